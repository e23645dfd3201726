use crate::config::GridConfig;
use crate::errors::{FleetError, FleetResult};
use crate::layout::LayoutMode;
use crate::scan::{PathMatcher, ScanRequest, DEFAULT_NAME_PATTERNS};
use crate::window::{WindowApi, WindowArranger, WindowResolver};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Complete configuration for e_fleet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    pub scan: ScanConfig,
    pub layout: LayoutConfig,
    pub arrange: ArrangeConfig,
    pub lifecycle: LifecycleConfig,
}

/// Executable discovery settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Case-insensitive substrings a file name must contain
    pub name_patterns: Vec<String>,
    /// Case-insensitive file names that match as a whole
    pub exact_names: Vec<String>,
    /// Extension of candidate files, without the dot; `None` accepts any file
    pub extension: Option<String>,
    /// Minimum time between progress snapshots (ms)
    pub progress_interval_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            name_patterns: DEFAULT_NAME_PATTERNS.iter().map(|s| s.to_string()).collect(),
            exact_names: Vec::new(),
            extension: Some("exe".to_string()),
            progress_interval_ms: 150,
        }
    }
}

impl ScanConfig {
    pub fn matcher(&self) -> PathMatcher {
        PathMatcher::new(&self.name_patterns, &self.exact_names)
    }

    /// Scan request for `root` that skips the `known` executables
    pub fn request<I, P>(&self, root: impl Into<PathBuf>, known: I) -> ScanRequest
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        ScanRequest::new(root)
            .with_matcher(self.matcher())
            .with_extension(self.extension.as_deref())
            .with_known(known)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}

/// Named layout strategy as stored in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    #[default]
    Auto,
    Grid,
    Chaotic,
    Custom,
    /// All windows side by side in one row
    Horizontal,
    /// All windows stacked in one column
    Vertical,
}

impl FromStr for LayoutKind {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(LayoutKind::Auto),
            "grid" => Ok(LayoutKind::Grid),
            "chaotic" => Ok(LayoutKind::Chaotic),
            "custom" => Ok(LayoutKind::Custom),
            "horizontal" => Ok(LayoutKind::Horizontal),
            "vertical" => Ok(LayoutKind::Vertical),
            other => Err(FleetError::ConfigError(format!(
                "Unknown layout mode '{}' (expected auto, grid, chaotic, custom, horizontal or vertical)",
                other
            ))),
        }
    }
}

/// Layout preferences chosen in the arranger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub mode: LayoutKind,
    /// Index into the working areas, primary display first
    pub monitor_index: usize,
    pub designer: GridConfig,
    /// Designer cells picked as launch slots; when present they win over `mode`
    pub selected_cells: Vec<usize>,
    pub custom: GridConfig,
    /// Fixed seed for chaotic layouts; `None` uses the clock
    pub chaotic_seed: Option<u64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            mode: LayoutKind::Auto,
            monitor_index: 0,
            designer: GridConfig::default(),
            selected_cells: Vec::new(),
            custom: GridConfig::new(1, 2),
            chaotic_seed: None,
        }
    }
}

impl LayoutConfig {
    pub fn to_mode(&self) -> LayoutMode {
        if !self.selected_cells.is_empty() {
            let designer = self.designer.clamped();
            return LayoutMode::DesignerCells {
                cells: self.selected_cells.clone(),
                cols: designer.cols,
                rows: designer.rows,
            };
        }

        match self.mode {
            LayoutKind::Auto => LayoutMode::Auto,
            LayoutKind::Grid => LayoutMode::Grid,
            LayoutKind::Chaotic => LayoutMode::Chaotic {
                seed: self.chaotic_seed,
            },
            LayoutKind::Horizontal => LayoutMode::Horizontal,
            LayoutKind::Vertical => LayoutMode::Vertical,
            LayoutKind::Custom => {
                let custom = self.custom.clamped();
                LayoutMode::CustomGrid {
                    cols: custom.cols,
                    rows: custom.rows,
                }
            }
        }
    }
}

/// Window placement tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrangeConfig {
    /// How long to wait for each process window (ms)
    pub resolve_timeout_ms: u64,
    /// Delay between window enumerations (ms)
    pub poll_interval_ms: u64,
    /// Smallest width/height given to a window (px)
    pub min_window_size: i32,
    /// Pause between launching and arranging (ms)
    pub settle_delay_ms: u64,
}

impl Default for ArrangeConfig {
    fn default() -> Self {
        Self {
            resolve_timeout_ms: 5000,
            poll_interval_ms: 120,
            min_window_size: 200,
            settle_delay_ms: 600,
        }
    }
}

impl ArrangeConfig {
    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn resolver(&self, api: Arc<dyn WindowApi>) -> WindowResolver {
        WindowResolver::new(api)
            .with_timeout(self.resolve_timeout())
            .with_poll_interval(self.poll_interval())
    }

    pub fn arranger(&self, api: Arc<dyn WindowApi>) -> WindowArranger {
        WindowArranger::new(api.clone())
            .with_resolver(self.resolver(api))
            .with_min_window_size(self.min_window_size)
    }
}

/// Exit tracking settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Ask for a status when a client exits
    pub enabled: bool,
    /// Exits sooner than this after launch are ignored (ms)
    pub min_lifetime_ms: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_lifetime_ms: 1500,
        }
    }
}

impl LifecycleConfig {
    pub fn min_lifetime(&self) -> Duration {
        Duration::from_millis(self.min_lifetime_ms)
    }
}

impl FleetConfig {
    /// Load configuration from file
    pub fn load_from_file(path: impl AsRef<Path>) -> FleetResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: FleetConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> FleetResult<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `FLEET_*` overrides; `lookup` maps a variable name to its value
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup("FLEET_LAYOUT_MODE") {
            if let Ok(mode) = mode.parse::<LayoutKind>() {
                self.layout.mode = mode;
            }
        }
        if let Some(Ok(index)) = lookup("FLEET_MONITOR").map(|v| v.parse::<usize>()) {
            self.layout.monitor_index = index;
        }
        if let Some(Ok(cols)) = lookup("FLEET_CUSTOM_COLS").map(|v| v.parse::<usize>()) {
            self.layout.custom.cols = cols;
        }
        if let Some(Ok(rows)) = lookup("FLEET_CUSTOM_ROWS").map(|v| v.parse::<usize>()) {
            self.layout.custom.rows = rows;
        }

        // Lifecycle configuration
        if let Some(enabled) = lookup("FLEET_TRACK_EXITS") {
            self.lifecycle.enabled = enabled.to_lowercase() == "true";
        }
        if let Some(Ok(ms)) = lookup("FLEET_MIN_LIFETIME_MS").map(|v| v.parse::<u64>()) {
            self.lifecycle.min_lifetime_ms = ms;
        }

        if let Some(Ok(ms)) = lookup("FLEET_RESOLVE_TIMEOUT_MS").map(|v| v.parse::<u64>()) {
            self.arrange.resolve_timeout_ms = ms;
        }

        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> FleetResult<()> {
        if self.scan.name_patterns.iter().all(|p| p.trim().is_empty())
            && self.scan.exact_names.iter().all(|p| p.trim().is_empty())
        {
            return Err(FleetError::ConfigError(
                "Scan needs at least one name pattern or exact name".into(),
            ));
        }

        if self.layout.designer.rows == 0 || self.layout.designer.cols == 0 {
            return Err(FleetError::ConfigError(
                "Designer grid dimensions must be positive".into(),
            ));
        }

        let designer_cells = self.layout.designer.cell_count();
        if let Some(bad) = self
            .layout
            .selected_cells
            .iter()
            .find(|&&c| c >= designer_cells)
        {
            return Err(FleetError::ConfigError(format!(
                "Selected cell {} is outside the {}x{} designer grid",
                bad, self.layout.designer.cols, self.layout.designer.rows
            )));
        }

        if self.arrange.poll_interval_ms == 0 {
            return Err(FleetError::ConfigError(
                "Poll interval must be positive".into(),
            ));
        }

        if self.arrange.min_window_size < 0 {
            return Err(FleetError::ConfigError(
                "Minimum window size cannot be negative".into(),
            ));
        }

        Ok(())
    }
}
