// Window management module - the OS window seam plus resolution and arrangement on top of it
pub mod arranger;
pub mod info;
pub mod resolver;

#[cfg(not(windows))]
pub mod headless;
#[cfg(windows)]
pub mod win32;

// Re-export main types
pub use arranger::{ArrangementOutcome, WindowArranger, DEFAULT_MIN_WINDOW_SIZE};
pub use info::{RunningProcess, TopLevelWindow, WindowId};
pub use resolver::{Resolution, WindowResolver};

use crate::errors::FleetResult;
use crate::layout::Rect;
use std::sync::Arc;

/// Operating-system window and process queries used by the resolver and the arranger
pub trait WindowApi: Send + Sync {
    /// All top-level windows in OS enumeration order
    fn top_level_windows(&self) -> Vec<TopLevelWindow>;

    /// True while the process has not exited
    fn process_alive(&self, process_id: u32) -> bool;

    /// Running processes whose executable file name equals `exe_name`, ignoring case
    fn running_processes(&self, exe_name: &str) -> Vec<RunningProcess>;

    fn is_minimized(&self, window: WindowId) -> bool;

    /// Restore a minimized window to its normal state
    fn restore(&self, window: WindowId) -> FleetResult<()>;

    /// Move and resize a window without changing z-order or focus
    fn set_bounds(&self, window: WindowId, rect: Rect) -> FleetResult<()>;

    /// Usable area of each display, primary display first
    fn working_areas(&self) -> Vec<Rect>;
}

/// Window API for the platform this binary was built for
pub fn system_window_api() -> Arc<dyn WindowApi> {
    #[cfg(windows)]
    {
        Arc::new(win32::Win32WindowApi::new())
    }
    #[cfg(not(windows))]
    {
        Arc::new(headless::HeadlessWindowApi::new())
    }
}
