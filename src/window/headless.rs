// Fallback window seam for platforms without a supported window system

use super::{RunningProcess, TopLevelWindow, WindowApi, WindowId};
use crate::errors::{FleetError, FleetResult};
use crate::layout::Rect;

/// Working area reported when no display can be queried
pub const FALLBACK_WORKING_AREA: Rect = Rect {
    x: 0,
    y: 0,
    width: 1920,
    height: 1080,
};

/// Sees no windows and refuses to move any; process liveness uses procfs where available
#[derive(Debug, Default)]
pub struct HeadlessWindowApi;

impl HeadlessWindowApi {
    pub fn new() -> Self {
        Self
    }
}

impl WindowApi for HeadlessWindowApi {
    fn top_level_windows(&self) -> Vec<TopLevelWindow> {
        Vec::new()
    }

    fn process_alive(&self, process_id: u32) -> bool {
        if cfg!(target_os = "linux") {
            std::path::Path::new(&format!("/proc/{}", process_id)).exists()
        } else {
            true
        }
    }

    fn running_processes(&self, _exe_name: &str) -> Vec<RunningProcess> {
        Vec::new()
    }

    fn is_minimized(&self, _window: WindowId) -> bool {
        false
    }

    fn restore(&self, window: WindowId) -> FleetResult<()> {
        Err(FleetError::Unsupported(format!("restore {:?}", window)))
    }

    fn set_bounds(&self, window: WindowId, _rect: Rect) -> FleetResult<()> {
        Err(FleetError::Unsupported(format!("move {:?}", window)))
    }

    fn working_areas(&self) -> Vec<Rect> {
        vec![FALLBACK_WORKING_AREA]
    }
}
