// Window information as seen by one top-level window enumeration

use std::fmt;
use std::path::PathBuf;

/// Opaque OS window handle, stored as an integer so it can cross threads
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WindowId(pub u64);

impl fmt::Debug for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WindowId({:#x})", self.0)
    }
}

/// Snapshot of one top-level window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopLevelWindow {
    pub id: WindowId,
    pub process_id: u32,
    pub is_visible: bool,
}

impl TopLevelWindow {
    pub fn new(id: WindowId, process_id: u32, is_visible: bool) -> Self {
        Self {
            id,
            process_id,
            is_visible,
        }
    }

    /// True for a visible window owned by `process_id`
    pub fn is_visible_for(&self, process_id: u32) -> bool {
        self.is_visible && self.process_id == process_id
    }
}

/// A running process whose executable has a given file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningProcess {
    pub process_id: u32,
    /// Full image path when the OS lets us read it
    pub exe_path: Option<PathBuf>,
    /// Creation time as an ordering key; larger is newer
    pub started: u64,
}
