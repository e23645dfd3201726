// Lifecycle module - exit tracking for launched clients and the UI hand-off it reports through

pub mod dispatch;
pub mod tracker;

pub use dispatch::{UiDispatcher, UiExecutor, UiHandle, UiTask};
pub use tracker::{
    ExitDisposition, KillAllGuard, LifecycleTracker, StatusPrompt, WatchedProcess,
    DEFAULT_MIN_LIFETIME,
};
