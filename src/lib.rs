// E-Fleet: launcher and window arranger for a fleet of messenger client instances
// Finds client executables, plans screen layouts, places the launched windows and
// asks for a status when a client exits.

// Modular structure
pub mod client;
pub mod config;
pub mod display;
pub mod launcher;
pub mod layout;
pub mod lifecycle;
pub mod monitor;
pub mod scan;
pub mod window;

// Import our error handling module
pub mod errors;
pub use errors::{safe_lock, FleetError, FleetResult};

// Re-export main types for convenience
pub use client::{Client, ClientHandle, ClientStatus, ClientStore, JsonClientStore, StatusDecision};
pub use config::{
    ArrangeConfig, FleetConfig, GridConfig, LayoutConfig, LayoutKind, LifecycleConfig, ScanConfig,
};
pub use launcher::{
    arrange_running, launch_and_arrange, launch_selected, ArrangedLaunch, LaunchReport,
    RunningArrangement, RunningPlacement, SkipReason,
};
pub use layout::{plan, LayoutMode, Rect};
pub use lifecycle::{
    ExitDisposition, KillAllGuard, LifecycleTracker, StatusPrompt, UiDispatcher, UiExecutor,
};
pub use monitor::select_working_area;
pub use scan::{
    CancellationToken, PathMatcher, ScanOutcome, ScanProgress, ScanRequest, TreeScanner,
};
pub use window::{
    system_window_api, ArrangementOutcome, Resolution, RunningProcess, WindowApi, WindowArranger,
    WindowId, WindowResolver,
};
