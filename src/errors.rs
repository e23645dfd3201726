use std::fmt;

/// Error type shared by every e_fleet component
#[derive(Debug)]
pub enum FleetError {
    /// Invalid or unreadable configuration
    ConfigError(String),
    /// Filesystem errors that could not be recovered locally
    IoError(String),
    /// Poisoned mutex or similar lock failures
    LockError(String),
    /// A client process could not be started
    LaunchError(String),
    /// An OS window call failed
    WindowError(String),
    /// The client store rejected an update
    StoreError(String),
    /// The operation has no implementation on this platform
    Unsupported(String),
}

impl fmt::Display for FleetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FleetError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            FleetError::IoError(msg) => write!(f, "I/O error: {}", msg),
            FleetError::LockError(msg) => write!(f, "Lock error: {}", msg),
            FleetError::LaunchError(msg) => write!(f, "Launch failed: {}", msg),
            FleetError::WindowError(msg) => write!(f, "Window operation failed: {}", msg),
            FleetError::StoreError(msg) => write!(f, "Client store error: {}", msg),
            FleetError::Unsupported(msg) => write!(f, "Unsupported on this platform: {}", msg),
        }
    }
}

impl std::error::Error for FleetError {}

impl From<std::io::Error> for FleetError {
    fn from(err: std::io::Error) -> Self {
        FleetError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for FleetError {
    fn from(err: serde_json::Error) -> Self {
        FleetError::ConfigError(err.to_string())
    }
}

/// Result type alias for e_fleet operations
pub type FleetResult<T> = Result<T, FleetError>;

/// Safe mutex lock wrapper
pub fn safe_lock<'a, T>(
    mutex: &'a std::sync::Mutex<T>,
    context: &str,
) -> FleetResult<std::sync::MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|_| FleetError::LockError(format!("Failed to acquire lock for {}", context)))
}
