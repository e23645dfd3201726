// Scan module - finds client executables under an arbitrary directory tree

pub mod cancel;
pub mod matcher;
pub mod scanner;

pub use cancel::CancellationToken;
pub use matcher::{PathMatcher, DEFAULT_NAME_PATTERNS};
pub use scanner::{Scan, ScanOutcome, ScanProgress, ScanRequest, TreeScanner};
