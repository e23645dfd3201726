// Window resolver - waits for a freshly started process to show a top-level window

use super::{WindowApi, WindowId};
use log::debug;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Delay between two window enumerations
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(120);
/// Total budget for one process
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Result of waiting for a process window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Found(WindowId),
    /// The budget ran out while the process was still alive
    NotFound,
    /// The process exited before showing a window
    ProcessGone,
}

#[derive(Clone)]
pub struct WindowResolver {
    api: Arc<dyn WindowApi>,
    poll_interval: Duration,
    timeout: Duration,
}

impl WindowResolver {
    pub fn new(api: Arc<dyn WindowApi>) -> Self {
        Self {
            api,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_RESOLVE_TIMEOUT,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// First visible top-level window owned by `process_id`, if any right now
    pub fn find_visible_window(&self, process_id: u32) -> Option<WindowId> {
        self.api
            .top_level_windows()
            .into_iter()
            .find(|w| w.is_visible_for(process_id))
            .map(|w| w.id)
    }

    /// Poll until a window shows up, the process exits or the budget runs out
    pub fn resolve(&self, process_id: u32) -> Resolution {
        self.resolve_within(process_id, self.timeout)
    }

    pub fn resolve_within(&self, process_id: u32, timeout: Duration) -> Resolution {
        let started = Instant::now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            if let Some(window) = self.find_visible_window(process_id) {
                debug!(
                    "pid {} resolved to {:?} after {} attempt(s), {:?}",
                    process_id,
                    window,
                    attempts,
                    started.elapsed()
                );
                return Resolution::Found(window);
            }

            let elapsed = started.elapsed();
            if elapsed >= timeout {
                debug!(
                    "pid {} showed no visible window within {:?} ({} attempts)",
                    process_id, timeout, attempts
                );
                return Resolution::NotFound;
            }

            thread::sleep(self.poll_interval.min(timeout - elapsed));

            if !self.api.process_alive(process_id) {
                debug!("pid {} exited while waiting for its window", process_id);
                return Resolution::ProcessGone;
            }
        }
    }
}
