// Lifecycle tracker - turns client process exits into at most one status question each

use super::UiDispatcher;
use crate::client::{Client, ClientStore, StatusDecision};
use crate::config::LifecycleConfig;
use crate::errors::{FleetError, FleetResult};
use dashmap::DashMap;
use log::{debug, info, warn};
use std::io;
use std::process::Child;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Exits sooner than this after launch are treated as spawner re-execs
pub const DEFAULT_MIN_LIFETIME: Duration = Duration::from_millis(1500);

/// Asks the user what happened to a client whose process exited; runs on the UI thread
pub trait StatusPrompt: Send + Sync {
    fn ask_status(&self, client: &Client) -> Option<StatusDecision>;
}

impl<F> StatusPrompt for F
where
    F: Fn(&Client) -> Option<StatusDecision> + Send + Sync,
{
    fn ask_status(&self, client: &Client) -> Option<StatusDecision> {
        self(client)
    }
}

/// A running process whose exit can be waited on from a watcher thread
pub trait WatchedProcess: Send + 'static {
    fn id(&self) -> u32;

    /// Block until the process exits
    fn wait_for_exit(self: Box<Self>) -> io::Result<()>;
}

impl WatchedProcess for Child {
    fn id(&self) -> u32 {
        Child::id(self)
    }

    fn wait_for_exit(self: Box<Self>) -> io::Result<()> {
        let mut child = *self;
        child.wait().map(|_| ())
    }
}

/// What the tracker did with one exit notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDisposition {
    /// A status question was posted to the UI thread
    Reported,
    /// A kill-all was in progress
    Suppressed,
    /// Tracking is switched off
    Disabled,
    /// The process lived shorter than the minimum lifetime
    Debounced,
    /// No entry for this process id (never registered or already handled)
    Untracked,
}

#[derive(Debug, Clone)]
struct TrackedEntry {
    client: Client,
    started_at: Instant,
}

pub struct LifecycleTracker {
    entries: DashMap<u32, TrackedEntry>,
    suppress_kill_all: AtomicBool,
    enabled: AtomicBool,
    min_lifetime: Duration,
    dispatcher: Arc<dyn UiDispatcher>,
    prompt: Arc<dyn StatusPrompt>,
    store: Arc<dyn ClientStore>,
}

impl LifecycleTracker {
    /// Disabled tracker with the default minimum lifetime
    pub fn new(
        dispatcher: Arc<dyn UiDispatcher>,
        prompt: Arc<dyn StatusPrompt>,
        store: Arc<dyn ClientStore>,
    ) -> Self {
        Self {
            entries: DashMap::new(),
            suppress_kill_all: AtomicBool::new(false),
            enabled: AtomicBool::new(false),
            min_lifetime: DEFAULT_MIN_LIFETIME,
            dispatcher,
            prompt,
            store,
        }
    }

    pub fn from_config(
        config: &LifecycleConfig,
        dispatcher: Arc<dyn UiDispatcher>,
        prompt: Arc<dyn StatusPrompt>,
        store: Arc<dyn ClientStore>,
    ) -> Self {
        Self::new(dispatcher, prompt, store)
            .with_enabled(config.enabled)
            .with_min_lifetime(config.min_lifetime())
    }

    pub fn with_enabled(self, enabled: bool) -> Self {
        self.set_enabled(enabled);
        self
    }

    pub fn with_min_lifetime(mut self, min_lifetime: Duration) -> Self {
        self.min_lifetime = min_lifetime;
        self
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn min_lifetime(&self) -> Duration {
        self.min_lifetime
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppress_kill_all.load(Ordering::SeqCst)
    }

    pub fn tracked_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_tracked(&self, process_id: u32) -> bool {
        self.entries.contains_key(&process_id)
    }

    /// Record a process started at `started_at`; the caller delivers its exit via `handle_exit`.
    ///
    /// A live entry for the same pid (pid reuse) is replaced; its client is returned.
    pub fn register(&self, process_id: u32, client: Client, started_at: Instant) -> Option<Client> {
        debug!("Tracking pid {} for {}", process_id, client.name);
        let previous = self
            .entries
            .insert(process_id, TrackedEntry { client, started_at })?;
        warn!(
            "pid {} was still tracked for {}; replacing that entry",
            process_id, previous.client.name
        );
        Some(previous.client)
    }

    /// Register a freshly started process and watch for its exit on a background thread
    pub fn track<P>(self: &Arc<Self>, process: P, client: Client) -> FleetResult<u32>
    where
        P: WatchedProcess,
    {
        let process_id = process.id();
        self.register(process_id, client, Instant::now());

        let tracker = Arc::clone(self);
        let process: Box<dyn WatchedProcess> = Box::new(process);
        let spawned = thread::Builder::new()
            .name(format!("exit-watch-{}", process_id))
            .spawn(move || {
                if let Err(e) = process.wait_for_exit() {
                    warn!("Lost track of pid {}: {}", process_id, e);
                }
                tracker.handle_exit(process_id, Instant::now());
            });

        match spawned {
            Ok(_) => Ok(process_id),
            Err(e) => {
                self.entries.remove(&process_id);
                Err(FleetError::LaunchError(format!(
                    "Failed to watch pid {}: {}",
                    process_id, e
                )))
            }
        }
    }

    /// Decide what an exit of `process_id` at `exited_at` means.
    ///
    /// The entry is removed before anything else, so concurrent or repeated
    /// notifications for the same process can post at most one question.
    pub fn handle_exit(&self, process_id: u32, exited_at: Instant) -> ExitDisposition {
        let Some((_, entry)) = self.entries.remove(&process_id) else {
            debug!("Exit of untracked pid {}", process_id);
            return ExitDisposition::Untracked;
        };

        if self.is_suppressed() {
            debug!("Exit of pid {} during kill-all; not asking", process_id);
            return ExitDisposition::Suppressed;
        }
        if !self.is_enabled() {
            debug!("Exit of pid {} ignored; tracking disabled", process_id);
            return ExitDisposition::Disabled;
        }

        let lived = exited_at.saturating_duration_since(entry.started_at);
        if lived < self.min_lifetime {
            debug!(
                "pid {} exited after {:?} (< {:?}); treating as spawner",
                process_id, lived, self.min_lifetime
            );
            return ExitDisposition::Debounced;
        }

        info!(
            "{} (pid {}) exited after {:?}; asking for status",
            entry.client.name, process_id, lived
        );
        let prompt = Arc::clone(&self.prompt);
        let store = Arc::clone(&self.store);
        let client = entry.client;
        self.dispatcher.post(Box::new(move || {
            let Some(decision) = prompt.ask_status(&client) else {
                return;
            };
            if let Err(e) = store.record_status(&client.exe_path, &decision) {
                warn!("Could not record status for {}: {}", client.name, e);
            }
        }));
        ExitDisposition::Reported
    }

    /// Silence status questions until the returned guard is dropped
    pub fn suppress_kill_all(&self) -> KillAllGuard<'_> {
        self.suppress_kill_all.store(true, Ordering::SeqCst);
        KillAllGuard {
            flag: &self.suppress_kill_all,
        }
    }
}

/// Keeps kill-all suppression on while alive; clears it on drop, unwinding included
#[must_use = "suppression ends as soon as the guard is dropped"]
pub struct KillAllGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for KillAllGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
