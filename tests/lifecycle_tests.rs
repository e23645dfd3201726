//! Exit tracking: debounce, kill-all suppression and at-most-once status questions
use e_fleet::client::{Client, ClientStatus, ClientStore, JsonClientStore, StatusDecision};
use e_fleet::lifecycle::{ExitDisposition, LifecycleTracker, UiExecutor};
use e_fleet::LifecycleConfig;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const EXE: &str = "/fleet/alice/Telegram.exe";

struct Harness {
    executor: UiExecutor,
    store: Arc<JsonClientStore>,
    asked: Arc<AtomicUsize>,
    tracker: Arc<LifecycleTracker>,
}

fn harness(answer: Option<ClientStatus>) -> Harness {
    let executor = UiExecutor::new();
    let store = Arc::new(JsonClientStore::in_memory(vec![Client::from_exe_path(EXE)]));
    let asked = Arc::new(AtomicUsize::new(0));

    let counter = asked.clone();
    let prompt = move |_: &Client| -> Option<StatusDecision> {
        counter.fetch_add(1, Ordering::SeqCst);
        answer.map(StatusDecision::new)
    };
    let tracker = Arc::new(
        LifecycleTracker::new(Arc::new(executor.handle()), Arc::new(prompt), store.clone())
            .with_enabled(true),
    );

    Harness {
        executor,
        store,
        asked,
        tracker,
    }
}

fn status_of(store: &JsonClientStore, exe: &str) -> ClientStatus {
    store
        .enumerate_all()
        .into_iter()
        .find(|c| c.is_same_exe(Path::new(exe)))
        .map(|c| c.status)
        .unwrap()
}

#[test]
fn test_quick_exit_is_debounced() {
    let h = harness(Some(ClientStatus::Frozen));
    let t0 = Instant::now();
    h.tracker.register(10, Client::from_exe_path(EXE), t0);

    let disposition = h.tracker.handle_exit(10, t0 + Duration::from_millis(1000));

    assert_eq!(disposition, ExitDisposition::Debounced);
    assert_eq!(h.executor.run_pending(), 0);
    assert_eq!(h.asked.load(Ordering::SeqCst), 0);
    assert!(!h.tracker.is_tracked(10));
}

#[test]
fn test_long_lived_exit_asks_once_and_records() {
    let h = harness(Some(ClientStatus::Frozen));
    let t0 = Instant::now();
    h.tracker.register(11, Client::from_exe_path(EXE), t0);

    assert_eq!(
        h.tracker.handle_exit(11, t0 + Duration::from_millis(5000)),
        ExitDisposition::Reported
    );
    assert!(!h.tracker.is_tracked(11));
    assert_eq!(h.asked.load(Ordering::SeqCst), 0);

    assert_eq!(h.executor.run_pending(), 1);
    assert_eq!(h.asked.load(Ordering::SeqCst), 1);
    assert_eq!(status_of(&h.store, EXE), ClientStatus::Frozen);
}

#[test]
fn test_exit_exactly_at_min_lifetime_is_reported() {
    let h = harness(None);
    let t0 = Instant::now();
    h.tracker.register(12, Client::from_exe_path(EXE), t0);
    assert_eq!(
        h.tracker.handle_exit(12, t0 + h.tracker.min_lifetime()),
        ExitDisposition::Reported
    );
}

#[test]
fn test_declined_prompt_leaves_store_alone() {
    let h = harness(None);
    let t0 = Instant::now();
    h.tracker.register(13, Client::from_exe_path(EXE), t0);
    h.tracker.handle_exit(13, t0 + Duration::from_secs(10));

    h.executor.run_pending();
    assert_eq!(h.asked.load(Ordering::SeqCst), 1);
    assert_eq!(status_of(&h.store, EXE), ClientStatus::Active);
}

#[test]
fn test_store_failure_is_not_propagated() {
    let h = harness(Some(ClientStatus::Crash));
    let t0 = Instant::now();
    h.tracker
        .register(14, Client::from_exe_path("/fleet/ghost/Telegram.exe"), t0);
    h.tracker.handle_exit(14, t0 + Duration::from_secs(10));

    assert_eq!(h.executor.run_pending(), 1);
    assert_eq!(h.asked.load(Ordering::SeqCst), 1);
    assert_eq!(h.store.len(), 1);
}

#[test]
fn test_disabled_tracker_never_asks() {
    let h = harness(Some(ClientStatus::Frozen));
    h.tracker.set_enabled(false);
    let t0 = Instant::now();
    h.tracker.register(15, Client::from_exe_path(EXE), t0);

    assert_eq!(
        h.tracker.handle_exit(15, t0 + Duration::from_secs(60)),
        ExitDisposition::Disabled
    );
    assert_eq!(h.executor.pending(), 0);
    assert!(!h.tracker.is_tracked(15));
}

#[test]
fn test_kill_all_suppresses_until_guard_drops() {
    let h = harness(Some(ClientStatus::Frozen));
    let t0 = Instant::now();
    let late = t0 + Duration::from_secs(60);
    h.tracker.register(16, Client::from_exe_path(EXE), t0);
    h.tracker.register(17, Client::from_exe_path(EXE), t0);

    {
        let _guard = h.tracker.suppress_kill_all();
        assert_eq!(h.tracker.handle_exit(16, late), ExitDisposition::Suppressed);
    }

    assert!(!h.tracker.is_suppressed());
    assert_eq!(h.tracker.handle_exit(17, late), ExitDisposition::Reported);
    assert_eq!(h.executor.run_pending(), 1);
}

#[test]
fn test_guard_resets_when_kill_all_panics() {
    let h = harness(None);
    let tracker = h.tracker.clone();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let _guard = tracker.suppress_kill_all();
        assert!(tracker.is_suppressed());
        panic!("kill-all blew up");
    }));

    assert!(result.is_err());
    assert!(!h.tracker.is_suppressed());
}

#[test]
fn test_concurrent_notifications_ask_at_most_once() {
    let h = harness(Some(ClientStatus::Frozen));
    let t0 = Instant::now();
    h.tracker.register(18, Client::from_exe_path(EXE), t0);
    let exit = t0 + Duration::from_secs(30);

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let tracker = h.tracker.clone();
            thread::spawn(move || tracker.handle_exit(18, exit))
        })
        .collect();
    let reported = workers
        .into_iter()
        .map(|w| w.join().unwrap())
        .filter(|d| *d == ExitDisposition::Reported)
        .count();

    assert_eq!(reported, 1);
    assert_eq!(h.executor.run_pending(), 1);
    assert_eq!(h.asked.load(Ordering::SeqCst), 1);
}

#[test]
fn test_prompts_run_on_the_ui_thread() {
    let executor = UiExecutor::new();
    let store = Arc::new(JsonClientStore::in_memory(Vec::new()));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let prompt = move |client: &Client| -> Option<StatusDecision> {
        recorder
            .lock()
            .unwrap()
            .push((client.name.clone(), thread::current().id()));
        None
    };
    let tracker = Arc::new(
        LifecycleTracker::new(Arc::new(executor.handle()), Arc::new(prompt), store)
            .with_enabled(true),
    );

    let t0 = Instant::now();
    for pid in 0..4u32 {
        tracker.register(
            pid,
            Client::from_exe_path(format!("/fleet/acct{}/Telegram.exe", pid)),
            t0,
        );
    }
    let workers: Vec<_> = (0..4u32)
        .map(|pid| {
            let tracker = tracker.clone();
            thread::spawn(move || tracker.handle_exit(pid, t0 + Duration::from_secs(5)))
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(executor.run_pending(), 4);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 4);
    assert!(seen.iter().all(|(_, id)| *id == thread::current().id()));
    assert_eq!(tracker.tracked_count(), 0);
}

#[test]
fn test_from_config_picks_up_settings() {
    let executor = UiExecutor::new();
    let store = Arc::new(JsonClientStore::in_memory(Vec::new()));
    let prompt = |_: &Client| -> Option<StatusDecision> { None };
    let config = LifecycleConfig {
        enabled: true,
        min_lifetime_ms: 250,
    };

    let tracker =
        LifecycleTracker::from_config(&config, Arc::new(executor.handle()), Arc::new(prompt), store);
    assert!(tracker.is_enabled());
    assert_eq!(tracker.min_lifetime(), Duration::from_millis(250));
}

#[cfg(unix)]
#[test]
fn test_real_child_exit_reaches_the_prompt() {
    let h = harness(Some(ClientStatus::Frozen));
    let tracker = Arc::new(
        LifecycleTracker::new(
            Arc::new(h.executor.handle()),
            Arc::new({
                let counter = h.asked.clone();
                move |_: &Client| -> Option<StatusDecision> {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Some(StatusDecision::new(ClientStatus::Frozen))
                }
            }),
            h.store.clone(),
        )
        .with_enabled(true)
        .with_min_lifetime(Duration::ZERO),
    );

    let child = std::process::Command::new("sh")
        .args(["-c", "sleep 0.2"])
        .spawn()
        .unwrap();
    let pid = tracker.track(child, Client::from_exe_path(EXE)).unwrap();
    assert!(tracker.is_tracked(pid));

    let deadline = Instant::now() + Duration::from_secs(10);
    while h.asked.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
        h.executor.run_for(Duration::from_millis(100));
    }

    assert_eq!(h.asked.load(Ordering::SeqCst), 1);
    assert!(!tracker.is_tracked(pid));
    assert_eq!(status_of(&h.store, EXE), ClientStatus::Frozen);
}

#[cfg(unix)]
#[test]
fn test_real_child_quick_exit_is_ignored() {
    let h = harness(Some(ClientStatus::Frozen));
    let child = std::process::Command::new("true").spawn().unwrap();
    let pid = h.tracker.track(child, Client::from_exe_path(EXE)).unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    while h.tracker.is_tracked(pid) && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(20));
    }

    assert!(!h.tracker.is_tracked(pid));
    assert_eq!(h.executor.run_pending(), 0);
    assert_eq!(h.asked.load(Ordering::SeqCst), 0);
}
