// Launcher - starts the selected clients and hands their processes to the tracker and the arranger

use crate::client::{Client, ClientHandle, ClientStatus, ClientStore};
use crate::config::FleetConfig;
use crate::errors::{FleetError, FleetResult};
use crate::layout::{plan, Rect};
use crate::lifecycle::LifecycleTracker;
use crate::monitor::working_area_for;
use crate::scan::scanner::path_key;
use crate::scan::CancellationToken;
use crate::window::{ArrangementOutcome, RunningProcess, WindowApi};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fmt;
use std::process::Command;
use std::sync::Arc;
use std::thread;
use std::time::SystemTime;

/// Why a selected client was not started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Marked as lost by the user
    Crashed,
    MissingExecutable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Crashed => write!(f, "status is Crash"),
            SkipReason::MissingExecutable => write!(f, "executable not found"),
        }
    }
}

#[derive(Debug, Default)]
pub struct LaunchReport {
    /// Started processes in selection order
    pub launched: Vec<ClientHandle>,
    pub skipped: Vec<(String, SkipReason)>,
    pub errors: Vec<FleetError>,
}

impl LaunchReport {
    pub fn is_empty(&self) -> bool {
        self.launched.is_empty()
    }
}

/// Result of launching and then arranging the new windows
#[derive(Debug)]
pub struct ArrangedLaunch {
    pub report: LaunchReport,
    /// Working area the layout was planned on
    pub area: Option<Rect>,
    /// One outcome per launched client, same order as `report.launched`
    pub outcomes: Vec<ArrangementOutcome>,
}

/// Start every selected client and register each process with the tracker.
///
/// Clients with status `Crash` or a missing executable are skipped. A client
/// that fails to start is reported in `errors` and does not stop the rest.
pub fn launch_selected(store: &dyn ClientStore, tracker: &Arc<LifecycleTracker>) -> LaunchReport {
    let mut report = LaunchReport::default();

    for client in store.enumerate_all().into_iter().filter(|c| c.is_selected) {
        if client.status == ClientStatus::Crash {
            debug!("Skipping {}: {}", client.name, SkipReason::Crashed);
            report.skipped.push((client.name, SkipReason::Crashed));
            continue;
        }
        if !client.exe_path.is_file() {
            warn!(
                "Skipping {}: {} does not exist",
                client.name,
                client.exe_path.display()
            );
            report.skipped.push((client.name, SkipReason::MissingExecutable));
            continue;
        }

        match launch_one(store, tracker, client) {
            Ok(handle) => report.launched.push(handle),
            Err(e) => {
                warn!("{}", e);
                report.errors.push(e);
            }
        }
    }

    info!(
        "Launched {} client(s), skipped {}, {} error(s)",
        report.launched.len(),
        report.skipped.len(),
        report.errors.len()
    );
    report
}

fn launch_one(
    store: &dyn ClientStore,
    tracker: &Arc<LifecycleTracker>,
    client: Client,
) -> FleetResult<ClientHandle> {
    let mut command = build_command(&client)?;
    let child = command.spawn().map_err(|e| {
        FleetError::LaunchError(format!("Failed to start {}: {}", client.name, e))
    })?;
    let process_id = child.id();
    info!("Started {} (pid {})", client.name, process_id);

    if let Err(e) = store.record_launch(&client.exe_path, SystemTime::now()) {
        warn!("Could not record launch of {}: {}", client.name, e);
    }

    let handle = ClientHandle::new(process_id, client.exe_path.clone());
    if let Err(e) = tracker.track(child, client) {
        // Process keeps running; only its exit goes unnoticed.
        warn!("{}", e);
    }
    Ok(handle)
}

/// Command for a client: split arguments, working directory set to the executable's folder
pub fn build_command(client: &Client) -> FleetResult<Command> {
    let mut command = Command::new(&client.exe_path);

    if let Some(arguments) = client.arguments.as_deref().filter(|a| !a.trim().is_empty()) {
        let args = shell_words::split(arguments).map_err(|e| {
            FleetError::LaunchError(format!("Bad arguments for {}: {}", client.name, e))
        })?;
        command.args(args);
    }

    if let Some(dir) = client.exe_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        command.current_dir(dir);
    }

    Ok(command)
}

/// Launch the selected clients, give them time to show a window and lay them out
pub fn launch_and_arrange(
    store: &dyn ClientStore,
    tracker: &Arc<LifecycleTracker>,
    api: Arc<dyn WindowApi>,
    config: &FleetConfig,
) -> FleetResult<ArrangedLaunch> {
    let report = launch_selected(store, tracker);
    if report.is_empty() {
        return Ok(ArrangedLaunch {
            report,
            area: None,
            outcomes: Vec::new(),
        });
    }

    let area = working_area_for(api.as_ref(), config.layout.monitor_index)
        .ok_or_else(|| FleetError::WindowError("No display working area available".into()))?;

    let settle = config.arrange.settle_delay();
    debug!("Waiting {:?} for windows to settle", settle);
    thread::sleep(settle);

    let mode = config.layout.to_mode();
    let rects = plan(report.launched.len(), area, &mode);
    info!(
        "Planned {} slot(s) with {} layout on monitor {}",
        rects.len(),
        mode.name(),
        config.layout.monitor_index
    );

    let outcomes = config.arrange.arranger(api).arrange(&report.launched, &rects);
    Ok(ArrangedLaunch {
        report,
        area: Some(area),
        outcomes,
    })
}

/// Where one stored client ended up when arranging what is already running
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningPlacement {
    pub client: String,
    /// Process picked for the client, `None` when nothing was running
    pub process_id: Option<u32>,
    pub outcome: ArrangementOutcome,
}

/// Result of laying out clients that were started earlier
#[derive(Debug, Default)]
pub struct RunningArrangement {
    /// Working area the layout was planned on
    pub area: Option<Rect>,
    /// Store order; clients not reached before cancellation are absent
    pub placements: Vec<RunningPlacement>,
    pub cancelled: bool,
}

impl RunningArrangement {
    pub fn positioned(&self) -> usize {
        self.placements
            .iter()
            .filter(|p| p.outcome.is_positioned())
            .count()
    }
}

/// Apply the configured layout to clients that are already running.
///
/// Every stored client with an executable path gets a slot in store order,
/// selected or not. Each is matched to the newest running process of its
/// executable that no earlier client claimed. `cancel` is checked before
/// each client; a cancelled pass keeps the placements made so far.
pub fn arrange_running(
    store: &dyn ClientStore,
    api: Arc<dyn WindowApi>,
    config: &FleetConfig,
    cancel: &CancellationToken,
) -> FleetResult<RunningArrangement> {
    let clients: Vec<Client> = store
        .enumerate_all()
        .into_iter()
        .filter(|c| !c.exe_path.as_os_str().is_empty())
        .collect();
    if clients.is_empty() {
        debug!("No stored clients to arrange");
        return Ok(RunningArrangement::default());
    }

    let area = working_area_for(api.as_ref(), config.layout.monitor_index)
        .ok_or_else(|| FleetError::WindowError("No display working area available".into()))?;
    let mode = config.layout.to_mode();
    let rects = plan(clients.len(), area, &mode);
    info!(
        "Arranging running clients: {} slot(s) for {} client(s) with {} layout",
        rects.len(),
        clients.len(),
        mode.name()
    );

    let arranger = config.arrange.arranger(api.clone());
    let mut claimed: HashSet<u32> = HashSet::new();
    let mut result = RunningArrangement {
        area: Some(area),
        ..RunningArrangement::default()
    };

    for (i, client) in clients.into_iter().enumerate() {
        if cancel.is_cancelled() {
            info!("Arrangement cancelled after {} client(s)", i);
            result.cancelled = true;
            break;
        }

        let Some(rect) = rects.get(i).copied() else {
            result.placements.push(RunningPlacement {
                client: client.name,
                process_id: None,
                outcome: ArrangementOutcome::Unassigned,
            });
            continue;
        };

        let Some(process) = newest_unclaimed(api.as_ref(), &client, &claimed) else {
            debug!("{} is not running", client.name);
            result.placements.push(RunningPlacement {
                client: client.name,
                process_id: None,
                outcome: ArrangementOutcome::NotRunning,
            });
            continue;
        };
        claimed.insert(process.process_id);

        let handle = ClientHandle::new(process.process_id, client.exe_path.clone());
        let outcome = arranger.place(&handle, rect);
        result.placements.push(RunningPlacement {
            client: client.name,
            process_id: Some(process.process_id),
            outcome,
        });
    }

    info!(
        "Positioned {}/{} running client window(s)",
        result.positioned(),
        result.placements.len()
    );
    Ok(result)
}

/// Newest process of the client's executable not taken by another client.
///
/// A process whose image path is known must match the client's path; one
/// whose path could not be read is matched on the file name alone.
fn newest_unclaimed(
    api: &dyn WindowApi,
    client: &Client,
    claimed: &HashSet<u32>,
) -> Option<RunningProcess> {
    let exe_name = client.exe_path.file_name()?.to_string_lossy().into_owned();
    let wanted = path_key(&client.exe_path);

    let candidates: Vec<RunningProcess> = api
        .running_processes(&exe_name)
        .into_iter()
        .filter(|p| !claimed.contains(&p.process_id))
        .collect();

    let exact = candidates
        .iter()
        .filter(|p| p.exe_path.as_deref().map(path_key).as_deref() == Some(wanted.as_str()))
        .max_by_key(|p| p.started);
    let unknown = || {
        candidates
            .iter()
            .filter(|p| p.exe_path.is_none())
            .max_by_key(|p| p.started)
    };

    exact.or_else(unknown).cloned()
}
