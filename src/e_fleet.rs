use e_fleet::display::{format_count, format_outcome, print_layout_preview, print_monitor_header};
use e_fleet::lifecycle::{LifecycleTracker, StatusPrompt, UiExecutor};
use e_fleet::monitor::working_area_for;
use e_fleet::{
    arrange_running, launch_and_arrange, launch_selected, plan, system_window_api,
    ArrangementOutcome, CancellationToken, Client, ClientStatus, ClientStore, FleetConfig,
    FleetError, FleetResult, JsonClientStore, ScanOutcome, StatusDecision, TreeScanner,
};
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const BANNER: &str = r#"
 ███████╗      ███████╗██╗     ███████╗███████╗████████╗
 ██╔════╝      ██╔════╝██║     ██╔════╝██╔════╝╚══██╔══╝
 █████╗  █████╗█████╗  ██║     █████╗  █████╗     ██║
 ██╔══╝  ╚════╝██╔══╝  ██║     ██╔══╝  ██╔══╝     ██║
 ███████╗      ██║     ███████╗███████╗███████╗   ██║
 ╚══════╝      ╚═╝     ╚══════╝╚══════╝╚══════╝   ╚═╝
"#;

const DEFAULT_STORE: &str = "clients.json";

/// Command line after the subcommand: positionals plus `--flag [value]` options
struct Options {
    positionals: Vec<String>,
    config: Option<String>,
    store: String,
    arrange: bool,
}

impl Options {
    fn parse(args: &[String]) -> FleetResult<Self> {
        let mut options = Options {
            positionals: Vec::new(),
            config: None,
            store: DEFAULT_STORE.to_string(),
            arrange: false,
        };

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--config" => options.config = Some(value_of("--config", iter.next())?),
                "--store" => options.store = value_of("--store", iter.next())?,
                "--arrange" => options.arrange = true,
                flag if flag.starts_with("--") => {
                    return Err(FleetError::ConfigError(format!("Unknown option {}", flag)))
                }
                _ => options.positionals.push(arg.clone()),
            }
        }
        Ok(options)
    }

    fn load_config(&self) -> FleetResult<FleetConfig> {
        let config = match &self.config {
            Some(path) => FleetConfig::load_from_file(path)?,
            None => FleetConfig::default(),
        };
        let config = config.with_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }
}

fn value_of(flag: &str, value: Option<&String>) -> FleetResult<String> {
    value
        .cloned()
        .ok_or_else(|| FleetError::ConfigError(format!("{} needs a value", flag)))
}

/// Raise `flag` on Ctrl+C
fn install_interrupt(flag: Arc<AtomicBool>) -> FleetResult<()> {
    ctrlc::set_handler(move || {
        println!("\n🛑 Ctrl+C pressed - stopping...");
        flag.store(true, Ordering::SeqCst);
    })
    .map_err(|e| FleetError::ConfigError(format!("Cannot install Ctrl+C handler: {}", e)))
}

fn run_scan(options: &Options) -> FleetResult<()> {
    let root = options
        .positionals
        .first()
        .ok_or_else(|| FleetError::ConfigError("scan needs a root directory".into()))?;
    let config = options.load_config()?;
    let store = JsonClientStore::open(&options.store)?;
    let known: Vec<_> = store.enumerate_all().into_iter().map(|c| c.exe_path).collect();

    let cancel = CancellationToken::new();
    let interrupted = Arc::new(AtomicBool::new(false));
    install_interrupt(interrupted.clone())?;

    let request = config
        .scan
        .request(root.as_str(), known)
        .with_cancellation(cancel.clone());
    println!("🔍 Scanning {} ...", root);

    let scanner = TreeScanner::new().with_progress_interval(config.scan.progress_interval());
    let handle = scanner.spawn(request, |progress| {
        print!("\r{}", progress);
        let _ = io::stdout().flush();
    });

    while !handle.is_finished() {
        if interrupted.load(Ordering::SeqCst) {
            cancel.cancel();
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    let outcome = handle
        .join()
        .map_err(|_| FleetError::IoError("Scanner thread panicked".into()))?;
    println!();

    match outcome {
        ScanOutcome::Completed { paths, progress } => {
            for path in &paths {
                println!("  + {}", path.display());
            }
            let added = store.add_discovered(&paths)?;
            println!(
                "✅ Visited {} files, matched {}, added {} new client(s) to {}",
                format_count(progress.visited),
                format_count(progress.matched),
                added,
                options.store
            );
        }
        ScanOutcome::Cancelled { partial, progress } => {
            println!(
                "⚠️ Scan cancelled after {} files; {} new path(s) found, nothing saved",
                format_count(progress.visited),
                partial.len()
            );
        }
    }
    Ok(())
}

fn run_plan(options: &Options) -> FleetResult<()> {
    let count: usize = options
        .positionals
        .first()
        .ok_or_else(|| FleetError::ConfigError("plan needs a window count".into()))?
        .parse()
        .map_err(|e| FleetError::ConfigError(format!("Bad window count: {}", e)))?;
    let config = options.load_config()?;

    let api = system_window_api();
    let area = working_area_for(api.as_ref(), config.layout.monitor_index)
        .ok_or_else(|| FleetError::WindowError("No display working area available".into()))?;
    let mode = config.layout.to_mode();
    let rects = plan(count, area, &mode);

    print_monitor_header(config.layout.monitor_index, area, rects.len());
    println!("Layout: {}", mode.name());
    for (i, rect) in rects.iter().enumerate() {
        println!(
            "  {:>3}: ({}, {}) {}x{}",
            i + 1,
            rect.x,
            rect.y,
            rect.width,
            rect.height
        );
    }
    if rects.len() < count {
        println!("⚠️ Only {} of {} windows fit this layout", rects.len(), count);
    }
    println!();
    print_layout_preview(area, &rects)?;
    Ok(())
}

/// Asks on the console what happened to a client that exited
struct ConsolePrompt;

impl StatusPrompt for ConsolePrompt {
    fn ask_status(&self, client: &Client) -> Option<StatusDecision> {
        println!();
        println!("❓ {} closed. What happened?", client.name);
        println!("   [a] Active  [f] Frozen  [c] Crash  [Enter] skip");
        let answer = read_line()?;
        let status = match answer.trim().to_lowercase().as_str() {
            "a" => ClientStatus::Active,
            "f" => ClientStatus::Frozen,
            "c" => ClientStatus::Crash,
            _ => return None,
        };

        print!("   Comment (optional): ");
        let _ = io::stdout().flush();
        let comment = read_line().unwrap_or_default();
        let decision = StatusDecision::new(status);
        Some(if comment.trim().is_empty() {
            decision
        } else {
            decision.with_comment(comment.trim())
        })
    }
}

fn read_line() -> Option<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok()?;
    Some(line)
}

fn run_launch(options: &Options) -> FleetResult<()> {
    let config = options.load_config()?;
    let store: Arc<JsonClientStore> = Arc::new(JsonClientStore::open(&options.store)?);
    let executor = UiExecutor::new();
    let tracker = Arc::new(LifecycleTracker::from_config(
        &config.lifecycle,
        Arc::new(executor.handle()),
        Arc::new(ConsolePrompt),
        store.clone(),
    ));

    let interrupted = Arc::new(AtomicBool::new(false));
    install_interrupt(interrupted.clone())?;

    let report = if options.arrange {
        let arranged = launch_and_arrange(store.as_ref(), &tracker, system_window_api(), &config)?;
        for (handle, outcome) in arranged.report.launched.iter().zip(&arranged.outcomes) {
            println!("  {}", format_outcome(handle.process_id, outcome));
        }
        arranged.report
    } else {
        launch_selected(store.as_ref(), &tracker)
    };

    for (name, reason) in &report.skipped {
        println!("  ⏭️ {}: {}", name, reason);
    }
    for error in &report.errors {
        println!("  ❌ {}", error);
    }
    println!("🚀 Launched {} client(s)", report.launched.len());

    if !tracker.is_enabled() {
        return Ok(());
    }

    println!("👀 Watching for exits (Ctrl+C to stop)...");
    while !interrupted.load(Ordering::SeqCst) {
        executor.run_for(Duration::from_millis(200));
        if tracker.tracked_count() == 0 && executor.pending() == 0 {
            println!("All clients exited");
            break;
        }
    }

    Ok(())
}

fn run_arrange(options: &Options) -> FleetResult<()> {
    let config = options.load_config()?;
    let store = JsonClientStore::open(&options.store)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    ctrlc::set_handler(move || {
        println!("\n🛑 Ctrl+C pressed - stopping after the current window...");
        on_interrupt.cancel();
    })
    .map_err(|e| FleetError::ConfigError(format!("Cannot install Ctrl+C handler: {}", e)))?;

    let arranged = arrange_running(&store, system_window_api(), &config, &cancel)?;

    let Some(area) = arranged.area else {
        println!("No stored clients to arrange in {}", options.store);
        return Ok(());
    };
    print_monitor_header(config.layout.monitor_index, area, arranged.placements.len());
    for placement in &arranged.placements {
        match placement.process_id {
            Some(pid) => println!(
                "  {}: {}",
                placement.client,
                format_outcome(pid, &placement.outcome)
            ),
            None if placement.outcome == ArrangementOutcome::Unassigned => {
                println!("  {}: no free slot", placement.client)
            }
            None => println!("  {}: not running", placement.client),
        }
    }
    if arranged.cancelled {
        println!("⚠️ Arrangement cancelled");
    }
    println!(
        "✅ Positioned {} of {} client window(s)",
        arranged.positioned(),
        arranged.placements.len()
    );
    Ok(())
}

fn show_help() {
    println!("{}", BANNER);
    println!("Usage: e_fleet <command> [options]");
    println!();
    println!("Commands:");
    println!("  scan <root>      Find client executables under <root> and add new ones");
    println!("  plan <count>     Show the slots <count> windows would get");
    println!("  launch           Start every selected client");
    println!("  arrange          Lay out the stored clients that are already running");
    println!("  help             Show this help message");
    println!();
    println!("Options:");
    println!("  --config <file>  JSON configuration (defaults otherwise)");
    println!("  --store <file>   Client list (default {})", DEFAULT_STORE);
    println!("  --arrange        With launch: lay the new windows out");
    println!();
    println!("Environment:");
    println!("  FLEET_LAYOUT_MODE  auto | grid | chaotic | custom | horizontal | vertical");
    println!("  FLEET_MONITOR, FLEET_CUSTOM_COLS, FLEET_CUSTOM_ROWS");
    println!("  FLEET_TRACK_EXITS=true  ask for a status when a client exits");
    println!("  RUST_LOG           log filter (default info)");
    println!();
    println!("Examples:");
    println!("  e_fleet scan D:\\accounts");
    println!("  FLEET_LAYOUT_MODE=grid e_fleet plan 6");
    println!("  e_fleet launch --arrange");
    println!("  FLEET_LAYOUT_MODE=vertical e_fleet arrange");
    println!();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let rest = args.get(2..).unwrap_or(&[]);

    match args.get(1).map(|s| s.as_str()) {
        Some("scan") => run_scan(&Options::parse(rest)?)?,
        Some("plan") => run_plan(&Options::parse(rest)?)?,
        Some("launch") => run_launch(&Options::parse(rest)?)?,
        Some("arrange") => run_arrange(&Options::parse(rest)?)?,
        Some("help") | Some("-h") | Some("--help") | None => show_help(),
        Some(unknown) => {
            println!("❌ Unknown command: {}", unknown);
            println!("Run 'e_fleet help' for usage information");
        }
    }
    Ok(())
}
