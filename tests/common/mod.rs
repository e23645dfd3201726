//! Shared in-memory window system for integration tests
#![allow(dead_code)]

use e_fleet::layout::Rect;
use e_fleet::window::{RunningProcess, TopLevelWindow, WindowApi, WindowId};
use e_fleet::{FleetError, FleetResult};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Default)]
struct FakeState {
    windows: Vec<TopLevelWindow>,
    alive: HashSet<u32>,
    minimized: HashSet<WindowId>,
    restored: Vec<WindowId>,
    moves: Vec<(WindowId, Rect)>,
    refuse_moves: HashSet<WindowId>,
    /// Windows that only show up once this instant has passed
    delayed: Vec<(Instant, TopLevelWindow)>,
    /// Executable file name and the process listed under it
    running: Vec<(String, RunningProcess)>,
    enumerations: usize,
}

/// `WindowApi` backed by a scripted list of windows and processes
pub struct FakeWindowApi {
    state: Mutex<FakeState>,
    areas: Vec<Rect>,
}

impl FakeWindowApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState::default()),
            areas: vec![Rect::new(0, 0, 1920, 1080)],
        }
    }

    pub fn with_areas(mut self, areas: Vec<Rect>) -> Self {
        self.areas = areas;
        self
    }

    /// A live process with one window
    pub fn with_window(self, pid: u32, window: u64, visible: bool) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.alive.insert(pid);
            state
                .windows
                .push(TopLevelWindow::new(WindowId(window), pid, visible));
        }
        self
    }

    /// A live process whose window appears after `delay`
    pub fn with_late_window(self, pid: u32, window: u64, delay: Duration) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.alive.insert(pid);
            state.delayed.push((
                Instant::now() + delay,
                TopLevelWindow::new(WindowId(window), pid, true),
            ));
        }
        self
    }

    /// A live process that never shows a window
    pub fn with_process(self, pid: u32) -> Self {
        self.state.lock().unwrap().alive.insert(pid);
        self
    }

    /// A live process listed by executable name, started at `started`
    pub fn with_running(self, pid: u32, exe_path: &str, started: u64) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.alive.insert(pid);
            let exe_path = PathBuf::from(exe_path);
            let name = exe_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            state.running.push((
                name,
                RunningProcess {
                    process_id: pid,
                    exe_path: Some(exe_path),
                    started,
                },
            ));
        }
        self
    }

    /// A live process listed by executable name whose full path cannot be read
    pub fn with_running_unreadable(self, pid: u32, exe_name: &str, started: u64) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.alive.insert(pid);
            state.running.push((
                exe_name.to_string(),
                RunningProcess {
                    process_id: pid,
                    exe_path: None,
                    started,
                },
            ));
        }
        self
    }

    pub fn minimized(self, window: u64) -> Self {
        self.state.lock().unwrap().minimized.insert(WindowId(window));
        self
    }

    pub fn refusing_moves(self, window: u64) -> Self {
        self.state
            .lock()
            .unwrap()
            .refuse_moves
            .insert(WindowId(window));
        self
    }

    pub fn kill(&self, pid: u32) {
        self.state.lock().unwrap().alive.remove(&pid);
    }

    pub fn moves(&self) -> Vec<(WindowId, Rect)> {
        self.state.lock().unwrap().moves.clone()
    }

    pub fn restored(&self) -> Vec<WindowId> {
        self.state.lock().unwrap().restored.clone()
    }

    pub fn enumerations(&self) -> usize {
        self.state.lock().unwrap().enumerations
    }
}

impl WindowApi for FakeWindowApi {
    fn top_level_windows(&self) -> Vec<TopLevelWindow> {
        let mut state = self.state.lock().unwrap();
        state.enumerations += 1;

        let now = Instant::now();
        let (ready, waiting): (Vec<_>, Vec<_>) =
            state.delayed.drain(..).partition(|(at, _)| *at <= now);
        state.delayed = waiting;
        for (_, window) in ready {
            state.windows.push(window);
        }
        state.windows.clone()
    }

    fn process_alive(&self, process_id: u32) -> bool {
        self.state.lock().unwrap().alive.contains(&process_id)
    }

    fn running_processes(&self, exe_name: &str) -> Vec<RunningProcess> {
        let state = self.state.lock().unwrap();
        state
            .running
            .iter()
            .filter(|(name, p)| {
                name.eq_ignore_ascii_case(exe_name) && state.alive.contains(&p.process_id)
            })
            .map(|(_, p)| p.clone())
            .collect()
    }

    fn is_minimized(&self, window: WindowId) -> bool {
        self.state.lock().unwrap().minimized.contains(&window)
    }

    fn restore(&self, window: WindowId) -> FleetResult<()> {
        let mut state = self.state.lock().unwrap();
        state.minimized.remove(&window);
        state.restored.push(window);
        Ok(())
    }

    fn set_bounds(&self, window: WindowId, rect: Rect) -> FleetResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.refuse_moves.contains(&window) {
            return Err(FleetError::WindowError(format!(
                "access denied for {:?}",
                window
            )));
        }
        state.moves.push((window, rect));
        Ok(())
    }

    fn working_areas(&self) -> Vec<Rect> {
        self.areas.clone()
    }
}
