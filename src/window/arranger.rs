// Window arranger - pairs launched clients with planned rectangles and moves their windows

use super::{Resolution, WindowApi, WindowId, WindowResolver};
use crate::client::ClientHandle;
use crate::layout::Rect;
use log::{info, warn};
use std::sync::Arc;

/// Smallest width or height a positioned window may get
pub const DEFAULT_MIN_WINDOW_SIZE: i32 = 200;

/// Per-client result of one arrangement pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrangementOutcome {
    Positioned { window: WindowId, rect: Rect },
    WindowNotFound,
    ProcessGone,
    /// More clients than rectangles; this client was left where it is
    Unassigned,
    /// The window was found but the OS refused to move it
    MoveFailed(String),
    /// No running process was found for the client's executable
    NotRunning,
}

impl ArrangementOutcome {
    pub fn is_positioned(&self) -> bool {
        matches!(self, ArrangementOutcome::Positioned { .. })
    }
}

pub struct WindowArranger {
    api: Arc<dyn WindowApi>,
    resolver: WindowResolver,
    min_window_size: i32,
}

impl WindowArranger {
    pub fn new(api: Arc<dyn WindowApi>) -> Self {
        Self {
            resolver: WindowResolver::new(api.clone()),
            api,
            min_window_size: DEFAULT_MIN_WINDOW_SIZE,
        }
    }

    pub fn with_resolver(mut self, resolver: WindowResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_min_window_size(mut self, min_window_size: i32) -> Self {
        self.min_window_size = min_window_size.max(0);
        self
    }

    /// Position the window of each client in order; the i-th client gets the i-th rectangle.
    ///
    /// Returns exactly one outcome per client. Clients are handled one after
    /// another and a failure for one never stops the rest.
    pub fn arrange(&self, clients: &[ClientHandle], rects: &[Rect]) -> Vec<ArrangementOutcome> {
        let outcomes: Vec<ArrangementOutcome> = clients
            .iter()
            .enumerate()
            .map(|(i, client)| match rects.get(i) {
                Some(rect) => self.place(client, *rect),
                None => ArrangementOutcome::Unassigned,
            })
            .collect();

        let positioned = outcomes.iter().filter(|o| o.is_positioned()).count();
        info!(
            "Arranged {}/{} client window(s) into {} slot(s)",
            positioned,
            clients.len(),
            rects.len()
        );
        outcomes
    }

    /// Resolve one client's window, restore it if minimized and move it onto `rect`
    pub fn place(&self, client: &ClientHandle, rect: Rect) -> ArrangementOutcome {
        let window = match self.resolver.resolve(client.process_id) {
            Resolution::Found(window) => window,
            Resolution::NotFound => {
                warn!(
                    "No visible window for pid {} ({})",
                    client.process_id,
                    client.exe_path_hint.display()
                );
                return ArrangementOutcome::WindowNotFound;
            }
            Resolution::ProcessGone => {
                warn!(
                    "pid {} ({}) exited before it could be arranged",
                    client.process_id,
                    client.exe_path_hint.display()
                );
                return ArrangementOutcome::ProcessGone;
            }
        };

        if self.api.is_minimized(window) {
            if let Err(e) = self.api.restore(window) {
                warn!("Failed to restore {:?}: {}", window, e);
            }
        }

        let target = rect.with_min_size(self.min_window_size);
        match self.api.set_bounds(window, target) {
            Ok(()) => {
                info!(
                    "pid {} -> {:?} at ({}, {}) {}x{}",
                    client.process_id, window, target.x, target.y, target.width, target.height
                );
                ArrangementOutcome::Positioned {
                    window,
                    rect: target,
                }
            }
            Err(e) => {
                warn!("Failed to move {:?} for pid {}: {}", window, client.process_id, e);
                ArrangementOutcome::MoveFailed(e.to_string())
            }
        }
    }
}
