// Single-threaded UI context: background threads post tasks, one thread runs them in order

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::warn;
use std::time::Duration;

/// Unit of work executed on the UI thread
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// Target that runs posted tasks on the UI thread, in posting order
pub trait UiDispatcher: Send + Sync {
    fn post(&self, task: UiTask);
}

/// Cloneable posting end of a `UiExecutor`
#[derive(Clone)]
pub struct UiHandle {
    sender: Sender<UiTask>,
}

impl UiDispatcher for UiHandle {
    fn post(&self, task: UiTask) {
        if self.sender.send(task).is_err() {
            warn!("UI executor is gone; dropping posted task");
        }
    }
}

/// Task queue drained by the thread that owns it
pub struct UiExecutor {
    sender: Sender<UiTask>,
    receiver: Receiver<UiTask>,
}

impl Default for UiExecutor {
    fn default() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }
}

impl UiExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> UiHandle {
        UiHandle {
            sender: self.sender.clone(),
        }
    }

    /// Number of tasks waiting to run
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Run every task already queued; returns how many ran
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Wait up to `timeout` for work, then run it and anything queued behind it
    pub fn run_for(&self, timeout: Duration) -> usize {
        match self.receiver.recv_timeout(timeout) {
            Ok(task) => {
                task();
                1 + self.run_pending()
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }
}
