use std::time::Duration;

use shared::protocol::Action;
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tracing::debug;

use crate::actions;

pub const DEFAULT_VIEWPORT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Coalesces bursts of chart range updates into one `VIEWPORT_CHANGED`.
/// Each call supersedes the pending one; the action is sent on the channel
/// once the window elapses without a newer call. Must be used inside a tokio
/// runtime.
pub struct ViewportDebouncer {
    window: Duration,
    sender: UnboundedSender<Action>,
    pending: Option<JoinHandle<()>>,
}

impl ViewportDebouncer {
    pub fn new(window: Duration, sender: UnboundedSender<Action>) -> Self {
        Self {
            window,
            sender,
            pending: None,
        }
    }

    pub fn channel(window: Duration) -> (Self, UnboundedReceiver<Action>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(window, sender), receiver)
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn schedule(&mut self, min: f64, max: f64) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
        let window = self.window;
        let sender = self.sender.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            debug!(min, max, "viewport range settled");
            if sender.send(actions::viewport_changed(min, max)).is_err() {
                debug!(min, max, "viewport receiver closed; range dropped");
            }
        }));
    }

    /// True while a scheduled range has not been sent yet.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Drops the pending update, if any.
    pub fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

impl Drop for ViewportDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
#[path = "tests/debounce_tests.rs"]
mod tests;
