//! Transient status text beside a control

use ml_inline_model::messages;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Default time a success message stays visible
pub const SUCCESS_WINDOW: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Pending,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

#[derive(Debug, Default)]
struct Slot {
    current: Option<StatusMessage>,
    generation: u64,
}

/// Status area of one control.
///
/// Pending and error messages stay until replaced. A success message hides
/// itself after the success window unless something newer was shown first.
#[derive(Debug, Clone)]
pub struct StatusPresenter {
    slot: Arc<Mutex<Slot>>,
    success_window: Duration,
}

impl Default for StatusPresenter {
    fn default() -> Self {
        Self::new(SUCCESS_WINDOW)
    }
}

impl StatusPresenter {
    #[must_use]
    pub fn new(success_window: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            success_window,
        }
    }

    pub fn show_pending(&self) {
        self.show(StatusKind::Pending, messages::SAVING);
    }

    pub fn show_error(&self, text: impl Into<String>) {
        self.show(StatusKind::Error, text);
    }

    /// Show `text` and schedule its removal. Must be called inside a tokio
    /// runtime.
    pub fn show_success(&self, text: impl Into<String>) {
        let generation = self.show(StatusKind::Success, text);
        let slot = Arc::clone(&self.slot);
        let window = self.success_window;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let mut slot = slot.lock();
            if slot.generation == generation {
                slot.current = None;
            }
        });
    }

    pub fn clear(&self) {
        let mut slot = self.slot.lock();
        slot.generation += 1;
        slot.current = None;
    }

    #[must_use]
    pub fn current(&self) -> Option<StatusMessage> {
        self.slot.lock().current.clone()
    }

    fn show(&self, kind: StatusKind, text: impl Into<String>) -> u64 {
        let mut slot = self.slot.lock();
        slot.generation += 1;
        slot.current = Some(StatusMessage {
            kind,
            text: text.into(),
        });
        slot.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn success_hides_after_window() {
        let status = StatusPresenter::default();
        status.show_success("Alt text saved.");
        assert_eq!(status.current().unwrap().kind, StatusKind::Success);

        tokio::time::sleep(Duration::from_millis(2_900)).await;
        assert!(status.current().is_some());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(status.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_message_survives_old_timer() {
        let status = StatusPresenter::default();
        status.show_success("Title saved.");
        tokio::time::sleep(Duration::from_secs(1)).await;
        status.show_pending();

        tokio::time::sleep(Duration::from_secs(5)).await;
        let current = status.current().unwrap();
        assert_eq!(current.kind, StatusKind::Pending);
        assert_eq!(current.text, "Saving…");
    }

    #[tokio::test(start_paused = true)]
    async fn errors_are_sticky() {
        let status = StatusPresenter::default();
        status.show_error("Network error");
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(status.current().unwrap().text, "Network error");
    }
}
