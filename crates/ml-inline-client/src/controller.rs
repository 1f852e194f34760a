//! Field controller
//!
//! Reacts to control events and drives one save attempt at a time per
//! field:
//!
//! 1. On blur, wait the confirmation delay. If focus came back, drop it.
//! 2. Claim the field in the [`GuardSet`]. If it is already claimed, drop.
//! 3. Disable the control, enter `Saving`, show "Saving…", dispatch.
//! 4. On any outcome, release the claim, re-enable, settle, show the text.
//!
//! Dropped triggers are silent.

use crate::config::ClientConfig;
use crate::control::FieldControl;
use crate::dispatcher::RequestDispatcher;
use crate::error::ClientError;
use crate::guard::GuardSet;
use crate::transport::{HttpTransport, SaveTransport};
use ml_inline_model::{ControlDescriptor, SaveResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Enter key code
pub const ENTER: u32 = 13;

/// A key press on a focused control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub key_code: u32,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyChord {
    #[must_use]
    pub const fn plain(key_code: u32) -> Self {
        Self {
            key_code,
            ctrl: false,
            meta: false,
        }
    }

    #[must_use]
    pub const fn ctrl_enter() -> Self {
        Self {
            key_code: ENTER,
            ctrl: true,
            meta: false,
        }
    }

    #[must_use]
    pub const fn cmd_enter() -> Self {
        Self {
            key_code: ENTER,
            ctrl: false,
            meta: true,
        }
    }

    /// Ctrl+Enter or Cmd+Enter
    #[must_use]
    pub const fn is_force_save(self) -> bool {
        self.key_code == ENTER && (self.ctrl || self.meta)
    }
}

/// Why a trigger did not start a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Focus returned to the control within the confirmation delay
    Refocused,
    /// A save for the same field is still in flight
    AlreadySaving,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveAttempt {
    Dropped(DropReason),
    Settled(SaveResult),
}

impl SaveAttempt {
    #[must_use]
    pub fn result(&self) -> Option<&SaveResult> {
        match self {
            Self::Settled(result) => Some(result),
            Self::Dropped(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct FieldController {
    guards: Arc<GuardSet>,
    dispatcher: Arc<RequestDispatcher>,
    confirm_delay: Duration,
    success_window: Duration,
}

impl FieldController {
    #[must_use]
    pub fn new(guards: Arc<GuardSet>, transport: Arc<dyn SaveTransport>, config: &ClientConfig) -> Self {
        Self {
            guards,
            dispatcher: Arc::new(RequestDispatcher::new(transport, config.request_timeout())),
            confirm_delay: config.confirm_delay(),
            success_window: config.success_window(),
        }
    }

    /// Controller for a fresh page with its own guard set, posting over HTTP
    pub fn for_page(config: &ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(GuardSet::new(), Arc::new(transport), config))
    }

    /// Control for `descriptor` whose success text stays up for this
    /// controller's success window
    #[must_use]
    pub fn control(&self, descriptor: ControlDescriptor) -> Arc<FieldControl> {
        FieldControl::new(descriptor, self.success_window)
    }

    #[must_use]
    pub fn guards(&self) -> &Arc<GuardSet> {
        &self.guards
    }

    /// Focus left `control`
    pub async fn on_blur(&self, control: &Arc<FieldControl>) -> SaveAttempt {
        control.blur();
        tokio::time::sleep(self.confirm_delay).await;
        if control.is_focused() {
            debug!(key = %control.key(), "focus returned, save skipped");
            return SaveAttempt::Dropped(DropReason::Refocused);
        }
        self.save(control).await
    }

    /// Key press on `control`. A force-save chord on a multi-line control
    /// leaves it and runs the blur path; anything else returns `None`.
    pub async fn on_key(&self, control: &Arc<FieldControl>, chord: KeyChord) -> Option<SaveAttempt> {
        if !chord.is_force_save() || !control.is_multiline() {
            return None;
        }
        Some(self.on_blur(control).await)
    }

    /// Run one attempt now, unless one is already in flight for this field
    pub async fn save(&self, control: &Arc<FieldControl>) -> SaveAttempt {
        let key = control.key();
        let Some(ticket) = self.guards.try_acquire(key) else {
            debug!(%key, "save already in flight, trigger dropped");
            return SaveAttempt::Dropped(DropReason::AlreadySaving);
        };

        let (attempt, request) = control.begin_saving();
        debug!(%key, attempt, "save dispatched");
        let result = self.dispatcher.dispatch(request).await;

        control.settle(&result);
        drop(ticket);

        if result.success {
            info!(%key, "field saved");
            self.schedule_idle(control, attempt);
        } else {
            warn!(%key, message = %result.message, "field save failed");
        }
        SaveAttempt::Settled(result)
    }

    fn schedule_idle(&self, control: &Arc<FieldControl>, attempt: u64) {
        let control = Arc::clone(control);
        let window = self.success_window;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            control.expire_success(attempt);
        });
    }
}
