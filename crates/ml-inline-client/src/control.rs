//! One rendered editing control and its page-side state

use crate::state::{validate_transition, FieldState, Outcome};
use crate::status::{StatusPresenter, SUCCESS_WINDOW};
use ml_inline_model::{ControlDescriptor, ControlKind, EditableField, SaveRequest, SaveResult};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

#[derive(Debug)]
struct ControlInner {
    value: String,
    focused: bool,
    disabled: bool,
    state: FieldState,
    /// Bumped on every attempt; lets a late timer see it is stale
    attempt: u64,
}

/// A text control bound to one [`EditableField`]
#[derive(Debug)]
pub struct FieldControl {
    descriptor: ControlDescriptor,
    inner: Mutex<ControlInner>,
    status: StatusPresenter,
}

impl FieldControl {
    #[must_use]
    pub fn from_descriptor(descriptor: ControlDescriptor) -> Arc<Self> {
        Self::new(descriptor, SUCCESS_WINDOW)
    }

    #[must_use]
    pub fn new(descriptor: ControlDescriptor, success_window: Duration) -> Arc<Self> {
        let value = descriptor.value.clone();
        Arc::new(Self {
            descriptor,
            inner: Mutex::new(ControlInner {
                value,
                focused: false,
                disabled: false,
                state: FieldState::Idle,
                attempt: 0,
            }),
            status: StatusPresenter::new(success_window),
        })
    }

    #[inline]
    #[must_use]
    pub fn key(&self) -> EditableField {
        EditableField::new(self.descriptor.attachment_id, self.descriptor.field)
    }

    #[must_use]
    pub fn descriptor(&self) -> &ControlDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn is_multiline(&self) -> bool {
        matches!(self.descriptor.kind(), ControlKind::MultiLine { .. })
    }

    #[must_use]
    pub fn value(&self) -> String {
        self.inner.lock().value.clone()
    }

    /// Replace the typed value. Ignored while disabled.
    pub fn set_value(&self, value: impl Into<String>) {
        let mut inner = self.inner.lock();
        if !inner.disabled {
            inner.value = value.into();
        }
    }

    pub fn focus(&self) {
        let mut inner = self.inner.lock();
        if !inner.disabled {
            inner.focused = true;
        }
    }

    pub fn blur(&self) {
        self.inner.lock().focused = false;
    }

    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.inner.lock().focused
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.inner.lock().disabled
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.inner.lock().state.is_saving()
    }

    #[must_use]
    pub fn state(&self) -> FieldState {
        self.inner.lock().state
    }

    #[must_use]
    pub fn status(&self) -> &StatusPresenter {
        &self.status
    }

    /// Disable the control, enter `Saving`, and build the request from the
    /// current value. Returns the attempt number with the request.
    pub(crate) fn begin_saving(&self) -> (u64, SaveRequest) {
        let mut inner = self.inner.lock();
        if let FieldState::Settled(_) = inner.state {
            Self::transition(&mut inner, FieldState::Idle);
        }
        Self::transition(&mut inner, FieldState::Saving);
        inner.disabled = true;
        inner.focused = false;
        inner.attempt += 1;
        let attempt = inner.attempt;
        let request = self.descriptor.save_request(inner.value.clone());
        drop(inner);

        self.status.show_pending();
        (attempt, request)
    }

    /// Re-enable the control and show the outcome
    pub(crate) fn settle(&self, result: &SaveResult) {
        {
            let mut inner = self.inner.lock();
            inner.disabled = false;
            let outcome = if result.success {
                Outcome::Success
            } else {
                Outcome::Error
            };
            Self::transition(&mut inner, FieldState::Settled(outcome));
        }
        if result.success {
            self.status.show_success(result.message.clone());
        } else {
            self.status.show_error(result.message.clone());
        }
    }

    /// Return a successful attempt to `Idle`, unless a newer one started
    pub(crate) fn expire_success(&self, attempt: u64) {
        let mut inner = self.inner.lock();
        if inner.attempt == attempt && inner.state == FieldState::Settled(Outcome::Success) {
            Self::transition(&mut inner, FieldState::Idle);
        }
    }

    fn transition(inner: &mut ControlInner, to: FieldState) {
        match validate_transition(inner.state, to) {
            Ok(()) => inner.state = to,
            Err(e) => warn!(error = %e, "field state transition refused"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ml_inline_model::{AttachmentId, FieldName};

    fn control(field: FieldName) -> Arc<FieldControl> {
        FieldControl::from_descriptor(ControlDescriptor {
            attachment_id: AttachmentId::new(4).unwrap(),
            token: "tok".into(),
            field,
            value: "stored".into(),
        })
    }

    #[test]
    fn starts_idle_with_stored_value() {
        let c = control(FieldName::Title);
        assert_eq!(c.value(), "stored");
        assert_eq!(c.state(), FieldState::Idle);
        assert!(!c.is_multiline());
        assert!(control(FieldName::Description).is_multiline());
    }

    #[test]
    fn disabled_control_ignores_typing() {
        let c = control(FieldName::AltText);
        c.set_value("typed");
        let (_, request) = c.begin_saving();
        assert_eq!(request.value, "typed");
        assert!(c.is_disabled());
        assert!(c.is_saving());

        c.set_value("ignored");
        c.focus();
        assert_eq!(c.value(), "typed");
        assert!(!c.is_focused());
    }

    #[tokio::test]
    async fn error_then_retry_passes_through_idle() {
        let c = control(FieldName::AltText);
        c.begin_saving();
        c.settle(&SaveResult::failed(ml_inline_model::ErrorClass::Transport, "Network error"));
        assert_eq!(c.state(), FieldState::Settled(Outcome::Error));
        assert!(!c.is_disabled());

        let (attempt, _) = c.begin_saving();
        assert_eq!(attempt, 2);
        assert_eq!(c.state(), FieldState::Saving);
    }

    #[tokio::test]
    async fn stale_expiry_is_ignored() {
        let c = control(FieldName::Title);
        let (first, _) = c.begin_saving();
        c.settle(&SaveResult::succeeded("Title saved."));
        c.begin_saving();
        c.expire_success(first);
        assert_eq!(c.state(), FieldState::Saving);
    }
}
