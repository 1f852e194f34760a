//! Per-field save lifecycle
//!
//! `Idle -> Saving -> Settled(outcome) -> Idle`. A settled field goes back
//! to `Idle` before its next attempt, so every attempt starts from the same
//! state.

use crate::error::StateError;

/// How an attempt settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldState {
    #[default]
    Idle,
    Saving,
    Settled(Outcome),
}

impl FieldState {
    #[inline]
    #[must_use]
    pub const fn is_saving(self) -> bool {
        matches!(self, Self::Saving)
    }
}

/// Validates a field state transition.
pub fn validate_transition(from: FieldState, to: FieldState) -> Result<(), StateError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(StateError::IllegalTransition { from, to })
    }
}

pub fn allowed_transitions(from: FieldState) -> Vec<FieldState> {
    use FieldState::*;
    match from {
        Idle => vec![Saving],
        Saving => vec![Settled(Outcome::Success), Settled(Outcome::Error)],
        Settled(_) => vec![Idle],
    }
}
