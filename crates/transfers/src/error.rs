use thiserror::Error;

use forgepos_core::DomainError;

use crate::workflow::{Step, WorkflowEvent};

/// Refusal of a workflow event.
///
/// Refusals leave the workflow unchanged; callers decide whether to show them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// The event was valid for the current step but its guard failed.
    #[error(transparent)]
    Validation(#[from] DomainError),

    /// The event is not defined for the current step.
    #[error("cannot {event} while in {state}")]
    InvalidTransition { state: Step, event: WorkflowEvent },
}

impl WorkflowError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
