//! Flow error types

use action_primitives::ActionError;
use thiserror::Error;

/// Failures of one unit of work (a task, a day, or a whole run).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// An expected UI element never appeared
    #[error("Element not found: {0}")]
    NotFound(String),

    /// An expected state change never occurred
    #[error("Condition timeout: {0}")]
    ConditionTimeout(String),

    /// Missing or malformed configuration fields
    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(String),

    /// One step of the task creation wizard failed
    #[error("Wizard step {step} ({name}) failed: {reason}")]
    WizardStepFailure {
        step: u8,
        name: String,
        reason: String,
    },

    /// Final incurred time diverges from the plan beyond tolerance
    #[error("Incurred {actual} min against {planned} min planned")]
    ReconciliationMismatch { planned: u32, actual: u32 },

    /// The page never reached the requested date
    #[error("Navigation to {date} failed: {reason}")]
    Navigation { date: String, reason: String },

    /// Another run holds the page
    #[error("Another automation run is in progress")]
    Busy,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Browser or page level failure outside the categories above
    #[error("Page error: {0}")]
    Page(String),
}

impl FlowError {
    /// Warnings are reported but never fail a run.
    pub fn is_warning(&self) -> bool {
        matches!(self, FlowError::ReconciliationMismatch { .. })
    }
}

impl From<ActionError> for FlowError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::NotFound(what) => FlowError::NotFound(what),
            ActionError::ConditionTimeout(what) => FlowError::ConditionTimeout(what),
            other => FlowError::Page(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_failures_keep_their_category() {
        assert_eq!(
            FlowError::from(ActionError::NotFound("#save".into())),
            FlowError::NotFound("#save".into())
        );
        assert_eq!(
            FlowError::from(ActionError::StaleElement("ai-1".into())),
            FlowError::Page("Stale element: ai-1".into())
        );
    }

    #[test]
    fn only_mismatch_is_a_warning() {
        assert!(FlowError::ReconciliationMismatch {
            planned: 480,
            actual: 420
        }
        .is_warning());
        assert!(!FlowError::Busy.is_warning());
    }
}
