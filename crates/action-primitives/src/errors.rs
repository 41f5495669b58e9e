//! Error types for action primitives

use thiserror::Error;

/// Failures surfaced while observing or driving the page
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// An expected element never appeared
    #[error("Element not found: {0}")]
    NotFound(String),

    /// An expected state change never happened
    #[error("Condition timeout: {0}")]
    ConditionTimeout(String),

    /// Element exists but refuses interaction
    #[error("Element not enabled: {0}")]
    NotEnabled(String),

    /// A previously observed element was re-rendered away
    #[error("Stale element: {0}")]
    StaleElement(String),

    /// Waiting was cancelled by the caller
    #[error("Operation interrupted: {0}")]
    Interrupted(String),

    /// Browser communication or protocol error
    #[error("CDP I/O error: {0}")]
    CdpIo(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ActionError {
    /// True for the two "page did not get there in time" outcomes.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ActionError::NotFound(_) | ActionError::ConditionTimeout(_)
        )
    }
}
