use std::fmt;

use action_primitives::ActionError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// High-level error categories surfaced by the adapter.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdapterErrorKind {
    #[error("browser launch failed")]
    LaunchFailed,
    #[error("cdp i/o failure")]
    CdpIo,
    #[error("target page not found")]
    TargetNotFound,
    #[error("element is no longer attached")]
    StaleElement,
    #[error("page script failed")]
    ScriptFailed,
    #[error("internal error")]
    Internal,
}

/// Enriched error metadata passed back to higher layers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdapterError {
    pub kind: AdapterErrorKind,
    pub hint: Option<String>,
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(hint) = &self.hint {
            write!(f, ": {}", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for AdapterError {}

impl AdapterError {
    pub fn new(kind: AdapterErrorKind) -> Self {
        Self { kind, hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn cdp(err: impl fmt::Display) -> Self {
        Self::new(AdapterErrorKind::CdpIo).with_hint(err.to_string())
    }
}

impl From<AdapterError> for ActionError {
    fn from(err: AdapterError) -> Self {
        let message = err.hint.clone().unwrap_or_else(|| err.kind.to_string());
        match err.kind {
            AdapterErrorKind::StaleElement => ActionError::StaleElement(message),
            AdapterErrorKind::TargetNotFound => ActionError::NotFound(message),
            AdapterErrorKind::CdpIo | AdapterErrorKind::ScriptFailed => {
                ActionError::CdpIo(message)
            }
            AdapterErrorKind::LaunchFailed | AdapterErrorKind::Internal => {
                ActionError::Internal(message)
            }
        }
    }
}
