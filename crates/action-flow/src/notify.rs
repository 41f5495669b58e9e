//! Notification sink
//!
//! The flows report progress and failures through [`Notifier`]; rendering is
//! the host's business (console, toast, log).

use std::fmt;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    /// Completed, but the result diverges from the plan.
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, severity: Severity, duration: Option<Duration>);
}

/// Forwards notifications to the tracing subscriber.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, severity: Severity, duration: Option<Duration>) {
        let duration_ms = duration.map(|d| d.as_millis() as u64);
        match severity {
            Severity::Info | Severity::Success => info!(%severity, ?duration_ms, "{message}"),
            Severity::Warning => warn!(?duration_ms, "{message}"),
            Severity::Error => error!(?duration_ms, "{message}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub duration_ms: Option<u64>,
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    entries: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Notification> {
        self.entries.lock().clone()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.severity == severity)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity, duration: Option<Duration>) {
        self.entries.lock().push(Notification {
            message: message.to_string(),
            severity,
            duration_ms: duration.map(|d| d.as_millis() as u64),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_counts_by_severity() {
        let notifier = RecordingNotifier::new();
        notifier.notify("a", Severity::Info, None);
        notifier.notify("b", Severity::Error, Some(Duration::from_secs(5)));
        notifier.notify("c", Severity::Error, None);
        assert_eq!(notifier.count(Severity::Error), 2);
        assert_eq!(notifier.entries()[1].duration_ms, Some(5_000));
    }
}
