use std::io::{self, Write};
use std::time::Duration;

use action_flow::{Notifier, Severity, TracingNotifier};

use crate::cli::output::OutputFormat;

/// Shows notifications on stderr so stdout stays free for command output.
///
/// Human output gets tagged lines. JSON output hands notifications to the
/// tracing subscriber, which already writes JSON lines to stderr in that mode.
#[derive(Clone, Debug)]
pub struct ConsoleNotifier {
    format: OutputFormat,
}

impl ConsoleNotifier {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, severity: Severity, duration: Option<Duration>) {
        match self.format {
            OutputFormat::Human => {
                // stderr may already be closed
                let _ = writeln!(io::stderr().lock(), "{}", render_human(message, severity));
            }
            OutputFormat::Json => TracingNotifier.notify(message, severity, duration),
        }
    }
}

fn render_human(message: &str, severity: Severity) -> String {
    let tag = match severity {
        Severity::Info => "info",
        Severity::Success => " ok ",
        Severity::Warning => "warn",
        Severity::Error => "FAIL",
    };
    format!("[{tag}] {message}")
}
