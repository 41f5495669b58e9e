//! Timesheet flows
//!
//! This crate drives the timesheet page through the flows of an automation run:
//! - Navigation to a date through the page-context date bridge
//! - The incurring loop, creating tasks through the wizard when needed
//! - Range deletion honoring the fortnightly lock
//! - The orchestrator entry points that serialize runs and report outcomes

pub mod clock;
pub mod deletion;
pub mod errors;
pub mod incurring;
pub mod navigation;
pub mod notify;
pub mod orchestrator;
pub mod policy;
pub mod selectors;
pub mod timesheet;
pub mod wizard;

#[cfg(test)]
mod testing;

pub use clock::{Clock, FixedClock, SystemClock};
pub use deletion::{fortnight_locked, DeletionFlow, DeletionReport, MAX_DELETE_ATTEMPTS};
pub use errors::FlowError;
pub use incurring::{
    reconcile, DayReport, Disposition, IncurringLoop, TaskOutcome, TaskStatus, TOLERANCE_MINUTES,
};
pub use navigation::{NavState, NavigationController, DATE_BRIDGE_SCRIPT};
pub use notify::{Notification, Notifier, RecordingNotifier, Severity, TracingNotifier};
pub use orchestrator::{ActionOutcome, ConfigurationSource, Orchestrator, StaticConfiguration};
pub use policy::FlowTimeouts;
pub use selectors::PageSelectors;
pub use timesheet::Timesheet;
pub use wizard::{TaskCategory, TaskWizard, WizardContext, WizardSettings, WizardState};
