//! Chromium DevTools Protocol adapter for autoincur.
//!
//! Connects to (or launches) a Chromium instance, attaches to the timesheet tab
//! and exposes it as an [`action_primitives::PagePort`]. Automation scripts run
//! in an isolated world so they never collide with the page's own globals;
//! only [`action_primitives::PagePort::run_in_page_context`] reaches the page's
//! main world.

pub mod config;
pub mod error;
mod page;
mod scripts;
mod session;

pub use config::{parse_flag, CdpConfig};
pub use error::{AdapterError, AdapterErrorKind};
pub use page::ChromiumPage;
pub use session::BrowserSession;
