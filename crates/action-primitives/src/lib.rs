//! Action primitives for driving a rendered timesheet page
//!
//! This crate provides the building blocks the automation flows are written in:
//! - [`PagePort`], the seam between the flows and a live page
//! - polling waits with bounded timeouts ([`Waiter`])
//! - gesture helpers that wait for a control before pressing or filling it
//! - [`fake::FakePage`], an in-memory page for tests (feature `fake-page`)

mod actions;
pub mod errors;
pub mod ports;
pub mod types;
mod waiting;

#[cfg(any(test, feature = "fake-page"))]
pub mod fake;

pub use actions::*;
pub use errors::*;
pub use ports::*;
pub use types::*;
pub use waiting::*;
