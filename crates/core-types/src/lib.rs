//! Shared primitives for the autoincur automation core.
//!
//! Everything here is plain data: the configuration value handed to the core,
//! the tasks the incurring loop consumes, and the text helpers used to read and
//! write the clock values the timesheet page displays.

mod clock;
mod dates;
mod model;
mod task;

pub use clock::*;
pub use dates::*;
pub use model::*;
pub use task::*;

use thiserror::Error;

/// Errors raised while interpreting caller supplied values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid date '{0}': expected YYYY-MM-DD or DD/MM/YYYY")]
    InvalidDate(String),

    #[error("invalid clock value '{0}': expected H:MM")]
    InvalidClock(String),
}
