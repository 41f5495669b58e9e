//! Day planning: turns a configured day plan into the ordered list of tasks
//! the incurring loop submits.
//!
//! - [`allocate`] converts the expected hours of a day into per-project minutes
//!   using fixed quantities and an even split of the remainder.
//! - [`planned_tasks`] resolves those minutes into [`PlannedTask`]s sorted by
//!   task-type precedence.

mod allocator;
mod plan;

pub use allocator::*;
pub use plan::*;

pub use autoincur_core_types::PlannedTask;
