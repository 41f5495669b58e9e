pub mod check;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod output;
pub mod plan;
pub mod run;
pub mod runtime;

pub use commands::Commands;
pub use context::CliContext;
pub use dispatch::dispatch;
pub use env::CliArgs;
