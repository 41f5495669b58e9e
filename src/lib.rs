//! autoincur library
//!
//! Exposes the CLI, application config and host adapters for integration testing

pub mod cli;
pub mod config;
pub mod notifier;
pub mod source;

pub use config::AppConfig;
pub use notifier::ConsoleNotifier;
pub use source::FileConfigurationSource;
