use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::source::FileConfigurationSource;

use super::output::OutputFormat;

pub struct CliContext {
    config: Arc<AppConfig>,
    config_path: PathBuf,
    output: OutputFormat,
}

impl CliContext {
    pub fn new(config: AppConfig, config_path: PathBuf, output: OutputFormat) -> Self {
        Self {
            config: Arc::new(config),
            config_path,
            output,
        }
    }

    pub fn config(&self) -> &AppConfig {
        self.config.as_ref()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn output(&self) -> OutputFormat {
        self.output
    }

    /// Source for the timesheet configuration named by the app config.
    pub fn timesheet_source(&self) -> FileConfigurationSource {
        FileConfigurationSource::new(self.config.plan_path())
    }
}
