use std::path::{Path, PathBuf};

use action_flow::{ConfigurationSource, FlowError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use autoincur_core_types::Configuration;
use tokio::fs;
use tracing::debug;

/// Reads the timesheet configuration from a JSON or YAML file.
#[derive(Clone, Debug)]
pub struct FileConfigurationSource {
    path: PathBuf,
}

impl FileConfigurationSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> Result<Configuration> {
        let content = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read timesheet configuration {}", self.path.display()))?;
        let config = parse_configuration(&self.path, &content)?;
        debug!(
            path = %self.path.display(),
            projects = config.projects.len(),
            days = config.day_plan.len(),
            "loaded timesheet configuration"
        );
        Ok(config)
    }
}

#[async_trait]
impl ConfigurationSource for FileConfigurationSource {
    async fn load(&self) -> Result<Configuration, FlowError> {
        self.read()
            .await
            .map_err(|err| FlowError::ConfigurationInvalid(format!("{err:#}")))
    }
}

fn parse_configuration(path: &Path, content: &str) -> Result<Configuration> {
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    if is_yaml {
        serde_yaml::from_str(content)
            .with_context(|| format!("Failed to parse YAML in {}", path.display()))
    } else {
        serde_json::from_str(content)
            .with_context(|| format!("Failed to parse JSON in {}", path.display()))
    }
}
