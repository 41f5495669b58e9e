//! Application configuration
//!
//! Settings that describe how to reach and drive the timesheet. The timesheet
//! configuration itself (projects, hours, day plans) lives in a separate file
//! pointed to by `plan_file` and is re-read on every run.

use std::env;
use std::path::PathBuf;

use action_flow::{FlowTimeouts, PageSelectors, WizardSettings};
use cdp_adapter::{parse_flag, CdpConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const DEFAULT_PLAN_FILE: &str = "config/timesheet.json";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub browser: CdpConfig,
    pub plan_file: Option<PathBuf>,
    pub selectors: PageSelectors,
    pub timeouts: FlowTimeouts,
    pub wizard: WizardSettings,
}

impl AppConfig {
    /// Environment variables win over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("AUTOINCUR_WS_URL") {
            if !url.trim().is_empty() {
                info!(%url, "Using browser websocket from AUTOINCUR_WS_URL");
                self.browser.websocket_url = Some(url.trim().to_string());
            }
        }

        if let Ok(raw) = env::var("AUTOINCUR_HEADLESS") {
            match parse_flag(&raw) {
                Some(headless) => self.browser.headless = headless,
                None => warn!(value = %raw, "ignoring unrecognised AUTOINCUR_HEADLESS"),
            }
        }

        if let Ok(path) = env::var("AUTOINCUR_PLAN") {
            if !path.trim().is_empty() {
                self.plan_file = Some(PathBuf::from(path.trim()));
            }
        }
    }

    pub fn plan_path(&self) -> PathBuf {
        self.plan_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PLAN_FILE))
    }
}
