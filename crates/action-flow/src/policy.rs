use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Bounded waits and settle delays used by the flows, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowTimeouts {
    pub poll_interval_ms: u64,
    pub element_ms: u64,
    pub option_lookup_ms: u64,
    pub calendar_ms: u64,
    pub page_refresh_ms: u64,
    pub incurred_change_ms: u64,
    pub wizard_step_ms: u64,
    pub settle_ms: u64,
    pub field_settle_ms: u64,
}

impl Default for FlowTimeouts {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            element_ms: 5_000,
            option_lookup_ms: 3_000,
            calendar_ms: 8_000,
            page_refresh_ms: 15_000,
            incurred_change_ms: 10_000,
            wizard_step_ms: 10_000,
            settle_ms: 500,
            field_settle_ms: 300,
        }
    }
}

impl FlowTimeouts {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn element(&self) -> Duration {
        Duration::from_millis(self.element_ms)
    }

    /// How long a missing task option is looked for before it counts as absent.
    pub fn option_lookup(&self) -> Duration {
        Duration::from_millis(self.option_lookup_ms)
    }

    pub fn calendar(&self) -> Duration {
        Duration::from_millis(self.calendar_ms)
    }

    pub fn page_refresh(&self) -> Duration {
        Duration::from_millis(self.page_refresh_ms)
    }

    pub fn incurred_change(&self) -> Duration {
        Duration::from_millis(self.incurred_change_ms)
    }

    pub fn wizard_step(&self) -> Duration {
        Duration::from_millis(self.wizard_step_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn field_settle(&self) -> Duration {
        Duration::from_millis(self.field_settle_ms)
    }
}
