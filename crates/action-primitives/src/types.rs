//! Core data types for action primitives

use serde::{Deserialize, Serialize};

/// Attribute used to tag elements so later gestures reach the same node.
pub const REF_ATTRIBUTE: &str = "data-autoincur-ref";

/// Snapshot of one element as seen during a query.
///
/// The snapshot is not live: text and state reflect the moment of the query,
/// while `reference` keeps addressing the node until the page re-renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    pub reference: String,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub value: Option<String>,

    #[serde(default)]
    pub visible: bool,

    #[serde(default = "enabled_default")]
    pub enabled: bool,
}

fn enabled_default() -> bool {
    true
}

impl ElementHandle {
    /// CSS selector addressing this exact node.
    pub fn selector(&self) -> String {
        format!("[{}=\"{}\"]", REF_ATTRIBUTE, self.reference)
    }

    /// Order independent substring match over the element text.
    pub fn contains_all(&self, parts: &[&str]) -> bool {
        parts.iter().all(|part| self.text.contains(part))
    }

    pub fn is_interactable(&self) -> bool {
        self.visible && self.enabled
    }

    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }
}
