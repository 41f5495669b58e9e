use async_trait::async_trait;

use crate::errors::ActionError;
use crate::types::ElementHandle;

/// Handle to a live page the automation drives.
///
/// Implementations never wait on their own: each call is one observation or
/// one input event. Synchronisation with the page's re-rendering is done by
/// polling through [`crate::Waiter`].
#[async_trait]
pub trait PagePort: Send + Sync {
    /// Elements matching `selector`, limited to descendants of `scope`.
    async fn query(
        &self,
        selector: &str,
        scope: Option<&ElementHandle>,
    ) -> Result<Vec<ElementHandle>, ActionError>;

    /// Full pointer gesture: mousedown, mouseup, click.
    ///
    /// The page's widget library ignores a bare click event.
    async fn press(&self, element: &ElementHandle) -> Result<(), ActionError>;

    /// Replaces the value of an input and fires its input/change events.
    async fn fill(&self, element: &ElementHandle, value: &str) -> Result<(), ActionError>;

    async fn press_enter(&self, element: &ElementHandle) -> Result<(), ActionError>;

    /// Writes an attribute on `document.body`, visible to every script context.
    async fn set_shared_attribute(&self, name: &str, value: &str) -> Result<(), ActionError>;

    /// Runs `script` inside the page's own execution context rather than the
    /// automation's isolated one.
    async fn run_in_page_context(&self, script: &str) -> Result<(), ActionError>;
}
