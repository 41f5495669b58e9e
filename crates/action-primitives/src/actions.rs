//! Gesture helpers: wait for a control, then act on it

use std::time::Duration;

use tracing::debug;

use crate::errors::ActionError;
use crate::ports::PagePort;
use crate::types::ElementHandle;
use crate::waiting::Waiter;

/// Waits until `selector` is visible and enabled, then presses it.
pub async fn press_when_ready(
    page: &dyn PagePort,
    waiter: &Waiter,
    selector: &str,
    required_text: &[&str],
    timeout: Duration,
) -> Result<ElementHandle, ActionError> {
    let element = waiter
        .interactable(page, selector, required_text, None, timeout)
        .await?;
    debug!(selector, text = %element.trimmed_text(), "pressing element");
    page.press(&element).await?;
    Ok(element)
}

/// Waits for an input, then replaces its value.
pub async fn fill_when_ready(
    page: &dyn PagePort,
    waiter: &Waiter,
    selector: &str,
    value: &str,
    timeout: Duration,
) -> Result<ElementHandle, ActionError> {
    let element = waiter.interactable(page, selector, &[], None, timeout).await?;
    debug!(selector, value, "filling input");
    page.fill(&element, value).await?;
    Ok(element)
}

/// Text of the first element matching `selector`, if any is rendered.
pub async fn read_text(page: &dyn PagePort, selector: &str) -> Result<Option<String>, ActionError> {
    let found = page.query(selector, None).await?;
    Ok(found.into_iter().next().map(|el| el.text.trim().to_string()))
}

/// Opens a dropdown and waits until an option containing all `markers`
/// shows up inside it.
pub async fn open_and_find_option(
    page: &dyn PagePort,
    waiter: &Waiter,
    trigger: &str,
    option: &str,
    markers: &[&str],
    timeout: Duration,
) -> Result<ElementHandle, ActionError> {
    press_when_ready(page, waiter, trigger, &[], timeout).await?;
    waiter.element(page, option, markers, None, timeout).await
}
