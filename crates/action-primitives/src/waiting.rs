//! Polling waits with bounded timeouts
//!
//! The timesheet offers no "render complete" signal, so every synchronisation
//! point is an observation repeated at a fixed interval until it succeeds or
//! its deadline passes.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::errors::ActionError;
use crate::ports::PagePort;
use crate::types::ElementHandle;

/// Interval between two observations of the page.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Poll-with-timeout utility parameterized by interval and cancellation.
#[derive(Clone, Debug)]
pub struct Waiter {
    interval: Duration,
    cancel: CancellationToken,
}

impl Default for Waiter {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl Waiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Polls `producer` until it yields a value.
    ///
    /// A tick that fails counts as "not yet"; only the deadline ends the wait,
    /// with [`ActionError::ConditionTimeout`] carrying `description`.
    pub async fn value<T, F, Fut>(
        &self,
        mut producer: F,
        timeout: Duration,
        description: &str,
    ) -> Result<T, ActionError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, ActionError>>,
    {
        let deadline = Instant::now() + timeout;
        loop {
            if self.cancel.is_cancelled() {
                return Err(ActionError::Interrupted(description.to_string()));
            }

            match producer().await {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {}
                Err(err) => trace!(%err, description, "poll tick failed"),
            }

            let now = Instant::now();
            if now >= deadline {
                debug!(description, timeout_ms = timeout.as_millis() as u64, "wait timed out");
                return Err(ActionError::ConditionTimeout(description.to_string()));
            }

            let pause = self.interval.min(deadline - now);
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    return Err(ActionError::Interrupted(description.to_string()));
                }
                _ = sleep(pause) => {}
            }
        }
    }

    /// Resolves on the first tick where `predicate` reports true.
    pub async fn condition<F, Fut>(
        &self,
        mut predicate: F,
        timeout: Duration,
        description: &str,
    ) -> Result<(), ActionError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool, ActionError>>,
    {
        self.value(
            || {
                let tick = predicate();
                async move { tick.await.map(|met| met.then_some(())) }
            },
            timeout,
            description,
        )
        .await
    }

    /// Waits for an element matching `selector` whose text contains every
    /// entry of `required_text`.
    pub async fn element(
        &self,
        page: &dyn PagePort,
        selector: &str,
        required_text: &[&str],
        scope: Option<&ElementHandle>,
        timeout: Duration,
    ) -> Result<ElementHandle, ActionError> {
        self.matching_element(page, selector, required_text, scope, timeout, |_| true)
            .await
    }

    /// Like [`Waiter::element`] but also requires the element to be visible
    /// and enabled.
    pub async fn interactable(
        &self,
        page: &dyn PagePort,
        selector: &str,
        required_text: &[&str],
        scope: Option<&ElementHandle>,
        timeout: Duration,
    ) -> Result<ElementHandle, ActionError> {
        self.matching_element(
            page,
            selector,
            required_text,
            scope,
            timeout,
            ElementHandle::is_interactable,
        )
        .await
    }

    async fn matching_element(
        &self,
        page: &dyn PagePort,
        selector: &str,
        required_text: &[&str],
        scope: Option<&ElementHandle>,
        timeout: Duration,
        accept: fn(&ElementHandle) -> bool,
    ) -> Result<ElementHandle, ActionError> {
        let description = describe_element(selector, required_text);
        self.value(
            || async move {
                let found = page.query(selector, scope).await?;
                Ok(found
                    .into_iter()
                    .find(|el| accept(el) && el.contains_all(required_text)))
            },
            timeout,
            &description,
        )
        .await
        .map_err(|err| match err {
            ActionError::ConditionTimeout(description) => ActionError::NotFound(description),
            other => other,
        })
    }
}

/// Fixed pause letting the page's framework process an input event.
pub async fn settle(delay: Duration) {
    if !delay.is_zero() {
        sleep(delay).await;
    }
}

fn describe_element(selector: &str, required_text: &[&str]) -> String {
    if required_text.is_empty() {
        selector.to_string()
    } else {
        format!("{} containing {:?}", selector, required_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakePage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fast() -> Waiter {
        Waiter::new(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn element_requires_every_text_part() {
        let page = FakePage::new();
        page.with_dom(|dom| {
            dom.add("li.option", "[Diseño] PRJ-1 00:00");
            dom.add("li.option", "[Construcción] PRJ-1 01:00");
        });

        let found = fast()
            .element(
                &page,
                "li.option",
                &["PRJ-1", "[Construcción]"],
                None,
                Duration::from_millis(50),
            )
            .await
            .unwrap();
        assert_eq!(found.text, "[Construcción] PRJ-1 01:00");

        let missing = fast()
            .element(&page, "li.option", &["PRJ-9"], None, Duration::from_millis(30))
            .await;
        assert!(matches!(missing, Err(ActionError::NotFound(_))));
    }

    #[tokio::test]
    async fn element_appearing_later_is_found() {
        let page = Arc::new(FakePage::new());
        let later = Arc::clone(&page);
        tokio::spawn(async move {
            sleep(Duration::from_millis(30)).await;
            later.with_dom(|dom| {
                dom.add("#calendar", "marzo 2025");
            });
        });

        let found = fast()
            .element(page.as_ref(), "#calendar", &[], None, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(found.text, "marzo 2025");
    }

    #[tokio::test]
    async fn interactable_skips_disabled_elements() {
        let page = FakePage::new();
        page.with_dom(|dom| {
            dom.add("button.next", "Siguiente");
            dom.set_enabled("button.next", false);
        });
        let result = fast()
            .interactable(&page, "button.next", &[], None, Duration::from_millis(30))
            .await;
        assert!(matches!(result, Err(ActionError::NotFound(_))));

        page.with_dom(|dom| dom.set_enabled("button.next", true));
        assert!(fast()
            .interactable(&page, "button.next", &[], None, Duration::from_millis(30))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn failing_predicate_ticks_are_not_fatal() {
        let calls = AtomicUsize::new(0);
        let result = fast()
            .condition(
                || {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        match n {
                            0 | 1 => Err(ActionError::CdpIo("detached".into())),
                            2 => Ok(false),
                            _ => Ok(true),
                        }
                    }
                },
                Duration::from_secs(1),
                "counter changes",
            )
            .await;
        assert!(result.is_ok());
        assert!(calls.load(Ordering::SeqCst) >= 4);
    }

    #[tokio::test]
    async fn condition_timeout_carries_description() {
        let result = fast()
            .condition(|| async { Ok(false) }, Duration::from_millis(20), "date changes")
            .await;
        assert_eq!(
            result,
            Err(ActionError::ConditionTimeout("date changes".into()))
        );
    }

    #[tokio::test]
    async fn cancellation_interrupts_wait() {
        let token = CancellationToken::new();
        let waiter = fast().with_cancel(token.clone());
        token.cancel();
        let result = waiter
            .condition(|| async { Ok(false) }, Duration::from_secs(5), "never")
            .await;
        assert!(matches!(result, Err(ActionError::Interrupted(_))));
    }
}
