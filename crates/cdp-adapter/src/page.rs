use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CreateIsolatedWorldParams;
use chromiumoxide::cdp::js_protocol::runtime::{EvaluateParams, ExecutionContextId};
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, trace};
use uuid::Uuid;

use action_primitives::{ActionError, ElementHandle, PagePort};

use crate::error::{AdapterError, AdapterErrorKind};
use crate::scripts;

const WORLD_NAME: &str = "autoincur";

#[derive(Debug, Deserialize)]
struct ScriptStatus {
    status: String,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    status: String,
    #[serde(default)]
    elements: Vec<ElementHandle>,
}

/// A timesheet tab driven over CDP.
///
/// Queries and gestures run in an isolated world created on the main frame.
/// The world is recreated lazily after the page navigates and drops it.
pub struct ChromiumPage {
    page: Page,
    world: Mutex<Option<ExecutionContextId>>,
}

impl ChromiumPage {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            world: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &Page {
        &self.page
    }

    async fn isolated_world(&self) -> Result<ExecutionContextId, AdapterError> {
        let mut world = self.world.lock().await;
        if let Some(id) = world.as_ref() {
            return Ok(id.clone());
        }
        let frame = self
            .page
            .mainframe()
            .await
            .map_err(AdapterError::cdp)?
            .ok_or_else(|| {
                AdapterError::new(AdapterErrorKind::TargetNotFound).with_hint("page has no main frame")
            })?;
        let mut params = CreateIsolatedWorldParams::new(frame);
        params.world_name = Some(WORLD_NAME.to_string());
        let created = self.page.execute(params).await.map_err(AdapterError::cdp)?;
        let id = created.result.execution_context_id.clone();
        debug!(?id, "created isolated world");
        *world = Some(id.clone());
        Ok(id)
    }

    async fn forget_world(&self) {
        *self.world.lock().await = None;
    }

    async fn evaluate_isolated<T: DeserializeOwned>(&self, script: String) -> Result<T, AdapterError> {
        match self.evaluate_in_world(&script).await {
            Ok(value) => Ok(value),
            Err(err) if err.kind == AdapterErrorKind::CdpIo => {
                // Navigation destroys the isolated world; retry once in a fresh one.
                trace!(%err, "isolated evaluation failed, recreating world");
                self.forget_world().await;
                self.evaluate_in_world(&script).await
            }
            Err(err) => Err(err),
        }
    }

    async fn evaluate_in_world<T: DeserializeOwned>(&self, script: &str) -> Result<T, AdapterError> {
        let context = self.isolated_world().await?;
        let params = EvaluateParams::builder()
            .expression(script)
            .context_id(context)
            .return_by_value(true)
            .await_promise(true)
            .build()
            .map_err(|err| AdapterError::new(AdapterErrorKind::Internal).with_hint(err))?;
        let result = self
            .page
            .evaluate_expression(params)
            .await
            .map_err(AdapterError::cdp)?;
        result.into_value::<T>().map_err(|err| {
            AdapterError::new(AdapterErrorKind::ScriptFailed)
                .with_hint(format!("unexpected script result: {err}"))
        })
    }

    async fn run_gesture(&self, element: &ElementHandle, script: String) -> Result<(), ActionError> {
        let outcome: ScriptStatus = self.evaluate_isolated(script).await?;
        match outcome.status.as_str() {
            "ok" => Ok(()),
            "stale" => Err(ActionError::StaleElement(element.reference.clone())),
            other => Err(ActionError::CdpIo(format!("gesture returned status {other}"))),
        }
    }
}

#[async_trait]
impl PagePort for ChromiumPage {
    async fn query(
        &self,
        selector: &str,
        scope: Option<&ElementHandle>,
    ) -> Result<Vec<ElementHandle>, ActionError> {
        let prefix = format!("ai-{}", &Uuid::new_v4().simple().to_string()[..8]);
        let scope_selector = scope.map(ElementHandle::selector);
        let script = scripts::query(selector, scope_selector.as_deref(), &prefix);
        let result: QueryResult = self.evaluate_isolated(script).await?;
        if result.status == "stale" {
            if let Some(scope) = scope {
                return Err(ActionError::StaleElement(scope.reference.clone()));
            }
        }
        trace!(selector, found = result.elements.len(), "query");
        Ok(result.elements)
    }

    async fn press(&self, element: &ElementHandle) -> Result<(), ActionError> {
        self.run_gesture(element, scripts::press(&element.selector()))
            .await
    }

    async fn fill(&self, element: &ElementHandle, value: &str) -> Result<(), ActionError> {
        self.run_gesture(element, scripts::fill(&element.selector(), value))
            .await
    }

    async fn press_enter(&self, element: &ElementHandle) -> Result<(), ActionError> {
        self.run_gesture(element, scripts::press_enter(&element.selector()))
            .await
    }

    async fn set_shared_attribute(&self, name: &str, value: &str) -> Result<(), ActionError> {
        let _: ScriptStatus = self
            .evaluate_isolated(scripts::set_body_attribute(name, value))
            .await?;
        Ok(())
    }

    async fn run_in_page_context(&self, script: &str) -> Result<(), ActionError> {
        // No context id: evaluates in the page's main world.
        self.page
            .evaluate_expression(script.to_string())
            .await
            .map_err(|err| ActionError::from(AdapterError::cdp(err)))?;
        Ok(())
    }
}
