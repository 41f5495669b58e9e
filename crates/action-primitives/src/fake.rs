//! In-memory page double.
//!
//! Elements are addressed by the exact selector string they were registered
//! with; hooks attached to a selector run when an element with that selector is
//! pressed (or receives Enter) and may rewrite the DOM, which is how tests model
//! the page re-rendering after a gesture.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::ActionError;
use crate::ports::PagePort;
use crate::types::ElementHandle;

pub type Hook = Box<dyn FnMut(&mut FakeDom) + Send>;

/// Every input event the page received, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Press { selector: String, text: String },
    Fill { selector: String, value: String },
    Enter { selector: String },
    SharedAttribute { name: String, value: String },
    PageScript,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeElement {
    pub reference: String,
    pub selector: String,
    pub text: String,
    pub value: String,
    pub visible: bool,
    pub enabled: bool,
    pub parent: Option<String>,
}

impl FakeElement {
    fn handle(&self) -> ElementHandle {
        ElementHandle {
            reference: self.reference.clone(),
            text: self.text.clone(),
            value: Some(self.value.clone()),
            visible: self.visible,
            enabled: self.enabled,
        }
    }
}

#[derive(Default)]
pub struct FakeDom {
    elements: Vec<FakeElement>,
    next_ref: u64,
    press_hooks: HashMap<String, Hook>,
    enter_hooks: HashMap<String, Hook>,
    script_hook: Option<Hook>,
    body_attributes: BTreeMap<String, String>,
    mutations: Vec<Mutation>,
    last_pressed: Option<FakeElement>,
}

impl FakeDom {
    /// Appends an element and returns its reference.
    pub fn add(&mut self, selector: &str, text: &str) -> String {
        self.insert(selector, text, None)
    }

    pub fn add_child(&mut self, parent: &str, selector: &str, text: &str) -> String {
        self.insert(selector, text, Some(parent.to_string()))
    }

    fn insert(&mut self, selector: &str, text: &str, parent: Option<String>) -> String {
        self.next_ref += 1;
        let reference = format!("fake-{}", self.next_ref);
        self.elements.push(FakeElement {
            reference: reference.clone(),
            selector: selector.to_string(),
            text: text.to_string(),
            value: String::new(),
            visible: true,
            enabled: true,
            parent,
        });
        reference
    }

    /// Removes every element registered under `selector`, and their children.
    pub fn remove(&mut self, selector: &str) {
        let removed: Vec<String> = self
            .elements
            .iter()
            .filter(|el| el.selector == selector)
            .map(|el| el.reference.clone())
            .collect();
        for reference in removed {
            self.remove_ref(&reference);
        }
    }

    pub fn remove_ref(&mut self, reference: &str) {
        let children: Vec<String> = self
            .elements
            .iter()
            .filter(|el| el.parent.as_deref() == Some(reference))
            .map(|el| el.reference.clone())
            .collect();
        for child in children {
            self.remove_ref(&child);
        }
        self.elements.retain(|el| el.reference != reference);
    }

    pub fn set_text(&mut self, selector: &str, text: &str) {
        for el in self.elements.iter_mut().filter(|el| el.selector == selector) {
            el.text = text.to_string();
        }
    }

    pub fn set_text_ref(&mut self, reference: &str, text: &str) {
        if let Some(el) = self.elements.iter_mut().find(|el| el.reference == reference) {
            el.text = text.to_string();
        }
    }

    pub fn set_enabled(&mut self, selector: &str, enabled: bool) {
        for el in self.elements.iter_mut().filter(|el| el.selector == selector) {
            el.enabled = enabled;
        }
    }

    pub fn set_visible(&mut self, selector: &str, visible: bool) {
        for el in self.elements.iter_mut().filter(|el| el.selector == selector) {
            el.visible = visible;
        }
    }

    pub fn exists(&self, selector: &str) -> bool {
        self.elements.iter().any(|el| el.selector == selector)
    }

    pub fn text_of(&self, selector: &str) -> Option<String> {
        self.first(selector).map(|el| el.text.clone())
    }

    pub fn value_of(&self, selector: &str) -> Option<String> {
        self.first(selector).map(|el| el.value.clone())
    }

    pub fn elements(&self, selector: &str) -> Vec<FakeElement> {
        self.elements
            .iter()
            .filter(|el| el.selector == selector)
            .cloned()
            .collect()
    }

    pub fn body_attribute(&self, name: &str) -> Option<&str> {
        self.body_attributes.get(name).map(String::as_str)
    }

    pub fn remove_body_attribute(&mut self, name: &str) -> Option<String> {
        self.body_attributes.remove(name)
    }

    /// Element most recently pressed, as it was at the time of the press.
    pub fn last_pressed(&self) -> Option<&FakeElement> {
        self.last_pressed.as_ref()
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    fn first(&self, selector: &str) -> Option<&FakeElement> {
        self.elements.iter().find(|el| el.selector == selector)
    }

    fn by_ref(&self, reference: &str) -> Option<&FakeElement> {
        self.elements.iter().find(|el| el.reference == reference)
    }

    fn is_descendant(&self, element: &FakeElement, ancestor: &str) -> bool {
        let mut current = element.parent.clone();
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.by_ref(&parent).and_then(|el| el.parent.clone());
        }
        false
    }

    fn run_press_hook(&mut self, selector: &str) {
        if let Some(mut hook) = self.press_hooks.remove(selector) {
            hook(self);
            self.press_hooks.entry(selector.to_string()).or_insert(hook);
        }
    }

    fn run_enter_hook(&mut self, selector: &str) {
        if let Some(mut hook) = self.enter_hooks.remove(selector) {
            hook(self);
            self.enter_hooks.entry(selector.to_string()).or_insert(hook);
        }
    }

    fn run_script_hook(&mut self) {
        if let Some(mut hook) = self.script_hook.take() {
            hook(self);
            if self.script_hook.is_none() {
                self.script_hook = Some(hook);
            }
        }
    }
}

/// Scriptable page used by the flow tests.
#[derive(Clone, Default)]
pub struct FakePage {
    dom: Arc<Mutex<FakeDom>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dom<R>(&self, f: impl FnOnce(&mut FakeDom) -> R) -> R {
        let mut dom = self.dom.lock();
        f(&mut dom)
    }

    pub fn on_press(&self, selector: &str, hook: impl FnMut(&mut FakeDom) + Send + 'static) {
        self.dom
            .lock()
            .press_hooks
            .insert(selector.to_string(), Box::new(hook));
    }

    pub fn on_enter(&self, selector: &str, hook: impl FnMut(&mut FakeDom) + Send + 'static) {
        self.dom
            .lock()
            .enter_hooks
            .insert(selector.to_string(), Box::new(hook));
    }

    pub fn on_page_script(&self, hook: impl FnMut(&mut FakeDom) + Send + 'static) {
        self.dom.lock().script_hook = Some(Box::new(hook));
    }

    pub fn mutations(&self) -> Vec<Mutation> {
        self.dom.lock().mutations.clone()
    }

    pub fn clear_mutations(&self) {
        self.dom.lock().mutations.clear();
    }

    fn live(&self, dom: &FakeDom, element: &ElementHandle) -> Result<FakeElement, ActionError> {
        dom.by_ref(&element.reference)
            .cloned()
            .ok_or_else(|| ActionError::StaleElement(element.reference.clone()))
    }
}

#[async_trait]
impl PagePort for FakePage {
    async fn query(
        &self,
        selector: &str,
        scope: Option<&ElementHandle>,
    ) -> Result<Vec<ElementHandle>, ActionError> {
        let dom = self.dom.lock();
        Ok(dom
            .elements
            .iter()
            .filter(|el| el.selector == selector)
            .filter(|el| match scope {
                Some(scope) => dom.is_descendant(el, &scope.reference),
                None => true,
            })
            .map(FakeElement::handle)
            .collect())
    }

    async fn press(&self, element: &ElementHandle) -> Result<(), ActionError> {
        let mut dom = self.dom.lock();
        let live = self.live(&dom, element)?;
        dom.mutations.push(Mutation::Press {
            selector: live.selector.clone(),
            text: live.text.clone(),
        });
        let selector = live.selector.clone();
        let enabled = live.enabled;
        dom.last_pressed = Some(live);
        if enabled {
            dom.run_press_hook(&selector);
        }
        Ok(())
    }

    async fn fill(&self, element: &ElementHandle, value: &str) -> Result<(), ActionError> {
        let mut dom = self.dom.lock();
        let live = self.live(&dom, element)?;
        dom.mutations.push(Mutation::Fill {
            selector: live.selector.clone(),
            value: value.to_string(),
        });
        if let Some(el) = dom
            .elements
            .iter_mut()
            .find(|el| el.reference == live.reference)
        {
            el.value = value.to_string();
        }
        Ok(())
    }

    async fn press_enter(&self, element: &ElementHandle) -> Result<(), ActionError> {
        let mut dom = self.dom.lock();
        let live = self.live(&dom, element)?;
        dom.mutations.push(Mutation::Enter {
            selector: live.selector.clone(),
        });
        dom.run_enter_hook(&live.selector);
        Ok(())
    }

    async fn set_shared_attribute(&self, name: &str, value: &str) -> Result<(), ActionError> {
        let mut dom = self.dom.lock();
        dom.mutations.push(Mutation::SharedAttribute {
            name: name.to_string(),
            value: value.to_string(),
        });
        dom.body_attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    async fn run_in_page_context(&self, _script: &str) -> Result<(), ActionError> {
        let mut dom = self.dom.lock();
        dom.mutations.push(Mutation::PageScript);
        dom.run_script_hook();
        Ok(())
    }
}
