//! Waiting for an element to become attached under an ancestor.
//!
//! When the element is already there, [`until_attached`] answers immediately
//! without creating an observer. Otherwise a `MutationObserver` watches the
//! ancestor's subtree and is disconnected as soon as the first match shows up,
//! or when the wait is dropped.
//!
//! There is no built-in timeout: [`UntilAttached::wait`] hangs for as long as
//! the element never appears. Use [`UntilAttached::wait_within`] to bound it.

use std::cell::RefCell;
use std::rc::Rc;

use futures_util::future::{Either, select};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Element, MutationObserver, MutationObserverInit, MutationRecord, Node};

use storyad_preview_core::PreviewError;

use crate::dom::js_err;

/// What to wait for.
#[derive(Debug, Clone)]
pub enum AttachTarget {
    /// First element matching a CSS selector, resolved relative to the ancestor.
    Selector(String),
    /// A specific element, matched by identity.
    Element(Element),
}

impl From<&str> for AttachTarget {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_owned())
    }
}

impl From<Element> for AttachTarget {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl AttachTarget {
    /// Look the target up among the current descendants of `ancestor`.
    ///
    /// Fails with [`PreviewError::Dom`] when the selector does not parse.
    fn find_in(&self, ancestor: &Element) -> Result<Option<Element>, PreviewError> {
        match self {
            Self::Selector(selector) => ancestor
                .query_selector(selector)
                .map_err(|e| js_err(&format!("invalid selector `{selector}`"), e)),
            Self::Element(element) => {
                let node: &Node = element.as_ref();
                Ok((ancestor != element && ancestor.contains(Some(node))).then(|| element.clone()))
            }
        }
    }

    /// Test a node reported as added by the observer.
    ///
    /// The target may be the added node itself or sit inside an added subtree.
    /// Selectors reaching this point already parsed in [`find_in`](Self::find_in).
    fn match_added(&self, node: &Node) -> Option<Element> {
        let added = node.dyn_ref::<Element>()?;
        match self {
            Self::Selector(selector) => {
                if added.matches(selector).unwrap_or(false) {
                    Some(added.clone())
                } else {
                    added.query_selector(selector).ok().flatten()
                }
            }
            Self::Element(element) => {
                let target: &Node = element.as_ref();
                node.contains(Some(target)).then(|| element.clone())
            }
        }
    }
}

/// Pending or completed attachment wait.
pub enum UntilAttached {
    /// The target was already attached when the wait was created.
    Attached(Element),
    /// An observer is watching for the target.
    Observing(Observation),
}

impl std::fmt::Debug for UntilAttached {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Attached(_) => f.write_str("UntilAttached::Attached"),
            Self::Observing(_) => f.write_str("UntilAttached::Observing"),
        }
    }
}

impl UntilAttached {
    /// Whether a `MutationObserver` had to be created.
    pub fn is_observing(&self) -> bool {
        matches!(self, Self::Observing(_))
    }

    /// Resolve with the attached element.
    pub async fn wait(self) -> Result<Element, PreviewError> {
        match self {
            Self::Attached(element) => Ok(element),
            Self::Observing(observation) => observation.settle().await,
        }
    }

    /// Like [`wait`](Self::wait), giving up after `timeout_ms`.
    ///
    /// On timeout the observer is disconnected and
    /// [`PreviewError::AttachmentTimeout`] is returned.
    pub async fn wait_within(self, timeout_ms: u32) -> Result<Element, PreviewError> {
        match self {
            Self::Attached(element) => Ok(element),
            Self::Observing(observation) => {
                let settle = Box::pin(observation.settle());
                let timeout = Box::pin(gloo_timers::future::TimeoutFuture::new(timeout_ms));
                match select(settle, timeout).await {
                    Either::Left((result, _)) => result,
                    Either::Right(((), _abandoned)) => {
                        tracing::debug!(timeout_ms, "attachment wait timed out");
                        Err(PreviewError::AttachmentTimeout {
                            after_ms: timeout_ms,
                        })
                    }
                }
            }
        }
    }
}

type ObserverCallback = Closure<dyn FnMut(js_sys::Array, MutationObserver)>;

/// A live `MutationObserver` subscription resolving one promise.
///
/// Disconnected on first match and again (idempotently) on drop.
pub struct Observation {
    observer: MutationObserver,
    _callback: ObserverCallback,
    found: Option<JsFuture>,
}

impl Observation {
    async fn settle(mut self) -> Result<Element, PreviewError> {
        let found = self
            .found
            .take()
            .ok_or_else(|| PreviewError::dom("attachment already awaited"))?;
        let value = found
            .await
            .map_err(|e| js_err("waiting for attachment", e))?;
        self.observer.disconnect();
        value
            .dyn_into::<Element>()
            .map_err(|_| PreviewError::dom("attachment resolved with a non-element"))
    }
}

impl Drop for Observation {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Wait until `target` is a descendant of `ancestor`.
///
/// Resolves at most once. The fast path creates no observer at all. An
/// invalid selector fails here, before any observer exists.
pub fn until_attached(
    ancestor: &Element,
    target: impl Into<AttachTarget>,
) -> Result<UntilAttached, PreviewError> {
    let target = target.into();
    if let Some(element) = target.find_in(ancestor)? {
        return Ok(UntilAttached::Attached(element));
    }
    tracing::trace!(?target, "target not attached yet, observing");
    observe(ancestor, target).map(UntilAttached::Observing)
}

fn observe(ancestor: &Element, target: AttachTarget) -> Result<Observation, PreviewError> {
    let resolver: Rc<RefCell<Option<js_sys::Function>>> = Rc::default();

    let slot = Rc::clone(&resolver);
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        *slot.borrow_mut() = Some(resolve);
    });

    let callback: ObserverCallback = Closure::new(
        move |records: js_sys::Array, observer: MutationObserver| {
            if resolver.borrow().is_none() {
                return;
            }
            for record in records.iter() {
                let record: MutationRecord = record.unchecked_into();
                let added = record.added_nodes();
                for i in 0..added.length() {
                    let Some(node) = added.item(i) else {
                        continue;
                    };
                    if let Some(found) = target.match_added(&node) {
                        observer.disconnect();
                        if let Some(resolve) = resolver.borrow_mut().take() {
                            tracing::trace!("attachment observed");
                            let _ = resolve.call1(&JsValue::NULL, &found);
                        }
                        return;
                    }
                }
            }
        },
    );

    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())
        .map_err(|e| js_err("creating MutationObserver", e))?;
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    observer
        .observe_with_options(ancestor, &init)
        .map_err(|e| js_err("observing ancestor", e))?;

    Ok(Observation {
        observer,
        _callback: callback,
        found: Some(JsFuture::from(promise)),
    })
}
