//! Awaiting one-shot DOM events.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use gloo_events::EventListener;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::EventTarget;

use storyad_preview_core::PreviewError;

use crate::dom::js_err;

/// Resolve on the next `event` dispatched at `target`.
///
/// The listener is registered immediately, before the returned future is
/// polled, so the caller can trigger the event right after this call. It is
/// removed once the event fires or the future is dropped.
pub fn next_event(
    target: &EventTarget,
    event: &'static str,
) -> impl Future<Output = Result<(), PreviewError>> + 'static {
    let resolver: Rc<RefCell<Option<js_sys::Function>>> = Rc::default();
    let slot = Rc::clone(&resolver);
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        *slot.borrow_mut() = Some(resolve);
    });

    let listener = EventListener::once(target, event, move |_| {
        if let Some(resolve) = resolver.borrow_mut().take() {
            let _ = resolve.call0(&JsValue::NULL);
        }
    });

    async move {
        let result = JsFuture::from(promise).await;
        drop(listener);
        result
            .map(|_| ())
            .map_err(|e| js_err(&format!("awaiting `{event}`"), e))
    }
}
