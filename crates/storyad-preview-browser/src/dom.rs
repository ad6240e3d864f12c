//! Small helpers for web-sys calls.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Window};

use storyad_preview_core::PreviewError;

/// Convert a thrown JS value into a [`PreviewError::Dom`] with context.
pub fn js_err(context: &str, err: JsValue) -> PreviewError {
    PreviewError::Dom(format!("{context}: {}", describe_js(&err)))
}

/// Best-effort human readable form of a thrown JS value.
pub fn describe_js(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{value:?}")
}

pub fn window() -> Result<Window, PreviewError> {
    web_sys::window().ok_or_else(|| PreviewError::dom("no window"))
}

pub fn document() -> Result<Document, PreviewError> {
    window()?
        .document()
        .ok_or_else(|| PreviewError::dom("no document"))
}
