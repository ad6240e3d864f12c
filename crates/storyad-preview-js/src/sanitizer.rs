//! Host-supplied HTML sanitizer.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Node;

use storyad_preview_browser::dom::{self, describe_js};
use storyad_preview_browser::{PreviewError, Sanitizer};

/// Calls a JS function such as `html => DOMPurify.sanitize(html)`.
///
/// The function may return markup or a DOM node; a node is serialized
/// through a detached container.
pub struct JsSanitizer {
    function: js_sys::Function,
}

impl JsSanitizer {
    pub fn new(function: js_sys::Function) -> Self {
        Self { function }
    }
}

impl Sanitizer for JsSanitizer {
    fn sanitize(&self, dirty: &str) -> Result<String, PreviewError> {
        let result = self
            .function
            .call1(&JsValue::NULL, &JsValue::from_str(dirty))
            .map_err(|e| PreviewError::Sanitization(describe_js(&e)))?;

        if let Some(markup) = result.as_string() {
            return Ok(markup);
        }
        match result.dyn_into::<Node>() {
            Ok(node) => serialize(&node),
            Err(other) => Err(PreviewError::Sanitization(format!(
                "sanitizer returned neither a string nor a node: {other:?}"
            ))),
        }
    }
}

fn serialize(node: &Node) -> Result<String, PreviewError> {
    let container = dom::document()?
        .create_element("div")
        .map_err(|e| dom::js_err("creating sanitizer container", e))?;
    let copy = node
        .clone_node_with_deep(true)
        .map_err(|e| dom::js_err("cloning sanitized node", e))?;
    container
        .append_child(&copy)
        .map_err(|e| dom::js_err("serializing sanitized node", e))?;
    Ok(container.inner_html())
}
