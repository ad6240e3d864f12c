//! Applying an HTML document to a live `Document`.
//!
//! The existing `<head>` and `<body>` elements are kept and only their
//! attributes and children are rewritten. External scripts are recreated as
//! fresh elements after the markup is assigned, because scripts inserted via
//! `innerHTML` never run.

use web_sys::{Document, Element};

use storyad_preview_core::{Attribute, Fragment, PreviewError, split_document};

use crate::dom::js_err;

/// Inject `html` into `target`'s head and body.
///
/// Parsing is permissive; malformed markup yields a partial render rather
/// than an error. Errors only come from missing head/body elements or failing
/// DOM insertions.
pub fn inject_document(target: &Document, html: &str) -> Result<(), PreviewError> {
    let parts = split_document(html);

    let head = target
        .head()
        .ok_or_else(|| PreviewError::dom("target document has no head"))?;
    apply_fragment(target, &head, &parts.head)?;

    let body = target
        .body()
        .ok_or_else(|| PreviewError::dom("target document has no body"))?;
    apply_fragment(target, &body, &parts.body)?;

    tracing::debug!(
        head_scripts = parts.head.scripts.len(),
        body_scripts = parts.body.scripts.len(),
        "injected document"
    );
    Ok(())
}

fn apply_fragment(
    document: &Document,
    element: &Element,
    fragment: &Fragment,
) -> Result<(), PreviewError> {
    set_attributes(element, &fragment.attributes);
    element.set_inner_html(&fragment.markup);

    for script in &fragment.scripts {
        let fresh = document
            .create_element("script")
            .map_err(|e| js_err("creating script", e))?;
        set_attributes(&fresh, &script.attributes);
        element
            .append_child(&fresh)
            .map_err(|e| js_err("appending script", e))?;
    }
    Ok(())
}

fn set_attributes(element: &Element, attributes: &[Attribute]) {
    for attr in attributes {
        if let Err(e) = element.set_attribute(&attr.name, attr.value_or_empty()) {
            // Names like `"x` survive the permissive parse but are rejected here.
            tracing::debug!(name = %attr.name, "skipping attribute: {:?}", e);
        }
    }
}
