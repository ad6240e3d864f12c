//! Re-rendering the preview frame.
//!
//! Two strategies, picked once per preview surface:
//!
//! - `Reload`: force the frame to reload its current location, then inject
//!   the document into the fresh (blank) context once `load` fires.
//! - `Srcdoc`: assign the document to the `srcdoc` attribute and wait for
//!   `load`; the browser parses it and runs its scripts itself.
//!
//! Every call may carry an [`UpdateTicket`]. When a newer ticket has been
//! issued by the time `load` fires, nothing is injected and the call reports
//! [`Reloaded::Superseded`].

use wasm_bindgen::JsValue;
use web_sys::{Document, HtmlIFrameElement};

use storyad_preview_core::{PreviewError, StrategyPreference, UpdateTicket};

use crate::dom::{self, js_err};
use crate::events::next_event;
use crate::inject::inject_document;

/// How a frame is re-rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStrategy {
    Reload,
    Srcdoc,
}

impl FrameStrategy {
    /// Probe whether iframes support `srcdoc` in this browser.
    pub fn detect() -> Self {
        let supported = dom::document()
            .and_then(|doc| {
                doc.create_element("iframe")
                    .map_err(|e| js_err("creating probe iframe", e))
            })
            .map(|probe| js_sys::Reflect::has(&probe, &JsValue::from_str("srcdoc")).unwrap_or(false))
            .unwrap_or(false);
        if supported { Self::Srcdoc } else { Self::Reload }
    }

    /// Resolve a configured preference, probing only for `Auto`.
    pub fn resolve(preference: StrategyPreference) -> Self {
        match preference {
            StrategyPreference::Auto => Self::detect(),
            StrategyPreference::Reload => Self::Reload,
            StrategyPreference::Srcdoc => Self::Srcdoc,
        }
    }
}

/// Result of a guarded re-render.
#[derive(Debug, Clone)]
pub enum Reloaded {
    /// The document was rendered; the frame's current document.
    Injected(Document),
    /// A newer update started before this one's `load`; nothing was injected.
    Superseded,
}

/// Reload `iframe` and inject `html` into the fresh document.
///
/// Exactly one injection happens per call. Overlapping calls are not
/// serialized here; use [`restart_with_document_guarded`] for that.
pub async fn restart_with_document(
    iframe: &HtmlIFrameElement,
    html: &str,
) -> Result<Document, PreviewError> {
    match restart_with_document_guarded(iframe, html, &UpdateTicket::detached()).await? {
        Reloaded::Injected(document) => Ok(document),
        Reloaded::Superseded => Err(PreviewError::dom("detached reload was superseded")),
    }
}

/// [`restart_with_document`], skipping the injection if `ticket` went stale.
pub async fn restart_with_document_guarded(
    iframe: &HtmlIFrameElement,
    html: &str,
    ticket: &UpdateTicket,
) -> Result<Reloaded, PreviewError> {
    let window = iframe
        .content_window()
        .ok_or_else(|| PreviewError::dom("preview frame has no browsing context"))?;

    let loaded = next_event(iframe, "load");
    window
        .location()
        .reload()
        .map_err(|e| js_err("reloading preview frame", e))?;
    loaded.await?;

    if !ticket.is_current() {
        tracing::debug!(ticket = ticket.id(), "reload superseded, skipping injection");
        return Ok(Reloaded::Superseded);
    }

    let document = iframe
        .content_document()
        .ok_or_else(|| PreviewError::dom("preview frame document is not accessible"))?;
    inject_document(&document, html)?;
    Ok(Reloaded::Injected(document))
}

/// Render `html` through the frame's `srcdoc` attribute.
pub async fn write_srcdoc_guarded(
    iframe: &HtmlIFrameElement,
    html: &str,
    ticket: &UpdateTicket,
) -> Result<Reloaded, PreviewError> {
    let loaded = next_event(iframe, "load");
    iframe.set_srcdoc(html);
    loaded.await?;

    if !ticket.is_current() {
        tracing::debug!(ticket = ticket.id(), "srcdoc load superseded");
        return Ok(Reloaded::Superseded);
    }

    let document = iframe
        .content_document()
        .ok_or_else(|| PreviewError::dom("preview frame document is not accessible"))?;
    Ok(Reloaded::Injected(document))
}

/// Re-render `iframe` with `html` using `strategy`.
pub async fn render_frame(
    strategy: FrameStrategy,
    iframe: &HtmlIFrameElement,
    html: &str,
    ticket: &UpdateTicket,
) -> Result<Reloaded, PreviewError> {
    match strategy {
        FrameStrategy::Reload => restart_with_document_guarded(iframe, html, ticket).await,
        FrameStrategy::Srcdoc => write_srcdoc_guarded(iframe, html, ticket).await,
    }
}
