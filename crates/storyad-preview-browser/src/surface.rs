//! The preview surface: one sandboxed iframe re-rendered on every update.
//!
//! An update sanitizes the user's ad markup, wraps it in a `text/html` blob,
//! merges the blob URL into the story template and re-renders the frame with
//! the result. Steps always run in that order:
//! merge → await attachment → reload → await load → inject.
//!
//! Each update's blob URL is leased: it stays valid while its document is the
//! visible one and is revoked once a newer update lands. URLs of superseded or
//! failed updates are revoked right away.
//!
//! With the `Reload` strategy the frame's initial `src` load counts as part of
//! attachment, so a reload never races the navigation that created the frame.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use futures_util::FutureExt;
use futures_util::future::{AbortHandle, Abortable, LocalBoxFuture, Shared};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlIFrameElement};

use storyad_preview_core::names::FRAME;
use storyad_preview_core::{
    ClassNamespace, LeaseLedger, ObjectUrls, PreviewConfig, PreviewError, Sanitizer,
    StoryTemplate, UpdateSequencer, UpdateTicket,
};

use crate::attach::{AttachTarget, until_attached};
use crate::dom::{self, js_err};
use crate::events::next_event;
use crate::files::{BrowserObjectUrls, html_blob_url};
use crate::reload::{FrameStrategy, Reloaded, render_frame};

type Attachment = Shared<LocalBoxFuture<'static, Result<Element, PreviewError>>>;

/// Outcome of one [`PreviewSurface::update`].
#[derive(Debug, Clone)]
pub enum UpdateOutcome {
    /// The update is now the visible preview.
    Rendered(Document),
    /// A newer update started first; this one was discarded.
    Superseded,
}

/// Owns the preview iframe and renders ad markup into it.
pub struct PreviewSurface {
    inner: Rc<SurfaceInner>,
}

struct SurfaceInner {
    iframe: HtmlIFrameElement,
    template: StoryTemplate,
    strategy: FrameStrategy,
    sanitizer: Box<dyn Sanitizer>,
    attached: Attachment,
    sequencer: UpdateSequencer,
    leases: RefCell<LeaseLedger>,
    in_flight: RefCell<Vec<(u64, AbortHandle)>>,
    disposed: Cell<bool>,
}

impl PreviewSurface {
    /// Create the preview iframe inside `container`.
    ///
    /// The strategy is resolved here once and reused for every update.
    pub fn new(
        container: &Element,
        config: &PreviewConfig,
        sanitizer: Box<dyn Sanitizer>,
    ) -> Result<Self, PreviewError> {
        let template = config.story_template()?;
        let strategy = FrameStrategy::resolve(config.strategy);
        let document = dom::document()?;

        let iframe: HtmlIFrameElement = document
            .create_element("iframe")
            .map_err(|e| js_err("creating preview frame", e))?
            .dyn_into()
            .map_err(|_| PreviewError::dom("iframe element has unexpected type"))?;
        iframe.set_class_name(&ClassNamespace::new(config.class_prefix.as_str()).class(FRAME));
        // Registered before insertion: some browsers fire the initial
        // `about:blank` load synchronously inside `append_child`.
        let first_load = (strategy == FrameStrategy::Reload).then(|| {
            iframe.set_src(&config.frame_src);
            next_event(&iframe, "load")
        });
        container
            .append_child(&iframe)
            .map_err(|e| js_err("appending preview frame", e))?;

        // The frame only gets a browsing context once it is in the document,
        // which may happen after construction if the host mounts late.
        let root = document
            .document_element()
            .ok_or_else(|| PreviewError::dom("document has no root element"))?;
        let frame_element: Element = iframe.clone().into();
        let wait = until_attached(&root, AttachTarget::Element(frame_element))?.wait();
        let attached: Attachment = async move {
            let element = wait.await?;
            if let Some(first_load) = first_load {
                first_load.await?;
                tracing::trace!("preview frame finished its initial load");
            }
            Ok::<_, PreviewError>(element)
        }
        .boxed_local()
        .shared();

        tracing::debug!(?strategy, "preview surface created");

        Ok(Self {
            inner: Rc::new(SurfaceInner {
                iframe,
                template,
                strategy,
                sanitizer,
                attached,
                sequencer: UpdateSequencer::new(),
                leases: RefCell::new(LeaseLedger::new()),
                in_flight: RefCell::new(Vec::new()),
                disposed: Cell::new(false),
            }),
        })
    }

    pub fn iframe(&self) -> &HtmlIFrameElement {
        &self.inner.iframe
    }

    pub fn strategy(&self) -> FrameStrategy {
        self.inner.strategy
    }

    /// URL of the ad document currently shown, if any update has landed.
    pub fn visible_ad_url(&self) -> Option<String> {
        self.inner.leases.borrow().visible().map(str::to_owned)
    }

    /// Render `dirty_html` as the ad.
    ///
    /// Sanitizing, blob creation and the template merge happen synchronously;
    /// if any of them fails the returned future fails and the previous preview
    /// stays visible. The rest of the render only happens while the returned
    /// future is driven, typically through `spawn_local`.
    pub fn update(
        &self,
        dirty_html: &str,
    ) -> impl Future<Output = Result<UpdateOutcome, PreviewError>> + 'static {
        let inner = Rc::clone(&self.inner);
        let prepared = inner.prepare(dirty_html);
        async move {
            let (ticket, ad_url, merged) = prepared?;
            inner.render(ticket, ad_url, merged).await
        }
    }

    /// Revoke the visible ad URL and remove the frame.
    ///
    /// Updates still in flight stop waiting for attachment or `load`, revoke
    /// their ad URLs and resolve with [`PreviewError::Disposed`].
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        // Invalidate in-flight tickets.
        let _ = self.inner.sequencer.issue();
        let in_flight = std::mem::take(&mut *self.inner.in_flight.borrow_mut());
        for (_, handle) in in_flight {
            handle.abort();
        }
        if let Some(url) = self.inner.leases.borrow_mut().release() {
            BrowserObjectUrls.revoke_object_url(&url);
        }
        self.inner.iframe.remove();
        tracing::debug!("preview surface disposed");
    }
}

impl SurfaceInner {
    fn prepare(&self, dirty_html: &str) -> Result<(UpdateTicket, String, String), PreviewError> {
        if self.disposed.get() {
            return Err(PreviewError::Disposed);
        }
        let clean = self.sanitizer.sanitize(dirty_html)?;
        let ad_url = html_blob_url(&clean)?;
        let merged = self.template.merge(&ad_url);
        let ticket = self.sequencer.issue();
        tracing::debug!(ticket = ticket.id(), %ad_url, "preview update prepared");
        Ok((ticket, ad_url, merged))
    }

    async fn render(
        &self,
        ticket: UpdateTicket,
        ad_url: String,
        merged: String,
    ) -> Result<UpdateOutcome, PreviewError> {
        if self.disposed.get() {
            BrowserObjectUrls.revoke_object_url(&ad_url);
            return Err(PreviewError::Disposed);
        }

        let (handle, registration) = AbortHandle::new_pair();
        self.in_flight.borrow_mut().push((ticket.id(), handle));
        let steps = async {
            match self.attached.clone().await {
                Ok(_) => render_frame(self.strategy, &self.iframe, &merged, &ticket).await,
                Err(e) => Err(e),
            }
        };
        let result = Abortable::new(steps, registration)
            .await
            .unwrap_or(Err(PreviewError::Disposed));
        self.in_flight
            .borrow_mut()
            .retain(|(id, _)| *id != ticket.id());

        match result {
            Ok(Reloaded::Injected(document)) => {
                if let Some(stale) = self.leases.borrow_mut().land(ticket.id(), ad_url) {
                    BrowserObjectUrls.revoke_object_url(&stale);
                }
                tracing::debug!(ticket = ticket.id(), "preview rendered");
                Ok(UpdateOutcome::Rendered(document))
            }
            Ok(Reloaded::Superseded) => {
                BrowserObjectUrls.revoke_object_url(&ad_url);
                Ok(UpdateOutcome::Superseded)
            }
            Err(e) => {
                BrowserObjectUrls.revoke_object_url(&ad_url);
                Err(e)
            }
        }
    }
}
