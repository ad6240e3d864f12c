//! The editor controller: text widget → debounce → preview surface.
//!
//! Mounting finds the widget and preview containers by their namespaced class
//! names, builds both components and renders the initial content. Afterwards
//! each change event re-arms the debounce timer; when it fires the widget's
//! current text is rendered. Only one update runs at a time and text that
//! arrives meanwhile is rendered next, newest value first.
//!
//! Update failures are logged and published on the applied-state store; the
//! last good preview stays on screen.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use web_sys::{Element, FileList};

use storyad_preview_core::names::{EDITOR, PREVIEW};
use storyad_preview_core::{
    AppliedKey, AppliedState, ClassNamespace, ControllerMachine, ControllerState, PreviewConfig,
    PreviewError, Sanitizer, Subscription, TrackedFile, TrackedFiles, substitute_references,
};

use crate::debounce::Debouncer;
use crate::files::{BrowserObjectUrls, attach_all};
use crate::surface::{PreviewSurface, UpdateOutcome};
use crate::widget::{ChangeSubscription, TextAreaWidget, TextWidget};

/// Owns the text widget and the preview surface for one editor instance.
pub struct EditorController {
    inner: Rc<ControllerInner>,
}

struct ControllerInner {
    widget: Box<dyn TextWidget>,
    surface: PreviewSurface,
    machine: RefCell<ControllerMachine>,
    files: RefCell<TrackedFiles>,
    applied: AppliedState,
    debouncer: Debouncer,
    change: RefCell<Option<ChangeSubscription>>,
}

impl EditorController {
    /// Mount with the built-in textarea widget.
    pub fn mount(
        root: &Element,
        config: PreviewConfig,
        sanitizer: Box<dyn Sanitizer>,
    ) -> Result<Self, PreviewError> {
        let initial = config.initial_content.clone();
        Self::mount_with_widget(root, config, sanitizer, |container, names| {
            let widget = TextAreaWidget::mount(container, &initial, names)?;
            Ok(Box::new(widget) as Box<dyn TextWidget>)
        })
    }

    /// Mount with a widget built by `make_widget` inside the editor container.
    pub fn mount_with_widget<F>(
        root: &Element,
        config: PreviewConfig,
        sanitizer: Box<dyn Sanitizer>,
        make_widget: F,
    ) -> Result<Self, PreviewError>
    where
        F: FnOnce(&Element, &ClassNamespace) -> Result<Box<dyn TextWidget>, PreviewError>,
    {
        config.validate()?;
        let names = ClassNamespace::new(config.class_prefix.as_str());

        let editor_container = find(root, &names.selector(EDITOR))?;
        let preview_container = find(root, &names.selector(PREVIEW))?;

        let widget = make_widget(&editor_container, &names)?;
        let surface = PreviewSurface::new(&preview_container, &config, sanitizer)?;

        let mut machine = ControllerMachine::new();
        machine.mount();

        let inner = Rc::new(ControllerInner {
            widget,
            surface,
            machine: RefCell::new(machine),
            files: RefCell::new(TrackedFiles::new()),
            applied: AppliedState::new(),
            debouncer: Debouncer::new(config.debounce_ms),
            change: RefCell::new(None),
        });
        inner.publish_status(ControllerState::Mounted.as_str());

        let weak = Rc::downgrade(&inner);
        let subscription = inner.widget.on_change(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.changed();
            }
        }));
        *inner.change.borrow_mut() = Some(subscription);

        let initial = if config.initial_content.is_empty() {
            inner.widget.value()
        } else {
            config.initial_content
        };
        tracing::debug!(len = initial.len(), "editor mounted, rendering initial content");
        inner.request(initial);

        Ok(Self { inner })
    }

    /// Current text of the widget.
    pub fn value(&self) -> String {
        self.inner.widget.value()
    }

    pub fn state(&self) -> ControllerState {
        self.inner.machine.borrow().state()
    }

    pub fn surface(&self) -> &PreviewSurface {
        &self.inner.surface
    }

    /// Applied content and status, for host UI bindings.
    pub fn applied(&self) -> &AppliedState {
        &self.inner.applied
    }

    /// Listen for applied-state changes.
    pub fn subscribe(&self, listener: impl Fn(&AppliedKey, &String) + 'static) -> Subscription {
        self.inner.applied.subscribe(listener)
    }

    /// Render the widget's current text now, skipping the debounce.
    pub fn refresh(&self) {
        self.inner.debouncer.cancel();
        self.inner.request(self.inner.widget.value());
    }

    /// Track dropped or selected files and re-render with them.
    pub fn attach_files(&self, list: &FileList) -> Result<(), PreviewError> {
        let incoming = attach_all(list)?;
        self.add_files(incoming);
        Ok(())
    }

    /// Track already-resolved files (replacing same-named ones) and re-render.
    pub fn add_files(&self, incoming: Vec<TrackedFile>) {
        {
            let mut files = self.inner.files.borrow_mut();
            let mut current = std::mem::take(&mut *files);
            for file in incoming {
                current = current.upsert(file, &BrowserObjectUrls);
            }
            *files = current;
        }
        self.refresh();
    }

    /// Stop tracking the file at `index` and re-render.
    pub fn remove_file(&self, index: usize) {
        {
            let mut files = self.inner.files.borrow_mut();
            let current = std::mem::take(&mut *files);
            *files = current.remove(index, &BrowserObjectUrls);
        }
        self.refresh();
    }

    /// Tracked files in display order.
    pub fn files(&self) -> Vec<TrackedFile> {
        self.inner.files.borrow().as_slice().to_vec()
    }

    /// Tear down listeners, timers, the preview frame and every tracked URL.
    pub fn dispose(&self) {
        let inner = &self.inner;
        inner.change.borrow_mut().take();
        inner.debouncer.cancel();
        inner.machine.borrow_mut().dispose();
        inner.surface.dispose();
        inner.files.borrow_mut().clear(&BrowserObjectUrls);
        inner.publish_status(ControllerState::Disposed.as_str());
        tracing::debug!("editor disposed");
    }
}

impl Drop for EditorController {
    fn drop(&mut self) {
        if self.state() != ControllerState::Disposed {
            self.dispose();
        }
    }
}

impl ControllerInner {
    fn changed(self: &Rc<Self>) {
        let weak: Weak<Self> = Rc::downgrade(self);
        self.debouncer.schedule(move || {
            if let Some(inner) = weak.upgrade() {
                let text = inner.widget.value();
                inner.request(text);
            }
        });
    }

    fn request(self: &Rc<Self>, text: String) {
        let next = self.machine.borrow_mut().request(text);
        if let Some(text) = next {
            self.run(text);
        }
    }

    fn run(self: &Rc<Self>, text: String) {
        self.publish_status(ControllerState::Updating.as_str());
        let html = substitute_references(&text, &self.files.borrow());
        let update = self.surface.update(&html);

        let this = Rc::clone(self);
        wasm_bindgen_futures::spawn_local(async move {
            let failed = match update.await {
                Ok(UpdateOutcome::Rendered(_)) => {
                    this.applied.set(AppliedKey::Content, text);
                    false
                }
                Ok(UpdateOutcome::Superseded) => {
                    tracing::debug!("preview update superseded");
                    false
                }
                Err(PreviewError::Disposed) => false,
                Err(e) => {
                    tracing::warn!(error = %e, "preview update failed, keeping last preview");
                    this.publish_status(&format!("error: {e}"));
                    true
                }
            };

            let next = this.machine.borrow_mut().complete();
            match next {
                Some(text) => this.run(text),
                // The error status stays visible until the next update starts.
                None if failed => {}
                None => {
                    let state = this.machine.borrow().state();
                    if state == ControllerState::Idle {
                        this.publish_status(state.as_str());
                    }
                }
            }
        });
    }

    fn publish_status(&self, status: &str) {
        self.applied.set(AppliedKey::Status, status.to_owned());
    }
}

fn find(root: &Element, selector: &str) -> Result<Element, PreviewError> {
    root.query_selector(selector)
        .map_err(|e| crate::dom::js_err(selector, e))?
        .ok_or_else(|| PreviewError::dom(format!("no element matches `{selector}`")))
}
