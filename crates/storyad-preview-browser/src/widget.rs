//! Text widget contract and the built-in `<textarea>` widget.
//!
//! The controller only needs the current text and a change notification. Any
//! third-party code editor can be plugged in by implementing [`TextWidget`].

use std::any::Any;

use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlTextAreaElement};

use storyad_preview_core::{ClassNamespace, PreviewError};

use crate::dom::{self, js_err};

/// Keeps a change handler registered until dropped.
pub struct ChangeSubscription {
    _guard: Box<dyn Any>,
}

impl ChangeSubscription {
    /// Wrap anything whose `Drop` unregisters the handler.
    pub fn new(guard: impl Any) -> Self {
        Self {
            _guard: Box::new(guard),
        }
    }
}

impl std::fmt::Debug for ChangeSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ChangeSubscription")
    }
}

/// A text-editing widget the preview can follow.
pub trait TextWidget {
    /// Current full text.
    fn value(&self) -> String;

    /// Call `handler` after every user edit.
    fn on_change(&self, handler: Box<dyn FnMut()>) -> ChangeSubscription;
}

/// Plain `<textarea>` widget, used when the host brings no code editor.
pub struct TextAreaWidget {
    element: HtmlTextAreaElement,
}

impl TextAreaWidget {
    /// Create a textarea holding `initial` and append it to `container`.
    pub fn mount(
        container: &Element,
        initial: &str,
        names: &ClassNamespace,
    ) -> Result<Self, PreviewError> {
        let element: HtmlTextAreaElement = dom::document()?
            .create_element("textarea")
            .map_err(|e| js_err("creating textarea", e))?
            .dyn_into()
            .map_err(|_| PreviewError::dom("textarea element has unexpected type"))?;
        element.set_class_name(&names.class("input"));
        element.set_spellcheck(false);
        element.set_value(initial);
        container
            .append_child(&element)
            .map_err(|e| js_err("appending textarea", e))?;
        Ok(Self { element })
    }

    /// Wrap an existing textarea.
    pub fn from_element(element: HtmlTextAreaElement) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &HtmlTextAreaElement {
        &self.element
    }

    /// Replace the text without firing a change.
    pub fn set_value(&self, text: &str) {
        self.element.set_value(text);
    }
}

impl TextWidget for TextAreaWidget {
    fn value(&self) -> String {
        self.element.value()
    }

    fn on_change(&self, mut handler: Box<dyn FnMut()>) -> ChangeSubscription {
        let listener = EventListener::new(&self.element, "input", move |_| handler());
        ChangeSubscription::new(listener)
    }
}
