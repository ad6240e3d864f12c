//! JsPreviewEditor - the editor + live preview wrapper for JavaScript.

use wasm_bindgen::prelude::*;
use web_sys::{Element, FileList};

use storyad_preview_browser::{
    AppliedKey, EditorController, PassThrough, PreviewConfig, PreviewError, Sanitizer, Subscription,
    TextWidget,
};

use crate::sanitizer::JsSanitizer;
use crate::types::{JsPreviewConfig, JsTrackedFile};
use crate::widget::{CodeEditor, CodeEditorWidget};

fn to_js_error(e: PreviewError) -> JsError {
    JsError::new(&e.to_string())
}

/// An editor with a live story ad preview, exposed to JavaScript.
///
/// `root` must contain one `.{prefix}-editor` and one `.{prefix}-preview`
/// element. Without a `widget` a plain textarea is created in the editor
/// container.
#[wasm_bindgen]
pub struct JsPreviewEditor {
    controller: EditorController,
}

#[wasm_bindgen]
impl JsPreviewEditor {
    #[wasm_bindgen(constructor)]
    pub fn new(
        root: &Element,
        config: Option<JsPreviewConfig>,
        sanitizer: Option<js_sys::Function>,
        widget: Option<CodeEditor>,
    ) -> Result<JsPreviewEditor, JsError> {
        let config: PreviewConfig = config.unwrap_or_default().into();
        let sanitizer: Box<dyn Sanitizer> = match sanitizer {
            Some(function) => Box::new(JsSanitizer::new(function)),
            None => Box::new(PassThrough),
        };

        let controller = match widget {
            Some(editor) => {
                EditorController::mount_with_widget(root, config, sanitizer, |_, _| {
                    Ok(Box::new(CodeEditorWidget::new(editor)) as Box<dyn TextWidget>)
                })
            }
            None => EditorController::mount(root, config, sanitizer),
        }
        .map_err(to_js_error)?;

        Ok(Self { controller })
    }

    // === Content ===

    /// Current text of the editor widget.
    #[wasm_bindgen(js_name = getValue)]
    pub fn get_value(&self) -> String {
        self.controller.value()
    }

    /// Text of the last successfully rendered update.
    #[wasm_bindgen(js_name = getRenderedContent)]
    pub fn get_rendered_content(&self) -> Option<String> {
        self.controller.applied().get(&AppliedKey::Content)
    }

    /// Render the current text immediately.
    #[wasm_bindgen]
    pub fn refresh(&self) {
        self.controller.refresh();
    }

    // === Files ===

    /// Track files from a drop or file input. `/name` references in the
    /// markup are rewritten to the files' object URLs.
    #[wasm_bindgen(js_name = attachFiles)]
    pub fn attach_files(&self, files: &FileList) -> Result<(), JsError> {
        self.controller.attach_files(files).map_err(to_js_error)
    }

    /// Stop tracking the file at `index` (as listed by `getFiles`).
    #[wasm_bindgen(js_name = removeFile)]
    pub fn remove_file(&self, index: usize) {
        self.controller.remove_file(index);
    }

    /// Tracked files, sorted by name.
    #[wasm_bindgen(js_name = getFiles)]
    pub fn get_files(&self) -> Result<JsValue, JsError> {
        let files: Vec<JsTrackedFile> = self
            .controller
            .files()
            .iter()
            .map(JsTrackedFile::from)
            .collect();
        serde_wasm_bindgen::to_value(&files)
            .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
    }

    // === State ===

    /// Controller state, e.g. `"idle"` or `"updating"`.
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        self.controller.state().as_str().to_string()
    }

    /// Last published status; `"error: ..."` after a failed update.
    #[wasm_bindgen(js_name = getStatus)]
    pub fn get_status(&self) -> Option<String> {
        self.controller.applied().get(&AppliedKey::Status)
    }

    /// Call `callback(key, value)` whenever `"content"` or `"status"` changes.
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: js_sys::Function) -> JsSubscription {
        let subscription = self.controller.subscribe(move |key, value| {
            let this = JsValue::null();
            let key = JsValue::from_str(key.as_str());
            if let Err(e) = callback.call2(&this, &key, &JsValue::from_str(value)) {
                tracing::warn!("onChange callback threw: {:?}", e);
            }
        });
        JsSubscription {
            inner: Some(subscription),
        }
    }

    // === Lifecycle ===

    /// Remove the preview frame and release every object URL.
    #[wasm_bindgen]
    pub fn dispose(&self) {
        self.controller.dispose();
    }
}

/// Handle returned by `onChange`.
#[wasm_bindgen]
pub struct JsSubscription {
    inner: Option<Subscription>,
}

#[wasm_bindgen]
impl JsSubscription {
    /// Stop receiving change notifications.
    #[wasm_bindgen]
    pub fn unsubscribe(&mut self) {
        if let Some(subscription) = self.inner.take() {
            subscription.unsubscribe();
        }
    }
}
