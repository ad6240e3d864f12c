//! Adapter for host-provided code editors (CodeMirror-style `on`/`off` API).

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use storyad_preview_browser::{ChangeSubscription, TextWidget};

#[wasm_bindgen]
extern "C" {
    /// Any editor object exposing `getValue()`, `on(event, fn)` and `off(event, fn)`.
    #[wasm_bindgen(typescript_type = "CodeEditor")]
    #[derive(Debug, Clone)]
    pub type CodeEditor;

    #[wasm_bindgen(method, js_name = getValue)]
    fn get_value(this: &CodeEditor) -> String;

    #[wasm_bindgen(method)]
    fn on(this: &CodeEditor, event: &str, handler: &js_sys::Function);

    #[wasm_bindgen(method)]
    fn off(this: &CodeEditor, event: &str, handler: &js_sys::Function);
}

#[wasm_bindgen(typescript_custom_section)]
const CODE_EDITOR_TS: &str = r#"
export interface CodeEditor {
    getValue(): string;
    on(event: "change", handler: () => void): void;
    off(event: "change", handler: () => void): void;
}
"#;

const CHANGE: &str = "change";

/// [`TextWidget`] over a host [`CodeEditor`].
pub struct CodeEditorWidget {
    editor: CodeEditor,
}

impl CodeEditorWidget {
    pub fn new(editor: CodeEditor) -> Self {
        Self { editor }
    }
}

impl TextWidget for CodeEditorWidget {
    fn value(&self) -> String {
        self.editor.get_value()
    }

    fn on_change(&self, mut handler: Box<dyn FnMut()>) -> ChangeSubscription {
        let closure = Closure::<dyn FnMut()>::new(move || handler());
        self.editor.on(CHANGE, closure.as_ref().unchecked_ref());
        ChangeSubscription::new(Registration {
            editor: self.editor.clone(),
            closure,
        })
    }
}

/// Unregisters the change handler on drop.
struct Registration {
    editor: CodeEditor,
    closure: Closure<dyn FnMut()>,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.editor.off(CHANGE, self.closure.as_ref().unchecked_ref());
    }
}
