//! WASM bindings for the story ad live preview editor.
//!
//! Mounts an editor widget next to a sandboxed preview frame and keeps the
//! frame in sync with the ad markup being edited. Host pages can plug in
//! their own code editor and HTML sanitizer.

mod editor;
mod sanitizer;
mod types;
mod widget;

pub use editor::*;
pub use sanitizer::JsSanitizer;
pub use types::*;
pub use widget::{CodeEditor, CodeEditorWidget};

use wasm_bindgen::prelude::*;

/// Install the panic hook and route `tracing` output to the console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    let _ = set_global_default(Registry::default().with(wasm_layer));
}
