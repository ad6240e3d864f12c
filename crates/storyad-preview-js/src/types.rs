//! Types exposed to JavaScript via wasm-bindgen.

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

use storyad_preview_core::{PreviewConfig, StrategyPreference, TrackedFile};

/// Editor options. Every field is optional and falls back to its default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase", default)]
pub struct JsPreviewConfig {
    /// Story document with a `{{ adUrl }}` placeholder.
    #[tsify(optional)]
    pub template: Option<String>,
    /// Sandbox flags for `{{ adSandbox }}`.
    #[tsify(optional)]
    pub sandbox: Option<String>,
    #[tsify(optional)]
    pub class_prefix: Option<String>,
    #[tsify(optional)]
    pub debounce_ms: Option<u32>,
    #[tsify(optional, type = "\"auto\" | \"reload\" | \"srcdoc\"")]
    pub strategy: Option<StrategyPreference>,
    #[tsify(optional)]
    pub frame_src: Option<String>,
    #[tsify(optional)]
    pub initial_content: Option<String>,
}

impl From<JsPreviewConfig> for PreviewConfig {
    fn from(js: JsPreviewConfig) -> Self {
        let defaults = PreviewConfig::default();
        PreviewConfig {
            template: js.template.unwrap_or(defaults.template),
            sandbox: js.sandbox.unwrap_or(defaults.sandbox),
            class_prefix: js.class_prefix.unwrap_or(defaults.class_prefix),
            debounce_ms: js.debounce_ms.unwrap_or(defaults.debounce_ms),
            strategy: js.strategy.unwrap_or(defaults.strategy),
            frame_src: js.frame_src.unwrap_or(defaults.frame_src),
            initial_content: js.initial_content.unwrap_or(defaults.initial_content),
        }
    }
}

/// A tracked file as shown in the host's file list.
#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct JsTrackedFile {
    pub name: String,
    pub url: String,
}

impl From<&TrackedFile> for JsTrackedFile {
    fn from(file: &TrackedFile) -> Self {
        Self {
            name: file.name.to_string(),
            url: file.url.clone(),
        }
    }
}
