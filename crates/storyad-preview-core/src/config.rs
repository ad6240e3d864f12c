//! Editor configuration supplied by the host page.

use serde::{Deserialize, Serialize};

use crate::error::PreviewError;
use crate::template::{AD_URL_TOKEN, StoryTemplate};

/// Default flags for the ad frame inside the story template.
pub const DEFAULT_SANDBOX: &str = "allow-scripts allow-same-origin";

/// Default prefix for the DOM class names the editor looks up.
pub const DEFAULT_CLASS_PREFIX: &str = "amp-story-ad-editor";

/// Default quiet period before an edit is rendered.
pub const DEFAULT_DEBOUNCE_MS: u32 = 300;

/// How the preview frame is re-rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyPreference {
    /// Use `srcdoc` when the browser supports it, reload otherwise.
    #[default]
    Auto,
    /// Reload the frame and inject the document into the fresh context.
    Reload,
    /// Assign the document through the `srcdoc` attribute.
    Srcdoc,
}

/// Everything the editor needs to mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviewConfig {
    /// Story document containing `{{ adUrl }}` and optionally `{{ adSandbox }}`.
    pub template: String,
    /// Sandbox flags substituted for `{{ adSandbox }}`.
    pub sandbox: String,
    /// Prefix for the editor's class names (`{prefix}-editor`, `{prefix}-preview`).
    pub class_prefix: String,
    pub debounce_ms: u32,
    pub strategy: StrategyPreference,
    /// URL the preview frame starts on. Only relevant for the reload strategy.
    pub frame_src: String,
    /// Text rendered on mount. When empty the widget's own value is used.
    pub initial_content: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            template: format!(r#"<iframe src="{AD_URL_TOKEN}"></iframe>"#),
            sandbox: DEFAULT_SANDBOX.to_owned(),
            class_prefix: DEFAULT_CLASS_PREFIX.to_owned(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            strategy: StrategyPreference::Auto,
            frame_src: "about:blank".to_owned(),
            initial_content: String::new(),
        }
    }
}

impl PreviewConfig {
    /// Check the config and build the story template from it.
    pub fn story_template(&self) -> Result<StoryTemplate, PreviewError> {
        StoryTemplate::new(&self.template, &self.sandbox)
    }

    pub fn validate(&self) -> Result<(), PreviewError> {
        self.story_template()?;
        if self.class_prefix.is_empty()
            || !self
                .class_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(PreviewError::Config(format!(
                "class prefix {:?} is not a valid class name",
                self.class_prefix
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = PreviewConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.debounce_ms, 300);
    }

    #[test]
    fn test_deserialize_partial_camel_case() {
        let config: PreviewConfig = serde_json::from_str(
            r#"{
                "template": "<amp-story>{{ adUrl }}</amp-story>",
                "debounceMs": 50,
                "strategy": "srcdoc",
                "classPrefix": "my-app"
            }"#,
        )
        .unwrap();

        assert_eq!(config.debounce_ms, 50);
        assert_eq!(config.strategy, StrategyPreference::Srcdoc);
        assert_eq!(config.class_prefix, "my-app");
        assert_eq!(config.sandbox, DEFAULT_SANDBOX);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_template_without_url_token_invalid() {
        let config = PreviewConfig {
            template: "<div></div>".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PreviewError::Template(_))
        ));
    }

    #[test]
    fn test_bad_class_prefix_invalid() {
        let config = PreviewConfig {
            class_prefix: "a b".into(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(PreviewError::Config(
                r#"class prefix "a b" is not a valid class name"#.into()
            ))
        );

        let empty = PreviewConfig {
            class_prefix: String::new(),
            ..Default::default()
        };
        assert!(matches!(empty.validate(), Err(PreviewError::Config(_))));
    }
}
