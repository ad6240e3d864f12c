//! Story template with ad placeholders.

use crate::error::PreviewError;

/// Placeholder replaced by the ad document URL on every update.
pub const AD_URL_TOKEN: &str = "{{ adUrl }}";

/// Placeholder replaced by the ad frame's sandbox flags once, at construction.
pub const AD_SANDBOX_TOKEN: &str = "{{ adSandbox }}";

/// Host-provided story document that the user's ad is merged into.
///
/// Immutable after construction. The sandbox token has already been
/// substituted; only the ad URL token remains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryTemplate {
    source: String,
}

impl StoryTemplate {
    /// Build a template, substituting `sandbox` for every sandbox token.
    ///
    /// Fails when the template has no ad URL token, since every update would
    /// then render the same document.
    pub fn new(template: &str, sandbox: &str) -> Result<Self, PreviewError> {
        if !template.contains(AD_URL_TOKEN) {
            return Err(PreviewError::Template(format!(
                "template has no `{AD_URL_TOKEN}` placeholder"
            )));
        }
        Ok(Self {
            source: template.replace(AD_SANDBOX_TOKEN, sandbox),
        })
    }

    /// Produce the story document for one ad URL.
    pub fn merge(&self, ad_url: &str) -> String {
        self.source.replace(AD_URL_TOKEN, ad_url)
    }

    /// The template text after sandbox substitution.
    pub fn source(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_replaces_every_url_token() {
        let template = StoryTemplate::new(
            r#"<a href="{{ adUrl }}"></a><amp-ad src="{{ adUrl }}"></amp-ad>"#,
            "",
        )
        .unwrap();
        let merged = template.merge("blob:https://example.test/1234");
        assert_eq!(
            merged,
            r#"<a href="blob:https://example.test/1234"></a><amp-ad src="blob:https://example.test/1234"></amp-ad>"#
        );
        assert!(!merged.contains(AD_URL_TOKEN));
    }

    #[test]
    fn test_sandbox_substituted_once_at_construction() {
        let template = StoryTemplate::new(
            r#"<iframe sandbox="{{ adSandbox }}" src="{{ adUrl }}"></iframe>"#,
            "allow-scripts",
        )
        .unwrap();
        assert_eq!(
            template.source(),
            r#"<iframe sandbox="allow-scripts" src="{{ adUrl }}"></iframe>"#
        );
        assert_eq!(
            template.merge("blob:x"),
            r#"<iframe sandbox="allow-scripts" src="blob:x"></iframe>"#
        );
    }

    #[test]
    fn test_missing_url_token_rejected() {
        let err = StoryTemplate::new("<div>{{ adSandbox }}</div>", "x").unwrap_err();
        assert!(matches!(err, PreviewError::Template(_)));
    }

    #[test]
    fn test_token_must_match_verbatim() {
        assert!(StoryTemplate::new("<div>{{adUrl}}</div>", "").is_err());
    }
}
