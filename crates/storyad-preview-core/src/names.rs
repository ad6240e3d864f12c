//! App-prefixed class names, so the editor's DOM hooks cannot collide with
//! host page styles.

use smol_str::{SmolStr, format_smolstr};

/// Suffix of the text widget's container.
pub const EDITOR: &str = "editor";
/// Suffix of the preview container.
pub const PREVIEW: &str = "preview";
/// Suffix applied to the preview iframe.
pub const FRAME: &str = "frame";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNamespace {
    prefix: SmolStr,
}

impl ClassNamespace {
    pub fn new(prefix: impl Into<SmolStr>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `{prefix}-{name}`
    pub fn class(&self, name: &str) -> SmolStr {
        format_smolstr!("{}-{}", self.prefix, name)
    }

    /// `.{prefix}-{name}`
    pub fn selector(&self, name: &str) -> SmolStr {
        format_smolstr!(".{}-{}", self.prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_and_selector() {
        let ns = ClassNamespace::new("amp-story-ad-editor");
        assert_eq!(ns.class(PREVIEW), "amp-story-ad-editor-preview");
        assert_eq!(ns.selector(EDITOR), ".amp-story-ad-editor-editor");
    }
}
