//! Error type shared by every layer of the preview pipeline.

/// Errors surfaced by the preview pipeline.
///
/// Cloneable so a single failure can be handed to every consumer of a shared
/// future (the preview frame's attachment wait is awaited by each update).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PreviewError {
    /// The awaited element never appeared under its ancestor.
    #[error("element was not attached within {after_ms}ms")]
    AttachmentTimeout { after_ms: u32 },

    /// The host sanitizer rejected or failed on the input.
    #[error("sanitizer failed: {0}")]
    Sanitization(String),

    /// The story template is unusable.
    #[error("invalid story template: {0}")]
    Template(String),

    /// A configuration value is out of range or malformed.
    #[error("invalid config: {0}")]
    Config(String),

    /// Blob or object URL construction failed.
    #[error("blob error: {0}")]
    Blob(String),

    /// A DOM call failed or a required node was missing.
    #[error("dom error: {0}")]
    Dom(String),

    /// The component was disposed before the operation ran.
    #[error("preview has been disposed")]
    Disposed,
}

impl PreviewError {
    pub fn dom(msg: impl Into<String>) -> Self {
        Self::Dom(msg.into())
    }
}
