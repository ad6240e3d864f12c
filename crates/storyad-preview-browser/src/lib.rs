//! Browser DOM layer for the story ad live preview.
//!
//! This crate drives the preview iframe and the editor widget. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `attach`: waiting for an element to enter the document
//! - `files`: object URLs for uploaded files and ad documents
//! - `inject`: writing a full HTML document into a live `Document`
//! - `reload`: re-rendering the frame and waiting for `load`
//! - `surface`: the sandboxed preview frame and its update pipeline
//! - `controller`: widget → debounce → surface, plus file tracking
//!
//! # Re-exports
//!
//! This crate re-exports `storyad-preview-core` for convenience, so consumers
//! only need to depend on `storyad-preview-browser`.

// Re-export core crate
pub use storyad_preview_core;
pub use storyad_preview_core::*;

pub mod attach;
pub mod controller;
pub mod debounce;
pub mod dom;
pub mod events;
pub mod files;
pub mod inject;
pub mod reload;
pub mod surface;
pub mod widget;

pub use attach::{AttachTarget, Observation, UntilAttached, until_attached};
pub use controller::EditorController;
pub use debounce::Debouncer;
pub use files::{BrowserObjectUrls, html_blob_url};
pub use inject::inject_document;
pub use reload::{FrameStrategy, Reloaded, render_frame, restart_with_document};
pub use surface::{PreviewSurface, UpdateOutcome};
pub use widget::{ChangeSubscription, TextAreaWidget, TextWidget};
