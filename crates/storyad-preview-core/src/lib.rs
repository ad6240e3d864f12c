//! storyad-preview-core: pure Rust logic behind the story ad live preview.
//!
//! This crate provides:
//! - `document` - head/body splitting and permissive tag parsing for injection
//! - `template` - the story template and its ad placeholders
//! - `files` - tracked files and their object URL lifecycle
//! - `sequence` - update tickets and per-update URL leases
//! - `state` - the editor controller state machine
//! - `store` - observable state shared with the host UI
//! - `platform` - traits implemented by the browser layer
//!
//! Nothing here touches the DOM, so all of it is testable natively.

pub mod config;
pub mod document;
pub mod error;
pub mod files;
pub mod names;
pub mod platform;
pub mod sequence;
pub mod state;
pub mod store;
pub mod template;

pub use config::{PreviewConfig, StrategyPreference};
pub use document::{
    Attribute, DocumentParts, Fragment, ScriptTag, extract_scripts, parse_attributes,
    parse_fragment, split_document,
};
pub use error::PreviewError;
pub use files::{BLOB_SCHEME, TrackedFile, TrackedFiles, substitute_references};
pub use names::ClassNamespace;
pub use platform::{ObjectUrls, PassThrough, Sanitizer};
pub use sequence::{LeaseLedger, UpdateSequencer, UpdateTicket};
pub use smol_str::SmolStr;
pub use state::{ControllerMachine, ControllerState};
pub use store::{AppliedKey, AppliedState, Store, Subscription};
pub use template::{AD_SANDBOX_TOKEN, AD_URL_TOKEN, StoryTemplate};
