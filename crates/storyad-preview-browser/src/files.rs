//! Object URL allocation for uploaded files and per-update ad documents.

use js_sys::Array;
use wasm_bindgen::JsValue;
use web_sys::{Blob, BlobPropertyBag, File, FileList, Url};

use storyad_preview_core::{ObjectUrls, PreviewError, TrackedFile};

use crate::dom::js_err;

/// `URL.createObjectURL` / `URL.revokeObjectURL`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserObjectUrls;

impl ObjectUrls for BrowserObjectUrls {
    type Handle = Blob;

    fn create_object_url(&self, blob: &Blob) -> Result<String, PreviewError> {
        Url::create_object_url_with_blob(blob).map_err(|e| match js_err("createObjectURL", e) {
            PreviewError::Dom(msg) => PreviewError::Blob(msg),
            other => other,
        })
    }

    fn revoke_object_url(&self, url: &str) {
        if let Err(e) = Url::revoke_object_url(url) {
            tracing::warn!("revokeObjectURL failed for {}: {:?}", url, e);
        }
    }
}

/// Track a user-supplied file under its own name.
pub fn attach(file: &File) -> Result<TrackedFile, PreviewError> {
    let blob: &Blob = file;
    TrackedFile::attach(file.name(), blob, &BrowserObjectUrls)
}

/// Track every file of a drop or `<input type=file>` selection.
pub fn attach_all(list: &FileList) -> Result<Vec<TrackedFile>, PreviewError> {
    let mut files = Vec::with_capacity(list.length() as usize);
    for i in 0..list.length() {
        if let Some(file) = list.get(i) {
            files.push(attach(&file)?);
        }
    }
    Ok(files)
}

/// Wrap `html` in a `text/html` blob and return an object URL for it.
pub fn html_blob_url(html: &str) -> Result<String, PreviewError> {
    let parts = Array::new();
    parts.push(&JsValue::from_str(html));
    let opts = BlobPropertyBag::new();
    opts.set_type("text/html");
    let blob = Blob::new_with_str_sequence_and_options(&parts, &opts)
        .map_err(|e| PreviewError::Blob(crate::dom::describe_js(&e)))?;
    BrowserObjectUrls.create_object_url(&blob)
}
