//! Tracked files exposed to the preview through object URLs.
//!
//! Users drop assets (images, fonts, scripts) onto the editor. Each asset gets
//! an object URL, and references of the form `/<name>` in the ad markup are
//! rewritten to that URL before the markup is rendered.
//!
//! Every `blob:` URL is revoked exactly once, when its entry is removed or
//! replaced. Callers must not use a file's URL after that point.

use smol_str::SmolStr;

use crate::error::PreviewError;
use crate::platform::ObjectUrls;

/// URL scheme of browser-local object URLs.
pub const BLOB_SCHEME: &str = "blob:";

/// A named asset and the URL it is served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFile {
    pub name: SmolStr,
    pub url: String,
}

impl TrackedFile {
    pub fn new(name: impl Into<SmolStr>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Allocate an object URL for `handle` and track it under `name`.
    pub fn attach<U: ObjectUrls>(
        name: impl Into<SmolStr>,
        handle: &U::Handle,
        urls: &U,
    ) -> Result<Self, PreviewError> {
        let url = urls.create_object_url(handle)?;
        let file = Self::new(name, url);
        tracing::debug!(name = %file.name, url = %file.url, "attached file");
        Ok(file)
    }

    /// Whether the URL is browser-local and must be revoked on removal.
    pub fn is_blob(&self) -> bool {
        self.url.starts_with(BLOB_SCHEME)
    }

    fn release<U: ObjectUrls>(&self, urls: &U) {
        if self.is_blob() {
            tracing::debug!(name = %self.name, url = %self.url, "revoking file url");
            urls.revoke_object_url(&self.url);
        }
    }
}

/// The ordered collection of tracked files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackedFiles {
    files: Vec<TrackedFile>,
}

impl TrackedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackedFile> {
        self.files.iter()
    }

    pub fn as_slice(&self) -> &[TrackedFile] {
        &self.files
    }

    pub fn get(&self, index: usize) -> Option<&TrackedFile> {
        self.files.get(index)
    }

    pub fn find(&self, name: &str) -> Option<&TrackedFile> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Remove the entry at `index`, revoking its URL if it is a blob URL.
    ///
    /// An out-of-range index leaves the collection untouched.
    pub fn remove<U: ObjectUrls>(mut self, index: usize, urls: &U) -> Self {
        if index < self.files.len() {
            let file = self.files.remove(index);
            file.release(urls);
        } else {
            tracing::warn!(index, len = self.files.len(), "remove: index out of range");
        }
        self
    }

    /// Append `incoming` and sort the union by name.
    ///
    /// The sort is stable: equal names keep their relative input order, with
    /// existing entries ahead of incoming ones.
    pub fn merge_sorted(mut self, incoming: impl IntoIterator<Item = TrackedFile>) -> Self {
        self.files.extend(incoming);
        self.files.sort_by(|a, b| a.name.cmp(&b.name));
        self
    }

    /// Insert `file`, replacing any entry with the same name.
    ///
    /// The replaced entry's blob URL is revoked. The collection stays sorted.
    pub fn upsert<U: ObjectUrls>(mut self, file: TrackedFile, urls: &U) -> Self {
        if let Some(existing) = self.files.iter_mut().find(|f| f.name == file.name) {
            if existing.url != file.url {
                existing.release(urls);
            }
            *existing = file;
            self
        } else {
            self.merge_sorted([file])
        }
    }

    /// Remove every entry, revoking all blob URLs.
    pub fn clear<U: ObjectUrls>(&mut self, urls: &U) {
        for file in self.files.drain(..) {
            file.release(urls);
        }
    }
}

impl From<Vec<TrackedFile>> for TrackedFiles {
    fn from(files: Vec<TrackedFile>) -> Self {
        Self { files }
    }
}

impl<'a> IntoIterator for &'a TrackedFiles {
    type Item = &'a TrackedFile;
    type IntoIter = std::slice::Iter<'a, TrackedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// Rewrite every `/<name>` in `html` to the tracked file's URL.
///
/// Files are applied in collection order. Names are matched literally with no
/// escaping, so a file named `a` also rewrites the prefix of `/ab`.
pub fn substitute_references(html: &str, files: &TrackedFiles) -> String {
    let mut out = html.to_owned();
    for file in files {
        let needle = format!("/{}", file.name);
        if out.contains(&needle) {
            out = out.replace(&needle, &file.url);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    /// Records every allocation and revocation.
    #[derive(Default)]
    struct RecordingUrls {
        created: RefCell<usize>,
        revoked: RefCell<Vec<String>>,
    }

    impl ObjectUrls for RecordingUrls {
        type Handle = str;

        fn create_object_url(&self, handle: &str) -> Result<String, PreviewError> {
            let mut n = self.created.borrow_mut();
            *n += 1;
            Ok(format!("blob:test/{handle}-{n}"))
        }

        fn revoke_object_url(&self, url: &str) {
            self.revoked.borrow_mut().push(url.to_owned());
        }
    }

    fn names(files: &TrackedFiles) -> Vec<&str> {
        files.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_attach_allocates_url() {
        let urls = RecordingUrls::default();
        let file = TrackedFile::attach("logo.png", "logo", &urls).unwrap();
        assert_eq!(file.name, "logo.png");
        assert_eq!(file.url, "blob:test/logo-1");
        assert!(file.is_blob());
    }

    #[test]
    fn test_remove_blob_revokes_once() {
        let urls = RecordingUrls::default();
        let files = TrackedFiles::from(vec![
            TrackedFile::new("a.png", "blob:test/a"),
            TrackedFile::new("b.png", "blob:test/b"),
        ]);

        let files = files.remove(0, &urls);
        assert_eq!(names(&files), ["b.png"]);
        assert_eq!(*urls.revoked.borrow(), ["blob:test/a"]);
    }

    #[test]
    fn test_remove_non_blob_does_not_revoke() {
        let urls = RecordingUrls::default();
        let files = TrackedFiles::from(vec![TrackedFile::new("cdn.js", "https://cdn.test/x.js")]);

        let files = files.remove(0, &urls);
        assert!(files.is_empty());
        assert!(urls.revoked.borrow().is_empty());
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let urls = RecordingUrls::default();
        let files = TrackedFiles::from(vec![TrackedFile::new("a", "blob:a")]);
        let files = files.remove(3, &urls);
        assert_eq!(files.len(), 1);
        assert!(urls.revoked.borrow().is_empty());
    }

    #[test]
    fn test_merge_sorted_orders_by_name() {
        let existing = TrackedFiles::from(vec![TrackedFile::new("b", "blob:b")]);
        let merged = existing.merge_sorted([TrackedFile::new("a", "blob:a")]);
        assert_eq!(names(&merged), ["a", "b"]);
    }

    #[test]
    fn test_merge_sorted_is_stable() {
        let existing = TrackedFiles::from(vec![
            TrackedFile::new("a", "blob:first"),
            TrackedFile::new("c", "blob:c"),
        ]);
        let merged = existing.merge_sorted([
            TrackedFile::new("a", "blob:second"),
            TrackedFile::new("b", "blob:b"),
        ]);

        let urls: Vec<&str> = merged.iter().map(|f| f.url.as_str()).collect();
        assert_eq!(urls, ["blob:first", "blob:second", "blob:b", "blob:c"]);
    }

    #[test]
    fn test_upsert_replaces_and_revokes_old() {
        let urls = RecordingUrls::default();
        let files = TrackedFiles::from(vec![
            TrackedFile::new("a", "blob:old"),
            TrackedFile::new("b", "blob:b"),
        ]);

        let files = files.upsert(TrackedFile::new("a", "blob:new"), &urls);
        assert_eq!(files.find("a").map(|f| f.url.as_str()), Some("blob:new"));
        assert_eq!(*urls.revoked.borrow(), ["blob:old"]);

        let files = files.upsert(TrackedFile::new("0", "blob:zero"), &urls);
        assert_eq!(names(&files), ["0", "a", "b"]);
        assert_eq!(urls.revoked.borrow().len(), 1);
    }

    #[test]
    fn test_clear_revokes_all_blobs() {
        let urls = RecordingUrls::default();
        let mut files = TrackedFiles::from(vec![
            TrackedFile::new("a", "blob:a"),
            TrackedFile::new("b", "https://x/b"),
            TrackedFile::new("c", "blob:c"),
        ]);
        files.clear(&urls);
        assert!(files.is_empty());
        assert_eq!(*urls.revoked.borrow(), ["blob:a", "blob:c"]);
    }

    #[test]
    fn test_substitute_references() {
        let files = TrackedFiles::from(vec![
            TrackedFile::new("bg.png", "blob:test/1"),
            TrackedFile::new("font.woff", "blob:test/2"),
        ]);
        let html = r#"<amp-img src="/bg.png"></amp-img><style>@font-face{src:url(/font.woff)}</style><img src="/bg.png">"#;
        assert_eq!(
            substitute_references(html, &files),
            r#"<amp-img src="blob:test/1"></amp-img><style>@font-face{src:url(blob:test/2)}</style><img src="blob:test/1">"#
        );
    }

    #[test]
    fn test_substitute_is_literal() {
        let files = TrackedFiles::from(vec![TrackedFile::new("a.b", "X")]);
        // No regex semantics: `.` only matches a dot.
        assert_eq!(substitute_references("/a.b /axb", &files), "X /axb");
    }
}
