//! Platform abstraction traits for the preview pipeline.
//!
//! These traits define the seam between the pure bookkeeping in this crate and
//! the browser implementations (object URLs, the host's HTML sanitizer). Tests
//! substitute recording doubles for them.

use crate::error::PreviewError;

/// Allocation and release of object URLs for local resources.
///
/// The browser implementation wraps `URL.createObjectURL` and
/// `URL.revokeObjectURL`.
pub trait ObjectUrls {
    /// The resource an URL is allocated for (a `Blob` in the browser).
    type Handle: ?Sized;

    /// Allocate a fresh URL referencing `handle`.
    fn create_object_url(&self, handle: &Self::Handle) -> Result<String, PreviewError>;

    /// Release a previously allocated URL.
    ///
    /// Failures are not reported; a revoke is best effort.
    fn revoke_object_url(&self, url: &str);
}

impl<T: ObjectUrls + ?Sized> ObjectUrls for &T {
    type Handle = T::Handle;

    fn create_object_url(&self, handle: &Self::Handle) -> Result<String, PreviewError> {
        (**self).create_object_url(handle)
    }

    fn revoke_object_url(&self, url: &str) {
        (**self).revoke_object_url(url)
    }
}

/// HTML sanitizer contract.
///
/// Implementations must be deterministic and free of side effects for the same
/// input. The returned markup is what gets rendered into the preview.
pub trait Sanitizer {
    fn sanitize(&self, dirty: &str) -> Result<String, PreviewError>;
}

impl<F> Sanitizer for F
where
    F: Fn(&str) -> Result<String, PreviewError>,
{
    fn sanitize(&self, dirty: &str) -> Result<String, PreviewError> {
        self(dirty)
    }
}

/// Sanitizer that returns its input unchanged.
///
/// Used when the host does not supply a sanitizer.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl Sanitizer for PassThrough {
    fn sanitize(&self, dirty: &str) -> Result<String, PreviewError> {
        Ok(dirty.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_through_is_identity() {
        let html = "<b onclick=\"x()\">x</b>";
        assert_eq!(PassThrough.sanitize(html).as_deref(), Ok(html));
    }

    #[test]
    fn test_closure_sanitizer() {
        let strip_bold = |dirty: &str| -> Result<String, PreviewError> {
            Ok(dirty.replace("<b>", "").replace("</b>", ""))
        };
        assert_eq!(strip_bold.sanitize("<b>x</b>").as_deref(), Ok("x"));

        let failing =
            |_: &str| -> Result<String, PreviewError> { Err(PreviewError::Sanitization("boom".into())) };
        assert!(matches!(
            failing.sanitize("x"),
            Err(PreviewError::Sanitization(_))
        ));
    }
}
