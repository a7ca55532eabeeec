//! Acceptance half of the client-side icon capture.
//!
//! A browser on the private network fetches the icon of an internal link and
//! hands it over as a data URI. Nothing here performs network access: the
//! payload is validated and turned into an [`IconResult`] for storage.

use thiserror::Error;

use crate::core::{IconResult, LinkRecord};
use crate::utils::mime;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("captured icons are only accepted for internal links")]
    NotInternal,

    #[error("payload is not an image data URI")]
    NotImageData,

    #[error("payload exceeds {0} bytes")]
    TooLarge(usize),
}

/// Icons captured inside the private network, keyed by page URL.
pub trait ClientSideCapture: Send + Sync {
    /// Image data URI captured for `url`, if the client supplied one.
    fn captured_icon(&self, url: &str) -> Option<String>;
}

/// A single capture handed over with the current request.
#[derive(Debug, Clone, Default)]
pub struct SuppliedCapture {
    payload: Option<String>,
}

impl SuppliedCapture {
    pub fn new(payload: Option<String>) -> Self {
        Self {
            payload: payload.filter(|p| !p.trim().is_empty()),
        }
    }
}

impl ClientSideCapture for SuppliedCapture {
    fn captured_icon(&self, _url: &str) -> Option<String> {
        self.payload.clone()
    }
}

/// Validate a client-supplied payload as an image data URI.
///
/// Accepts `data:image/<type>;base64,<payload>` whose payload decodes to a
/// non-empty body of at most `max_bytes`.
pub fn validate_image_data(payload: &str, max_bytes: usize) -> Result<IconResult, CaptureError> {
    let icon = IconResult::from_stored(payload.trim()).ok_or(CaptureError::NotImageData)?;

    let IconResult::DataUri { mime: ref declared, .. } = icon else {
        return Err(CaptureError::NotImageData);
    };
    if !mime::is_image(&mime::essence(declared)) {
        return Err(CaptureError::NotImageData);
    }

    let decoded = icon.decoded_bytes().ok_or(CaptureError::NotImageData)?;
    if decoded.is_empty() {
        return Err(CaptureError::NotImageData);
    }
    if decoded.len() > max_bytes {
        return Err(CaptureError::TooLarge(max_bytes));
    }
    Ok(icon)
}

/// Validate a capture for a stored link: the link must be internal and the
/// payload a recognized image encoding.
pub fn validate_capture(
    link: &LinkRecord,
    payload: &str,
    max_bytes: usize,
) -> Result<IconResult, CaptureError> {
    let icon = validate_image_data(payload, max_bytes)?;
    if !link.is_internal() {
        return Err(CaptureError::NotInternal);
    }
    Ok(icon)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUg==";

    fn link(url: &str, internal_only: bool) -> LinkRecord {
        LinkRecord {
            id: "nas".into(),
            title: "NAS".into(),
            url: url.into(),
            external_url: None,
            icon: None,
            is_internal_only: internal_only,
        }
    }

    #[test]
    fn test_accepts_internal_image() {
        let icon = validate_capture(&link("http://nas.local", false), PNG_URI, 1024).unwrap();
        assert_eq!(icon.to_string(), PNG_URI);
    }

    #[test]
    fn test_flagged_internal_only_counts() {
        let flagged = link("https://nas.example.com", true);
        assert!(validate_capture(&flagged, PNG_URI, 1024).is_ok());
    }

    #[test]
    fn test_rejects_external_link() {
        let err = validate_capture(&link("https://github.com", false), PNG_URI, 1024).unwrap_err();
        assert_eq!(err, CaptureError::NotInternal);
    }

    #[test]
    fn test_rejects_non_image_payloads() {
        for payload in [
            "https://example.com/favicon.ico",
            "data:text/html;base64,PGh0bWw+",
            "data:image/png;base64,!!!not-base64!!!",
            "data:image/svg+xml,%3Csvg%3E",
            "data:image/png;base64,",
            "",
        ] {
            assert_eq!(
                validate_image_data(payload, 1024).unwrap_err(),
                CaptureError::NotImageData,
                "{payload:?}"
            );
        }
    }

    #[test]
    fn test_rejects_oversized_payload() {
        let err = validate_image_data(PNG_URI, 4).unwrap_err();
        assert_eq!(err, CaptureError::TooLarge(4));
    }

    #[test]
    fn test_supplied_capture_ignores_blank() {
        assert!(SuppliedCapture::new(Some("  ".into())).captured_icon("x").is_none());
        assert_eq!(
            SuppliedCapture::new(Some(PNG_URI.into())).captured_icon("x").as_deref(),
            Some(PNG_URI)
        );
    }
}
