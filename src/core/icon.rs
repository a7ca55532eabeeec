//! Icon representation produced by the resolver.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Exactly what should be rendered for a link.
///
/// `Display` yields the string to put into an `<img src>`; for icons parsed
/// from storage it reproduces the stored string unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IconResult {
    /// Inline image data.
    #[serde(rename_all = "camelCase")]
    DataUri {
        mime: String,
        /// Payload, base64 when `base64` is set.
        bytes: String,
        #[serde(default = "default_true")]
        base64: bool,
    },
    /// Path served by this application (e.g. the generic network icon).
    StaticPath { path: String },
    /// Absolute URL of a remote image.
    RemoteUrl { url: String },
}

const fn default_true() -> bool {
    true
}

impl IconResult {
    /// Build a base64 data URI from raw image bytes.
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self::DataUri {
            mime: mime.to_string(),
            bytes: STANDARD.encode(bytes),
            base64: true,
        }
    }

    pub fn static_path(path: impl Into<String>) -> Self {
        Self::StaticPath { path: path.into() }
    }

    pub fn remote_url(url: impl Into<String>) -> Self {
        Self::RemoteUrl { url: url.into() }
    }

    /// Interpret a stored icon string by its shape.
    ///
    /// - `data:` → `DataUri`
    /// - leading `/` → `StaticPath`
    /// - anything else → `RemoteUrl`
    ///
    /// Returns `None` for empty input.
    pub fn from_stored(stored: &str) -> Option<Self> {
        if stored.trim().is_empty() {
            return None;
        }
        if let Some(icon) = parse_data_uri(stored) {
            return Some(icon);
        }
        if stored.starts_with('/') && !stored.starts_with("//") {
            return Some(Self::static_path(stored));
        }
        Some(Self::remote_url(stored))
    }

    /// Short tag used in API payloads.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DataUri { .. } => "dataUri",
            Self::StaticPath { .. } => "staticPath",
            Self::RemoteUrl { .. } => "remoteUrl",
        }
    }

    /// Decoded payload of a base64 data URI.
    pub fn decoded_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Self::DataUri {
                bytes,
                base64: true,
                ..
            } => STANDARD.decode(bytes).ok(),
            _ => None,
        }
    }
}

/// Split `data:<mime>[;base64],<payload>`.
fn parse_data_uri(s: &str) -> Option<IconResult> {
    let rest = s.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let (mime, base64) = match header.strip_suffix(";base64") {
        Some(mime) => (mime, true),
        None => (header, false),
    };
    Some(IconResult::DataUri {
        mime: mime.to_string(),
        bytes: payload.to_string(),
        base64,
    })
}

impl fmt::Display for IconResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DataUri {
                mime,
                bytes,
                base64: true,
            } => write!(f, "data:{mime};base64,{bytes}"),
            Self::DataUri { mime, bytes, .. } => write!(f, "data:{mime},{bytes}"),
            Self::StaticPath { path } => f.write_str(path),
            Self::RemoteUrl { url } => f.write_str(url),
        }
    }
}
