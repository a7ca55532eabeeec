//! Link records as seen by the icon engine.

use serde::{Deserialize, Serialize};

/// The two addresses a link may be reached at.
///
/// The link store guarantees at least one is non-empty; everything here
/// still copes with both missing. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkAddress {
    #[serde(default)]
    pub internal_url: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
}

impl LinkAddress {
    pub fn new(internal_url: Option<&str>, external_url: Option<&str>) -> Self {
        Self {
            internal_url: internal_url.map(str::to_owned),
            external_url: external_url.map(str::to_owned),
        }
    }

    pub fn internal(&self) -> Option<&str> {
        non_empty(self.internal_url.as_deref())
    }

    pub fn external(&self) -> Option<&str> {
        non_empty(self.external_url.as_deref())
    }

    /// Select the URL to resolve for the given network-mode preference.
    ///
    /// Recomputed per call; never cached across preference values.
    pub fn effective_url(&self, prefer_internal: bool) -> Option<&str> {
        if prefer_internal && let Some(internal) = self.internal() {
            return Some(internal);
        }
        self.external().or_else(|| self.internal())
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// The slice of a stored link that the icon engine reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Primary URL; internal for LAN services.
    pub url: String,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub is_internal_only: bool,
}

impl LinkRecord {
    /// Addresses of this link.
    ///
    /// The primary URL counts as the internal address when it classifies as
    /// internal, as the external one otherwise.
    pub fn address(&self) -> LinkAddress {
        let primary = non_empty(Some(&self.url));
        let external = non_empty(self.external_url.as_deref());

        if primary.is_some_and(crate::core::is_internal_url) {
            LinkAddress::new(primary, external)
        } else {
            LinkAddress::new(None, external.or(primary))
        }
    }

    /// Stored icon, if any.
    pub fn stored_icon(&self) -> Option<&str> {
        non_empty(self.icon.as_deref())
    }

    /// Whether this link belongs to a private network.
    pub fn is_internal(&self) -> bool {
        self.is_internal_only || crate::core::is_internal_url(&self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, external: Option<&str>) -> LinkRecord {
        LinkRecord {
            id: "l1".into(),
            title: "NAS".into(),
            url: url.into(),
            external_url: external.map(Into::into),
            icon: None,
            is_internal_only: false,
        }
    }

    #[test]
    fn test_effective_url_preference() {
        let both = LinkAddress::new(Some("http://nas.local"), Some("https://nas.example.com"));
        assert_eq!(both.effective_url(true), Some("http://nas.local"));
        assert_eq!(both.effective_url(false), Some("https://nas.example.com"));
    }

    #[test]
    fn test_effective_url_fallbacks() {
        let internal_only = LinkAddress::new(Some("http://nas.local"), None);
        assert_eq!(internal_only.effective_url(false), Some("http://nas.local"));

        let external_only = LinkAddress::new(None, Some("https://github.com"));
        assert_eq!(external_only.effective_url(true), Some("https://github.com"));

        let blank = LinkAddress::new(Some("  "), Some(""));
        assert_eq!(blank.effective_url(true), None);
        assert_eq!(LinkAddress::default().effective_url(false), None);
    }

    #[test]
    fn test_record_address_split() {
        let lan = record("http://192.168.1.5:8096", Some("https://media.example.com"));
        assert_eq!(
            lan.address(),
            LinkAddress::new(Some("http://192.168.1.5:8096"), Some("https://media.example.com"))
        );
        assert!(lan.is_internal());

        let public = record("https://github.com", None);
        assert_eq!(public.address(), LinkAddress::new(None, Some("https://github.com")));
        assert!(!public.is_internal());
    }

    #[test]
    fn test_record_json_shape() {
        let json = r#"{"id":"a","title":"Docs","url":"https://docs.rs","isInternalOnly":false}"#;
        let parsed: LinkRecord = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.url, "https://docs.rs");
        assert!(parsed.icon.is_none());
    }
}
