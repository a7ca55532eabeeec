//! `[resolver]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [resolver]
//! favicon_timeout = 2000       # ms per well-known favicon path
//! html_timeout = 3000          # ms for the HTML link scan
//! aggregator_timeout = 3000    # ms for the aggregator request
//! max_icon_bytes = 524288
//! aggregator = "https://www.google.com/s2/favicons?domain={host}&sz=64"
//! network_icon = "/icons/network-icon.svg"
//! cache = true
//! ```

use std::time::Duration;

use macros::Config;
use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;

/// Placeholder substituted with the hostname in `aggregator`.
pub const HOST_PLACEHOLDER: &str = "{host}";

/// Icon resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize, Config)]
#[serde(default)]
#[config(section = "resolver")]
pub struct ResolverConfig {
    /// Timeout in milliseconds for each well-known favicon path.
    #[config(default = "2000")]
    pub favicon_timeout: u64,

    /// Timeout in milliseconds for fetching and scanning the page HTML,
    /// including the icon it points to.
    #[config(default = "3000")]
    pub html_timeout: u64,

    /// Timeout in milliseconds for the aggregator request.
    #[config(default = "3000")]
    pub aggregator_timeout: u64,

    /// Largest icon body accepted, in bytes.
    #[config(default = "524288")]
    pub max_icon_bytes: usize,

    /// Third-party favicon service. `{host}` is replaced with the
    /// percent-encoded hostname.
    #[config(default = "https://www.google.com/s2/favicons?domain={host}&sz=64")]
    pub aggregator: String,

    /// Static path returned for links on a private network.
    #[config(default = "/icons/network-icon.svg")]
    pub network_icon: String,

    /// User-Agent sent with outbound requests.
    #[config(default = "Mozilla/5.0 (compatible; linkicon)")]
    pub user_agent: String,

    /// Keep resolved remote icons for the lifetime of the process.
    #[config(default = "true", inline_doc)]
    pub cache: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            favicon_timeout: 2000,
            html_timeout: 3000,
            aggregator_timeout: 3000,
            max_icon_bytes: 512 * 1024,
            aggregator: "https://www.google.com/s2/favicons?domain={host}&sz=64".into(),
            network_icon: "/icons/network-icon.svg".into(),
            user_agent: "Mozilla/5.0 (compatible; linkicon)".into(),
            cache: true,
        }
    }
}

impl ResolverConfig {
    pub const fn favicon_timeout(&self) -> Duration {
        Duration::from_millis(self.favicon_timeout)
    }

    pub const fn html_timeout(&self) -> Duration {
        Duration::from_millis(self.html_timeout)
    }

    pub const fn aggregator_timeout(&self) -> Duration {
        Duration::from_millis(self.aggregator_timeout)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (field, value) in [
            (Self::FIELDS.favicon_timeout, self.favicon_timeout),
            (Self::FIELDS.html_timeout, self.html_timeout),
            (Self::FIELDS.aggregator_timeout, self.aggregator_timeout),
        ] {
            if value == 0 {
                diag.error(field, "timeout must be greater than 0");
            }
        }

        if self.max_icon_bytes == 0 {
            diag.error(Self::FIELDS.max_icon_bytes, "must be greater than 0");
        }

        if !self.aggregator.contains(HOST_PLACEHOLDER) {
            diag.error_with_hint(
                Self::FIELDS.aggregator,
                format!("missing `{HOST_PLACEHOLDER}` placeholder"),
                "e.g. https://www.google.com/s2/favicons?domain={host}&sz=64",
            );
        } else if url::Url::parse(&self.aggregator.replace(HOST_PLACEHOLDER, "example.com")).is_err()
        {
            diag.error(Self::FIELDS.aggregator, "not a valid URL template");
        }

        if !self.network_icon.starts_with('/') {
            diag.error_with_hint(
                Self::FIELDS.network_icon,
                "must be an absolute path",
                "e.g. /icons/network-icon.svg",
            );
        }
    }
}
