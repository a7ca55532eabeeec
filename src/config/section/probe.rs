//! `[probe]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [probe]
//! enable = true
//! timeout = 3000     # ms for the HEAD request
//! ```

use std::time::Duration;

use macros::Config;
use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;

/// Reachability probe settings.
#[derive(Debug, Clone, Serialize, Deserialize, Config)]
#[serde(default)]
#[config(section = "probe")]
pub struct ProbeConfig {
    /// Probe internal links. When disabled every verdict is `unknown`.
    #[config(default = "true")]
    pub enable: bool,

    /// Timeout in milliseconds for the HEAD request.
    #[config(default = "3000", inline_doc)]
    pub timeout: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            enable: true,
            timeout: 3000,
        }
    }
}

impl ProbeConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.enable && self.timeout == 0 {
            diag.error(Self::FIELDS.timeout, "timeout must be greater than 0");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_probe_config() {
        let config = test_parse_config("[probe]\nenable = false\ntimeout = 750");
        assert!(!config.probe.enable);
        assert_eq!(config.probe.timeout(), Duration::from_millis(750));
    }

    #[test]
    fn test_zero_timeout_only_matters_when_enabled() {
        let mut diag = ConfigDiagnostics::new();
        test_parse_config("[probe]\ntimeout = 0").probe.validate(&mut diag);
        assert_eq!(diag.len(), 1);

        let mut diag = ConfigDiagnostics::new();
        test_parse_config("[probe]\nenable = false\ntimeout = 0")
            .probe
            .validate(&mut diag);
        assert!(diag.is_empty());
    }
}
