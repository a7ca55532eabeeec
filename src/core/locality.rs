//! Network locality classification.
//!
//! One rule table decides whether a hostname belongs to a private network.
//! Every caller (URL classification, probe allow-list, capture acceptance,
//! client-network inference) goes through [`is_private_host`].
//!
//! # Rules (tested in order)
//!
//! | Rule                | Matches                              |
//! |---------------------|--------------------------------------|
//! | exact               | `localhost`                          |
//! | prefix              | `127.`, `192.168.`, `10.`            |
//! | 172.16.0.0/12       | `172.16.` ..= `172.31.`              |
//! | suffix              | `.local`, `.lan`                     |

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use url::Url;

/// Whether a target sits on a private network or the public internet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locality {
    Internal,
    External,
}

/// What a locality verdict was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Basis {
    /// Hostname matched (or failed to match) the rule table.
    HostnamePattern,
    /// Same-origin round trip plus corroborating client signals.
    NetworkProbe,
    /// Input could not be parsed; failed closed.
    Unparseable,
}

/// Derived locality with the basis it was computed on. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalityVerdict {
    pub locality: Locality,
    pub basis: Basis,
}

impl LocalityVerdict {
    pub const fn new(locality: Locality, basis: Basis) -> Self {
        Self { locality, basis }
    }

    #[inline]
    pub const fn is_internal(&self) -> bool {
        matches!(self.locality, Locality::Internal)
    }

    const fn fail_closed() -> Self {
        Self::new(Locality::External, Basis::Unparseable)
    }
}

// =============================================================================
// Rule table
// =============================================================================

/// A single hostname rule.
#[derive(Debug, Clone, Copy)]
enum HostRule {
    Exact(&'static str),
    Prefix(&'static str),
    /// `172.<n>.` with `n` in the inclusive range.
    SecondOctet(&'static str, u8, u8),
    Suffix(&'static str),
}

impl HostRule {
    fn matches(self, host: &str) -> bool {
        match self {
            Self::Exact(name) => host == name,
            Self::Prefix(prefix) => host.starts_with(prefix),
            Self::Suffix(suffix) => host.ends_with(suffix),
            Self::SecondOctet(first, lo, hi) => host
                .strip_prefix(first)
                .and_then(|rest| rest.split_once('.'))
                .and_then(|(octet, _)| octet.parse::<u8>().ok())
                .is_some_and(|n| (lo..=hi).contains(&n)),
        }
    }
}

const PRIVATE_RULES: [HostRule; 7] = [
    HostRule::Exact("localhost"),
    HostRule::Prefix("127."),
    HostRule::Prefix("192.168."),
    HostRule::Prefix("10."),
    HostRule::SecondOctet("172.", 16, 31),
    HostRule::Suffix(".local"),
    HostRule::Suffix(".lan"),
];

/// Check a bare hostname against the private-network rule table.
///
/// Comparison is case-insensitive; IPv6 brackets are ignored.
pub fn is_private_host(host: &str) -> bool {
    let host = normalize_host(host);
    if host.is_empty() {
        return false;
    }
    PRIVATE_RULES.iter().any(|rule| rule.matches(&host))
}

fn normalize_host(host: &str) -> String {
    host.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim_end_matches('.')
        .to_ascii_lowercase()
}

// =============================================================================
// Classification
// =============================================================================

/// Classify a URL as internal or external.
///
/// Pure and deterministic. Empty or unparseable input fails closed to
/// `External`.
pub fn classify(url: &str) -> LocalityVerdict {
    let url = url.trim();
    if url.is_empty() {
        return LocalityVerdict::fail_closed();
    }

    let Some(host) = Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_owned)) else {
        return LocalityVerdict::fail_closed();
    };

    let locality = if is_private_host(&host) {
        Locality::Internal
    } else {
        Locality::External
    };
    LocalityVerdict::new(locality, Basis::HostnamePattern)
}

/// Convenience wrapper around [`classify`].
#[inline]
pub fn is_internal_url(url: &str) -> bool {
    classify(url).is_internal()
}

/// Classify a socket-level address with the same rule table.
///
/// IPv6 loopback is treated as internal; IPv4-mapped IPv6 addresses are
/// classified by their IPv4 form.
pub fn classify_ip(addr: IpAddr) -> Locality {
    let private = match addr {
        IpAddr::V4(v4) => is_private_host(&v4.to_string()),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_private_host(&v4.to_string()),
            None => v6.is_loopback(),
        },
    };
    if private {
        Locality::Internal
    } else {
        Locality::External
    }
}

// =============================================================================
// Client network inference
// =============================================================================

/// Physical medium hint reported by the client, when it has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMedium {
    Wifi,
    Ethernet,
    Cellular,
    #[default]
    Unknown,
}

impl ConnectionMedium {
    /// Parse the `type`/`effectiveType` strings browsers report.
    pub fn from_hint(hint: &str) -> Self {
        match hint.trim().to_ascii_lowercase().as_str() {
            "wifi" | "wlan" => Self::Wifi,
            "ethernet" | "wired" => Self::Ethernet,
            "cellular" | "2g" | "3g" | "4g" | "5g" | "slow-2g" => Self::Cellular,
            _ => Self::Unknown,
        }
    }
}

/// Signals gathered by a same-origin round trip.
#[derive(Debug, Clone, Default)]
pub struct ClientSignals {
    /// The minimal same-origin endpoint answered.
    pub round_trip_ok: bool,
    /// Address the application saw the client connect from.
    pub client_addr: Option<IpAddr>,
    /// Connection medium reported by the client.
    pub medium: ConnectionMedium,
}

/// Decide whether the calling client is itself on a private network.
///
/// Internal only when the round trip succeeded, the apparent address is
/// private, and the medium does not contradict it. This is a network-layer
/// inference and may disagree with [`classify`] on the app's own origin.
pub fn classify_client_network(signals: &ClientSignals) -> LocalityVerdict {
    let address_private = signals
        .client_addr
        .is_some_and(|addr| classify_ip(addr) == Locality::Internal);
    let medium_agrees = signals.medium != ConnectionMedium::Cellular;

    let locality = if signals.round_trip_ok && address_private && medium_agrees {
        Locality::Internal
    } else {
        Locality::External
    };
    LocalityVerdict::new(locality, Basis::NetworkProbe)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_private_hosts() {
        for url in [
            "http://10.0.0.1",
            "http://192.168.1.1:8080/admin",
            "http://172.16.0.1",
            "http://172.20.10.4",
            "http://172.31.255.255",
            "http://localhost:3000",
            "http://127.0.0.1",
            "http://nas.local",
            "https://router.lan/",
            "http://NAS.LOCAL",
        ] {
            assert_eq!(classify(url).locality, Locality::Internal, "{url}");
        }
    }

    #[test]
    fn test_public_hosts() {
        for url in [
            "http://172.15.255.255",
            "http://172.32.0.0",
            "http://172.1.2.3",
            "https://8.8.8.8",
            "https://example.com",
            "https://localhost.example.com",
            "https://lan.example.com",
            "https://github.com",
        ] {
            assert_eq!(classify(url).locality, Locality::External, "{url}");
        }
    }

    #[test]
    fn test_fail_closed() {
        for input in ["", "   ", "not a url", "http://", "://missing-scheme"] {
            let verdict = classify(input);
            assert_eq!(verdict.locality, Locality::External, "{input:?}");
            assert_eq!(verdict.basis, Basis::Unparseable, "{input:?}");
        }
    }

    #[test]
    fn test_deterministic() {
        let url = "http://192.168.50.2:5000/";
        assert_eq!(classify(url), classify(url));
        assert_eq!(classify(url).basis, Basis::HostnamePattern);
    }

    #[test]
    fn test_second_octet_rule_needs_dot() {
        assert!(!is_private_host("172.16"));
        assert!(!is_private_host("172.160.0.1"));
        assert!(is_private_host("172.16.0.1"));
    }

    #[test]
    fn test_bare_hosts() {
        assert!(is_private_host("localhost"));
        assert!(is_private_host("printer.lan."));
        assert!(!is_private_host("8.8.8.8"));
        assert!(!is_private_host(""));
    }

    #[test]
    fn test_classify_ip() {
        assert_eq!(
            classify_ip(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20))),
            Locality::Internal
        );
        assert_eq!(classify_ip(IpAddr::V6(Ipv6Addr::LOCALHOST)), Locality::Internal);
        assert_eq!(
            classify_ip(IpAddr::V6(Ipv4Addr::new(10, 1, 1, 1).to_ipv6_mapped())),
            Locality::Internal
        );
        assert_eq!(
            classify_ip(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1))),
            Locality::External
        );
    }

    #[test]
    fn test_client_network_requires_all_signals() {
        let lan = IpAddr::V4(Ipv4Addr::new(192, 168, 0, 7));

        let ok = ClientSignals {
            round_trip_ok: true,
            client_addr: Some(lan),
            medium: ConnectionMedium::Wifi,
        };
        let verdict = classify_client_network(&ok);
        assert!(verdict.is_internal());
        assert_eq!(verdict.basis, Basis::NetworkProbe);

        let no_trip = ClientSignals {
            round_trip_ok: false,
            ..ok.clone()
        };
        assert!(!classify_client_network(&no_trip).is_internal());

        let cellular = ClientSignals {
            medium: ConnectionMedium::Cellular,
            ..ok.clone()
        };
        assert!(!classify_client_network(&cellular).is_internal());

        let public = ClientSignals {
            client_addr: Some(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 9))),
            ..ok
        };
        assert!(!classify_client_network(&public).is_internal());
    }

    #[test]
    fn test_medium_hints() {
        assert_eq!(ConnectionMedium::from_hint("WiFi"), ConnectionMedium::Wifi);
        assert_eq!(ConnectionMedium::from_hint("4g"), ConnectionMedium::Cellular);
        assert_eq!(ConnectionMedium::from_hint("bluetooth"), ConnectionMedium::Unknown);
    }
}
