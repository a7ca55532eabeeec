//! Reachability probing.
//!
//! Answers "does this private-network host answer right now?" with a single
//! time-bounded HEAD request. Verdicts are advisory and never gate anything.
//!
//! Targets coming from untrusted input go through the same private-host rule
//! table as the locality classifier; everything else is refused with
//! [`ProbeError::Disallowed`] so the prober cannot be pointed at the public
//! internet.

mod client;

pub use client::{NetworkReport, NetworkTester, client_address};

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use thiserror::Error;
use url::Url;

use crate::config::ProbeConfig;
use crate::core::{ReachabilityVerdict, is_internal_url, is_private_host};
use crate::debug;
use crate::fetch::ServerSideFetch;

/// Dotted IPv4 literal, probed over plain http.
static IPV4_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(\.\d{1,3}){3}$").unwrap());

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("target is required")]
    MissingTarget,

    #[error("invalid target `{0}`: only local network targets are allowed")]
    Disallowed(String),

    #[error("invalid url `{0}`")]
    InvalidUrl(String),
}

pub struct ReachabilityProber {
    fetch: Arc<dyn ServerSideFetch>,
    enable: bool,
    timeout: Duration,
}

impl ReachabilityProber {
    pub fn new(fetch: Arc<dyn ServerSideFetch>, config: &ProbeConfig) -> Self {
        Self {
            fetch,
            enable: config.enable,
            timeout: config.timeout(),
        }
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe a link URL.
    ///
    /// External URLs are reported reachable without a request. Input without a
    /// scheme and host is treated as a bare target and goes through
    /// [`probe_target`](Self::probe_target).
    pub async fn probe_reachability(&self, url: &str) -> Result<ReachabilityVerdict, ProbeError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ProbeError::MissingTarget);
        }

        let parsed = match Url::parse(url) {
            Ok(parsed) if parsed.host_str().is_some() => parsed,
            _ => return self.probe_target(url).await,
        };

        if !is_internal_url(url) {
            return Ok(ReachabilityVerdict::reachable(None));
        }
        Ok(self.head(&parsed).await)
    }

    /// Probe a bare `host` or `host:port` taken from untrusted input.
    pub async fn probe_target(&self, target: &str) -> Result<ReachabilityVerdict, ProbeError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(ProbeError::MissingTarget);
        }

        let host = target_host(target);
        if target.contains('@') || !is_private_host(host) {
            debug!("probe"; "refused {}", target);
            return Err(ProbeError::Disallowed(target.to_string()));
        }

        let scheme = target_scheme(host);
        let url = match Url::parse(&format!("{scheme}://{target}")) {
            Ok(url) => url,
            Err(_) => {
                debug!("probe"; "cannot build a request for {}", target);
                return Ok(ReachabilityVerdict::unknown());
            }
        };

        // The host actually contacted must pass the rule table as well.
        if !contacts_private_host(&url) {
            debug!("probe"; "refused {} (resolves to {:?})", target, url.host_str());
            return Err(ProbeError::Disallowed(target.to_string()));
        }
        Ok(self.head(&url).await)
    }

    async fn head(&self, url: &Url) -> ReachabilityVerdict {
        if !self.enable {
            return ReachabilityVerdict::unknown();
        }

        match tokio::time::timeout(self.timeout, self.fetch.head(url)).await {
            Ok(Ok(code)) => {
                debug!("probe"; "{} answered {}", url, code);
                ReachabilityVerdict::reachable(Some(code))
            }
            Ok(Err(e)) => {
                debug!("probe"; "{} failed: {}", url, e);
                ReachabilityVerdict::unreachable()
            }
            Err(_) => {
                debug!("probe"; "{} timed out after {:?}", url, self.timeout);
                ReachabilityVerdict::unreachable()
            }
        }
    }
}

/// Host part of a `host[:port][/path]` target.
fn target_host(target: &str) -> &str {
    let authority = target.split(['/', '?', '#']).next().unwrap_or(target);

    if let Some(rest) = authority.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    match authority.rsplit_once(':') {
        Some((host, port)) if port.bytes().all(|b| b.is_ascii_digit()) => host,
        _ => authority,
    }
}

/// No credentials, and the parsed host is on the private rule table.
fn contacts_private_host(url: &Url) -> bool {
    url.username().is_empty()
        && url.password().is_none()
        && url.host_str().is_some_and(is_private_host)
}

fn target_scheme(host: &str) -> &'static str {
    if host.eq_ignore_ascii_case("localhost") || IPV4_LITERAL.is_match(host) {
        "http"
    } else {
        "https"
    }
}
