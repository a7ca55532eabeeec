//! Client network inference.
//!
//! The service half reports the address a request appears to come from
//! (`/api/network-test`). The client half ([`NetworkTester`]) calls that
//! endpoint on the application's own origin and turns the answer into
//! [`ClientSignals`] for [`classify_client_network`].

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::ProbeError;
use crate::core::{
    ClientSignals, ConnectionMedium, Envelope, Locality, LocalityVerdict, classify_client_network,
    classify_ip,
};
use crate::debug;
use crate::fetch::{Accept, ServerSideFetch};

/// Same-origin endpoint answering the round trip.
pub const NETWORK_TEST_PATH: &str = "/api/network-test";

/// Address the client appears to connect from.
///
/// Proxy headers win over the socket peer: `X-Real-IP`, then the first hop
/// of `X-Forwarded-For`.
pub fn client_address(
    real_ip: Option<&str>,
    forwarded_for: Option<&str>,
    peer: Option<IpAddr>,
) -> Option<IpAddr> {
    let parse = |raw: &str| raw.trim().parse::<IpAddr>().ok();

    real_ip
        .and_then(parse)
        .or_else(|| forwarded_for.and_then(|list| list.split(',').next()).and_then(parse))
        .or(peer)
}

/// Body of `/api/network-test`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkReport {
    /// Apparent client address, or `unknown`.
    pub client_ip: String,
    pub is_private_network: bool,
}

impl NetworkReport {
    pub fn new(addr: Option<IpAddr>) -> Self {
        Self {
            client_ip: addr.map_or_else(|| "unknown".to_string(), |a| a.to_string()),
            is_private_network: addr.is_some_and(|a| classify_ip(a) == Locality::Internal),
        }
    }
}

/// Runs the same-origin round trip against a running service.
pub struct NetworkTester {
    fetch: Arc<dyn ServerSideFetch>,
    timeout: Duration,
}

impl NetworkTester {
    pub fn new(fetch: Arc<dyn ServerSideFetch>, timeout: Duration) -> Self {
        Self { fetch, timeout }
    }

    /// Gather signals from `origin` and classify the calling machine.
    pub async fn test(
        &self,
        origin: &str,
        medium: ConnectionMedium,
    ) -> Result<(LocalityVerdict, ClientSignals), ProbeError> {
        let endpoint = Url::parse(origin)
            .and_then(|base| base.join(NETWORK_TEST_PATH))
            .map_err(|_| ProbeError::InvalidUrl(origin.to_string()))?;

        let round_trip_ok = matches!(
            tokio::time::timeout(self.timeout, self.fetch.head(&endpoint)).await,
            Ok(Ok(code)) if (200..300).contains(&code)
        );

        let client_addr = if round_trip_ok {
            self.report(&endpoint)
                .await
                .and_then(|report| report.client_ip.parse().ok())
        } else {
            debug!("probe"; "round trip to {} failed", endpoint);
            None
        };

        let signals = ClientSignals {
            round_trip_ok,
            client_addr,
            medium,
        };
        Ok((classify_client_network(&signals), signals))
    }

    async fn report(&self, endpoint: &Url) -> Option<NetworkReport> {
        let fetched = tokio::time::timeout(self.timeout, self.fetch.get(endpoint, Accept::Json))
            .await
            .ok()?
            .ok()?;

        match serde_json::from_slice::<Envelope<NetworkReport>>(&fetched.body) {
            Ok(envelope) => envelope.into_data(),
            Err(e) => {
                debug!("probe"; "unexpected network-test body: {}", e);
                None
            }
        }
    }
}
