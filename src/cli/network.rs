//! `linkicon probe` and `linkicon network`.

use anyhow::Result;

use super::common::{build_runtime, http_fetcher};
use crate::config::LinkiconConfig;
use crate::core::{ConnectionMedium, Locality, Reachability, ReachabilityVerdict};
use crate::logger::{outcome_ok, outcome_warn};
use crate::probe::{NetworkTester, ReachabilityProber};

/// Probe a private host (or internal URL) once.
pub fn run_probe(target: &str, config: &LinkiconConfig) -> Result<()> {
    let runtime = build_runtime()?;
    let prober = ReachabilityProber::new(http_fetcher(config)?, &config.probe);

    let verdict = runtime.block_on(prober.probe_reachability(target))?;
    report_verdict(target, &verdict);
    Ok(())
}

fn report_verdict(target: &str, verdict: &ReachabilityVerdict) {
    match (verdict.status, verdict.status_code) {
        (Reachability::Reachable, Some(code)) => outcome_ok(&format!("{target} reachable ({code})")),
        (Reachability::Reachable, None) => outcome_ok(&format!("{target} reachable")),
        (Reachability::Unreachable, _) => outcome_warn(&format!("{target} may be unreachable")),
        (Reachability::Unknown, _) => outcome_warn(&format!("{target} not checked")),
    }
}

/// Classify this machine's network by a round trip to a running service.
pub fn run_network(origin: &str, medium: Option<&str>, config: &LinkiconConfig) -> Result<()> {
    let runtime = build_runtime()?;
    let tester = NetworkTester::new(http_fetcher(config)?, config.probe.timeout());
    let medium = medium.map_or(ConnectionMedium::Unknown, ConnectionMedium::from_hint);

    let (verdict, signals) = runtime.block_on(tester.test(origin, medium))?;

    let seen_as = signals
        .client_addr
        .map_or_else(|| "unknown".to_string(), |addr| addr.to_string());
    match (signals.round_trip_ok, verdict.locality) {
        (false, _) => outcome_warn(&format!("{origin} did not answer; assuming external")),
        (true, Locality::Internal) => outcome_ok(&format!("internal network (seen as {seen_as})")),
        (true, Locality::External) => outcome_ok(&format!("external network (seen as {seen_as})")),
    }
    Ok(())
}
