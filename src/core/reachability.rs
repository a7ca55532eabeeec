//! Advisory reachability verdicts.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reachability {
    Reachable,
    Unreachable,
    /// Probe in flight, disabled, or not meaningful from this vantage point.
    Unknown,
}

/// Short-lived verdict used only to annotate UI state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReachabilityVerdict {
    pub status: Reachability,
    /// Unix time in milliseconds.
    pub checked_at: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl ReachabilityVerdict {
    pub fn new(status: Reachability) -> Self {
        Self {
            status,
            checked_at: now_millis(),
            status_code: None,
        }
    }

    pub fn reachable(status_code: Option<u16>) -> Self {
        Self {
            status_code,
            ..Self::new(Reachability::Reachable)
        }
    }

    pub fn unreachable() -> Self {
        Self::new(Reachability::Unreachable)
    }

    pub fn unknown() -> Self {
        Self::new(Reachability::Unknown)
    }

    /// Whether the UI should show "may be unreachable".
    #[inline]
    pub fn needs_hint(&self) -> bool {
        self.status == Reachability::Unreachable
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_json() {
        let verdict = ReachabilityVerdict::reachable(Some(204));
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["status"], "reachable");
        assert_eq!(json["statusCode"], 204);
        assert!(json["checkedAt"].as_u64().unwrap() > 0);

        let json = serde_json::to_value(ReachabilityVerdict::unknown()).unwrap();
        assert!(json.get("statusCode").is_none());
    }

    #[test]
    fn test_only_unreachable_needs_hint() {
        assert!(ReachabilityVerdict::unreachable().needs_hint());
        assert!(!ReachabilityVerdict::unknown().needs_hint());
        assert!(!ReachabilityVerdict::reachable(None).needs_hint());
    }
}
