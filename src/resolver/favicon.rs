//! Conventional favicon locations at the page origin.

use std::time::Duration;

use async_trait::async_trait;

use super::strategy::{IconStrategy, StepContext, StepError};
use crate::core::IconResult;
use crate::fetch::Accept;

/// Probed in this order, one step each.
pub const WELL_KNOWN_PATHS: [&str; 4] = [
    "/favicon.ico",
    "/favicon.png",
    "/apple-touch-icon.png",
    "/apple-touch-icon-precomposed.png",
];

pub struct WellKnownPath {
    path: &'static str,
    timeout: Duration,
}

impl WellKnownPath {
    pub const fn new(path: &'static str, timeout: Duration) -> Self {
        Self { path, timeout }
    }

    /// One step per entry of [`WELL_KNOWN_PATHS`].
    pub fn all(timeout: Duration) -> impl Iterator<Item = Self> {
        WELL_KNOWN_PATHS
            .into_iter()
            .map(move |path| Self::new(path, timeout))
    }
}

#[async_trait]
impl IconStrategy for WellKnownPath {
    fn name(&self) -> &str {
        self.path
    }

    fn timeout(&self) -> Option<Duration> {
        Some(self.timeout)
    }

    async fn attempt(&self, ctx: &StepContext<'_>) -> Result<IconResult, StepError> {
        let url = ctx.origin().join(self.path)?;
        let fetched = ctx.fetch.get(&url, Accept::Image).await?;
        ctx.into_icon(fetched)
    }
}
