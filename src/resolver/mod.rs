//! Icon resolution.
//!
//! # Flow
//!
//! ```text
//! stored icon? ──yes──▶ returned verbatim
//!      │no
//! effective URL (prefer_internal) ──▶ classify
//!      │internal                         │external
//!      ▼                                 ▼
//! client capture or network icon     cache ─▶ strategy chain
//!                                       favicon paths ▸ html ▸ aggregator ▸ placeholder
//! ```
//!
//! Resolution never fails. Internal URLs are never fetched from here; the
//! only icon for them besides the static network icon is one captured by a
//! browser inside the network.

mod aggregator;
mod cache;
mod favicon;
mod html;
pub mod placeholder;
mod strategy;

pub use aggregator::Aggregator;
pub use cache::IconCache;
pub use favicon::{WELL_KNOWN_PATHS, WellKnownPath};
pub use html::HtmlLinkScan;
pub use placeholder::Placeholder;
pub use strategy::{IconStrategy, Resolved, StepContext, StepError, run_chain};

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::config::ResolverConfig;
use crate::core::{IconResult, LinkAddress, classify};
use crate::debug;
use crate::fetch::{ClientSideCapture, ServerSideFetch, validate_image_data};

/// One icon request.
#[derive(Clone, Default)]
pub struct IconRequest<'a> {
    pub address: LinkAddress,
    pub stored_icon: Option<String>,
    pub prefer_internal: bool,
    pub title: Option<String>,
    pub capture: Option<&'a dyn ClientSideCapture>,
}

impl<'a> IconRequest<'a> {
    pub fn new(address: LinkAddress) -> Self {
        Self {
            address,
            ..Default::default()
        }
    }

    pub fn stored_icon(mut self, stored: Option<&str>) -> Self {
        self.stored_icon = stored.map(str::to_owned);
        self
    }

    pub fn prefer_internal(mut self, prefer: bool) -> Self {
        self.prefer_internal = prefer;
        self
    }

    pub fn title(mut self, title: Option<&str>) -> Self {
        self.title = title.map(str::to_owned);
        self
    }

    pub fn capture(mut self, capture: &'a dyn ClientSideCapture) -> Self {
        self.capture = Some(capture);
        self
    }

    /// Hostname of `url`, else title, else `?`.
    fn label(&self, url: Option<&Url>) -> String {
        url.and_then(Url::host_str)
            .map(str::to_owned)
            .or_else(|| {
                self.title
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_owned)
            })
            .unwrap_or_else(|| placeholder::FALLBACK_LABEL.to_string())
    }
}

/// A resolved icon and whether it may outlive the request.
///
/// Only icons found by a cacheable strategy or captured inside the network
/// are durable. Stored icons, the network icon and placeholders are not:
/// the first is already persisted, the others depend on the preference or
/// on a transient failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub icon: IconResult,
    pub durable: bool,
}

impl Resolution {
    const fn durable(icon: IconResult) -> Self {
        Self { icon, durable: true }
    }

    const fn transient(icon: IconResult) -> Self {
        Self {
            icon,
            durable: false,
        }
    }
}

/// Tunables taken from `[resolver]`.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub network_icon: String,
    pub max_icon_bytes: usize,
    pub favicon_timeout: Duration,
    pub html_timeout: Duration,
    pub aggregator_timeout: Duration,
    pub aggregator: String,
    pub cache: bool,
}

impl From<&ResolverConfig> for ResolverSettings {
    fn from(config: &ResolverConfig) -> Self {
        Self {
            network_icon: config.network_icon.clone(),
            max_icon_bytes: config.max_icon_bytes,
            favicon_timeout: config.favicon_timeout(),
            html_timeout: config.html_timeout(),
            aggregator_timeout: config.aggregator_timeout(),
            aggregator: config.aggregator.clone(),
            cache: config.cache,
        }
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self::from(&ResolverConfig::default())
    }
}

pub struct IconResolver {
    fetch: Arc<dyn ServerSideFetch>,
    settings: ResolverSettings,
    strategies: Vec<Box<dyn IconStrategy>>,
    aggregator: Aggregator,
    cache: IconCache,
}

impl IconResolver {
    pub fn new(fetch: Arc<dyn ServerSideFetch>, settings: ResolverSettings) -> Self {
        let strategies = Self::default_strategies(&settings);
        Self::with_strategies(fetch, settings, strategies)
    }

    pub fn with_strategies(
        fetch: Arc<dyn ServerSideFetch>,
        settings: ResolverSettings,
        strategies: Vec<Box<dyn IconStrategy>>,
    ) -> Self {
        Self {
            fetch,
            aggregator: Aggregator::new(&settings.aggregator, settings.aggregator_timeout),
            cache: IconCache::new(settings.cache),
            settings,
            strategies,
        }
    }

    /// Well-known paths, HTML scan, aggregator, placeholder.
    pub fn default_strategies(settings: &ResolverSettings) -> Vec<Box<dyn IconStrategy>> {
        let mut steps: Vec<Box<dyn IconStrategy>> = WellKnownPath::all(settings.favicon_timeout)
            .map(|s| Box::new(s) as Box<dyn IconStrategy>)
            .collect();
        steps.push(Box::new(HtmlLinkScan::new(settings.html_timeout)));
        steps.push(Box::new(Aggregator::new(
            &settings.aggregator,
            settings.aggregator_timeout,
        )));
        steps.push(Box::new(Placeholder));
        steps
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub fn cache(&self) -> &IconCache {
        &self.cache
    }

    /// Resolve without title or capture.
    pub async fn resolve_icon(
        &self,
        address: &LinkAddress,
        stored_icon: Option<&str>,
        prefer_internal: bool,
    ) -> IconResult {
        let request = IconRequest::new(address.clone())
            .stored_icon(stored_icon)
            .prefer_internal(prefer_internal);
        self.resolve(&request).await
    }

    pub async fn resolve(&self, request: &IconRequest<'_>) -> IconResult {
        self.resolution(request).await.icon
    }

    /// Like [`resolve`](Self::resolve), also reporting durability.
    pub async fn resolution(&self, request: &IconRequest<'_>) -> Resolution {
        if let Some(icon) = request.stored_icon.as_deref().and_then(IconResult::from_stored) {
            return Resolution::transient(icon);
        }

        let Some(effective) = request.address.effective_url(request.prefer_internal) else {
            return Resolution::transient(placeholder::badge(&request.label(None)));
        };

        if classify(effective).is_internal() {
            return self.internal_icon(effective, request.capture);
        }

        let Ok(url) = Url::parse(effective) else {
            return Resolution::transient(placeholder::badge(&request.label(None)));
        };
        let label = request.label(Some(&url));

        match self
            .cache
            .get_or_resolve(url.as_str(), || self.run_strategies(&url, &label))
            .await
        {
            Ok(icon) => Resolution::durable(icon),
            Err(icon) => Resolution::transient(icon),
        }
    }

    /// Captured icon when the client supplied a valid one, else the network icon.
    fn internal_icon(&self, url: &str, capture: Option<&dyn ClientSideCapture>) -> Resolution {
        let captured = capture
            .and_then(|c| c.captured_icon(url))
            .map(|payload| validate_image_data(&payload, self.settings.max_icon_bytes));

        match captured {
            Some(Ok(icon)) => Resolution::durable(icon),
            Some(Err(e)) => {
                debug!("resolve"; "{}: rejected captured icon: {}", url, e);
                Resolution::transient(IconResult::static_path(&self.settings.network_icon))
            }
            None => Resolution::transient(IconResult::static_path(&self.settings.network_icon)),
        }
    }

    async fn run_strategies(&self, url: &Url, label: &str) -> Result<IconResult, IconResult> {
        let ctx = StepContext {
            url,
            label,
            fetch: self.fetch.as_ref(),
            max_icon_bytes: self.settings.max_icon_bytes,
        };

        match run_chain(&self.strategies, &ctx).await {
            Some(resolved) => {
                debug!("resolve"; "{} via {}", url, resolved.step);
                if resolved.cacheable {
                    Ok(resolved.icon)
                } else {
                    Err(resolved.icon)
                }
            }
            None => Err(placeholder::badge(label)),
        }
    }

    /// Fetch the aggregator icon for the host of `url` directly.
    pub async fn proxy_icon(&self, url: &str) -> Result<IconResult, StepError> {
        let url = Url::parse(url)?;
        let label = url.host_str().unwrap_or(placeholder::FALLBACK_LABEL).to_string();
        let ctx = StepContext {
            url: &url,
            label: &label,
            fetch: self.fetch.as_ref(),
            max_icon_bytes: self.settings.max_icon_bytes,
        };

        let limit = self.settings.aggregator_timeout;
        tokio::time::timeout(limit, self.aggregator.attempt(&ctx))
            .await
            .unwrap_or(Err(StepError::Timeout(limit)))
    }
}
