//! Strategy trait and the ordered driver.
//!
//! A strategy is one way of obtaining an icon for an external page. The
//! resolver owns an ordered `Vec<Box<dyn IconStrategy>>`; [`run_chain`]
//! tries each under its own timeout and stops at the first success.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::core::IconResult;
use crate::debug;
use crate::fetch::{FetchError, Fetched, ServerSideFetch};
use crate::utils::mime;

/// Why a single step produced nothing. Never surfaced to callers.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("response is not an image")]
    NotAnImage,

    #[error("no icon link in page")]
    NoIconLink,

    #[error("cannot build request url: {0}")]
    InvalidUrl(String),
}

impl From<url::ParseError> for StepError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

/// Inputs shared by every step of one resolution.
pub struct StepContext<'a> {
    /// Effective URL of the link.
    pub url: &'a Url,
    /// Hostname, else title, else `?`; seeds the placeholder.
    pub label: &'a str,
    pub fetch: &'a dyn ServerSideFetch,
    pub max_icon_bytes: usize,
}

impl StepContext<'_> {
    /// Scheme, host and port of the effective URL.
    pub fn origin(&self) -> Url {
        let mut origin = self.url.clone();
        origin.set_path("/");
        origin.set_query(None);
        origin.set_fragment(None);
        origin
    }

    /// Turn a fetched body into a data URI when it is a plausible image.
    pub fn into_icon(&self, fetched: Fetched) -> Result<IconResult, StepError> {
        if fetched.body.len() > self.max_icon_bytes {
            return Err(FetchError::TooLarge(self.max_icon_bytes).into());
        }
        let mime = mime::image_mime(fetched.content_type.as_deref(), &fetched.body)
            .ok_or(StepError::NotAnImage)?;
        Ok(IconResult::from_bytes(&mime, &fetched.body))
    }
}

#[async_trait]
pub trait IconStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Bound for this step; `None` for steps that do no I/O.
    fn timeout(&self) -> Option<Duration>;

    /// Whether a success may be kept in the process cache.
    fn cacheable(&self) -> bool {
        true
    }

    async fn attempt(&self, ctx: &StepContext<'_>) -> Result<IconResult, StepError>;
}

/// Outcome of the first successful step.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub icon: IconResult,
    pub step: String,
    pub cacheable: bool,
}

/// Try `strategies` in order, each under its own timeout.
///
/// Every failure (network error, non-2xx, timeout, undecodable body)
/// advances to the next step. Total latency is bounded by the sum of the
/// step timeouts.
pub async fn run_chain(
    strategies: &[Box<dyn IconStrategy>],
    ctx: &StepContext<'_>,
) -> Option<Resolved> {
    for strategy in strategies {
        let attempt = strategy.attempt(ctx);
        let result = match strategy.timeout() {
            Some(limit) => tokio::time::timeout(limit, attempt)
                .await
                .unwrap_or(Err(StepError::Timeout(limit))),
            None => attempt.await,
        };

        match result {
            Ok(icon) => {
                return Some(Resolved {
                    icon,
                    step: strategy.name().to_string(),
                    cacheable: strategy.cacheable(),
                });
            }
            Err(e) => debug!("resolve"; "{} {}: {}", ctx.url, strategy.name(), e),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::{ScriptedFetch, png_bytes};

    struct Fixed(&'static str, Result<&'static str, ()>);

    #[async_trait]
    impl IconStrategy for Fixed {
        fn name(&self) -> &str {
            self.0
        }
        fn timeout(&self) -> Option<Duration> {
            None
        }
        async fn attempt(&self, _ctx: &StepContext<'_>) -> Result<IconResult, StepError> {
            self.1
                .map(IconResult::remote_url)
                .map_err(|()| StepError::NoIconLink)
        }
    }

    struct Slow;

    #[async_trait]
    impl IconStrategy for Slow {
        fn name(&self) -> &str {
            "slow"
        }
        fn timeout(&self) -> Option<Duration> {
            Some(Duration::from_millis(10))
        }
        async fn attempt(&self, _ctx: &StepContext<'_>) -> Result<IconResult, StepError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(IconResult::remote_url("never"))
        }
    }

    fn ctx<'a>(url: &'a Url, fetch: &'a ScriptedFetch) -> StepContext<'a> {
        StepContext {
            url,
            label: "example.com",
            fetch,
            max_icon_bytes: 1024,
        }
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let url = Url::parse("https://example.com/page").unwrap();
        let fetch = ScriptedFetch::new();
        let chain: Vec<Box<dyn IconStrategy>> = vec![
            Box::new(Fixed("a", Err(()))),
            Box::new(Slow),
            Box::new(Fixed("b", Ok("https://example.com/b.png"))),
            Box::new(Fixed("c", Ok("https://example.com/c.png"))),
        ];

        let resolved = run_chain(&chain, &ctx(&url, &fetch)).await.unwrap();
        assert_eq!(resolved.step, "b");
        assert_eq!(resolved.icon, IconResult::remote_url("https://example.com/b.png"));
    }

    #[tokio::test]
    async fn test_all_fail() {
        let url = Url::parse("https://example.com").unwrap();
        let fetch = ScriptedFetch::new();
        let chain: Vec<Box<dyn IconStrategy>> = vec![Box::new(Fixed("a", Err(()))), Box::new(Slow)];
        assert!(run_chain(&chain, &ctx(&url, &fetch)).await.is_none());
    }

    #[tokio::test]
    async fn test_into_icon() {
        let url = Url::parse("https://example.com/x?y=1#z").unwrap();
        let fetch = ScriptedFetch::new();
        let ctx = ctx(&url, &fetch);
        assert_eq!(ctx.origin().as_str(), "https://example.com/");

        let png = Fetched {
            url: url.clone(),
            status: 200,
            content_type: Some("application/octet-stream".into()),
            body: png_bytes(),
        };
        assert_eq!(ctx.into_icon(png).unwrap().kind(), "dataUri");

        let soft_404 = Fetched {
            url: url.clone(),
            status: 200,
            content_type: Some("text/html".into()),
            body: b"<!doctype html><p>not found".to_vec(),
        };
        assert!(matches!(ctx.into_icon(soft_404), Err(StepError::NotAnImage)));

        let big = Fetched {
            url: url.clone(),
            status: 200,
            content_type: Some("image/png".into()),
            body: vec![0; 2048],
        };
        assert!(matches!(
            ctx.into_icon(big),
            Err(StepError::Fetch(FetchError::TooLarge(1024)))
        ));
    }
}
