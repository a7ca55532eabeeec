//! Third-party favicon service keyed by hostname.

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

use super::strategy::{IconStrategy, StepContext, StepError};
use crate::config::section::HOST_PLACEHOLDER;
use crate::core::IconResult;
use crate::fetch::Accept;

/// Hostname characters that stay literal.
const HOST_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'-');

pub struct Aggregator {
    template: String,
    timeout: Duration,
}

impl Aggregator {
    pub fn new(template: impl Into<String>, timeout: Duration) -> Self {
        Self {
            template: template.into(),
            timeout,
        }
    }

    /// Service URL for `host`.
    pub fn endpoint(&self, host: &str) -> Result<Url, StepError> {
        let host = utf8_percent_encode(host, HOST_SET).to_string();
        Ok(Url::parse(&self.template.replace(HOST_PLACEHOLDER, &host))?)
    }
}

#[async_trait]
impl IconStrategy for Aggregator {
    fn name(&self) -> &str {
        "aggregator"
    }

    fn timeout(&self) -> Option<Duration> {
        Some(self.timeout)
    }

    async fn attempt(&self, ctx: &StepContext<'_>) -> Result<IconResult, StepError> {
        let host = ctx
            .url
            .host_str()
            .ok_or_else(|| StepError::InvalidUrl(ctx.url.to_string()))?;
        let fetched = ctx.fetch.get(&self.endpoint(host)?, Accept::Image).await?;
        ctx.into_icon(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::{Script, ScriptedFetch, png_bytes};

    const TEMPLATE: &str = "https://www.google.com/s2/favicons?domain={host}&sz=64";

    #[test]
    fn test_endpoint() {
        let agg = Aggregator::new(TEMPLATE, Duration::from_secs(1));
        assert_eq!(
            agg.endpoint("docs.rs").unwrap().as_str(),
            "https://www.google.com/s2/favicons?domain=docs.rs&sz=64"
        );
        assert_eq!(
            agg.endpoint("a&b").unwrap().as_str(),
            "https://www.google.com/s2/favicons?domain=a%26b&sz=64"
        );
    }

    #[tokio::test]
    async fn test_attempt_uses_hostname_only() {
        let fetch = ScriptedFetch::new().on(
            "https://www.google.com/s2/favicons?domain=github.com&sz=64",
            Script::Ok {
                content_type: "image/png",
                body: png_bytes(),
            },
        );
        let url = Url::parse("https://github.com/rust-lang/rust?tab=readme").unwrap();
        let ctx = StepContext {
            url: &url,
            label: "github.com",
            fetch: &fetch,
            max_icon_bytes: 4096,
        };

        let icon = Aggregator::new(TEMPLATE, Duration::from_secs(1))
            .attempt(&ctx)
            .await
            .unwrap();
        assert!(icon.to_string().starts_with("data:image/png;base64,"));
    }
}
