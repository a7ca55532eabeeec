//! `<link rel="icon">` discovery in the page HTML.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use url::Url;

use super::strategy::{IconStrategy, StepContext, StepError};
use crate::core::IconResult;
use crate::debug;
use crate::fetch::{Accept, FetchError};

/// `rel` values recognized as icons, best first.
const ICON_RELS: [&[&str]; 4] = [
    &["icon"],
    &["shortcut", "icon"],
    &["apple-touch-icon"],
    &["apple-touch-icon-precomposed"],
];

pub struct HtmlLinkScan {
    timeout: Duration,
}

impl HtmlLinkScan {
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl IconStrategy for HtmlLinkScan {
    fn name(&self) -> &str {
        "html"
    }

    fn timeout(&self) -> Option<Duration> {
        Some(self.timeout)
    }

    async fn attempt(&self, ctx: &StepContext<'_>) -> Result<IconResult, StepError> {
        // Leave room to fall back to the bare href when the icon body stalls.
        let icon_deadline = Instant::now() + self.timeout.mul_f32(0.9);

        let page = ctx.fetch.get(ctx.url, Accept::Html).await?;
        let href = find_icon_href(&page.text()).ok_or(StepError::NoIconLink)?;

        if href.starts_with("data:") {
            return IconResult::from_stored(&href).ok_or(StepError::NotAnImage);
        }

        let icon_url = resolve_href(&page.url, &href)
            .ok_or_else(|| StepError::InvalidUrl(href.clone()))?;
        if !matches!(icon_url.scheme(), "http" | "https") {
            return Err(StepError::InvalidUrl(icon_url.to_string()));
        }

        let fetched = tokio::time::timeout_at(icon_deadline, ctx.fetch.get(&icon_url, Accept::Image)).await;
        match fetched {
            Ok(Ok(fetched)) => ctx.into_icon(fetched),
            // The server answered: the href is broken, not slow.
            Ok(Err(e @ FetchError::Status(_))) => Err(e.into()),
            Ok(Err(e)) => {
                debug!("resolve"; "{} icon bytes unavailable ({}), using href", icon_url, e);
                Ok(IconResult::remote_url(icon_url))
            }
            Err(_) => {
                debug!("resolve"; "{} icon bytes timed out, using href", icon_url);
                Ok(IconResult::remote_url(icon_url))
            }
        }
    }
}

/// Pick the best icon `href` from `<link>` elements.
///
/// Ties on rank go to the earliest element in the document.
pub fn find_icon_href(html: &str) -> Option<String> {
    let dom = tl::parse(html, tl::ParserOptions::default()).ok()?;
    let parser = dom.parser();

    dom.query_selector("link")?
        .filter_map(|handle| handle.get(parser)?.as_tag())
        .filter_map(|tag| {
            let attrs = tag.attributes();
            let rel = attrs.get("rel").flatten()?.as_utf8_str().to_ascii_lowercase();
            let href = attrs.get("href").flatten()?.as_utf8_str().trim().to_string();
            let rank = rel_rank(&rel)?;
            (!href.is_empty()).then_some((rank, href))
        })
        .enumerate()
        .min_by_key(|(pos, (rank, _))| (*rank, *pos))
        .map(|(_, (_, href))| href)
}

/// Position of `rel` in [`ICON_RELS`]; token order and repeats are ignored.
fn rel_rank(rel: &str) -> Option<usize> {
    let tokens = token_set(rel.split_ascii_whitespace());
    ICON_RELS
        .iter()
        .position(|wanted| token_set(wanted.iter().copied()) == tokens)
}

fn token_set<'a>(tokens: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut set: Vec<&str> = tokens.collect();
    set.sort_unstable();
    set.dedup();
    set
}

/// Absolute URL of `href` relative to `page`.
pub fn resolve_href(page: &Url, href: &str) -> Option<Url> {
    page.join(href).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::{Script, ScriptedFetch, png_bytes};

    #[test]
    fn test_rel_tokens_in_any_order() {
        assert_eq!(rel_rank("shortcut icon"), Some(1));
        assert_eq!(rel_rank("icon shortcut"), Some(1));
        assert_eq!(rel_rank("icon  icon"), Some(0));
        assert_eq!(rel_rank("mask-icon"), None);
        assert_eq!(rel_rank("shortcut"), None);

        let html = r#"<link rel="icon shortcut" href="/reversed.ico">"#;
        assert_eq!(find_icon_href(html).as_deref(), Some("/reversed.ico"));
    }

    #[test]
    fn test_find_icon_href() {
        let html = r#"<html><head>
            <link rel="stylesheet" href="/app.css">
            <link rel="apple-touch-icon" href="/touch.png">
            <link rel="mask-icon" href="/mask.svg">
            <link rel="icon" href="/favicon-32.png" sizes="32x32">
        </head></html>"#;
        assert_eq!(find_icon_href(html).as_deref(), Some("/favicon-32.png"));
    }

    #[test]
    fn test_find_icon_href_variants() {
        let shortcut = r#"<link rel="Shortcut Icon" href="/legacy.ico">"#;
        assert_eq!(find_icon_href(shortcut).as_deref(), Some("/legacy.ico"));

        let touch_only = r#"<link rel="apple-touch-icon-precomposed" href="p.png"><link rel="apple-touch-icon" href="t.png">"#;
        assert_eq!(find_icon_href(touch_only).as_deref(), Some("t.png"));

        assert!(find_icon_href("<link rel=\"icon\" href=\"\">").is_none());
        assert!(find_icon_href("<p>no links</p>").is_none());
    }

    #[test]
    fn test_resolve_href() {
        let page = Url::parse("https://github.com/org/repo").unwrap();
        assert_eq!(
            resolve_href(&page, "/gh.png").unwrap().as_str(),
            "https://github.com/gh.png"
        );
        assert_eq!(
            resolve_href(&page, "img/i.png").unwrap().as_str(),
            "https://github.com/org/img/i.png"
        );
        assert_eq!(
            resolve_href(&page, "//cdn.example.com/i.png").unwrap().as_str(),
            "https://cdn.example.com/i.png"
        );
    }

    fn page(html: &'static str) -> Script {
        Script::Ok {
            content_type: "text/html; charset=utf-8",
            body: html.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn test_attempt_fetches_icon() {
        let fetch = ScriptedFetch::new()
            .on("https://github.com/", page(r#"<link rel="icon" href="/gh.png">"#))
            .on(
                "https://github.com/gh.png",
                Script::Ok {
                    content_type: "image/png",
                    body: png_bytes(),
                },
            );
        let url = Url::parse("https://github.com/").unwrap();
        let ctx = StepContext {
            url: &url,
            label: "github.com",
            fetch: &fetch,
            max_icon_bytes: 4096,
        };

        let icon = HtmlLinkScan::new(Duration::from_secs(1)).attempt(&ctx).await.unwrap();
        assert_eq!(icon.kind(), "dataUri");
    }

    #[tokio::test]
    async fn test_attempt_falls_back_to_href() {
        let fetch = ScriptedFetch::new()
            .on("https://github.com/", page(r#"<link rel="icon" href="/gh.png">"#))
            .on("https://github.com/gh.png", Script::Hang);
        let url = Url::parse("https://github.com/").unwrap();
        let ctx = StepContext {
            url: &url,
            label: "github.com",
            fetch: &fetch,
            max_icon_bytes: 4096,
        };

        let icon = HtmlLinkScan::new(Duration::from_millis(100)).attempt(&ctx).await.unwrap();
        assert_eq!(icon, IconResult::remote_url("https://github.com/gh.png"));
    }

    #[tokio::test]
    async fn test_broken_href_fails_step() {
        let fetch = ScriptedFetch::new()
            .on("https://github.com/", page(r#"<link rel="icon" href="/gone.png">"#));
        let url = Url::parse("https://github.com/").unwrap();
        let ctx = StepContext {
            url: &url,
            label: "github.com",
            fetch: &fetch,
            max_icon_bytes: 4096,
        };

        let result = HtmlLinkScan::new(Duration::from_secs(1)).attempt(&ctx).await;
        assert!(matches!(result, Err(StepError::Fetch(FetchError::Status(404)))));
    }

    #[tokio::test]
    async fn test_inline_data_href() {
        let fetch = ScriptedFetch::new().on(
            "https://example.com/",
            page(r#"<link rel="icon" href="data:image/svg+xml,%3Csvg%3E%3C/svg%3E">"#),
        );
        let url = Url::parse("https://example.com/").unwrap();
        let ctx = StepContext {
            url: &url,
            label: "example.com",
            fetch: &fetch,
            max_icon_bytes: 4096,
        };

        let icon = HtmlLinkScan::new(Duration::from_secs(1)).attempt(&ctx).await.unwrap();
        assert_eq!(icon.to_string(), "data:image/svg+xml,%3Csvg%3E%3C/svg%3E");
        assert_eq!(fetch.calls(), 1);
    }
}
