//! Common utilities shared across CLI commands.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::LinkiconConfig;
use crate::fetch::HttpFetcher;

/// Single-threaded runtime for one-shot commands.
pub fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")
}

/// Outbound HTTP client configured from `[resolver]`.
pub fn http_fetcher(config: &LinkiconConfig) -> Result<Arc<HttpFetcher>> {
    let fetcher = HttpFetcher::new(&config.resolver.user_agent, config.resolver.max_icon_bytes)
        .context("Failed to create http client")?;
    Ok(Arc::new(fetcher))
}

/// Shorten long values (data URIs) for one-line output.
pub fn preview(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &value[..cut]),
        None => value.to_string(),
    }
}
