//! reqwest-backed [`ServerSideFetch`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use url::Url;

use super::{Accept, FetchError, Fetched, ServerSideFetch};

/// Maximum number of redirects followed per request.
const MAX_REDIRECTS: usize = 5;

/// Text bodies are cut off here instead of rejected; icon links live in `<head>`.
const MAX_HTML_BYTES: usize = 1024 * 1024;

/// Shared HTTP client for favicon fetching and reachability probes.
///
/// The client carries no overall timeout; each step bounds its own request.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, max_bytes: usize) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .connect_timeout(Duration::from_secs(3))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FetchError::Other(format!("failed to build http client: {e}")))?;
        Ok(Self { client, max_bytes })
    }

    /// Read an image body, refusing anything over `max_bytes`.
    async fn read_body(&self, mut response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
        if let Some(len) = response.content_length()
            && len > self.max_bytes as u64
        {
            return Err(FetchError::TooLarge(self.max_bytes));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(map_error)? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(FetchError::TooLarge(self.max_bytes));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    /// Read an HTML body, keeping at most [`MAX_HTML_BYTES`].
    async fn read_truncated(mut response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(map_error)? {
            let room = MAX_HTML_BYTES - body.len();
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                break;
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait]
impl ServerSideFetch for HttpFetcher {
    async fn get(&self, url: &Url, accept: Accept) -> Result<Fetched, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, accept.header_value())
            .send()
            .await
            .map_err(map_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = match accept {
            Accept::Image => self.read_body(response).await?,
            Accept::Html | Accept::Json => Self::read_truncated(response).await?,
        };

        Ok(Fetched {
            url: final_url,
            status: status.as_u16(),
            content_type,
            body,
        })
    }

    async fn head(&self, url: &Url) -> Result<u16, FetchError> {
        let response = self
            .client
            .head(url.clone())
            .send()
            .await
            .map_err(map_error)?;
        Ok(response.status().as_u16())
    }
}

fn map_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else if err.is_connect() || err.is_request() {
        FetchError::Connect(err.to_string())
    } else if let Some(status) = err.status() {
        FetchError::Status(status.as_u16())
    } else if err.is_builder() {
        FetchError::InvalidUrl(err.to_string())
    } else {
        FetchError::Other(err.to_string())
    }
}
