//! Fetch capabilities.
//!
//! Two execution contexts, modelled as two capabilities instead of a runtime
//! environment flag:
//!
//! - [`ServerSideFetch`]: outbound HTTP from the resolving process. Used only
//!   for external URLs and for reachability probes.
//! - [`ClientSideCapture`]: icons captured by a browser that sits on the
//!   private network. This crate implements the acceptance half (validation
//!   and hand-off to storage); it never fetches internal URLs itself.

mod capture;
mod http;

pub use capture::{
    CaptureError, ClientSideCapture, SuppliedCapture, validate_capture, validate_image_data,
};
pub use http::HttpFetcher;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// Errors from a single outbound request.
///
/// Every variant means "this step failed" to the resolver; none is surfaced
/// to end users.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("response larger than {0} bytes")]
    TooLarge(usize),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Other(String),
}

/// What kind of body the caller expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accept {
    Image,
    Html,
    Json,
}

impl Accept {
    pub const fn header_value(self) -> &'static str {
        match self {
            Self::Image => "image/avif,image/webp,image/png,image/svg+xml,image/*;q=0.8,*/*;q=0.5",
            Self::Html => "text/html,application/xhtml+xml;q=0.9,*/*;q=0.5",
            Self::Json => "application/json",
        }
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone)]
pub struct Fetched {
    /// URL after redirects.
    pub url: Url,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Fetched {
    /// Body as text, lossily decoded.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Outbound HTTP from the process running the resolver.
#[async_trait]
pub trait ServerSideFetch: Send + Sync {
    /// GET `url`. Non-2xx responses are errors.
    async fn get(&self, url: &Url, accept: Accept) -> Result<Fetched, FetchError>;

    /// HEAD `url`. Any completed response is `Ok` with its status code.
    async fn head(&self, url: &Url) -> Result<u16, FetchError>;
}
