//! Link store contract.
//!
//! Link records belong to the admin layer; the icon engine only needs to read
//! a link's addresses and stored icon, and to write back a resolved icon.
//!
//! - [`LinkStore`]: the narrow contract
//! - [`JsonLinkStore`]: file-backed implementation used by the HTTP service

mod json;

pub use json::JsonLinkStore;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::core::{IconResult, LinkRecord};
use crate::log;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("malformed link store: {0}")]
    Json(#[from] serde_json::Error),

    #[error("link `{0}` not found")]
    NotFound(String),
}

/// Lookup and icon write-back by link identifier.
pub trait LinkStore: Send + Sync {
    fn get(&self, id: &str) -> Result<Option<LinkRecord>, StoreError>;

    /// Replace the stored icon of `id`.
    fn set_icon(&self, id: &str, icon: &str) -> Result<(), StoreError>;
}

/// Persist `icon` for `id` on a blocking task without waiting for it.
///
/// Failures are logged and never reach the caller.
pub fn persist_icon(
    runtime: &tokio::runtime::Handle,
    store: Arc<dyn LinkStore>,
    id: String,
    icon: IconResult,
) -> tokio::task::JoinHandle<()> {
    runtime.spawn_blocking(move || {
        let rendered = icon.to_string();
        match store.set_icon(&id, &rendered) {
            Ok(()) => crate::debug!("store"; "saved {} icon for {}", icon.kind(), id),
            Err(e) => log!("store"; "failed to save icon for {}: {}", id, e),
        }
    })
}
