//! Global config handle.
//!
//! Uses `arc-swap` for lock-free reads from request handlers on every
//! worker thread.

use crate::config::LinkiconConfig;
use arc_swap::ArcSwap;
use std::sync::{Arc, LazyLock};

/// Global config storage.
pub static CONFIG: LazyLock<ArcSwap<LinkiconConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(LinkiconConfig::default()));

#[inline]
pub fn cfg() -> Arc<LinkiconConfig> {
    CONFIG.load_full()
}

#[inline]
pub fn init_config(config: LinkiconConfig) -> Arc<LinkiconConfig> {
    let arc = Arc::new(config);
    CONFIG.store(Arc::clone(&arc));
    arc
}
