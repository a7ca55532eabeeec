//! Process-lifetime icon cache keyed by effective URL.
//!
//! Each key holds a `OnceCell`, so concurrent resolutions of the same URL
//! share one in-flight computation. A computation that ends in a
//! non-cacheable result (a placeholder) leaves the cell empty.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::core::IconResult;

#[derive(Default)]
pub struct IconCache {
    enabled: bool,
    entries: DashMap<String, Arc<OnceCell<IconResult>>>,
}

impl IconCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<IconResult> {
        self.entries.get(key)?.get().cloned()
    }

    /// Return the cached icon for `key`, or run `resolve`.
    ///
    /// `resolve` yields `Ok` for results worth keeping and `Err` for results
    /// that are returned but not stored; the same split is passed back to
    /// the caller.
    pub async fn get_or_resolve<F, Fut>(
        &self,
        key: &str,
        resolve: F,
    ) -> Result<IconResult, IconResult>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<IconResult, IconResult>>,
    {
        if !self.enabled {
            return resolve().await;
        }

        let cell = Arc::clone(&self.entries.entry(key.to_string()).or_default());
        match cell.get_or_try_init(resolve).await {
            Ok(icon) => Ok(icon.clone()),
            Err(icon) => {
                self.entries.remove_if(key, |_, cell| !cell.initialized());
                Err(icon)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.value().initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_hit_skips_resolution() {
        let cache = IconCache::new(true);
        let runs = AtomicUsize::new(0);

        for _ in 0..3 {
            let icon = cache
                .get_or_resolve("https://github.com", || async {
                    runs.fetch_add(1, Ordering::SeqCst);
                    Ok(IconResult::remote_url("https://github.com/favicon.ico"))
                })
                .await
                .unwrap();
            assert_eq!(icon.kind(), "remoteUrl");
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_uncacheable_not_stored() {
        let cache = IconCache::new(true);
        let icon = cache
            .get_or_resolve("https://down.example", || async {
                Err(IconResult::static_path("/fallback.svg"))
            })
            .await;
        assert_eq!(icon, Err(IconResult::static_path("/fallback.svg")));
        assert!(cache.is_empty());
        assert!(cache.get("https://down.example").is_none());
    }

    #[tokio::test]
    async fn test_disabled_always_resolves() {
        let cache = IconCache::new(false);
        let runs = AtomicUsize::new(0);
        for _ in 0..2 {
            let icon = cache
                .get_or_resolve("k", || async {
                    runs.fetch_add(1, Ordering::SeqCst);
                    Ok(IconResult::remote_url("u"))
                })
                .await;
            assert!(icon.is_ok());
        }
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_work() {
        let cache = Arc::new(IconCache::new(true));
        let runs = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let runs = Arc::clone(&runs);
                tokio::spawn(async move {
                    cache
                        .get_or_resolve("https://slow.example", || async move {
                            runs.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            Ok(IconResult::remote_url("https://slow.example/i.png"))
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap().kind(), "remoteUrl");
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
