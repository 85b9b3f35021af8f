//! Per-path cache of parsed resource bodies

use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OnceCell;

type Slot = Arc<OnceCell<Arc<Value>>>;

/// Cache of parsed JSON bodies keyed by relative resource path
///
/// Entries live until [`ResourceCache::clear`]; there is no expiry and no
/// size bound. Concurrent requests for the same path share one fetch: the
/// first caller runs it and the others wait for its result. A failed fetch
/// leaves the path uncached so the next request tries again.
#[derive(Debug, Default)]
pub struct ResourceCache {
    entries: Mutex<HashMap<String, Slot>>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached body for `path`, running `fetch` on a miss
    pub async fn get_or_fetch<F, Fut, E>(&self, path: &str, fetch: F) -> Result<Arc<Value>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        let slot = Arc::clone(self.entries().entry(path.to_string()).or_default());

        if let Some(value) = slot.get() {
            log::debug!("Cache hit for {}", path);
            return Ok(Arc::clone(value));
        }

        let value = slot
            .get_or_try_init(|| async move { fetch().await.map(Arc::new) })
            .await?;
        Ok(Arc::clone(value))
    }

    /// Returns the cached body for `path` without fetching
    pub fn get(&self, path: &str) -> Option<Arc<Value>> {
        self.entries()
            .get(path)
            .and_then(|slot| slot.get().cloned())
    }

    /// Returns true if a body is cached for `path`
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Number of cached bodies
    pub fn len(&self) -> usize {
        self.entries()
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached paths in sorted order
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .entries()
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(path, _)| path.clone())
            .collect();
        paths.sort();
        paths
    }

    /// Discards every cached body
    ///
    /// A fetch still in flight completes for its own callers but is not
    /// stored.
    pub fn clear(&self) {
        let mut entries = self.entries();
        let count = entries.len();
        entries.clear();
        log::debug!("Cleared {} cache entries", count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_second_request_is_served_from_cache() {
        let cache = ResourceCache::new();
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        for _ in 0..2 {
            let value = cache
                .get_or_fetch("manifest.json", move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(json!({"books": []}))
                })
                .await
                .unwrap();
            assert_eq!(*value, json!({"books": []}));
        }

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(cache.contains("manifest.json"));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache = ResourceCache::new();

        let result = cache
            .get_or_fetch("books/missing.json", || async { Err::<Value, _>("404") })
            .await;
        assert_eq!(result.unwrap_err(), "404");
        assert!(!cache.contains("books/missing.json"));
        assert!(cache.is_empty());

        let value = cache
            .get_or_fetch("books/missing.json", || async { Ok::<_, &str>(json!(1)) })
            .await
            .unwrap();
        assert_eq!(*value, json!(1));
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_fetch() {
        let cache = ResourceCache::new();
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let fetch = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok::<_, String>(json!("body"))
        };

        let (a, b) = tokio::join!(
            cache.get_or_fetch("scenes/ds1.json", fetch),
            cache.get_or_fetch("scenes/ds1.json", fetch)
        );

        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_clear_discards_entries() {
        let cache = ResourceCache::new();
        for path in ["b.json", "a.json"] {
            cache
                .get_or_fetch(path, || async { Ok::<_, String>(json!(null)) })
                .await
                .unwrap();
        }
        assert_eq!(cache.paths(), vec!["a.json", "b.json"]);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("a.json").is_none());
    }
}
