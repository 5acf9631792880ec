use crate::dataset::Dataset;
use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub page_count: usize,
    pub fingerprint: String,
}

/// Memoizes finished crawls by page count and source fingerprint.
///
/// Entries live until invalidated; nothing expires on its own.
#[derive(Debug, Clone, Default)]
pub struct ScrapeCache {
    entries: Arc<RwLock<HashMap<CacheKey, Arc<Dataset>>>>,
}

impl ScrapeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<Dataset>> {
        self.entries.read().get(key).cloned()
    }

    pub fn insert(&self, key: CacheKey, dataset: Dataset) -> Arc<Dataset> {
        let dataset = Arc::new(dataset);
        debug!(
            "Caching {} records for {} page(s) of {}",
            dataset.len(),
            key.page_count,
            key.fingerprint
        );
        self.entries.write().insert(key, Arc::clone(&dataset));
        dataset
    }

    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Drops every entry for one source, whatever its page count.
    pub fn invalidate_source(&self, fingerprint: &str) {
        self.entries
            .write()
            .retain(|key, _| key.fingerprint != fingerprint);
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::record;

    fn key(pages: usize, source: &str) -> CacheKey {
        CacheKey {
            page_count: pages,
            fingerprint: source.to_string(),
        }
    }

    #[test]
    fn test_insert_get_invalidate() {
        let cache = ScrapeCache::new();
        let data: Dataset = vec![record("Sapiens", 54.23, 20, 5, "History")]
            .into_iter()
            .collect();

        cache.insert(key(1, "a"), data.clone());
        cache.insert(key(2, "a"), data.clone());
        cache.insert(key(1, "b"), data);

        assert_eq!(cache.get(&key(1, "a")).map(|d| d.len()), Some(1));
        assert!(cache.get(&key(3, "a")).is_none());

        assert!(cache.invalidate(&key(1, "b")));
        assert!(!cache.invalidate(&key(1, "b")));

        cache.invalidate_source("a");
        assert!(cache.is_empty());
    }
}
