use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use packport_core::AssetReference;

use crate::resolver::ResolvedAsset;

#[derive(Debug, Default)]
struct CacheInner {
    entries: RwLock<HashMap<AssetReference, ResolvedAsset>>,
    extractions: AtomicUsize,
}

/// Resolution cache for one conversion session.
///
/// Cloning shares the same underlying map. Entries are only ever added:
/// the first resolution stored for a reference is the one every later
/// lookup sees.
#[derive(Debug, Clone, Default)]
pub struct ResolutionCache {
    inner: Arc<CacheInner>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a previously resolved asset
    pub fn get(&self, reference: &AssetReference) -> Option<ResolvedAsset> {
        self.inner.entries.read().get(reference).cloned()
    }

    /// Store a resolution and return the cached value.
    ///
    /// When another caller stored the same reference first, its entry wins
    /// and is returned instead.
    pub fn insert(&self, resolved: ResolvedAsset) -> ResolvedAsset {
        self.inner
            .entries
            .write()
            .entry(resolved.reference.clone())
            .or_insert(resolved)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count one archive extraction
    pub(crate) fn record_extraction(&self) -> usize {
        self.inner.extractions.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Number of archive entries extracted to disk during this session
    pub fn extraction_count(&self) -> usize {
        self.inner.extractions.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::AssetOrigin;
    use std::path::PathBuf;

    fn resolved(location: &str, origin: AssetOrigin) -> ResolvedAsset {
        ResolvedAsset {
            reference: AssetReference::new("acme", "textures/item/ruby.png"),
            location: PathBuf::from(location),
            origin,
        }
    }

    #[test]
    fn test_cache_insert_get() {
        let cache = ResolutionCache::new();
        let reference = AssetReference::new("acme", "textures/item/ruby.png");
        assert!(cache.get(&reference).is_none());
        assert!(cache.is_empty());

        cache.insert(resolved("/a/ruby.png", AssetOrigin::Loose));
        assert_eq!(
            cache.get(&reference).map(|r| r.location),
            Some(PathBuf::from("/a/ruby.png"))
        );
    }

    #[test]
    fn test_first_insert_wins() {
        let cache = ResolutionCache::new();
        cache.insert(resolved("/first.png", AssetOrigin::Loose));
        let second = cache.insert(resolved("/second.png", AssetOrigin::Archive));
        assert_eq!(second.location, PathBuf::from("/first.png"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let cache = ResolutionCache::new();
        let shared = cache.clone();
        shared.insert(resolved("/a.png", AssetOrigin::Loose));
        shared.record_extraction();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.extraction_count(), 1);
    }
}
