use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

use crate::config::SourcesConfig;
use crate::error::Result;
use crate::processor::Aggregator;
use crate::storage::CanonicalDataset;

/// Lazily built canonical dataset. The first `get_or_load` runs the loader,
/// later calls share the same immutable dataset until `invalidate`.
pub struct CatalogCache {
    slot: Mutex<CacheSlot>,
}

struct CacheSlot {
    dataset: Option<Arc<CanonicalDataset>>,
    epoch: u64,
}

static CATALOG: CatalogCache = CatalogCache::new();

/// Process-wide cache. Only cleared on restart or an explicit reload.
pub fn catalog_cache() -> &'static CatalogCache {
    &CATALOG
}

/// Canonical dataset for `config`, built on first use.
pub fn shared_catalog(config: &SourcesConfig) -> Result<Arc<CanonicalDataset>> {
    catalog_cache().get_or_load(|| Aggregator::new(config).build())
}

impl CatalogCache {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(CacheSlot {
                dataset: None,
                epoch: 0,
            }),
        }
    }

    pub fn get_or_load<F>(&self, load: F) -> Result<Arc<CanonicalDataset>>
    where
        F: FnOnce() -> Result<CanonicalDataset>,
    {
        let mut slot = self.lock();
        if let Some(dataset) = &slot.dataset {
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(load()?);
        slot.epoch += 1;
        slot.dataset = Some(Arc::clone(&dataset));
        info!(
            "Canonical dataset cached (epoch {}, {} records)",
            slot.epoch,
            dataset.len()
        );

        Ok(dataset)
    }

    /// Drop the cached dataset. Returns whether anything was cached.
    pub fn invalidate(&self) -> bool {
        let mut slot = self.lock();
        let was_loaded = slot.dataset.take().is_some();
        if was_loaded {
            info!("Canonical dataset cache cleared (epoch {})", slot.epoch);
        }
        was_loaded
    }

    /// Number of times the dataset has been built.
    pub fn epoch(&self) -> u64 {
        self.lock().epoch
    }

    fn lock(&self) -> MutexGuard<'_, CacheSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}
