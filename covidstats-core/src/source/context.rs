//! Explicit dependencies for creating stat sources.

use super::stat_source::{FetchMode, StatSource};
use crate::config::CovidConfig;
use crate::data::{HttpTransport, LocationCatalog, SnapshotCache, SnapshotTransport};
use crate::error::StatError;
use chrono::Duration;
use std::sync::Arc;

/// Default freshness window for cached snapshots.
pub const DEFAULT_FRESHNESS_HOURS: i64 = 24;

/// Catalog, cache, transport and freshness window shared by every source.
#[derive(Clone)]
pub struct SourceContext {
    catalog: Arc<LocationCatalog>,
    cache: Arc<SnapshotCache>,
    transport: Arc<dyn SnapshotTransport>,
    freshness: Duration,
}

impl SourceContext {
    pub fn new(
        catalog: Arc<LocationCatalog>,
        cache: Arc<SnapshotCache>,
        transport: Arc<dyn SnapshotTransport>,
    ) -> Self {
        Self {
            catalog,
            cache,
            transport,
            freshness: Duration::hours(DEFAULT_FRESHNESS_HOURS),
        }
    }

    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    /// Load the reference dataset and wire up the HTTP transport and cache
    /// described by `config`.
    pub fn from_config(config: &CovidConfig) -> Result<Self, StatError> {
        let catalog = LocationCatalog::load(&config.dataset)?;
        let transport = HttpTransport::new(config.base_url.clone(), config.request_timeout())?;
        Ok(Self::new(
            Arc::new(catalog),
            Arc::new(SnapshotCache::new(&config.cache_dir)),
            Arc::new(transport),
        )
        .with_freshness(config.freshness()))
    }

    /// Create the stat source for `code`.
    ///
    /// An unknown code yields a source in the `Error` state holding an empty
    /// placeholder stat; no fetch is made for it.
    pub fn create_source(&self, code: &str, mode: FetchMode) -> StatSource {
        StatSource::new(
            code,
            self.catalog.get(code),
            self.cache.clone(),
            self.transport.clone(),
            self.freshness,
            mode,
        )
    }

    pub fn catalog(&self) -> &LocationCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }
}
