//! COVID stats core — snapshot loading, caching and stat derivation.
//!
//! This crate contains everything below the views:
//! - Signal transforms (daily deltas, SMA + EMA smoothing)
//! - Stat builder (captions, totals, derived series)
//! - Location catalog from the bundled reference dataset
//! - Per-location snapshot cache with a freshness window
//! - Observable stat sources with sync/async fetch, and ordered collections

pub mod builder;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod signal;
pub mod source;

pub use builder::{build_stat, build_stat_for_code, build_stat_or_empty};
pub use config::CovidConfig;
pub use domain::{LocationMeta, RawSnapshot, SnapshotEnvelope, Stat};
pub use error::StatError;
pub use source::{
    CollectionEvent, FetchMode, SourceContext, SourceEvent, SourceState, StatCollection,
    StatSource, Subscription,
};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types handed across the fetch thread boundary
    /// are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Stat>();
        require_sync::<Stat>();
        require_send::<SnapshotEnvelope>();
        require_sync::<SnapshotEnvelope>();
        require_send::<SourceEvent>();
        require_sync::<SourceEvent>();
        require_send::<StatSource>();
        require_sync::<StatSource>();
        require_send::<StatCollection>();
        require_send::<SourceContext>();
        require_sync::<SourceContext>();
        require_send::<Subscription>();
        require_send::<data::LocationCatalog>();
        require_sync::<data::LocationCatalog>();
        require_send::<data::HttpTransport>();
        require_sync::<data::HttpTransport>();
    }
}
