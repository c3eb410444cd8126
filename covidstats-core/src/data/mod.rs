//! Reference dataset, snapshot cache and snapshot transports.

pub mod cache;
pub mod catalog;
pub mod http;
pub mod provider;

pub use cache::{CacheEntry, SnapshotCache};
pub use catalog::{LocationCatalog, LocationLabel};
pub use http::{HttpTransport, DEFAULT_BASE_URL};
pub use provider::{FetchCallback, FetchOutcome, SnapshotTransport};
