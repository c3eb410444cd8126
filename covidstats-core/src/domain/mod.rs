//! Domain types: locations, snapshots, derived stats.

pub mod location;
pub mod snapshot;
pub mod stat;

pub use location::LocationMeta;
pub use snapshot::{within_window, RawSnapshot, SnapshotEnvelope, FORMAT_VERSION};
pub use stat::Stat;
