//! Stat sources and collections: the load/cache/refresh lifecycle.

pub mod collection;
pub mod context;
pub mod listeners;
pub mod stat_source;
pub mod state;

pub use collection::{parse_codes, CollectionEvent, StatCollection};
pub use context::{SourceContext, DEFAULT_FRESHNESS_HOURS};
pub use listeners::{ListenerSet, Subscription};
pub use stat_source::{FetchMode, StatSource};
pub use state::{SourceEvent, SourceState};
