//! Snapshot transport trait.
//!
//! Abstracts over where envelopes come from (the HTTP snapshot service, or a
//! scripted transport in tests). The cache layer sits above this trait;
//! transports don't know about the cache.

use crate::error::StatError;

/// Result of one fetch: the raw payload, `Ok(None)` when the service
/// answered without a body, or the transport error.
pub type FetchOutcome = Result<Option<Vec<u8>>, StatError>;

/// Completion callback for a fetch. Runs exactly once, on whatever thread
/// the transport completes on.
pub type FetchCallback = Box<dyn FnOnce(FetchOutcome) + Send + 'static>;

/// Trait for snapshot transports.
pub trait SnapshotTransport: Send + Sync {
    /// Human-readable name of this transport.
    fn name(&self) -> &str;

    /// Start fetching the current envelope for `code`.
    ///
    /// Must not block the caller on the network; `on_complete` is invoked
    /// exactly once when the request finishes or fails.
    fn fetch(&self, code: &str, on_complete: FetchCallback);
}
