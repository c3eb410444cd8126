//! Observable per-location stat holder.
//!
//! On construction a source tries the snapshot cache; a fresh envelope is
//! turned into a `Stat` immediately. Otherwise a fetch is issued through
//! the transport and the result is cached, decoded, built and published.
//!
//! In `FetchMode::Sync` the constructor blocks on a one-shot channel until
//! the fetch callback has run. There is no timeout: a transport that never
//! calls back hangs the caller.

use super::listeners::{lock, ListenerSet, Subscription};
use super::state::{SourceEvent, SourceState};
use crate::builder::{build_stat, placeholder};
use crate::data::{FetchOutcome, SnapshotCache, SnapshotTransport};
use crate::domain::{within_window, LocationMeta, SnapshotEnvelope, Stat};
use crate::error::StatError;
use chrono::{Duration, Utc};
use std::sync::mpsc::{self, SyncSender};
use std::sync::{Arc, Mutex, Weak};

/// Whether creating or refreshing a source waits for the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Return immediately; observe the result through `subscribe`.
    #[default]
    Async,
    /// Block until the fetch completion has run. For callers that can
    /// render only once, such as a time-boxed widget snapshot.
    Sync,
}

#[derive(Debug)]
struct SourceData {
    state: SourceState,
    stat: Option<Arc<Stat>>,
    diagnostic: Option<String>,
}

struct Shared {
    code: String,
    meta: Option<LocationMeta>,
    cache: Arc<SnapshotCache>,
    transport: Arc<dyn SnapshotTransport>,
    freshness: Duration,
    data: Mutex<SourceData>,
    listeners: ListenerSet<SourceEvent>,
}

/// Stat holder for one location code.
pub struct StatSource {
    shared: Arc<Shared>,
}

impl StatSource {
    pub(crate) fn new(
        code: &str,
        meta: Result<&LocationMeta, StatError>,
        cache: Arc<SnapshotCache>,
        transport: Arc<dyn SnapshotTransport>,
        freshness: Duration,
        mode: FetchMode,
    ) -> Self {
        let (meta, data) = match meta {
            Ok(meta) => (
                Some(meta.clone()),
                SourceData {
                    state: SourceState::Uninitialized,
                    stat: None,
                    diagnostic: None,
                },
            ),
            Err(e) => {
                log::warn!("{e}");
                let stat = Stat {
                    caption: code.to_string(),
                    ..Stat::empty(Utc::now())
                };
                (
                    None,
                    SourceData {
                        state: SourceState::Error,
                        stat: Some(Arc::new(stat)),
                        diagnostic: Some(e.to_string()),
                    },
                )
            }
        };

        let source = Self {
            shared: Arc::new(Shared {
                code: code.to_string(),
                meta,
                cache,
                transport,
                freshness,
                data: Mutex::new(data),
                listeners: ListenerSet::new(),
            }),
        };

        if source.shared.meta.is_some() && !source.shared.load_cached() {
            source.fetch(mode);
        }
        source
    }

    pub fn code(&self) -> &str {
        &self.shared.code
    }

    /// The current stat, `None` until the first successful load.
    pub fn current_stat(&self) -> Option<Arc<Stat>> {
        lock(&self.shared.data).stat.clone()
    }

    /// Last error message, if the most recent load or fetch failed.
    pub fn diagnostic(&self) -> Option<String> {
        lock(&self.shared.data).diagnostic.clone()
    }

    pub fn state(&self) -> SourceState {
        lock(&self.shared.data).state
    }

    /// Current state as an event value.
    pub fn event(&self) -> SourceEvent {
        self.shared.event()
    }

    /// Whether there is no stat, or the stat is older than the freshness
    /// window.
    pub fn is_stale(&self) -> bool {
        match self.current_stat() {
            None => true,
            Some(stat) => !within_window(stat.computed_at, Utc::now(), self.shared.freshness),
        }
    }

    /// Register for change notifications. Listeners run on whichever thread
    /// publishes the change.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SourceEvent) + Send + Sync + 'static,
    {
        self.shared.listeners.subscribe(listener)
    }

    /// Fetch a new snapshot from the network regardless of cache freshness.
    ///
    /// The current stat stays visible while the fetch is in flight. Does
    /// nothing for a code missing from the catalog.
    pub fn refresh(&self, mode: FetchMode) {
        if self.shared.meta.is_none() {
            return;
        }
        self.fetch(mode);
    }

    fn fetch(&self, mode: FetchMode) {
        self.shared.update(|data| {
            data.state = SourceState::Loading;
            data.diagnostic = None;
        });

        match mode {
            FetchMode::Async => Shared::start_fetch(&self.shared, None),
            FetchMode::Sync => {
                let (tx, rx) = mpsc::sync_channel(1);
                Shared::start_fetch(&self.shared, Some(tx));
                if rx.recv().is_err() {
                    // The transport dropped the callback without running it.
                    self.shared.update(|data| {
                        data.state = SourceState::Error;
                        data.diagnostic = Some(
                            StatError::Transport("fetch abandoned before completion".into())
                                .to_string(),
                        );
                    });
                }
            }
        }
    }
}

impl std::fmt::Debug for StatSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = lock(&self.shared.data);
        f.debug_struct("StatSource")
            .field("code", &self.shared.code)
            .field("state", &data.state)
            .field("diagnostic", &data.diagnostic)
            .finish()
    }
}

impl Shared {
    /// Use the cached envelope if it is within the freshness window.
    ///
    /// A stale envelope is still shown while the fetch runs; it just does
    /// not count as loaded.
    fn load_cached(&self) -> bool {
        let (Some(meta), Some(envelope)) = (&self.meta, self.cache.load(&self.code)) else {
            return false;
        };

        let fresh = envelope.is_fresh(Utc::now(), self.freshness);
        let (stat, diagnostic) = stat_from_envelope(meta, &envelope);
        let mut data = lock(&self.data);
        data.stat = Some(Arc::new(stat));
        if fresh {
            log::debug!("{}: using cached snapshot from {}", self.code, envelope.fetched_at);
            data.state = SourceState::Ready;
            data.diagnostic = diagnostic;
        } else {
            log::debug!("{}: cached snapshot from {} is stale", self.code, envelope.fetched_at);
        }
        fresh
    }

    fn start_fetch(shared: &Arc<Shared>, gate: Option<SyncSender<()>>) {
        let weak: Weak<Shared> = Arc::downgrade(shared);
        let cache = shared.cache.clone();
        let code = shared.code.clone();
        log::debug!("{code}: fetching via {}", shared.transport.name());

        shared.transport.fetch(
            &shared.code,
            Box::new(move |outcome| {
                match weak.upgrade() {
                    Some(shared) => shared.complete(outcome),
                    None => {
                        // Source released mid-flight; keep the payload anyway.
                        if let Ok(Some(bytes)) = &outcome {
                            cache.save_raw(&code, bytes);
                        }
                    }
                }
                if let Some(gate) = gate {
                    let _ = gate.send(());
                }
            }),
        );
    }

    /// Fetch completion. Runs exactly once per fetch.
    fn complete(&self, outcome: FetchOutcome) {
        let bytes = match outcome {
            Err(e) => {
                log::warn!("{}: {e}", self.code);
                return self.fail(e.to_string());
            }
            Ok(None) => {
                log::warn!("{}: empty response", self.code);
                return self.fail(StatError::NoData.to_string());
            }
            Ok(Some(bytes)) => bytes,
        };

        self.cache.save_raw(&self.code, &bytes);

        let envelope = match SnapshotEnvelope::decode(&bytes) {
            Ok(envelope) => envelope,
            Err(e) => {
                // State stays Loading; only the diagnostic records it.
                log::warn!("{}: {e}", self.code);
                return self.update(|data| data.diagnostic = Some(e.to_string()));
            }
        };

        let Some(meta) = &self.meta else {
            return;
        };
        let (stat, diagnostic) = stat_from_envelope(meta, &envelope);
        log::info!(
            "{}: loaded snapshot from {} ({} cases)",
            self.code,
            envelope.fetched_at,
            stat.total_cases
        );
        self.update(|data| {
            data.stat = Some(Arc::new(stat));
            data.diagnostic = diagnostic;
            data.state = SourceState::Ready;
        });
    }

    fn fail(&self, diagnostic: String) {
        self.update(|data| {
            data.diagnostic = Some(diagnostic);
            data.state = SourceState::Error;
        });
    }

    /// Apply `change` and publish the result outside the lock.
    fn update(&self, change: impl FnOnce(&mut SourceData)) {
        let event = {
            let mut data = lock(&self.data);
            change(&mut data);
            self.event_from(&data)
        };
        self.listeners.notify(&event);
    }

    fn event(&self) -> SourceEvent {
        self.event_from(&lock(&self.data))
    }

    fn event_from(&self, data: &SourceData) -> SourceEvent {
        SourceEvent {
            code: self.code.clone(),
            state: data.state,
            stat: data.stat.clone(),
            diagnostic: data.diagnostic.clone(),
        }
    }
}

/// Build the stat for an envelope; degenerate data gives a placeholder plus
/// a diagnostic.
fn stat_from_envelope(meta: &LocationMeta, envelope: &SnapshotEnvelope) -> (Stat, Option<String>) {
    match build_stat(meta, &envelope.snapshot, envelope.fetched_at) {
        Ok(stat) => (stat, None),
        Err(e) => {
            log::warn!("{}: {e}", meta.code);
            (placeholder(meta, envelope.fetched_at), Some(e.to_string()))
        }
    }
}
