//! Shared fixtures: a small reference dataset and a scripted transport.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use covidstats_core::data::{
    FetchCallback, FetchOutcome, LocationCatalog, SnapshotCache, SnapshotTransport,
};
use covidstats_core::{RawSnapshot, SnapshotEnvelope, SourceContext, StatError};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const DATASET: &str = r#"{
    "time": "2020-10-16T00:00:00Z",
    "version": 1,
    "globals": {
        "Massachusetts": {"title":"Massachusetts","proviceState":"Massachusetts","countryRegion":"US","lat":"42.23","long":"-71.53"},
        "25025.0": {"title":"Suffolk","admin":"Suffolk","proviceState":"Massachusetts","countryRegion":"US"},
        "Spain": {"title":"Spain","proviceState":"","countryRegion":"Spain"},
        "Vermont": {"title":"Vermont","proviceState":"Vermont","countryRegion":"US"}
    }
}"#;

pub fn catalog() -> Arc<LocationCatalog> {
    Arc::new(LocationCatalog::from_json(DATASET.as_bytes()).unwrap())
}

pub fn envelope(fetched_at: DateTime<Utc>, confirmed: &[i64], deaths: &[i64]) -> SnapshotEnvelope {
    SnapshotEnvelope::new(
        fetched_at,
        RawSnapshot {
            cumulative_confirmed: confirmed.to_vec(),
            cumulative_deaths: deaths.to_vec(),
        },
    )
}

pub fn envelope_bytes(fetched_at: DateTime<Utc>, confirmed: &[i64], deaths: &[i64]) -> Vec<u8> {
    envelope(fetched_at, confirmed, deaths).encode().unwrap()
}

/// What the scripted transport answers for a code.
#[derive(Debug, Clone)]
pub enum Reply {
    Payload(Vec<u8>),
    Empty,
    Fail(String),
    /// Drop the callback without calling it.
    Abandon,
}

/// When the scripted transport runs the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// On the calling thread, before `fetch` returns.
    Inline,
    /// On a freshly spawned thread.
    Threaded,
    /// Only when the test calls `complete_pending`.
    Deferred,
}

pub struct ScriptedTransport {
    delivery: Delivery,
    replies: Mutex<HashMap<String, Reply>>,
    pending: Mutex<Vec<(String, FetchCallback)>>,
    fetches: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(delivery: Delivery) -> Arc<Self> {
        Arc::new(Self {
            delivery,
            replies: Mutex::new(HashMap::new()),
            pending: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
        })
    }

    pub fn reply(&self, code: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(code.to_string(), reply);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Run every deferred callback on the current thread.
    pub fn complete_pending(&self) {
        let pending: Vec<(String, FetchCallback)> =
            self.pending.lock().unwrap().drain(..).collect();
        for (code, callback) in pending {
            if let Some(outcome) = self.outcome(&code) {
                callback(outcome);
            }
        }
    }

    fn outcome(&self, code: &str) -> Option<FetchOutcome> {
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(code)
            .cloned()
            .unwrap_or(Reply::Empty);
        match reply {
            Reply::Payload(bytes) => Some(Ok(Some(bytes))),
            Reply::Empty => Some(Ok(None)),
            Reply::Fail(msg) => Some(Err(StatError::Transport(msg))),
            Reply::Abandon => None,
        }
    }
}

impl SnapshotTransport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    fn fetch(&self, code: &str, on_complete: FetchCallback) {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.delivery {
            Delivery::Deferred => {
                self.pending
                    .lock()
                    .unwrap()
                    .push((code.to_string(), on_complete));
            }
            Delivery::Inline => {
                if let Some(outcome) = self.outcome(code) {
                    on_complete(outcome);
                }
            }
            Delivery::Threaded => {
                let outcome = self.outcome(code);
                std::thread::spawn(move || {
                    std::thread::sleep(std::time::Duration::from_millis(20));
                    if let Some(outcome) = outcome {
                        on_complete(outcome);
                    }
                });
            }
        }
    }
}

pub fn context(cache_dir: &Path, transport: Arc<ScriptedTransport>) -> SourceContext {
    SourceContext::new(
        catalog(),
        Arc::new(SnapshotCache::new(cache_dir)),
        transport,
    )
}
