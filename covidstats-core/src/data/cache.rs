//! Per-location snapshot cache.
//!
//! Layout: `{cache_dir}/{code}`, one envelope per location, in the same JSON
//! encoding the snapshot service returns.
//!
//! - Writes are atomic (write to a unique .tmp, rename into place), so two
//!   sources racing on the same code leave whichever envelope landed last.
//! - A slot that cannot be read or decoded is a cache miss, never an error.
//! - A failed write is logged and skipped.

use crate::domain::{within_window, SnapshotEnvelope};
use crate::error::StatError;
use chrono::{DateTime, Duration, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

const TMP_EXTENSION: &str = "tmp";

/// The snapshot cache.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    cache_dir: PathBuf,
}

impl SnapshotCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Root directory of the cache.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of the slot for `code`. Path separators in the code are replaced
    /// so every slot stays directly under the cache root.
    pub fn slot_path(&self, code: &str) -> PathBuf {
        let name: String = code
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.cache_dir.join(name)
    }

    /// Cached envelope for `code`, or `None` when absent or undecodable.
    pub fn load(&self, code: &str) -> Option<SnapshotEnvelope> {
        match self.read(code) {
            Ok(envelope) => {
                log::debug!("cache hit for {code} (fetched {})", envelope.fetched_at);
                Some(envelope)
            }
            Err(StatError::CacheRead(msg)) => {
                log::debug!("cache miss for {code}: {msg}");
                None
            }
            Err(e) => {
                log::warn!("ignoring corrupt cache slot for {code}: {e}");
                None
            }
        }
    }

    /// Read and decode the slot for `code`.
    pub fn read(&self, code: &str) -> Result<SnapshotEnvelope, StatError> {
        let path = self.slot_path(code);
        let bytes = fs::read(&path)
            .map_err(|e| StatError::CacheRead(format!("{}: {e}", path.display())))?;
        SnapshotEnvelope::decode(&bytes)
    }

    /// Store `envelope` for `code`, replacing any previous entry.
    pub fn save(&self, code: &str, envelope: &SnapshotEnvelope) {
        let result = envelope
            .encode()
            .and_then(|bytes| self.write_raw(code, &bytes));
        if let Err(e) = result {
            log::warn!("skipping cache write for {code}: {e}");
        }
    }

    /// Store a payload exactly as received from the network.
    pub fn save_raw(&self, code: &str, bytes: &[u8]) {
        if let Err(e) = self.write_raw(code, bytes) {
            log::warn!("skipping cache write for {code}: {e}");
        }
    }

    /// Atomically replace the slot for `code` with `bytes`.
    pub fn write_raw(&self, code: &str, bytes: &[u8]) -> Result<(), StatError> {
        fs::create_dir_all(&self.cache_dir)
            .map_err(|e| StatError::CacheWrite(format!("failed to create dir: {e}")))?;

        let path = self.slot_path(code);
        let id = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp_path = path.with_extension(format!("{}.{id}.{TMP_EXTENSION}", std::process::id()));

        fs::write(&tmp_path, bytes)
            .map_err(|e| StatError::CacheWrite(format!("write {}: {e}", tmp_path.display())))?;

        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            StatError::CacheWrite(format!("atomic rename failed: {e}"))
        })?;

        log::debug!("cached {} bytes for {code}", bytes.len());
        Ok(())
    }

    /// Delete the slot for `code`. Returns whether a slot existed.
    pub fn remove(&self, code: &str) -> Result<bool, StatError> {
        match fs::remove_file(self.slot_path(code)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StatError::CacheWrite(format!("remove {code}: {e}"))),
        }
    }

    /// Every decodable slot, sorted by code.
    pub fn entries(&self) -> Vec<CacheEntry> {
        let Ok(dir) = fs::read_dir(&self.cache_dir) else {
            return Vec::new();
        };

        let mut entries: Vec<CacheEntry> = dir
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_file())
            .filter(|entry| {
                entry.path().extension().and_then(|e| e.to_str()) != Some(TMP_EXTENSION)
            })
            .filter_map(|entry| {
                let code = entry.file_name().to_str()?.to_string();
                let bytes = fs::read(entry.path()).ok()?;
                let envelope = SnapshotEnvelope::decode(&bytes).ok()?;
                Some(CacheEntry {
                    code,
                    fetched_at: envelope.fetched_at,
                    bytes: bytes.len() as u64,
                })
            })
            .collect();

        entries.sort_by(|a, b| a.code.cmp(&b.code));
        entries
    }

    /// Entries whose envelope is older than `age` at `now`.
    pub fn stale_entries(&self, now: DateTime<Utc>, age: Duration) -> Vec<CacheEntry> {
        self.entries()
            .into_iter()
            .filter(|entry| !within_window(entry.fetched_at, now, age))
            .collect()
    }

    /// Remove every slot older than `age`, returning the removed codes.
    pub fn prune_older_than(&self, now: DateTime<Utc>, age: Duration) -> Vec<String> {
        self.stale_entries(now, age)
            .into_iter()
            .filter_map(|entry| match self.remove(&entry.code) {
                Ok(true) => Some(entry.code),
                Ok(false) => None,
                Err(e) => {
                    log::warn!("{e}");
                    None
                }
            })
            .collect()
    }
}

/// One cached location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub code: String,
    pub fetched_at: DateTime<Utc>,
    pub bytes: u64,
}
