//! Stat source lifecycle states and the event published on every change.

use crate::domain::Stat;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Where a stat source is in its load/fetch cycle.
///
/// ```text
/// Uninitialized ──► Ready                      (fresh cache)
/// Uninitialized ──► Loading ──► Ready | Error  (network)
/// Ready | Error ──► Loading ──► Ready | Error  (refresh)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceState {
    Uninitialized,
    Loading,
    Ready,
    Error,
}

impl SourceState {
    /// No fetch is outstanding.
    pub fn is_settled(self) -> bool {
        matches!(self, SourceState::Ready | SourceState::Error)
    }
}

impl fmt::Display for SourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceState::Uninitialized => "uninitialized",
            SourceState::Loading => "loading",
            SourceState::Ready => "ready",
            SourceState::Error => "error",
        };
        f.write_str(s)
    }
}

/// Published to a source's listeners whenever its state, stat or
/// diagnostic changes.
#[derive(Debug, Clone)]
pub struct SourceEvent {
    pub code: String,
    pub state: SourceState,
    pub stat: Option<Arc<Stat>>,
    pub diagnostic: Option<String>,
}
