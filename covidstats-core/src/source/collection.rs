//! Ordered, observable collection of stat sources.
//!
//! Every member's change notifications are re-broadcast as the collection's
//! own events, so one subscription covers the whole list. Members are owned
//! exclusively; removing one releases it along with its forwarding
//! subscription.

use super::context::SourceContext;
use super::listeners::{lock, ListenerSet, Subscription};
use super::state::SourceEvent;
use super::stat_source::{FetchMode, StatSource};
use std::sync::{Arc, Mutex};

/// Published to collection listeners.
#[derive(Debug, Clone)]
pub enum CollectionEvent {
    /// A member's state, stat or diagnostic changed. `index` is the
    /// member's position when the change was forwarded.
    MemberChanged { index: usize, event: SourceEvent },
    Added { index: usize, code: String },
    Removed { codes: Vec<String> },
    Moved,
}

struct Member {
    id: u64,
    source: StatSource,
    _forward: Subscription,
}

#[derive(Default)]
pub struct StatCollection {
    members: Vec<Member>,
    /// Member ids in display order, read by the forwarding listeners.
    order: Arc<Mutex<Vec<u64>>>,
    next_id: u64,
    listeners: ListenerSet<CollectionEvent>,
}

impl StatCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from a saved comma-separated code list such as
    /// `"Massachusetts,California,25025.0"`.
    pub fn from_codes(context: &SourceContext, codes: &str, mode: FetchMode) -> Self {
        let mut collection = Self::new();
        for code in parse_codes(codes) {
            collection.add(context.create_source(code, mode));
        }
        collection
    }

    /// Append `source` at the end.
    pub fn add(&mut self, source: StatSource) {
        let id = self.next_id;
        self.next_id += 1;

        let listeners = self.listeners.clone();
        let order = self.order.clone();
        let forward = source.subscribe(move |event| {
            let Some(index) = lock(&order).iter().position(|&m| m == id) else {
                return;
            };
            listeners.notify(&CollectionEvent::MemberChanged {
                index,
                event: event.clone(),
            });
        });

        let index = self.members.len();
        let code = source.code().to_string();
        self.members.push(Member {
            id,
            source,
            _forward: forward,
        });
        self.sync_order();
        self.listeners.notify(&CollectionEvent::Added { index, code });
    }

    /// Remove the members at `offsets` and hand them back. Out-of-range and
    /// duplicate offsets are ignored.
    pub fn remove(&mut self, offsets: &[usize]) -> Vec<StatSource> {
        let offsets = self.valid_offsets(offsets);
        if offsets.is_empty() {
            return Vec::new();
        }

        let mut removed: Vec<StatSource> = offsets
            .iter()
            .rev()
            .map(|&i| self.members.remove(i).source)
            .collect();
        removed.reverse();
        self.sync_order();

        self.listeners.notify(&CollectionEvent::Removed {
            codes: removed.iter().map(|s| s.code().to_string()).collect(),
        });
        removed
    }

    /// Move the members at `offsets` so they sit, in their current relative
    /// order, just before the element that is at position `to` now (or at
    /// the end when `to >= len`). Other members keep their relative order.
    pub fn move_items(&mut self, offsets: &[usize], to: usize) {
        let offsets = self.valid_offsets(offsets);
        if offsets.is_empty() {
            return;
        }

        let to = to.min(self.members.len());
        let shift = offsets.iter().filter(|&&i| i < to).count();

        let mut moving: Vec<Member> = offsets
            .iter()
            .rev()
            .map(|&i| self.members.remove(i))
            .collect();
        moving.reverse();

        let dest = to - shift;
        self.members.splice(dest..dest, moving);
        self.sync_order();
        self.listeners.notify(&CollectionEvent::Moved);
    }

    pub fn get(&self, index: usize) -> Option<&StatSource> {
        self.members.get(index).map(|m| &m.source)
    }

    /// Members in display order.
    pub fn iter(&self) -> impl Iterator<Item = &StatSource> {
        self.members.iter().map(|m| &m.source)
    }

    /// All members in display order.
    pub fn all(&self) -> Vec<&StatSource> {
        self.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member codes in display order.
    pub fn codes(&self) -> Vec<String> {
        self.iter().map(|s| s.code().to_string()).collect()
    }

    /// Member codes as the comma-separated list `from_codes` accepts.
    pub fn codes_string(&self) -> String {
        self.codes().join(",")
    }

    /// Whether no member has a fetch outstanding.
    pub fn all_settled(&self) -> bool {
        self.iter().all(|s| s.state().is_settled())
    }

    /// Register for collection events, including every member change.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&CollectionEvent) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    fn sync_order(&self) {
        *lock(&self.order) = self.members.iter().map(|m| m.id).collect();
    }

    fn valid_offsets(&self, offsets: &[usize]) -> Vec<usize> {
        let mut offsets: Vec<usize> = offsets
            .iter()
            .copied()
            .filter(|&i| i < self.members.len())
            .collect();
        offsets.sort_unstable();
        offsets.dedup();
        offsets
    }
}

impl std::fmt::Debug for StatCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatCollection")
            .field("codes", &self.codes())
            .finish()
    }
}

/// Split a saved location list into codes, dropping blanks.
pub fn parse_codes(codes: &str) -> impl Iterator<Item = &str> {
    codes.split(',').map(str::trim).filter(|c| !c.is_empty())
}
