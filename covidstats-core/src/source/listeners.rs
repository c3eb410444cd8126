//! Listener registration with unsubscribe-on-drop handles.
//!
//! `notify` runs every callback synchronously on the calling thread. Callers
//! that need effects on a particular thread (a UI loop) forward the event
//! over a channel from inside the callback.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Registry<E> {
    next_id: u64,
    listeners: Vec<(u64, Listener<E>)>,
}

/// A set of callbacks interested in events of type `E`.
///
/// Cloning yields another handle to the same set.
pub struct ListenerSet<E> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E> Clone for ListenerSet<E> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<E: 'static> Default for ListenerSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> ListenerSet<E> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Register `listener`. It stays registered until the returned
    /// subscription is cancelled or dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push((id, Arc::new(listener)));
            id
        };

        let weak: Weak<Mutex<Registry<E>>> = Arc::downgrade(&self.registry);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    lock(&registry).listeners.retain(|(lid, _)| *lid != id);
                }
            })),
        }
    }

    /// Invoke every registered listener with `event`.
    ///
    /// The listener list is copied before dispatch, so a callback may
    /// subscribe or unsubscribe without deadlocking.
    pub fn notify(&self, event: &E) {
        let listeners: Vec<Listener<E>> = lock(&self.registry)
            .listeners
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.registry).listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle for one registered listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the listener immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Unsubscribe now.
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Lock a mutex, recovering the data if a listener panicked while it was held.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn notifies_every_listener() {
        let set: ListenerSet<u32> = ListenerSet::new();
        let total = Arc::new(AtomicUsize::new(0));

        let t1 = total.clone();
        let _a = set.subscribe(move |v| {
            t1.fetch_add(*v as usize, Ordering::SeqCst);
        });
        let t2 = total.clone();
        let _b = set.subscribe(move |v| {
            t2.fetch_add(*v as usize * 10, Ordering::SeqCst);
        });

        set.notify(&2);
        assert_eq!(total.load(Ordering::SeqCst), 22);
    }

    #[test]
    fn drop_unsubscribes() {
        let set: ListenerSet<()> = ListenerSet::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h = hits.clone();
        let sub = set.subscribe(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        set.notify(&());
        drop(sub);
        set.notify(&());

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(set.is_empty());
    }

    #[test]
    fn cancel_unsubscribes_only_that_listener() {
        let set: ListenerSet<()> = ListenerSet::new();
        let a = set.subscribe(|_| {});
        let _b = set.subscribe(|_| {});
        assert_eq!(set.len(), 2);
        a.cancel();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn subscription_outliving_set_is_harmless() {
        let set: ListenerSet<()> = ListenerSet::new();
        let sub = set.subscribe(|_| {});
        drop(set);
        drop(sub);
    }

    #[test]
    fn listener_may_subscribe_during_notify() {
        let set: ListenerSet<()> = ListenerSet::new();
        let inner = set.clone();
        let held = Arc::new(Mutex::new(Vec::new()));
        let held2 = held.clone();
        let _sub = set.subscribe(move |_| {
            let s = inner.subscribe(|_| {});
            lock(&held2).push(s);
        });
        set.notify(&());
        assert_eq!(set.len(), 2);
    }
}
