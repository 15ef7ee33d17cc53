//! Change listeners for the project collection
//!
//! A [`Listeners`] registry holds callbacks that receive the full collection
//! after every persisted change. Registering returns a [`Subscription`];
//! dropping it or calling [`Subscription::cancel`] removes the callback.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::debug;

use super::data::ProjectRecord;

type Callback = Arc<dyn Fn(&[ProjectRecord]) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<(u64, Callback)>,
}

/// Cloneable handle to a set of change callbacks
#[derive(Clone, Default)]
pub struct Listeners {
    inner: Arc<Mutex<Registry>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a callback, returning the handle that keeps it alive
    pub fn register<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&[ProjectRecord]) + Send + Sync + 'static,
    {
        let mut registry = self.registry();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.entries.push((id, Arc::new(callback)));

        debug!(subscription = id, "listener registered");

        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Invoke every registered callback with `records`.
    /// Callbacks run outside the registry lock, so they may (un)subscribe.
    pub fn notify(&self, records: &[ProjectRecord]) {
        let callbacks: Vec<Callback> = self
            .registry()
            .entries
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for callback in callbacks {
            callback(records);
        }
    }

    /// Number of live subscriptions
    fn len(&self) -> usize {
        self.registry().entries.len()
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.len())
            .finish()
    }
}

/// Handle of one registered callback
#[must_use = "dropping a Subscription cancels it"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Stop receiving changes
    pub fn cancel(self) {
        // removal happens in Drop
    }

    fn remove(&self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry.entries.retain(|(id, _)| *id != self.id);
            debug!(subscription = self.id, "listener cancelled");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter(listeners: &Listeners) -> (Arc<AtomicUsize>, Subscription) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let sub = listeners.register(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (count, sub)
    }

    #[test]
    fn test_notify_reaches_every_listener() {
        let listeners = Listeners::new();
        let (a, _sub_a) = counter(&listeners);
        let (b, _sub_b) = counter(&listeners);

        listeners.notify(&[]);

        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancelled_listener_is_silent() {
        let listeners = Listeners::new();
        let (a, sub_a) = counter(&listeners);
        let (b, _sub_b) = counter(&listeners);

        sub_a.cancel();
        listeners.notify(&[]);

        assert_eq!(a.load(Ordering::SeqCst), 0);
        assert_eq!(b.load(Ordering::SeqCst), 1);
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn test_drop_after_registry_is_gone() {
        let listeners = Listeners::new();
        let (_, sub) = counter(&listeners);

        drop(listeners);
        drop(sub);
    }
}
