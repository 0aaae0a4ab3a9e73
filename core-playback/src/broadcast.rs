//! # State Broadcast Fan-out
//!
//! Synchronous publish/subscribe registry for immutable state snapshots.
//!
//! ## Guarantees
//!
//! - Subscribers are notified in registration order.
//! - Each subscriber sees a monotonic sequence: a snapshot is never delivered
//!   after a newer one, even when publishers race on different threads.
//! - A new subscriber immediately receives the current snapshot and nothing
//!   older.
//! - Subscribing or unsubscribing from inside a callback is allowed. A
//!   subscriber removed mid-broadcast receives nothing further, including the
//!   rest of the in-flight broadcast.
//!
//! Callbacks run on the publishing thread, so they should be short. Registry
//! locks are never held while a callback runs.

use parking_lot::{ReentrantMutex, RwLock};
use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

type Callback<T> = Box<dyn Fn(&T) + Send + Sync>;

struct Versioned<T> {
    version: u64,
    value: Arc<T>,
}

struct Slot<T> {
    id: u64,
    /// Shared weakly with the [`Subscription`]; gone once the registry is.
    active: Arc<AtomicBool>,
    /// Serializes deliveries to this subscriber and remembers the newest
    /// version it has seen. Reentrant so a callback may publish.
    last_version: ReentrantMutex<Cell<u64>>,
    callback: Callback<T>,
}

impl<T> Slot<T> {
    fn deliver(&self, version: u64, value: &T) {
        let seen = self.last_version.lock();
        if !self.active.load(Ordering::Acquire) || version <= seen.get() {
            return;
        }
        seen.set(version);
        (self.callback)(value);
    }
}

struct Registry<T> {
    latest: RwLock<Versioned<T>>,
    slots: RwLock<Vec<Arc<Slot<T>>>>,
    next_id: AtomicU64,
}

impl<T> Registry<T> {
    fn remove(&self, id: u64) {
        let removed = {
            let mut slots = self.slots.write();
            slots
                .iter()
                .position(|slot| slot.id == id)
                .map(|index| slots.remove(index))
        };
        // Dropped outside the lock: the callback may own other subscriptions.
        if let Some(slot) = removed {
            slot.active.store(false, Ordering::Release);
        }
    }
}

/// Publish/subscribe registry holding the latest value of `T`.
pub struct StateBroadcaster<T> {
    registry: Arc<Registry<T>>,
}

impl<T> Clone for StateBroadcaster<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T: Send + Sync + 'static> StateBroadcaster<T> {
    pub fn new(initial: T) -> Self {
        Self {
            registry: Arc::new(Registry {
                latest: RwLock::new(Versioned {
                    version: 1,
                    value: Arc::new(initial),
                }),
                slots: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// The most recently published value.
    pub fn current(&self) -> Arc<T> {
        Arc::clone(&self.registry.latest.read().value)
    }

    pub fn version(&self) -> u64 {
        self.registry.latest.read().version
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.slots.read().len()
    }

    /// Replace the current value and notify every subscriber.
    pub fn publish(&self, value: T) {
        self.publish_with(move |_| value);
    }

    /// Build the next value from its version number, then fan it out.
    ///
    /// The version is assigned and stored atomically with the value, so
    /// concurrent publishers cannot reorder what `current()` returns.
    pub fn publish_with<F>(&self, build: F)
    where
        F: FnOnce(u64) -> T,
    {
        let (version, value) = {
            let mut latest = self.registry.latest.write();
            let version = latest.version + 1;
            let value = Arc::new(build(version));
            *latest = Versioned {
                version,
                value: Arc::clone(&value),
            };
            (version, value)
        };

        let slots = self.registry.slots.read().clone();
        for slot in slots {
            slot.deliver(version, &value);
        }
    }

    /// Register `callback`. It is called immediately with the current value,
    /// then with every later one until the returned [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));
        let slot = Arc::new(Slot {
            id,
            active: Arc::clone(&active),
            last_version: ReentrantMutex::new(Cell::new(0)),
            callback: Box::new(callback),
        });
        self.registry.slots.write().push(Arc::clone(&slot));

        let (version, value) = {
            let latest = self.registry.latest.read();
            (latest.version, Arc::clone(&latest.value))
        };
        slot.deliver(version, &value);

        let registry = Arc::downgrade(&self.registry);
        Subscription {
            active: Arc::downgrade(&active),
            remove: Some(Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    registry.remove(id);
                }
            })),
            id,
        }
    }
}

impl<T> fmt::Debug for StateBroadcaster<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateBroadcaster")
            .field("version", &self.registry.latest.read().version)
            .field("subscribers", &self.registry.slots.read().len())
            .finish()
    }
}

/// Handle for a registered subscriber. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    active: Weak<AtomicBool>,
    remove: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// `false` once the broadcaster that issued this handle is gone.
    pub fn is_active(&self) -> bool {
        self.active
            .upgrade()
            .is_some_and(|active| active.load(Ordering::Acquire))
    }

    /// Unsubscribe now. Equivalent to dropping the handle.
    pub fn unsubscribe(mut self) {
        self.cancel();
    }

    fn cancel(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_subscribe_receives_current_value() {
        let broadcaster = StateBroadcaster::new(7u32);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let _sub = broadcaster.subscribe(move |v| sink.lock().push(*v));
        broadcaster.publish(8);

        assert_eq!(*seen.lock(), vec![7, 8]);
        assert_eq!(*broadcaster.current(), 8);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let broadcaster = StateBroadcaster::new(0u32);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let sub = broadcaster.subscribe(move |v| sink.lock().push(*v));
        assert_eq!(broadcaster.subscriber_count(), 1);
        drop(sub);
        broadcaster.publish(1);

        assert_eq!(broadcaster.subscriber_count(), 0);
        assert_eq!(*seen.lock(), vec![0]);
    }

    #[test]
    fn test_subscription_outlives_broadcaster() {
        let broadcaster = StateBroadcaster::new(0u32);
        let sub = broadcaster.subscribe(|_| {});
        assert!(sub.is_active());
        drop(broadcaster);
        assert!(!sub.is_active());
        sub.unsubscribe();
    }

    #[test]
    fn test_version_increments_per_publish() {
        let broadcaster = StateBroadcaster::new(());
        let start = broadcaster.version();
        broadcaster.publish(());
        broadcaster.publish(());
        assert_eq!(broadcaster.version(), start + 2);
    }
}
