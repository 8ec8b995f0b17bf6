//! Explicit observer lists with handle-based unsubscription.
//!
//! Every fan-out in the crate (container resizes, chart lifecycle events and
//! data feed updates) goes through [`Observers`]. Subscribing returns a
//! [`Subscription`]; the callback stays registered until the handle is
//! unsubscribed or dropped.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Weak};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T> {
    next_id: u64,
    callbacks: BTreeMap<u64, Callback<T>>,
}

/// A list of callbacks notified in subscription order.
pub struct Observers<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: 'static> Observers<T> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                callbacks: BTreeMap::new(),
            })),
        }
    }

    /// Register `callback`. Dropping the returned handle unsubscribes it.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = match self.registry.lock() {
            Ok(mut registry) => {
                let id = registry.next_id;
                registry.next_id += 1;
                registry.callbacks.insert(id, Arc::new(callback));
                id
            }
            Err(_) => {
                log::error!("observer registry poisoned; subscription ignored");
                return Subscription { cancel: None };
            }
        };

        let weak: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    if let Ok(mut registry) = registry.lock() {
                        registry.callbacks.remove(&id);
                    }
                }
            })),
        }
    }

    /// Call every registered callback with `value`.
    ///
    /// The registry lock is released before callbacks run, so a callback may
    /// subscribe or unsubscribe without deadlocking. Returns how many
    /// callbacks were invoked.
    pub fn notify(&self, value: &T) -> usize {
        let callbacks: Vec<Callback<T>> = match self.registry.lock() {
            Ok(registry) => registry.callbacks.values().cloned().collect(),
            Err(_) => return 0,
        };
        for callback in &callbacks {
            callback(value);
        }
        callbacks.len()
    }

    pub fn len(&self) -> usize {
        self.registry
            .lock()
            .map(|registry| registry.callbacks.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Observers<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

/// Handle returned by [`Observers::subscribe`].
///
/// After `unsubscribe` returns (or the handle is dropped) the callback is
/// never invoked by a notification that starts later.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    /// Keep the callback registered for as long as the observer list lives.
    pub fn detach(mut self) {
        self.cancel = None;
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
