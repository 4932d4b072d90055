//! Subscription registry: event name to ordered subscriptions.

use crate::types::{Context, SubscriptionId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::types::{Handler, Subscription, SubscriptionKind};

/// Ordered subscriptions per event name.
///
/// Names with no subscriptions are never kept as keys. The lock is only
/// held for the duration of a single lookup or mutation; callers must not
/// invoke handlers while holding anything borrowed from here.
pub(crate) struct Registry<A: ?Sized> {
    /// Subscriptions by event name, in registration order.
    events: Mutex<HashMap<String, Vec<Subscription<A>>>>,
    /// Counter for generating subscription IDs.
    next_id: AtomicU64,
}

impl<A: ?Sized> Registry<A> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            events: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Append a subscription for `name`.
    ///
    /// Returns the new subscription's id and the number of subscriptions
    /// now registered under `name`.
    pub fn insert(
        &self,
        name: &str,
        handler: Handler<A>,
        context: Context,
        kind: SubscriptionKind,
    ) -> (SubscriptionId, usize) {
        // Allocate under the lock so ids follow append order.
        let mut events = self.events.lock();
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let subscription = Subscription {
            id,
            handler,
            context,
            kind,
        };

        let subs = events.entry(name.to_string()).or_default();
        subs.push(subscription);
        (id, subs.len())
    }

    /// Remove the first subscription matching `handler` and `context`.
    pub fn remove_matching(
        &self,
        name: &str,
        handler: &Handler<A>,
        context: &Context,
    ) -> Option<SubscriptionId> {
        self.remove_where(name, |sub| sub.matches(handler, context))
    }

    /// Remove the subscription with the given id.
    pub fn remove_by_id(&self, name: &str, id: SubscriptionId) -> bool {
        self.remove_where(name, |sub| sub.id == id).is_some()
    }

    fn remove_where<F>(&self, name: &str, predicate: F) -> Option<SubscriptionId>
    where
        F: Fn(&Subscription<A>) -> bool,
    {
        let mut events = self.events.lock();
        let subs = events.get_mut(name)?;
        let index = subs.iter().position(predicate)?;
        let removed = subs.remove(index);

        if subs.is_empty() {
            events.remove(name);
        }

        Some(removed.id)
    }

    /// Remove every subscription for `name`. Returns how many were removed.
    pub fn clear(&self, name: &str) -> usize {
        self.events.lock().remove(name).map_or(0, |subs| subs.len())
    }

    /// Remove every subscription.
    pub fn clear_all(&self) {
        self.events.lock().clear();
    }

    // --- Dispatch Helpers ---

    /// Copy of the current subscriptions for `name`.
    pub fn snapshot(&self, name: &str) -> Vec<Subscription<A>> {
        self.events
            .lock()
            .get(name)
            .map(|subs| subs.to_vec())
            .unwrap_or_default()
    }

    /// First current subscription for `name` registered after `after`.
    ///
    /// Ids increase along each sequence, so this is a binary search.
    pub fn next_after(&self, name: &str, after: Option<SubscriptionId>) -> Option<Subscription<A>> {
        let events = self.events.lock();
        let subs = events.get(name)?;
        let start = match after {
            None => 0,
            Some(last) => subs.partition_point(|sub| sub.id <= last),
        };
        subs.get(start).cloned()
    }

    // --- Introspection ---

    /// Number of subscriptions for `name`.
    pub fn len(&self, name: &str) -> usize {
        self.events.lock().get(name).map_or(0, Vec::len)
    }

    /// Whether no name has any subscription.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Names with at least one subscription, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.events.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

impl<A: ?Sized> Default for Registry<A> {
    fn default() -> Self {
        Self::new()
    }
}
