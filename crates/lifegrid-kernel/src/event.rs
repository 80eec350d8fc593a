//! World-changed notification.
//!
//! Subscribers are plain callbacks run synchronously after a tick or a reset
//! has fully completed.

use std::fmt;

/// Handle returned by [`ChangeNotifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

type Callback = Box<dyn FnMut()>;

/// List of world-changed callbacks.
#[derive(Default)]
pub struct ChangeNotifier {
    /// Callbacks in subscription order
    subscribers: Vec<(SubscriptionId, Callback)>,
    /// Next id to hand out
    next_id: u64,
}

impl ChangeNotifier {
    /// Creates a notifier with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut() + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a callback. Returns `false` if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    /// Runs every callback in subscription order.
    pub fn notify(&mut self) {
        for (_, callback) in &mut self.subscribers {
            callback();
        }
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.subscribers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_notify_runs_all() {
        let mut notifier = ChangeNotifier::new();
        let hits = Rc::new(Cell::new(0));
        for _ in 0..3 {
            let hits = Rc::clone(&hits);
            notifier.subscribe(move || hits.set(hits.get() + 1));
        }
        notifier.notify();
        assert_eq!(hits.get(), 3);
    }

    #[test]
    fn test_unsubscribe() {
        let mut notifier = ChangeNotifier::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let id = notifier.subscribe(move || counter.set(counter.get() + 1));

        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        notifier.notify();
        assert_eq!(hits.get(), 0);
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut notifier = ChangeNotifier::new();
        let a = notifier.subscribe(|| {});
        let b = notifier.subscribe(|| {});
        assert_ne!(a, b);
        assert!(a.raw() < b.raw());
    }
}
