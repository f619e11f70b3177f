//! Synchronous change notification.
//!
//! Views declare which pieces of state they read by subscribing to one or
//! more [`StateKey`]s. Every successful mutation of that state calls the
//! subscribers in registration order, on the current thread, before the
//! mutating call returns.

use std::fmt;

use log::debug;

use crate::individuals::Individuals;
use crate::sample_sets::SampleSets;

/// A piece of shared state a view can depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateKey {
    SampleSets,
    Individuals,
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StateKey::SampleSets => "sample_sets",
            StateKey::Individuals => "individuals",
        })
    }
}

/// Handle returned by [`Observers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Callback invoked with the key that changed and the registries as they
/// are after the change.
pub type Callback = Box<dyn FnMut(StateKey, &SampleSets, &Individuals)>;

struct Observer {
    subscription: Subscription,
    keys: Vec<StateKey>,
    callback: Callback,
}

#[derive(Default)]
pub struct Observers {
    next: u64,
    observers: Vec<Observer>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, keys: &[StateKey], callback: Callback) -> Subscription {
        let subscription = Subscription(self.next);
        self.next += 1;
        self.observers.push(Observer {
            subscription,
            keys: keys.to_vec(),
            callback,
        });
        subscription
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| o.subscription != subscription);
        self.observers.len() != before
    }

    /// Calls every observer subscribed to `key`.
    pub fn notify(&mut self, key: StateKey, sample_sets: &SampleSets, individuals: &Individuals) {
        let mut notified = 0;
        for observer in self.observers.iter_mut().filter(|o| o.keys.contains(&key)) {
            (observer.callback)(key, sample_sets, individuals);
            notified += 1;
        }
        debug!("{} changed, notified {} observer(s)", key, notified);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("subscriptions", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_only_matching_observers_are_called() {
        let calls = Rc::new(RefCell::new(vec![]));
        let mut observers = Observers::new();

        let log = Rc::clone(&calls);
        observers.subscribe(
            &[StateKey::SampleSets],
            Box::new(move |key, _, _| log.borrow_mut().push(("sets", key))),
        );
        let log = Rc::clone(&calls);
        observers.subscribe(
            &[StateKey::SampleSets, StateKey::Individuals],
            Box::new(move |key, _, _| log.borrow_mut().push(("both", key))),
        );

        let (sets, inds) = (SampleSets::new(), Individuals::new());
        observers.notify(StateKey::Individuals, &sets, &inds);
        observers.notify(StateKey::SampleSets, &sets, &inds);

        assert_eq!(
            *calls.borrow(),
            vec![
                ("both", StateKey::Individuals),
                ("sets", StateKey::SampleSets),
                ("both", StateKey::SampleSets),
            ]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let calls = Rc::new(RefCell::new(0));
        let mut observers = Observers::new();
        let counter = Rc::clone(&calls);
        let subscription = observers.subscribe(
            &[StateKey::Individuals],
            Box::new(move |_, _, _| *counter.borrow_mut() += 1),
        );
        assert!(observers.unsubscribe(subscription));
        assert!(!observers.unsubscribe(subscription));
        observers.notify(StateKey::Individuals, &SampleSets::new(), &Individuals::new());
        assert_eq!(*calls.borrow(), 0);
    }
}
