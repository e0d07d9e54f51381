//! Synchronous publish/subscribe fan-out.
//!
//! Every observable piece of the interactor (the grab action, both collision gates and the
//! grabbed-object registry) exposes its events through a [`Listeners`] list. Emission is
//! synchronous and runs subscribers in subscription order.

use std::fmt;

/// Handle returned by [`Listeners::subscribe`], used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback<E> = Box<dyn FnMut(&E)>;

/// An ordered list of event callbacks.
pub struct Listeners<E> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Callback<E>)>,
}

impl<E> Listeners<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Registers a callback. It runs after every callback registered before it.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&E) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(callback)));
        id
    }

    /// Removes a callback. Returns `false` if the id was unknown (already removed).
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Invokes every current subscriber with `event`. Returns how many ran.
    pub fn emit(&mut self, event: &E) -> usize {
        for (_, callback) in self.entries.iter_mut() {
            callback(event);
        }
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.entries.len())
            .finish()
    }
}
