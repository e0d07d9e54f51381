//! Observable ordered set of the interactables an interactor currently holds.
//!
//! The acceptance logic that listens to the grab gates owns all mutation; the grab
//! controller only ever reads `len()` and `first()`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::event::{Listeners, SubscriptionId};
use crate::Interactable;

/// Shared handle passed to the controller and to the acceptance logic.
pub type GrabbedSetHandle = Rc<RefCell<GrabbedSet>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetEvent {
    Added(Interactable),
    Removed(Interactable),
    /// The set went from empty to non-empty.
    Populated,
    /// The set went from non-empty to empty.
    Emptied,
}

/// Insertion-ordered set of grabbed interactables.
///
/// Listeners run while the set is mutably borrowed, so they must not reach back into the
/// same [`GrabbedSetHandle`].
#[derive(Default)]
pub struct GrabbedSet {
    elements: Vec<Interactable>,
    listeners: Listeners<SetEvent>,
}

impl GrabbedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> GrabbedSetHandle {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Inserts `item` at the end. Returns `false` if an entry with the same object exists.
    pub fn add(&mut self, item: Interactable) -> bool {
        if self.contains(&item) {
            return false;
        }
        self.elements.push(item);
        debug!(object = %item.object, len = self.elements.len(), "grabbed object added");
        self.listeners.emit(&SetEvent::Added(item));
        if self.elements.len() == 1 {
            self.listeners.emit(&SetEvent::Populated);
        }
        true
    }

    pub fn remove(&mut self, item: &Interactable) -> bool {
        let Some(index) = self.elements.iter().position(|e| e.object == item.object) else {
            return false;
        };
        let removed = self.elements.remove(index);
        debug!(object = %removed.object, len = self.elements.len(), "grabbed object removed");
        self.listeners.emit(&SetEvent::Removed(removed));
        if self.elements.is_empty() {
            self.listeners.emit(&SetEvent::Emptied);
        }
        true
    }

    pub fn clear(&mut self) {
        while let Some(last) = self.elements.last().copied() {
            self.remove(&last);
        }
    }

    pub fn contains(&self, item: &Interactable) -> bool {
        self.elements.iter().any(|e| e.object == item.object)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn first(&self) -> Option<&Interactable> {
        self.elements.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interactable> {
        self.elements.iter()
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&SetEvent) + 'static,
    {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

impl fmt::Debug for GrabbedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrabbedSet")
            .field("elements", &self.elements)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
