//! The two-state grab action and its control-input binding.

use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::event::{Listeners, SubscriptionId};

/// Any boolean-producing control (trigger, grip, key, virtual button).
pub trait ControlInput {
    fn is_pressed(&self) -> bool;
}

/// Notifications emitted by [`BooleanAction`] when its value changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionEvent {
    /// Emitted first on every change, carrying the new value.
    ValueChanged(bool),
    /// Released to pressed.
    Activated,
    /// Pressed to released.
    Deactivated,
}

type InputFilter = Box<dyn Fn(bool) -> bool>;

/// A pressed/released action with change notification.
///
/// The value only moves through [`BooleanAction::receive`], and every change is reported to
/// listeners exactly once.
#[derive(Default)]
pub struct BooleanAction {
    value: bool,
    sources: Vec<Rc<dyn ControlInput>>,
    filter: Option<InputFilter>,
    listeners: Listeners<ActionEvent>,
}

impl BooleanAction {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` while pressed.
    pub fn value(&self) -> bool {
        self.value
    }

    /// Delivers a new value. The optional filter may transform or veto it; listeners only
    /// hear about it if the stored value actually changed.
    pub fn receive(&mut self, value: bool) {
        let value = match &self.filter {
            Some(filter) => filter(value),
            None => value,
        };
        if value == self.value {
            return;
        }

        self.value = value;
        self.listeners.emit(&ActionEvent::ValueChanged(value));
        let edge = if value {
            ActionEvent::Activated
        } else {
            ActionEvent::Deactivated
        };
        self.listeners.emit(&edge);
    }

    pub fn set_filter<F>(&mut self, filter: F)
    where
        F: Fn(bool) -> bool + 'static,
    {
        self.filter = Some(Box::new(filter));
    }

    pub fn clear_filter(&mut self) {
        self.filter = None;
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ActionEvent) + 'static,
    {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn clear_sources(&mut self) {
        self.sources.clear();
    }

    pub fn add_source(&mut self, source: Rc<dyn ControlInput>) {
        self.sources.push(source);
    }

    /// Replaces every bound source with `source`. `None` leaves the current binding alone.
    pub fn bind(&mut self, source: Option<Rc<dyn ControlInput>>) {
        let Some(source) = source else {
            debug!("ignoring bind of empty control source");
            return;
        };
        self.clear_sources();
        self.add_source(source);
        debug!("grab action bound to a new control source");
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Reads the bound source, if any. Any pressed source counts as pressed.
    pub fn sample_source(&self) -> Option<bool> {
        if self.sources.is_empty() {
            return None;
        }
        Some(self.sources.iter().any(|s| s.is_pressed()))
    }
}

impl fmt::Debug for BooleanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BooleanAction")
            .field("value", &self.value)
            .field("sources", &self.sources.len())
            .field("filtered", &self.filter.is_some())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    struct Button(Cell<bool>);

    impl ControlInput for Button {
        fn is_pressed(&self) -> bool {
            self.0.get()
        }
    }

    fn record(action: &mut BooleanAction) -> Rc<RefCell<Vec<ActionEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        action.subscribe(move |e| sink.borrow_mut().push(*e));
        log
    }

    #[test]
    fn receive_reports_each_change_once() {
        let mut action = BooleanAction::new();
        let log = record(&mut action);

        action.receive(true);
        action.receive(true);
        action.receive(false);

        assert_eq!(
            *log.borrow(),
            vec![
                ActionEvent::ValueChanged(true),
                ActionEvent::Activated,
                ActionEvent::ValueChanged(false),
                ActionEvent::Deactivated,
            ]
        );
    }

    #[test]
    fn filter_can_veto_presses() {
        let mut action = BooleanAction::new();
        let log = record(&mut action);
        action.set_filter(|_| false);

        action.receive(true);
        assert!(!action.value());
        assert!(log.borrow().is_empty());

        action.clear_filter();
        action.receive(true);
        assert!(action.value());
    }

    #[test]
    fn bind_replaces_previous_sources() {
        let mut action = BooleanAction::new();
        let first = Rc::new(Button(Cell::new(true)));
        let second = Rc::new(Button(Cell::new(false)));

        action.add_source(first.clone());
        action.add_source(first);
        assert_eq!(action.source_count(), 2);

        action.bind(Some(second.clone()));
        assert_eq!(action.source_count(), 1);
        assert_eq!(action.sample_source(), Some(false));

        second.0.set(true);
        assert_eq!(action.sample_source(), Some(true));
    }

    #[test]
    fn binding_nothing_is_a_no_op() {
        let mut action = BooleanAction::new();
        action.bind(Some(Rc::new(Button(Cell::new(true)))));

        action.bind(None);

        assert_eq!(action.source_count(), 1);
        assert_eq!(action.sample_source(), Some(true));
    }

    #[test]
    fn unbound_action_has_no_sample() {
        let action = BooleanAction::new();
        assert_eq!(action.sample_source(), None);
    }
}
