//! Typed event registration.
//!
//! Each widget owns an [`EventBus`] for the notifications it publishes, so a
//! listener names the payload type it handles instead of a string event name.

use std::cell::Cell;
use std::fmt;

/// Identifier returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<T> = Box<dyn FnMut(&T)>;

/// Synchronous, single-threaded publisher for payloads of type `T`.
pub struct EventBus<T> {
    next_id: u64,
    handlers: Vec<(SubscriptionId, Handler<T>)>,
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl<T> EventBus<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            handlers: Vec::new(),
        }
    }

    /// Register a handler. Handlers run in registration order.
    pub fn subscribe(&mut self, handler: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(h, _)| *h != id);
        self.handlers.len() != before
    }

    /// Deliver `event` to every handler. Returns the number of handlers run.
    pub fn emit(&mut self, event: &T) -> usize {
        for (_, handler) in self.handlers.iter_mut() {
            handler(event);
        }
        self.handlers.len()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// A payload whose default action a listener may cancel.
#[derive(Debug)]
pub struct Cancelable<T> {
    pub detail: T,
    canceled: Cell<bool>,
}

impl<T> Cancelable<T> {
    pub fn new(detail: T) -> Self {
        Self {
            detail,
            canceled: Cell::new(false),
        }
    }

    pub fn prevent_default(&self) {
        self.canceled.set(true);
    }

    pub fn is_default_prevented(&self) -> bool {
        self.canceled.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_handlers_run_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();

        let first = Rc::clone(&seen);
        bus.subscribe(move |n: &u32| first.borrow_mut().push(("first", *n)));
        let second = Rc::clone(&seen);
        bus.subscribe(move |n: &u32| second.borrow_mut().push(("second", *n)));

        assert_eq!(bus.emit(&7), 2);
        assert_eq!(*seen.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(Cell::new(0));
        let mut bus = EventBus::new();
        let c = Rc::clone(&count);
        let id = bus.subscribe(move |_: &()| c.set(c.get() + 1));

        bus.emit(&());
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(&());

        assert_eq!(count.get(), 1);
        assert!(bus.is_empty());
    }

    #[test]
    fn test_cancelable() {
        let mut bus = EventBus::new();
        bus.subscribe(|e: &Cancelable<&str>| {
            if e.detail == "escape" {
                e.prevent_default();
            }
        });

        let event = Cancelable::new("escape");
        bus.emit(&event);
        assert!(event.is_default_prevented());

        let other = Cancelable::new("tab");
        bus.emit(&other);
        assert!(!other.is_default_prevented());
    }
}
