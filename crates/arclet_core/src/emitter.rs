//! Completion notification channels
//!
//! An [`EventEmitter`] is the single output of a widget: a one-to-many
//! channel that listeners subscribe to, optionally for one event only.
//! Completing the emitter drops every listener and silences later
//! emissions, which is how a disposed widget guarantees that no late
//! callback reaches it.
//!
//! Emission is reentrant. A listener may subscribe, unsubscribe, complete
//! the channel or emit on other channels while it runs. Listeners added
//! during an emission are first called on the next one.
//!
//! # Example
//!
//! ```rust
//! use arclet_core::emitter::EventEmitter;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let done: EventEmitter<u32> = EventEmitter::new();
//! let seen = Rc::new(Cell::new(0));
//!
//! let seen_clone = seen.clone();
//! done.once(move |v| seen_clone.set(*v));
//!
//! done.emit(&7);
//! done.emit(&8);
//! assert_eq!(seen.get(), 7);
//! ```

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

new_key_type! {
    /// Handle to a registered listener
    pub struct ListenerId;
}

enum Callback<T> {
    Persistent(Box<dyn FnMut(&T)>),
    Once(Box<dyn FnOnce(&T)>),
}

struct EmitterInner<T> {
    /// `None` while the listener is running
    callbacks: RefCell<SlotMap<ListenerId, Option<Callback<T>>>>,
    /// Registration order
    order: RefCell<SmallVec<[ListenerId; 4]>>,
    stopped: Cell<bool>,
}

impl<T> EmitterInner<T> {
    fn remove(&self, id: ListenerId) -> Option<Option<Callback<T>>> {
        let removed = self.callbacks.borrow_mut().remove(id);
        if removed.is_some() {
            self.order.borrow_mut().retain(|other| *other != id);
        }
        removed
    }
}

trait Unsubscribe {
    fn unsubscribe(&self, id: ListenerId);
}

impl<T> Unsubscribe for EmitterInner<T> {
    fn unsubscribe(&self, id: ListenerId) {
        // Dropped outside of the borrow
        let _callback = self.remove(id);
    }
}

/// A one-to-many event channel
pub struct EventEmitter<T: 'static> {
    inner: Rc<EmitterInner<T>>,
}

impl<T: 'static> EventEmitter<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(EmitterInner {
                callbacks: RefCell::new(SlotMap::with_key()),
                order: RefCell::new(SmallVec::new()),
                stopped: Cell::new(false),
            }),
        }
    }

    /// Listen to every event until unsubscribed
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&T) + 'static,
    {
        self.register(Callback::Persistent(Box::new(callback)))
    }

    /// Listen to the next event only
    pub fn once<F>(&self, callback: F) -> Subscription
    where
        F: FnOnce(&T) + 'static,
    {
        self.register(Callback::Once(Box::new(callback)))
    }

    fn register(&self, callback: Callback<T>) -> Subscription {
        if self.inner.stopped.get() {
            tracing::debug!("EventEmitter: subscribe after complete ignored");
            return Subscription::inert();
        }

        let id = self.inner.callbacks.borrow_mut().insert(Some(callback));
        self.inner.order.borrow_mut().push(id);

        let weak: Weak<dyn Unsubscribe> = Rc::downgrade(&self.inner) as Weak<dyn Unsubscribe>;
        Subscription {
            id: Some(id),
            emitter: weak,
            closed: Rc::new(Cell::new(false)),
        }
    }

    /// Deliver an event to the current listeners
    pub fn emit(&self, value: &T) {
        if self.inner.stopped.get() {
            return;
        }

        let ids: SmallVec<[ListenerId; 4]> = self.inner.order.borrow().clone();

        for id in ids {
            if self.inner.stopped.get() {
                break;
            }

            let callback = {
                let mut callbacks = self.inner.callbacks.borrow_mut();
                match callbacks.get_mut(id).and_then(Option::take) {
                    Some(Callback::Once(f)) => {
                        callbacks.remove(id);
                        drop(callbacks);
                        self.inner.order.borrow_mut().retain(|other| *other != id);
                        Some(Callback::Once(f))
                    }
                    other => other,
                }
            };

            match callback {
                Some(Callback::Once(f)) => f(value),
                Some(Callback::Persistent(mut f)) => {
                    f(value);
                    // Put it back unless it was removed while running
                    if let Some(slot) = self.inner.callbacks.borrow_mut().get_mut(id) {
                        *slot = Some(Callback::Persistent(f));
                    }
                }
                // Already running further up the stack
                None => {}
            }
        }
    }

    /// Close the channel, dropping every listener
    pub fn complete(&self) {
        if self.inner.stopped.replace(true) {
            return;
        }

        let drained = std::mem::take(&mut *self.inner.callbacks.borrow_mut());
        self.inner.order.borrow_mut().clear();
        drop(drained);
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.get()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.order.borrow().len()
    }
}

impl<T: 'static> Default for EventEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Clones share the same channel
impl<T: 'static> Clone for EventEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> fmt::Debug for EventEmitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listener_count())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Handle returned when subscribing
///
/// Dropping the handle keeps the listener registered. Call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Clone)]
pub struct Subscription {
    id: Option<ListenerId>,
    emitter: Weak<dyn Unsubscribe>,
    closed: Rc<Cell<bool>>,
}

impl Subscription {
    fn inert() -> Self {
        let emitter: Weak<dyn Unsubscribe> = Weak::<EmitterInner<()>>::new();
        Self {
            id: None,
            emitter,
            closed: Rc::new(Cell::new(true)),
        }
    }

    /// Remove the listener. Calling it again does nothing.
    pub fn unsubscribe(&self) {
        if self.closed.replace(true) {
            return;
        }
        if let (Some(id), Some(emitter)) = (self.id, self.emitter.upgrade()) {
            emitter.unsubscribe(id);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get() || self.emitter.strong_count() == 0
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}
