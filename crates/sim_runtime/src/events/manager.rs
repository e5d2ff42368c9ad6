//! Publish/subscribe event bus
//!
//! Listeners register per [`EventKind`]. Events are either triggered (all
//! listeners run before `trigger_event` returns) or queued and delivered by
//! [`EventManager::dispatch_queued`], which the frame loop calls once per
//! frame before entity updates.
//!
//! The manager is shared as `Rc<EventManager>` and every method takes
//! `&self`, so listeners may queue, trigger, add or remove listeners while a
//! dispatch is in progress. No internal borrow is held while a listener runs.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use slotmap::SlotMap;

use super::{Event, EventKind, EventType};

slotmap::new_key_type! {
    /// Handle returned by listener registration, used to unregister
    pub struct ListenerId;
}

/// Error returned by a listener; logged by the dispatcher and otherwise ignored
#[derive(thiserror::Error, Debug)]
pub enum ListenerError {
    /// The listener could not handle the event
    #[error("Listener failed: {0}")]
    Failed(String),
}

type Listener = Rc<dyn Fn(&Event) -> Result<(), ListenerError>>;

struct Registration {
    kind: EventKind,
    listener: Listener,
}

/// Event bus with typed registration, immediate trigger and a deferred FIFO queue
#[derive(Default)]
pub struct EventManager {
    registrations: RefCell<SlotMap<ListenerId, Registration>>,
    by_kind: RefCell<HashMap<EventKind, Vec<ListenerId>>>,
    queue: RefCell<VecDeque<Event>>,
}

impl EventManager {
    /// Create a new empty event manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one event kind
    ///
    /// Listeners of the same kind run in registration order.
    pub fn add_listener<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&Event) -> Result<(), ListenerError> + 'static,
    {
        let id = self.registrations.borrow_mut().insert(Registration {
            kind,
            listener: Rc::new(listener),
        });
        self.by_kind.borrow_mut().entry(kind).or_default().push(id);
        log::trace!("Listener {:?} registered for {}", id, kind);
        id
    }

    /// Register a listener that receives the payload type directly
    pub fn add_listener_for<E, F>(&self, listener: F) -> ListenerId
    where
        E: EventType,
        F: Fn(&E) -> Result<(), ListenerError> + 'static,
    {
        self.add_listener(E::KIND, move |event| match E::from_event(event) {
            Some(payload) => listener(payload),
            None => Ok(()),
        })
    }

    /// Unregister a listener
    ///
    /// Returns false if `id` was not registered for `kind`; that is not an error.
    pub fn remove_listener(&self, kind: EventKind, id: ListenerId) -> bool {
        {
            let mut registrations = self.registrations.borrow_mut();
            match registrations.get(id) {
                Some(registration) if registration.kind == kind => {
                    registrations.remove(id);
                }
                _ => return false,
            }
        }

        if let Some(ids) = self.by_kind.borrow_mut().get_mut(&kind) {
            ids.retain(|registered| *registered != id);
        }
        log::trace!("Listener {:?} removed from {}", id, kind);
        true
    }

    /// Typed counterpart of [`EventManager::remove_listener`]
    pub fn remove_listener_for<E: EventType>(&self, id: ListenerId) -> bool {
        self.remove_listener(E::KIND, id)
    }

    /// Number of listeners currently registered for `kind`
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.by_kind.borrow().get(&kind).map_or(0, Vec::len)
    }

    /// Append an event to the queue; no listener runs now
    pub fn queue_event(&self, event: impl Into<Event>) {
        let event = event.into();
        log::trace!("Queued {}", event.kind());
        self.queue.borrow_mut().push_back(event);
    }

    /// Deliver an event to its listeners before returning
    ///
    /// The listener list is captured when the call starts: listeners added
    /// during delivery wait for the next event, listeners removed during
    /// delivery are skipped.
    pub fn trigger_event(&self, event: &Event) {
        let kind = event.kind();
        let targets: Vec<(ListenerId, Listener)> = {
            let by_kind = self.by_kind.borrow();
            let registrations = self.registrations.borrow();
            by_kind
                .get(&kind)
                .map(|ids| {
                    ids.iter()
                        .filter_map(|id| {
                            registrations
                                .get(*id)
                                .map(|registration| (*id, Rc::clone(&registration.listener)))
                        })
                        .collect()
                })
                .unwrap_or_default()
        };

        for (id, listener) in targets {
            if !self.registrations.borrow().contains_key(id) {
                continue;
            }
            if let Err(error) = listener(event) {
                log::error!("Listener {:?} failed handling {}: {}", id, kind, error);
            }
        }
    }

    /// Deliver every queued event, including events queued while draining
    ///
    /// Returns the number of events delivered.
    pub fn dispatch_queued(&self) -> usize {
        let mut dispatched = 0;
        loop {
            // The queue borrow must end before the listeners run.
            let next = self.queue.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            self.trigger_event(&event);
            dispatched += 1;
        }
        dispatched
    }

    /// Number of events waiting in the queue
    pub fn queued_len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Drop every queued event without delivering it
    pub fn clear_queue(&self) {
        let dropped = {
            let mut queue = self.queue.borrow_mut();
            let dropped = queue.len();
            queue.clear();
            dropped
        };
        if dropped > 0 {
            log::debug!("Discarded {} queued events", dropped);
        }
    }
}
