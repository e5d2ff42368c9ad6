//! Entity manager
//!
//! Owns every live entity and drives their per-frame updates. Removal comes
//! in two forms:
//!
//! - [`EntityManager::remove_entity`] tears the entity down inside the call,
//!   after synchronously notifying listeners.
//! - [`EntityManager::queue_for_removal`] (and the `RequestEntityRemoval`
//!   event) park the entity in a FIFO that the next [`EntityManager::update`]
//!   drains before any entity is updated. This is the normal path for
//!   gameplay code, since it never mutates the update list mid-iteration.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use super::{EcsError, Entity, EntityId, IdAllocator};
use crate::config::EntityConfig;
use crate::events::{Event, EventKind, EventManager, ListenerId, PauseGame, RequestEntityRemoval};

#[derive(Default)]
struct EntityStore {
    entities: HashMap<EntityId, Rc<Entity>>,
    update_list: Vec<Rc<Entity>>,
    pending_removal: VecDeque<Rc<Entity>>,
    paused: bool,
}

impl EntityStore {
    fn lookup(store: &RefCell<Self>, id: EntityId) -> Option<Rc<Entity>> {
        store.borrow().entities.get(&id).cloned()
    }

    // Drops the entity from every collection and disposes it. The store is
    // not borrowed while component cleanup runs.
    fn finalize_removal(store: &RefCell<Self>, entity: &Rc<Entity>) {
        {
            let mut store = store.borrow_mut();
            store.update_list.retain(|candidate| !Rc::ptr_eq(candidate, entity));
            if store
                .entities
                .get(&entity.id())
                .is_some_and(|current| Rc::ptr_eq(current, entity))
            {
                store.entities.remove(&entity.id());
            }
        }

        if entity.is_disposed() {
            return;
        }
        let name = entity.full_name();
        entity.dispose();
        log::debug!("Removed entity {}", name);
    }

    fn handle_removal_request(store: &RefCell<Self>, events: &EventManager, id: EntityId) {
        let Some(entity) = Self::lookup(store, id) else {
            log::warn!("Request to remove non existing entity {}", id);
            return;
        };

        store.borrow_mut().pending_removal.push_back(Rc::clone(&entity));
        log::debug!("Entity {} queued for removal", id);
        // Triggered rather than queued so dependent systems drop the entity
        // in the same tick the request arrives.
        events.trigger_event(&Event::entity_removed(entity));
    }
}

/// Owns and manages all entities
pub struct EntityManager {
    store: Rc<RefCell<EntityStore>>,
    events: Rc<EventManager>,
    ids: IdAllocator,
    listeners: RefCell<Vec<(EventKind, ListenerId)>>,
    disposed: Cell<bool>,
}

impl EntityManager {
    /// Create the entity manager with default settings
    pub fn new(events: Rc<EventManager>) -> Self {
        Self::with_config(events, &EntityConfig::default())
    }

    /// Create the entity manager
    ///
    /// Registers for `RequestEntityRemoval` and `PauseGame` on `events`.
    pub fn with_config(events: Rc<EventManager>, config: &EntityConfig) -> Self {
        let store = Rc::new(RefCell::new(EntityStore {
            update_list: Vec::with_capacity(config.update_capacity),
            ..EntityStore::default()
        }));

        let removal = {
            let store = Rc::downgrade(&store);
            let bus = Rc::downgrade(&events);
            events.add_listener_for::<RequestEntityRemoval, _>(move |request| {
                if let (Some(store), Some(bus)) = (store.upgrade(), bus.upgrade()) {
                    EntityStore::handle_removal_request(&store, &bus, request.id);
                }
                Ok(())
            })
        };

        let pause = {
            let store = Rc::downgrade(&store);
            events.add_listener_for::<PauseGame, _>(move |pause| {
                if let Some(store) = store.upgrade() {
                    store.borrow_mut().paused = pause.paused;
                    log::info!("Entity updates {}", if pause.paused { "paused" } else { "resumed" });
                }
                Ok(())
            })
        };

        Self {
            store,
            events,
            ids: IdAllocator::new(),
            listeners: RefCell::new(vec![
                (EventKind::RequestEntityRemoval, removal),
                (EventKind::PauseGame, pause),
            ]),
            disposed: Cell::new(false),
        }
    }

    /// The next usable entity id; all entity creation should go through this
    pub fn next_id(&self) -> EntityId {
        self.ids.next_id()
    }

    /// The allocator behind [`EntityManager::next_id`], for entity factories
    pub fn id_allocator(&self) -> &IdAllocator {
        &self.ids
    }

    /// Create an empty entity with a fresh id
    ///
    /// The entity is not added; attach and initialize its components, then
    /// pass it to [`EntityManager::add_entity`].
    pub fn create_entity(&self, name: impl Into<String>) -> Result<Rc<Entity>, EcsError> {
        Entity::new(self.next_id(), name)
    }

    /// Add a fully built entity
    ///
    /// Fails on a duplicate id, leaving the existing entity untouched.
    /// Interested systems hear about the entity through a queued
    /// `EntityAdded` event.
    pub fn add_entity(&self, entity: Rc<Entity>) -> Result<(), EcsError> {
        let id = entity.id();
        if entity.is_disposed() {
            return Err(EcsError::Disposed(id));
        }

        {
            let mut store = self.store.borrow_mut();
            if store.entities.contains_key(&id) {
                return Err(EcsError::DuplicateEntity(id));
            }
            store.entities.insert(id, Rc::clone(&entity));
            if entity.needs_update() {
                store.update_list.push(Rc::clone(&entity));
            }
        }

        log::debug!("Added entity {}", entity.full_name());
        self.events.queue_event(Event::entity_added(entity));
        Ok(())
    }

    /// Remove an entity immediately, bypassing the removal queue
    ///
    /// Listeners see `EntityRemoved` before the entity is disposed. Do not
    /// call this while the entity list is being iterated; use
    /// [`EntityManager::queue_for_removal`] instead.
    pub fn remove_entity(&self, id: EntityId) {
        let Some(entity) = EntityStore::lookup(&self.store, id) else {
            log::warn!("Request to remove non existing entity {}", id);
            return;
        };

        self.events.trigger_event(&Event::entity_removed(Rc::clone(&entity)));
        EntityStore::finalize_removal(&self.store, &entity);
    }

    /// Queue an entity for removal at the start of the next update
    pub fn queue_for_removal(&self, id: EntityId) {
        let Some(entity) = EntityStore::lookup(&self.store, id) else {
            log::warn!("Tried to remove non existing entity {}", id);
            return;
        };

        self.store.borrow_mut().pending_removal.push_back(Rc::clone(&entity));
        self.events.queue_event(Event::entity_removed(entity));
        log::debug!("Entity {} queued for removal", id);
    }

    /// Retrieve an entity
    pub fn get_entity(&self, id: EntityId) -> Option<Rc<Entity>> {
        EntityStore::lookup(&self.store, id)
    }

    /// True if an entity with `id` is live
    pub fn contains(&self, id: EntityId) -> bool {
        self.store.borrow().entities.contains_key(&id)
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.store.borrow().entities.len()
    }

    /// True if no entity is live
    pub fn is_empty(&self) -> bool {
        self.store.borrow().entities.is_empty()
    }

    /// Number of entities in the per-frame update list
    pub fn update_count(&self) -> usize {
        self.store.borrow().update_list.len()
    }

    /// Number of entities waiting for the next update to remove them
    pub fn pending_removal_count(&self) -> usize {
        self.store.borrow().pending_removal.len()
    }

    /// True while updates are suspended
    pub fn is_paused(&self) -> bool {
        self.store.borrow().paused
    }

    /// Suspend or resume updates directly, without going through the event bus
    pub fn set_paused(&self, paused: bool) {
        self.store.borrow_mut().paused = paused;
    }

    /// Perform an update on all entities
    ///
    /// Does nothing while paused. Otherwise every entity queued for removal
    /// is removed first, then the remaining update entities run in the order
    /// they were added.
    pub fn update(&self, delta_time: f32) {
        if self.is_paused() {
            return;
        }

        loop {
            let next = self.store.borrow_mut().pending_removal.pop_front();
            let Some(entity) = next else {
                break;
            };
            EntityStore::finalize_removal(&self.store, &entity);
        }

        let entities = self.store.borrow().update_list.clone();
        for entity in entities {
            // Skips anything removed immediately by an earlier update.
            if !entity.is_disposed() {
                entity.update(delta_time);
            }
        }
    }

    /// Unregister listeners and dispose every live entity
    ///
    /// A second call does nothing.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        log::debug!("EntityManager disposing");

        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        for (kind, id) in listeners {
            self.events.remove_listener(kind, id);
        }

        let mut entities: Vec<Rc<Entity>> = {
            let mut store = self.store.borrow_mut();
            store.update_list.clear();
            store.pending_removal.clear();
            store.entities.drain().map(|(_, entity)| entity).collect()
        };
        entities.sort_by_key(|entity| entity.id());
        for entity in entities {
            entity.dispose();
        }
    }
}

impl Drop for EntityManager {
    fn drop(&mut self) {
        self.dispose();
    }
}
