//! Render manager
//!
//! Keeps a flat list of every render component in the scene, maintained from
//! `EntityAdded`/`EntityRemoved` events, and draws it in depth order at a
//! fixed target frame rate. The list is only re-sorted after it changed.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::config::RenderConfig;
use crate::ecs::{ComponentHandle, Entity, EntityId};
use crate::events::{EntityAdded, EntityRemoved, EventKind, EventManager, ListenerId};

use super::{ClearColor, RenderTarget};

// Depth is read once, when the entity is added.
struct RenderEntry {
    entity_id: EntityId,
    entity: Weak<Entity>,
    component: ComponentHandle,
    depth: i32,
}

impl RenderEntry {
    fn new(entity: &Rc<Entity>, component: ComponentHandle) -> Option<Self> {
        let depth = {
            let Ok(borrowed) = component.try_borrow() else {
                log::warn!("Render component of entity {} was busy; not drawn", entity.id());
                return None;
            };
            let depth = borrowed.as_render()?.depth();
            depth
        };
        Some(Self {
            entity_id: entity.id(),
            entity: Rc::downgrade(entity),
            component,
            depth,
        })
    }

    fn is_live(&self) -> bool {
        self.entity.upgrade().is_some_and(|entity| !entity.is_disposed())
    }
}

#[derive(Default)]
struct DrawList {
    entries: Vec<RenderEntry>,
    dirty: bool,
}

impl DrawList {
    fn handle_entity_added(&mut self, entity: &Rc<Entity>) {
        // A queued add can arrive after the entity was already torn down.
        if entity.is_disposed() {
            return;
        }

        let before = self.entries.len();
        self.entries.extend(
            entity
                .components_with_render()
                .into_iter()
                .filter_map(|component| RenderEntry::new(entity, component)),
        );
        let added = self.entries.len() - before;
        if added > 0 {
            self.dirty = true;
            log::debug!("Added {} render components from entity {}", added, entity.id());
        }
    }

    fn handle_entity_removed(&mut self, entity_id: EntityId) {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.entity_id != entity_id);
        let removed = before - self.entries.len();
        if removed > 0 {
            self.dirty = true;
            log::debug!("Removed {} render components from entity {}", removed, entity_id);
        }
    }

    fn prune_dead(&mut self) {
        let before = self.entries.len();
        self.entries.retain(RenderEntry::is_live);
        let pruned = before - self.entries.len();
        if pruned > 0 {
            log::debug!("Pruned {} render components of disposed entities", pruned);
        }
    }
}

/// Manages the rendering of all render components
pub struct RenderManager {
    draw_list: Rc<RefCell<DrawList>>,
    events: Rc<EventManager>,
    listeners: RefCell<Vec<(EventKind, ListenerId)>>,
    frame_interval: f32,
    clear_color: ClearColor,
    time_since_last_render: Cell<f32>,
    disposed: Cell<bool>,
}

impl RenderManager {
    /// Create the render manager and subscribe it to entity lifecycle events
    pub fn new(events: Rc<EventManager>, config: &RenderConfig) -> Self {
        let draw_list = Rc::new(RefCell::new(DrawList::default()));

        let added = {
            let draw_list = Rc::downgrade(&draw_list);
            events.add_listener_for::<EntityAdded, _>(move |added| {
                if let Some(draw_list) = draw_list.upgrade() {
                    draw_list.borrow_mut().handle_entity_added(&added.entity);
                }
                Ok(())
            })
        };

        let removed = {
            let draw_list = Rc::downgrade(&draw_list);
            events.add_listener_for::<EntityRemoved, _>(move |removed| {
                if let Some(draw_list) = draw_list.upgrade() {
                    draw_list.borrow_mut().handle_entity_removed(removed.entity.id());
                }
                Ok(())
            })
        };

        Self {
            draw_list,
            events,
            listeners: RefCell::new(vec![
                (EventKind::EntityAdded, added),
                (EventKind::EntityRemoved, removed),
            ]),
            frame_interval: config.frame_interval(),
            clear_color: config.clear_color,
            time_since_last_render: Cell::new(0.0),
            disposed: Cell::new(false),
        }
    }

    /// Seconds between two draw passes
    pub fn frame_interval(&self) -> f32 {
        self.frame_interval
    }

    /// Number of render components being drawn
    pub fn len(&self) -> usize {
        self.draw_list.borrow().entries.len()
    }

    /// True if there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.draw_list.borrow().entries.is_empty()
    }

    /// True if the list changed since it was last sorted
    pub fn is_dirty(&self) -> bool {
        self.draw_list.borrow().dirty
    }

    /// Accumulate frame time and draw once a full frame interval has passed
    ///
    /// Returns true if a draw happened and the target needs presenting.
    pub fn update(&self, delta_time: f32, target: &mut dyn RenderTarget) -> bool {
        let elapsed = self.time_since_last_render.get() + delta_time;
        if elapsed < self.frame_interval {
            self.time_since_last_render.set(elapsed);
            return false;
        }
        self.time_since_last_render.set(0.0);

        self.draw(target);
        true
    }

    /// Draw everything to the target, ignoring the frame rate timer
    pub fn draw(&self, target: &mut dyn RenderTarget) {
        let components: Vec<ComponentHandle> = {
            let mut draw_list = self.draw_list.borrow_mut();
            draw_list.prune_dead();
            if draw_list.dirty {
                // Stable: equal depths keep their insertion order.
                draw_list.entries.sort_by_key(|entry| entry.depth);
                draw_list.dirty = false;
                log::trace!("Sorted {} render components", draw_list.entries.len());
            }
            draw_list
                .entries
                .iter()
                .map(|entry| Rc::clone(&entry.component))
                .collect()
        };

        target.clear(self.clear_color);

        for component in components {
            match component.try_borrow() {
                Ok(component) => {
                    if let Some(render) = component.as_render() {
                        render.draw(target);
                    }
                }
                Err(_) => log::warn!("Skipped render component that is borrowed elsewhere"),
            }
        }
    }

    /// Unsubscribe from events and drop the draw list
    ///
    /// A second call does nothing.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }

        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        for (kind, id) in listeners {
            self.events.remove_listener(kind, id);
        }
        self.draw_list.borrow_mut().entries.clear();
        log::debug!("RenderManager disposed");
    }
}

impl Drop for RenderManager {
    fn drop(&mut self) {
        self.dispose();
    }
}
