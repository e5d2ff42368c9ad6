//! Entity implementation
//!
//! An entity is an id, an optional name and a set of components keyed by
//! concrete type. Components are shared handles so that siblings and the
//! render manager can hold on to them; the entity remains their owner and is
//! the only thing that disposes them.

use std::any::{type_name, Any, TypeId};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::{Component, ComponentError, ComponentHandle, EcsError, EntityId};

struct ComponentSlot {
    name: &'static str,
    handle: ComponentHandle,
    // Same allocation as `handle`, kept as `Any` for typed lookups.
    typed: Rc<dyn Any>,
}

/// A bag of components with an id
pub struct Entity {
    id: EntityId,
    name: String,
    components: RefCell<HashMap<TypeId, ComponentSlot>>,
    attach_order: RefCell<Vec<TypeId>>,
    update_components: RefCell<Vec<ComponentHandle>>,
    needs_update: Cell<bool>,
    disposed: Cell<bool>,
}

impl Entity {
    /// Create a new, empty entity
    ///
    /// Fails with [`EcsError::InvalidId`] for the reserved id.
    pub fn new(id: EntityId, name: impl Into<String>) -> Result<Rc<Self>, EcsError> {
        if !id.is_valid() {
            return Err(EcsError::InvalidId);
        }

        Ok(Rc::new(Self {
            id,
            name: name.into(),
            components: RefCell::new(HashMap::new()),
            attach_order: RefCell::new(Vec::new()),
            update_components: RefCell::new(Vec::new()),
            needs_update: Cell::new(false),
            disposed: Cell::new(false),
        }))
    }

    /// Get the entity ID
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Optional display name; empty when unnamed
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name and id, for log messages
    pub fn full_name(&self) -> String {
        if self.name.is_empty() {
            self.id.to_string()
        } else {
            format!("{} ({})", self.name, self.id)
        }
    }

    /// True if any attached component asked for per-frame updates
    ///
    /// Only meaningful once every component has been attached.
    pub fn needs_update(&self) -> bool {
        self.needs_update.get()
    }

    /// True once the entity has been disposed
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Attach a component
    ///
    /// The component must have been built for this entity, and no component
    /// of the same concrete type may already be attached. A component that
    /// wants updates is appended to the update list; there is no way to take
    /// it back out.
    pub fn add_component<T: Component>(&self, component: T) -> Result<Rc<RefCell<T>>, EcsError> {
        let name = type_name::<T>();
        if self.is_disposed() {
            return Err(EcsError::Disposed(self.id));
        }

        let base = component.base();
        if !base.is_bound_to(self) {
            let owner = base.parent_id();
            return Err(EcsError::ForeignComponent {
                entity: self.id,
                owner,
                component: name,
            });
        }

        let key = TypeId::of::<T>();
        if self.components.borrow().contains_key(&key) {
            return Err(EcsError::DuplicateComponent {
                entity: self.id,
                component: name,
            });
        }

        let wants_update = component.base().needs_update();
        let typed = Rc::new(RefCell::new(component));
        let handle: ComponentHandle = typed.clone();
        if wants_update {
            self.needs_update.set(true);
            self.update_components.borrow_mut().push(Rc::clone(&handle));
        }

        self.components.borrow_mut().insert(
            key,
            ComponentSlot {
                name,
                handle,
                typed: typed.clone(),
            },
        );
        self.attach_order.borrow_mut().push(key);
        log::trace!("Attached {} to entity {}", name, self.full_name());
        Ok(typed)
    }

    /// Get a component by type
    ///
    /// A miss is logged as a warning and returned as `None`.
    pub fn get_component<T: Component>(&self) -> Option<Rc<RefCell<T>>> {
        let component = self.try_get_component::<T>();
        if component.is_none() {
            log::warn!(
                "Entity {} does not contain component {}",
                self.full_name(),
                type_name::<T>()
            );
        }
        component
    }

    /// Get a component by type, treating absence as an expected outcome
    pub fn try_get_component<T: Component>(&self) -> Option<Rc<RefCell<T>>> {
        let typed = {
            let components = self.components.borrow();
            Rc::clone(&components.get(&TypeId::of::<T>())?.typed)
        };
        typed.downcast::<RefCell<T>>().ok()
    }

    /// Run `f` against a component, if present and not borrowed elsewhere
    pub fn with_component<T: Component, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let component = self.get_component::<T>()?;
        let mut component = component.try_borrow_mut().ok()?;
        Some(f(&mut *component))
    }

    /// Check if the entity contains a particular component type
    pub fn has_component<T: Component>(&self) -> bool {
        self.components.borrow().contains_key(&TypeId::of::<T>())
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.components.borrow().len()
    }

    /// Components registered for per-frame updates, in attach order
    pub fn components_with_update(&self) -> Vec<ComponentHandle> {
        self.update_components.borrow().clone()
    }

    /// Every attached component that can be drawn, in attach order
    pub fn components_with_render(&self) -> Vec<ComponentHandle> {
        self.handles_in_order()
            .into_iter()
            .filter(|(_, handle)| {
                handle
                    .try_borrow()
                    .map(|component| component.as_render().is_some())
                    .unwrap_or(false)
            })
            .map(|(_, handle)| handle)
            .collect()
    }

    /// Initialize every component that is not yet initialized, in attach order
    ///
    /// Returns false if any component failed; failures are logged and leave
    /// that component uninitialized, the others are still attempted.
    pub fn initialize(&self) -> bool {
        if self.is_disposed() {
            log::warn!("Tried to initialize disposed entity {}", self.full_name());
            return false;
        }

        let mut all_ok = true;
        for (name, handle) in self.handles_in_order() {
            let Ok(mut component) = handle.try_borrow_mut() else {
                log::error!("{} on entity {} was busy during initialization", name, self.full_name());
                all_ok = false;
                continue;
            };
            if component.is_initialized() {
                continue;
            }
            if !component.initialize() {
                component.base_mut().set_initialized(false);
                log::error!("{} failed to initialize on entity {}", name, self.full_name());
                all_ok = false;
            }
        }
        all_ok
    }

    /// Update every component that asked for updates, in the order they were attached
    pub fn update(&self, delta_time: f32) {
        // Snapshot so components may attach siblings while updating.
        let components = self.update_components.borrow().clone();
        for component in components {
            match component.try_borrow_mut() {
                Ok(mut component) => component.update(delta_time),
                Err(_) => log::warn!("Skipped busy component on entity {}", self.full_name()),
            }
        }
    }

    /// Dispose every component and release them
    ///
    /// Every component is visited even if some fail; the faults are logged
    /// and returned. A second call does nothing.
    pub fn dispose(&self) -> Vec<ComponentError> {
        if self.disposed.replace(true) {
            return Vec::new();
        }

        let order = std::mem::take(&mut *self.attach_order.borrow_mut());
        let mut components = std::mem::take(&mut *self.components.borrow_mut());
        self.update_components.borrow_mut().clear();

        let mut faults = Vec::new();
        for key in order {
            let Some(slot) = components.remove(&key) else {
                continue;
            };
            let result = match slot.handle.try_borrow_mut() {
                Ok(mut component) => component.dispose(),
                Err(_) => Err(ComponentError::Busy {
                    entity: self.id,
                    component: slot.name,
                }),
            };
            if let Err(fault) = result {
                log::error!("{}", fault);
                faults.push(fault);
            }
        }

        log::trace!("Disposed entity {}", self.full_name());
        faults
    }

    fn handles_in_order(&self) -> Vec<(&'static str, ComponentHandle)> {
        let components = self.components.borrow();
        let order = self.attach_order.borrow();
        let handles = order
            .iter()
            .filter_map(|key| components.get(key))
            .map(|slot| (slot.name, Rc::clone(&slot.handle)))
            .collect();
        handles
    }
}

impl Drop for Entity {
    fn drop(&mut self) {
        let _ = self.dispose();
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("components", &self.components.try_borrow().map(|c| c.len()).ok())
            .field("needs_update", &self.needs_update.get())
            .field("disposed", &self.disposed.get())
            .finish()
    }
}
