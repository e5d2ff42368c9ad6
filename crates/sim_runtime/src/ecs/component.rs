//! Component trait and shared component state
//!
//! Lifecycle of every component:
//!
//! 1. constructed with a live parent entity ([`ComponentBase::new`])
//! 2. attached with [`Entity::add_component`]
//! 3. [`Component::initialize`] once all siblings are attached, so sibling
//!    lookups succeed
//! 4. [`Component::update`] every frame, only if it asked for updates
//! 5. disposed exactly once; disposal is a no-op unless initialization
//!    succeeded
//!
//! Components must not acquire externally visible resources before they are
//! marked initialized, which is what makes disposing a half-built component
//! safe.

use std::any::{type_name, Any};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::{ComponentError, EcsError, Entity, EntityId};
use crate::render::RenderComponent;

/// Shared, type-erased handle to a component owned by an entity
pub type ComponentHandle = Rc<RefCell<dyn Component>>;

/// State every component carries, embedded by concrete components
#[derive(Debug)]
pub struct ComponentBase {
    parent: Weak<Entity>,
    parent_id: EntityId,
    initialized: bool,
    needs_update: bool,
    disposed: bool,
}

impl ComponentBase {
    /// Create the base state for a component of `parent`
    pub fn new(parent: &Rc<Entity>) -> Self {
        Self {
            parent: Rc::downgrade(parent),
            parent_id: parent.id(),
            initialized: false,
            needs_update: false,
            disposed: false,
        }
    }

    /// Create the base state from a weak parent reference
    ///
    /// Fails if the parent has been dropped or disposed.
    pub fn from_weak(parent: &Weak<Entity>) -> Result<Self, EcsError> {
        let parent = parent
            .upgrade()
            .ok_or_else(|| EcsError::Construction("parent entity no longer exists".to_string()))?;
        if parent.is_disposed() {
            return Err(EcsError::Construction(format!(
                "parent entity {} is disposed",
                parent.id()
            )));
        }
        Ok(Self::new(&parent))
    }

    /// Builder form of [`ComponentBase::set_needs_update`]
    #[must_use]
    pub fn updating(mut self) -> Self {
        self.needs_update = true;
        self
    }

    /// Request per-frame updates
    ///
    /// Read once when the component is attached; changing it afterwards has
    /// no effect on the entity's update list.
    pub fn set_needs_update(&mut self, needs_update: bool) {
        self.needs_update = needs_update;
    }

    /// Record the outcome of initialization
    pub fn set_initialized(&mut self, initialized: bool) {
        self.initialized = initialized;
    }

    /// True once initialization succeeded
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// True if the component wants per-frame updates
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// True after a successful disposal
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// The owning entity, if it is still alive and not yet disposed of us
    pub fn parent(&self) -> Option<Rc<Entity>> {
        self.parent.upgrade()
    }

    /// Id of the owning entity; kept after disposal for diagnostics
    pub fn parent_id(&self) -> EntityId {
        self.parent_id
    }

    /// True if this state was built for exactly `entity`, not just its id
    pub(crate) fn is_bound_to(&self, entity: &Entity) -> bool {
        self.parent_id == entity.id() && std::ptr::eq(self.parent.as_ptr(), entity)
    }
}

/// Type-erased access to a component's concrete type
///
/// Implemented for every `'static` type, so components get it for free.
pub trait AsAny {
    /// Borrow as `Any` for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Mutably borrow as `Any` for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A capability attached to exactly one entity
pub trait Component: AsAny + 'static {
    /// Shared component state
    fn base(&self) -> &ComponentBase;

    /// Mutable shared component state
    fn base_mut(&mut self) -> &mut ComponentBase;

    /// Bring the component into a usable state
    ///
    /// Called after every sibling is attached. Implementations look up the
    /// siblings they depend on, abort by returning false if one is missing,
    /// and call `self.base_mut().set_initialized(true)` on success.
    fn initialize(&mut self) -> bool;

    /// Per-frame logic; only called when the component asked for updates
    fn update(&mut self, _delta_time: f32) {}

    /// Release the component's own resources
    ///
    /// Only runs for initialized components, at most once.
    fn on_dispose(&mut self) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Drawable view of this component, if it is one
    fn as_render(&self) -> Option<&dyn RenderComponent> {
        None
    }

    /// Type name used in diagnostics
    fn component_name(&self) -> &'static str {
        type_name::<Self>()
    }

    /// Look up a sibling component on the parent entity
    ///
    /// A miss is logged and reported as `None`; callers are expected to
    /// abort their own initialization.
    fn retrieve_sibling<T: Component>(&self) -> Option<Rc<RefCell<T>>>
    where
        Self: Sized,
    {
        let base = self.base();
        let sibling = base.parent().and_then(|parent| parent.try_get_component::<T>());
        if sibling.is_none() {
            log::error!(
                "{} could not retrieve requested component {} from entity {}",
                self.component_name(),
                type_name::<T>(),
                base.parent_id()
            );
        }
        sibling
    }
}

impl dyn Component {
    /// True once initialization succeeded
    pub fn is_initialized(&self) -> bool {
        self.base().is_initialized()
    }

    /// True if the component wants per-frame updates
    pub fn needs_update(&self) -> bool {
        self.base().needs_update()
    }

    /// Dispose the component
    ///
    /// No-op if it was never initialized or is already disposed. The parent
    /// reference is released even when cleanup reports a fault.
    pub fn dispose(&mut self) -> Result<(), ComponentError> {
        let base = self.base();
        if base.disposed || !base.initialized {
            return Ok(());
        }

        let result = self.on_dispose();
        let base = self.base_mut();
        base.parent = Weak::new();
        base.disposed = true;
        result
    }
}
