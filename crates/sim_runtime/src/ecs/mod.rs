//! Entity/component model
//!
//! Entities are bags of at most one component per concrete type. The
//! [`EntityManager`] owns every live entity, drives per-frame updates and
//! handles immediate and deferred removal.

pub mod error;
pub mod id;
pub mod component;
pub mod entity;
pub mod entity_manager;

#[cfg(test)]
pub(crate) mod tests;

pub use error::{ComponentError, EcsError};
pub use id::{EntityId, IdAllocator};
pub use component::{AsAny, Component, ComponentBase, ComponentHandle};
pub use entity::Entity;
pub use entity_manager::EntityManager;
