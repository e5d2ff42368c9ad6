//! ECS error types

use super::EntityId;

/// Failures raised by entity construction and registration
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The reserved invalid id was used to build an entity
    #[error("Entity id {} is reserved and cannot be used", EntityId::INVALID)]
    InvalidId,

    /// A required reference was missing at construction
    #[error("Construction failed: {0}")]
    Construction(String),

    /// The entity already holds a component of this concrete type
    #[error("Entity {entity} already contains component {component}")]
    DuplicateComponent {
        /// Owning entity
        entity: EntityId,
        /// Type name of the rejected component
        component: &'static str,
    },

    /// A component built for one entity was attached to another
    #[error("Component {component} belongs to entity {owner}, not {entity}")]
    ForeignComponent {
        /// Entity the component was offered to
        entity: EntityId,
        /// Entity the component was built for
        owner: EntityId,
        /// Type name of the rejected component
        component: &'static str,
    },

    /// The entity manager already holds an entity with this id
    #[error("Duplicate entity id {0}")]
    DuplicateEntity(EntityId),

    /// The entity was already disposed
    #[error("Entity {0} has been disposed")]
    Disposed(EntityId),
}

/// Faults raised while tearing a component down
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ComponentError {
    /// The component's own cleanup failed
    #[error("Cleanup of {component} on entity {entity} failed: {reason}")]
    Cleanup {
        /// Owning entity
        entity: EntityId,
        /// Component type name
        component: &'static str,
        /// Failure description
        reason: String,
    },

    /// The component was borrowed elsewhere when disposal reached it
    #[error("Component {component} on entity {entity} was busy during disposal")]
    Busy {
        /// Owning entity
        entity: EntityId,
        /// Component type name, when it could be read
        component: &'static str,
    },
}
