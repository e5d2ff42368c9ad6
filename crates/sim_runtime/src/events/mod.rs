//! Event system
//!
//! Key principles:
//! - Closed set of event kinds (`EventKind`), one payload type per kind
//! - Registration system (only listeners for a kind are notified)
//! - Queuing support (immediate trigger + FIFO queue drained once per frame)
//!
//! Events are fire-and-forget values. Entity-carrying events hold a shared
//! reference to the entity so listeners can inspect its components even when
//! the entity is about to be torn down.

pub mod manager;

pub use manager::{EventManager, ListenerError, ListenerId};

use std::fmt;
use std::rc::Rc;

use nalgebra::Vector2;

use crate::ecs::{Entity, EntityId};

/// Event type identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// An entity was added to the entity manager
    EntityAdded,
    /// An entity is being removed from the entity manager
    EntityRemoved,
    /// Someone asked for an entity to be removed
    RequestEntityRemoval,
    /// The game was paused or resumed
    PauseGame,
    /// The window changed size
    WindowResized,
    /// The map zoom changed
    MapZoom,
    /// The map was dragged
    MapDrag,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An entity was added; queued by the entity manager on insert
#[derive(Debug, Clone)]
pub struct EntityAdded {
    /// The new entity
    pub entity: Rc<Entity>,
}

/// An entity is leaving the entity manager
#[derive(Debug, Clone)]
pub struct EntityRemoved {
    /// The departing entity, still intact when the event is delivered
    pub entity: Rc<Entity>,
}

/// Ask the entity manager to remove an entity at the next frame boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestEntityRemoval {
    /// Entity to remove
    pub id: EntityId,
}

/// Pause or resume entity updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseGame {
    /// True to pause
    pub paused: bool,
}

/// New window size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowResized {
    /// Width and height
    pub size: Vector2<u32>,
}

/// Mouse wheel zoom, in wheel ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapZoom {
    /// Positive zooms in
    pub delta: i32,
}

/// Map drag as a fraction of the window size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapDrag {
    /// Drag delta, x and y in window fractions
    pub delta: Vector2<f32>,
}

/// A typed message on the event bus
#[derive(Debug, Clone)]
pub enum Event {
    /// See [`EntityAdded`]
    EntityAdded(EntityAdded),
    /// See [`EntityRemoved`]
    EntityRemoved(EntityRemoved),
    /// See [`RequestEntityRemoval`]
    RequestEntityRemoval(RequestEntityRemoval),
    /// See [`PauseGame`]
    PauseGame(PauseGame),
    /// See [`WindowResized`]
    WindowResized(WindowResized),
    /// See [`MapZoom`]
    MapZoom(MapZoom),
    /// See [`MapDrag`]
    MapDrag(MapDrag),
}

/// Payload types that map one-to-one onto an [`EventKind`]
///
/// Lets listeners subscribe to a payload type directly instead of matching
/// on [`Event`] themselves.
pub trait EventType: Sized + 'static {
    /// Kind this payload is delivered under
    const KIND: EventKind;

    /// Borrow the payload out of an event of the matching kind
    fn from_event(event: &Event) -> Option<&Self>;
}

macro_rules! event_types {
    ($($variant:ident),* $(,)?) => {
        impl Event {
            /// The kind used to route this event to listeners
            pub fn kind(&self) -> EventKind {
                match self {
                    $(Self::$variant(_) => EventKind::$variant,)*
                }
            }
        }

        $(
            impl EventType for $variant {
                const KIND: EventKind = EventKind::$variant;

                fn from_event(event: &Event) -> Option<&Self> {
                    match event {
                        Event::$variant(payload) => Some(payload),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            }

            impl From<$variant> for Event {
                fn from(payload: $variant) -> Self {
                    Self::$variant(payload)
                }
            }
        )*
    };
}

event_types!(
    EntityAdded,
    EntityRemoved,
    RequestEntityRemoval,
    PauseGame,
    WindowResized,
    MapZoom,
    MapDrag,
);

impl Event {
    /// Entity-added notification
    pub fn entity_added(entity: Rc<Entity>) -> Self {
        Self::EntityAdded(EntityAdded { entity })
    }

    /// Entity-removed notification
    pub fn entity_removed(entity: Rc<Entity>) -> Self {
        Self::EntityRemoved(EntityRemoved { entity })
    }

    /// Removal request for `id`
    pub fn request_removal(id: EntityId) -> Self {
        Self::RequestEntityRemoval(RequestEntityRemoval { id })
    }

    /// Pause state change
    pub fn pause(paused: bool) -> Self {
        Self::PauseGame(PauseGame { paused })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(Event::pause(true).kind(), EventKind::PauseGame);
        assert_eq!(
            Event::request_removal(EntityId::new(4)).kind(),
            EventKind::RequestEntityRemoval
        );
        let drag: Event = MapDrag { delta: Vector2::new(0.1, -0.2) }.into();
        assert_eq!(drag.kind(), EventKind::MapDrag);
    }

    #[test]
    fn test_typed_payload_access() {
        let event = Event::pause(true);
        assert_eq!(PauseGame::from_event(&event), Some(&PauseGame { paused: true }));
        assert!(MapZoom::from_event(&event).is_none());
    }
}
