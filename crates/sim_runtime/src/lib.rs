//! # Sim Runtime
//!
//! Single-threaded runtime core for a real-time 2D simulation.
//!
//! ## Features
//!
//! - **Entities and Components**: Entities own at most one component per type
//! - **Event Bus**: Immediate and queued delivery to per-kind listeners
//! - **Deferred Removal**: Entities removed between frames, never mid-update
//! - **Render Ordering**: Depth-sorted draw list at a fixed frame rate
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::any::Any;
//! use sim_runtime::prelude::*;
//!
//! struct Window;
//!
//! impl RenderTarget for Window {
//!     fn clear(&mut self, _color: ClearColor) {}
//!     fn as_any_mut(&mut self) -> &mut dyn Any {
//!         self
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut runtime = Runtime::new(RuntimeConfig::default())?;
//!     runtime.init_logging()?;
//!
//!     let tank = runtime.entities().create_entity("tank")?;
//!     tank.initialize();
//!     runtime.entities().add_entity(tank)?;
//!
//!     let mut window = Window;
//!     loop {
//!         runtime.advance(&mut window);
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

pub mod foundation;
pub mod config;
pub mod events;
pub mod ecs;
pub mod render;

mod engine;

pub use engine::{EngineError, FrameStats, Runtime};

/// Common imports for runtime users
pub mod prelude {
    pub use crate::{
        EngineError, FrameStats, Runtime,
        config::{Config, ConfigError, EntityConfig, RenderConfig, RuntimeConfig},
        ecs::{Component, ComponentBase, ComponentError, EcsError, Entity, EntityId, EntityManager},
        events::{Event, EventKind, EventManager, EventType, ListenerError, ListenerId},
        foundation::time::{Stopwatch, Timer},
        render::{ClearColor, RenderComponent, RenderDepth, RenderManager, RenderTarget},
    };
}
