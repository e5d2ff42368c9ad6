//! Render ordering
//!
//! The runtime does not draw anything itself. Components that can be drawn
//! expose a [`RenderComponent`] view; the [`RenderManager`] keeps them in a
//! depth-sorted list and hands each one the frame's [`RenderTarget`].

pub mod render_manager;

pub use render_manager::RenderManager;

use std::any::Any;

use serde::{Deserialize, Serialize};

/// RGBA colour a target is cleared to, components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClearColor {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl ClearColor {
    /// Opaque white
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Opaque black
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Create a colour from its channels
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for ClearColor {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Something a frame is drawn into
///
/// Opaque to the runtime. Concrete render components downcast through
/// [`RenderTarget::as_any_mut`] to reach the backend they were written for.
pub trait RenderTarget {
    /// Clear the whole target before a draw pass
    fn clear(&mut self, color: ClearColor);

    /// Backend access for concrete render components
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Drawable capability of a component
pub trait RenderComponent {
    /// Sort key; lower depths are drawn first
    fn depth(&self) -> i32;

    /// Draw into the target
    fn draw(&self, target: &mut dyn RenderTarget);
}

/// Named depth layers used by the game's render components
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i32)]
pub enum RenderDepth {
    /// Arena floor
    Background = 0,
    /// Walls and obstacles
    Terrain = 1,
    /// Tank bodies
    Tank = 5,
    /// Shots in flight
    Projectile = 6,
    /// Health bars, selection markers
    Overlay = 10,
}

impl From<RenderDepth> for i32 {
    fn from(depth: RenderDepth) -> Self {
        depth as Self
    }
}
