//! Foundation module - Core utilities shared by the runtime
//!
//! - Logging setup and re-exported log macros
//! - Frame timing (delta source and phase stopwatches)

pub mod time;
pub mod logging;
