//! Configuration system
//!
//! Runtime settings are plain serde structs. Files are loaded as TOML or RON
//! depending on their extension; missing fields fall back to defaults.

pub use serde::{Serialize, Deserialize};

use crate::render::ClearColor;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value parsed but is out of range
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Top-level runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Default `env_logger` filter, used when `RUST_LOG` is not set
    pub log_filter: String,

    /// Draw scheduling
    pub render: RenderConfig,

    /// Entity bookkeeping
    pub entities: EntityConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            render: RenderConfig::default(),
            entities: EntityConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Check values that deserialize fine but cannot drive the runtime
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render.target_frame_rate == 0 {
            return Err(ConfigError::Invalid {
                field: "render.target_frame_rate",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Config for RuntimeConfig {}

/// Render scheduling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Frames per second the render manager tries to hold
    pub target_frame_rate: u32,

    /// Colour the target is cleared to before each draw pass
    pub clear_color: ClearColor,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            target_frame_rate: 60,
            clear_color: ClearColor::WHITE,
        }
    }
}

impl RenderConfig {
    /// Seconds between two draw passes
    #[allow(clippy::cast_precision_loss)]
    pub fn frame_interval(&self) -> f32 {
        1.0 / self.target_frame_rate.max(1) as f32
    }
}

/// Entity manager configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityConfig {
    /// Initial capacity of the per-frame update list
    pub update_capacity: usize,
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self { update_capacity: 50 }
    }
}
