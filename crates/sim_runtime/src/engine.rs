//! Runtime composition root

use std::rc::Rc;
use std::time::Duration;

use thiserror::Error;

use crate::{
    config::{Config, ConfigError, RuntimeConfig},
    ecs::EntityManager,
    events::EventManager,
    foundation::{
        logging,
        time::{Stopwatch, Timer},
    },
    render::{RenderManager, RenderTarget},
};

/// What happened during the last tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Ticks run so far, this one included
    pub frame: u64,
    /// Queued events delivered at the start of the tick
    pub events_dispatched: usize,
    /// Time spent delivering queued events
    pub event_time: Duration,
    /// Time spent updating entities
    pub entity_time: Duration,
    /// Time spent in the render manager
    pub render_time: Duration,
    /// Whether the render manager drew this tick
    pub drawn: bool,
}

/// Owns the event bus and the two managers and drives them once per frame
///
/// Each tick runs the phases in a fixed order: queued events are delivered,
/// entities are updated, then the render manager gets a chance to draw.
pub struct Runtime {
    events: Rc<EventManager>,
    entities: EntityManager,
    renderer: RenderManager,
    timer: Timer,
    stats: FrameStats,
    config: RuntimeConfig,
}

impl Runtime {
    /// Build a runtime from an already loaded configuration
    pub fn new(config: RuntimeConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let events = Rc::new(EventManager::new());
        let entities = EntityManager::with_config(Rc::clone(&events), &config.entities);
        let renderer = RenderManager::new(Rc::clone(&events), &config.render);

        log::info!(
            "Runtime initialized ({} fps target)",
            config.render.target_frame_rate
        );

        Ok(Self {
            events,
            entities,
            renderer,
            timer: Timer::new(),
            stats: FrameStats::default(),
            config,
        })
    }

    /// Load a `.toml` or `.ron` configuration file and build a runtime from it
    pub fn from_config_file(path: &str) -> Result<Self, EngineError> {
        let config = RuntimeConfig::load_from_file(path)?;
        log::debug!("Loaded runtime configuration from {}", path);
        Self::new(config)
    }

    /// Install `env_logger` with the configured default filter
    ///
    /// `RUST_LOG` still takes precedence. Fails if a logger is already set.
    pub fn init_logging(&self) -> Result<(), EngineError> {
        logging::init_with_filter(&self.config.log_filter)
            .map_err(|e| EngineError::Logging(e.to_string()))
    }

    /// Run one frame with an explicit delta time in seconds
    ///
    /// Returns true if a frame was drawn into `target`.
    pub fn tick(&mut self, delta_time: f32, target: &mut dyn RenderTarget) -> bool {
        self.timer.advance(delta_time);
        self.run_phases(delta_time, target)
    }

    /// Run one frame using the wall-clock time since the previous frame
    pub fn advance(&mut self, target: &mut dyn RenderTarget) -> bool {
        let delta_time = self.timer.update();
        self.run_phases(delta_time, target)
    }

    fn run_phases(&mut self, delta_time: f32, target: &mut dyn RenderTarget) -> bool {
        let mut stopwatch = Stopwatch::start_new();
        let events_dispatched = self.events.dispatch_queued();
        let event_time = stopwatch.stop();

        let mut stopwatch = Stopwatch::start_new();
        self.entities.update(delta_time);
        let entity_time = stopwatch.stop();

        let mut stopwatch = Stopwatch::start_new();
        let drawn = self.renderer.update(delta_time, target);
        let render_time = stopwatch.stop();

        self.stats = FrameStats {
            frame: self.timer.frame_count(),
            events_dispatched,
            event_time,
            entity_time,
            render_time,
            drawn,
        };
        log::trace!("Frame {}: {:?}", self.stats.frame, self.stats);
        drawn
    }

    /// Statistics of the most recent tick
    pub fn frame_stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Seconds of simulated time so far
    pub fn total_time(&self) -> f32 {
        self.timer.total_time()
    }

    /// The shared event bus
    pub fn events(&self) -> &Rc<EventManager> {
        &self.events
    }

    /// The entity manager
    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    /// The render manager
    pub fn renderer(&self) -> &RenderManager {
        &self.renderer
    }

    /// Configuration the runtime was built from
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Dispose both managers and drop anything still queued
    ///
    /// Safe to call more than once; also happens on drop.
    pub fn shutdown(&self) {
        self.renderer.dispose();
        self.entities.dispose();
        self.events.clear_queue();
        log::info!("Runtime shut down after {} frames", self.timer.frame_count());
    }
}

/// Runtime errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logger installation failed
    #[error("Logging initialization failed: {0}")]
    Logging(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::tests::fixtures::{RecordingTarget, Sprite};
    use crate::events::Event;

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = RuntimeConfig::default();
        config.render.target_frame_rate = 0;

        assert!(matches!(
            Runtime::new(config),
            Err(EngineError::Config(ConfigError::Invalid { .. }))
        ));
    }

    #[test]
    fn test_missing_config_file() {
        let result = Runtime::from_config_file("/nonexistent/sim_runtime.toml");
        assert!(matches!(result, Err(EngineError::Config(ConfigError::Io(_)))));
    }

    #[test]
    fn test_config_file_drives_frame_rate() {
        let mut path = std::env::temp_dir();
        path.push(format!("sim_runtime_{}_engine.toml", std::process::id()));
        let path = path.to_string_lossy().into_owned();
        std::fs::write(&path, "[render]\ntarget_frame_rate = 30\n").unwrap();

        let runtime = Runtime::from_config_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(runtime.config().render.target_frame_rate, 30);
        approx::assert_relative_eq!(runtime.renderer().frame_interval(), 1.0 / 30.0);
    }

    #[test]
    fn test_tick_runs_phases_in_order() {
        let mut runtime = Runtime::new(RuntimeConfig::default()).unwrap();
        let entity = runtime.entities().create_entity("tank").unwrap();
        entity.add_component(Sprite::new(&entity, "tank", 5)).unwrap();
        entity.initialize();
        runtime.entities().add_entity(entity).unwrap();

        // EntityAdded is still queued; the first tick delivers it before drawing.
        let mut target = RecordingTarget::default();
        assert!(runtime.tick(1.0 / 60.0, &mut target));

        let stats = runtime.frame_stats();
        assert_eq!(stats.frame, 1);
        assert_eq!(stats.events_dispatched, 1);
        assert!(stats.drawn);
        assert_eq!(target.drawn, vec!["tank"]);
    }

    #[test]
    fn test_pause_event_applies_next_tick() {
        let mut runtime = Runtime::new(RuntimeConfig::default()).unwrap();
        runtime.events().queue_event(Event::pause(true));
        assert!(!runtime.entities().is_paused());

        let mut target = RecordingTarget::default();
        runtime.tick(0.0, &mut target);
        assert!(runtime.entities().is_paused());
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut runtime = Runtime::new(RuntimeConfig::default()).unwrap();
        let mut target = RecordingTarget::default();
        runtime.tick(0.01, &mut target);

        runtime.shutdown();
        runtime.shutdown();
        assert!(runtime.renderer().is_empty());
        assert!(runtime.entities().is_empty());
        approx::assert_relative_eq!(runtime.total_time(), 0.01);
    }
}
