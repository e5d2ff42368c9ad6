//! Whole-frame scenarios across the entity manager, event bus and renderer

use std::cell::Cell;
use std::rc::Rc;

use crate::config::RuntimeConfig;
use crate::ecs::tests::fixtures::{Counter, RecordingTarget, Sprite};
use crate::ecs::EntityId;
use crate::engine::Runtime;
use crate::events::Event;

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn spawn_counter(runtime: &Runtime, count: &Rc<Cell<u32>>) -> EntityId {
        let entity = runtime.entities().create_entity("counter").unwrap();
        entity.add_component(Counter::new(&entity, count)).unwrap();
        assert!(entity.initialize());
        let id = entity.id();
        runtime.entities().add_entity(entity).unwrap();
        id
    }

    #[test]
    fn test_counter_survives_until_deferred_removal() {
        let mut runtime = Runtime::new(RuntimeConfig::default()).unwrap();
        let mut target = RecordingTarget::default();
        let count = Rc::new(Cell::new(0));
        let id = spawn_counter(&runtime, &count);

        for _ in 0..3 {
            runtime.tick(FRAME, &mut target);
        }
        assert_eq!(count.get(), 3);

        runtime.entities().queue_for_removal(id);
        assert!(runtime.entities().contains(id));

        runtime.tick(FRAME, &mut target);
        assert!(runtime.entities().get_entity(id).is_none());
        assert_eq!(count.get(), 3);

        runtime.tick(FRAME, &mut target);
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn test_removal_requested_mid_frame_skips_next_update() {
        let mut runtime = Runtime::new(RuntimeConfig::default()).unwrap();
        let mut target = RecordingTarget::default();
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));
        let doomed = spawn_counter(&runtime, &first);
        spawn_counter(&runtime, &second);

        runtime.tick(FRAME, &mut target);
        runtime.events().trigger_event(&Event::request_removal(doomed));
        runtime.tick(FRAME, &mut target);

        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 2);
        assert_eq!(runtime.entities().len(), 1);
    }

    #[test]
    fn test_render_list_tracks_spawn_and_removal() {
        let mut runtime = Runtime::new(RuntimeConfig::default()).unwrap();
        let mut target = RecordingTarget::default();

        let mut ids = Vec::new();
        for (label, depth) in [("shell", 6), ("floor", 0), ("tank", 5)] {
            let entity = runtime.entities().create_entity(label).unwrap();
            entity.add_component(Sprite::new(&entity, label, depth)).unwrap();
            entity.initialize();
            ids.push(entity.id());
            runtime.entities().add_entity(entity).unwrap();
        }

        assert!(runtime.tick(FRAME, &mut target));
        assert_eq!(target.drawn, vec!["floor", "tank", "shell"]);

        // The shell hits something.
        runtime.events().queue_event(Event::request_removal(ids[0]));
        target.drawn.clear();
        assert!(runtime.tick(FRAME, &mut target));

        assert_eq!(target.drawn, vec!["floor", "tank"]);
        assert_eq!(runtime.renderer().len(), 2);
        assert_eq!(runtime.entities().len(), 2);
    }

    #[test]
    fn test_paused_frames_still_draw() {
        let mut runtime = Runtime::new(RuntimeConfig::default()).unwrap();
        let mut target = RecordingTarget::default();
        let count = Rc::new(Cell::new(0));
        spawn_counter(&runtime, &count);

        runtime.events().queue_event(Event::pause(true));
        assert!(runtime.tick(FRAME, &mut target));
        assert!(runtime.tick(FRAME, &mut target));
        assert_eq!(count.get(), 0);

        runtime.events().queue_event(Event::pause(false));
        runtime.tick(FRAME, &mut target);
        assert_eq!(count.get(), 1);
        assert_eq!(target.clears.len(), 3);
    }
}
