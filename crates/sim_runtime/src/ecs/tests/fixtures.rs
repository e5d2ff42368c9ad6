//! Small components shared by the ECS and render tests

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::ecs::{Component, ComponentBase, ComponentError, Entity, EntityId};
use crate::render::{ClearColor, RenderComponent, RenderTarget};

/// Counts its updates into a shared cell
#[derive(Debug)]
pub struct Counter {
    base: ComponentBase,
    count: Rc<Cell<u32>>,
}

impl Counter {
    pub fn new(parent: &Rc<Entity>, count: &Rc<Cell<u32>>) -> Self {
        Self {
            base: ComponentBase::new(parent).updating(),
            count: Rc::clone(count),
        }
    }
}

impl Component for Counter {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn initialize(&mut self) -> bool {
        self.base.set_initialized(true);
        true
    }

    fn update(&mut self, _delta_time: f32) {
        self.count.set(self.count.get() + 1);
    }
}

/// Does nothing and never asks for updates
#[derive(Debug)]
pub struct Inert {
    base: ComponentBase,
}

impl Inert {
    pub fn new(parent: &Rc<Entity>) -> Self {
        Self {
            base: ComponentBase::new(parent),
        }
    }
}

impl Component for Inert {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn initialize(&mut self) -> bool {
        self.base.set_initialized(true);
        true
    }
}

/// Depends on a sibling [`Counter`]
#[derive(Debug)]
pub struct Needy {
    base: ComponentBase,
    counter: Option<Rc<RefCell<Counter>>>,
}

impl Needy {
    pub fn new(parent: &Rc<Entity>) -> Self {
        Self {
            base: ComponentBase::new(parent),
            counter: None,
        }
    }

    pub fn has_sibling(&self) -> bool {
        self.counter.is_some()
    }
}

impl Component for Needy {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn initialize(&mut self) -> bool {
        self.counter = self.retrieve_sibling::<Counter>();
        if self.counter.is_none() {
            return false;
        }
        self.base.set_initialized(true);
        true
    }

    fn on_dispose(&mut self) -> Result<(), ComponentError> {
        self.counter = None;
        Ok(())
    }
}

/// Fails its cleanup
#[derive(Debug)]
pub struct Faulty {
    base: ComponentBase,
}

impl Faulty {
    pub fn new(parent: &Rc<Entity>) -> Self {
        Self {
            base: ComponentBase::new(parent),
        }
    }
}

impl Component for Faulty {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn initialize(&mut self) -> bool {
        self.base.set_initialized(true);
        true
    }

    fn on_dispose(&mut self) -> Result<(), ComponentError> {
        Err(ComponentError::Cleanup {
            entity: self.base.parent_id(),
            component: self.component_name(),
            reason: "handle already closed".to_string(),
        })
    }
}

/// Records the parent id each time it is updated
#[derive(Debug)]
pub struct OrderLog {
    base: ComponentBase,
    log: Rc<RefCell<Vec<EntityId>>>,
}

impl OrderLog {
    pub fn new(parent: &Rc<Entity>, log: &Rc<RefCell<Vec<EntityId>>>) -> Self {
        Self {
            base: ComponentBase::new(parent).updating(),
            log: Rc::clone(log),
        }
    }
}

impl Component for OrderLog {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn initialize(&mut self) -> bool {
        self.base.set_initialized(true);
        true
    }

    fn update(&mut self, _delta_time: f32) {
        self.log.borrow_mut().push(self.base.parent_id());
    }
}

/// Target that records clears and the labels drawn into it
#[derive(Debug, Default)]
pub struct RecordingTarget {
    pub clears: Vec<ClearColor>,
    pub drawn: Vec<&'static str>,
}

impl RenderTarget for RecordingTarget {
    fn clear(&mut self, color: ClearColor) {
        self.clears.push(color);
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

fn record(target: &mut dyn RenderTarget, label: &'static str) {
    if let Some(target) = target.as_any_mut().downcast_mut::<RecordingTarget>() {
        target.drawn.push(label);
    }
}

/// Drawable component with a fixed depth
#[derive(Debug)]
pub struct Sprite {
    base: ComponentBase,
    label: &'static str,
    depth: i32,
}

impl Sprite {
    pub fn new(parent: &Rc<Entity>, label: &'static str, depth: i32) -> Self {
        Self {
            base: ComponentBase::new(parent),
            label,
            depth,
        }
    }
}

impl Component for Sprite {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn initialize(&mut self) -> bool {
        self.base.set_initialized(true);
        true
    }

    fn as_render(&self) -> Option<&dyn RenderComponent> {
        Some(self)
    }
}

impl RenderComponent for Sprite {
    fn depth(&self) -> i32 {
        self.depth
    }

    fn draw(&self, target: &mut dyn RenderTarget) {
        record(target, self.label);
    }
}

/// Second drawable type, so one entity can carry two render components
#[derive(Debug)]
pub struct Label {
    base: ComponentBase,
    text: &'static str,
    depth: i32,
}

impl Label {
    pub fn new(parent: &Rc<Entity>, text: &'static str, depth: i32) -> Self {
        Self {
            base: ComponentBase::new(parent),
            text,
            depth,
        }
    }
}

impl Component for Label {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn initialize(&mut self) -> bool {
        self.base.set_initialized(true);
        true
    }

    fn as_render(&self) -> Option<&dyn RenderComponent> {
        Some(self)
    }
}

impl RenderComponent for Label {
    fn depth(&self) -> i32 {
        self.depth
    }

    fn draw(&self, target: &mut dyn RenderTarget) {
        record(target, self.text);
    }
}
