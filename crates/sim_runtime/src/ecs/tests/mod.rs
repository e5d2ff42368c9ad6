//! ECS scenario tests and shared fixtures

pub(crate) mod fixtures;

mod lifecycle_scenarios;
