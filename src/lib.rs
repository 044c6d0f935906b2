//! Headless driver for the Biots engine: a reference evaluator, a minimal
//! resource soup and the [`app::App`] loop that ties them to a world.

pub mod app;
pub mod model;
