//! Core data structures for the Biots simulation.

pub mod genome;
pub mod geometry;
pub mod record;
