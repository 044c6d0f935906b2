//! Core data structures for the Biots simulation.
//!
//! Everything in this crate is plain data: the genome and its wire record,
//! the species tag and a small position type shared by the engine and the
//! persistence layer. Behaviour lives in `biots_core`.

pub mod data;

pub use data::genome::{Genome, GenomeError, GenomeShape, Species};
pub use data::geometry::Position;
pub use data::record::GenomeRecord;
