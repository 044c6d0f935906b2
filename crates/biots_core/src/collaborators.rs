//! Seams to the systems the engine does not own.
//!
//! The dense forward pass, sensing and the resource field all live outside
//! the core. The world only talks to them through these traits.

use crate::lifecycle::Cell;
use biots_data::{Genome, Position};

pub type ResourceId = u64;

/// Runs a genome's network on one input vector.
pub trait NetworkEvaluator: Send + Sync {
    /// Raw outputs, or `None` when the network produced no result.
    fn evaluate(&self, genome: &Genome, inputs: &[f32]) -> Option<Vec<f32>>;
}

/// Produces the network input vector for a cell.
pub trait SensoryInput: Send + Sync {
    fn sense(&self, cell: &Cell) -> Vec<f32>;
}

/// Food resources a cell can bite and the sink for energy a dead cell returns.
pub trait Environment {
    /// Resources currently touching a circle at `position` with `radius`.
    fn contacted_resources(&self, position: Position, radius: f64) -> Vec<ResourceId>;

    fn resource_energy(&self, id: ResourceId) -> Option<f64>;

    fn set_resource_energy(&mut self, id: ResourceId, energy: f64);

    /// Places a new resource holding `energy` and returns its id.
    fn deposit_resource(&mut self, position: Position, energy: f64) -> ResourceId;
}
