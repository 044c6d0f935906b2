//! # Biots Core
//!
//! The evolution engine behind Biots: small feed-forward networks steering
//! cells that feed, age, mate and die in a shared resource field.
//!
//! This crate contains:
//! - Genome creation, derivation and mutation
//! - Decoding of network outputs into smoothed actuator values
//! - The per-cell lifecycle state machine
//! - Population replenishment with per-species quotas and an unborn cache
//! - The [`World`] context that ties them together each tick
//! - Metrics collection and structured logging
//!
//! Rendering, physics and the dense forward pass stay outside; the world
//! reaches them through the traits in [`collaborators`].
//!
//! ## Example
//!
//! ```
//! use biots_core::genome::GenomeLogic;
//! use biots_data::{Genome, GenomeShape, Species};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let shape = GenomeShape::new(10, vec![8], 8);
//! let parent = Genome::new_random_with_rng(Species::Prey, &shape, 1.0, &mut rng);
//! let child = parent.derive_child_with_rng(1.0, 1.0, &mut rng);
//! assert_eq!(child.generation, parent.generation + 1);
//! ```

/// Seams to evaluators, sensing and the resource field
pub mod collaborators;
/// Configuration management for simulation parameters
pub mod config;
/// Genome creation, derivation and mutation
pub mod genome;
/// Network output decoding
pub mod inference;
/// Cell lifecycle (aging, feeding, mating, spawning, expiry)
pub mod lifecycle;
/// Performance metrics collection and logging
pub mod metrics;
/// Population bounds, unborn cache and genome dispensing
pub mod population;
/// Population statistics
pub mod stats;
/// Tick-driven simulation context
pub mod world;

pub use collaborators::{Environment, NetworkEvaluator, ResourceId, SensoryInput};
pub use config::AppConfig;
pub use genome::GenomeLogic;
pub use inference::{Inference, InferenceError};
pub use lifecycle::Cell;
pub use metrics::{init_logging, Metrics};
pub use population::{Census, PopulationManager, SeedPools};
pub use world::{World, WorldEvent};
