//! Configuration management for simulation parameters.
//!
//! This module provides strongly-typed configuration structures that map to
//! the `config.toml` file. Every section has defaults, so a file only needs to
//! name the values it overrides.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [world]
//! simulation_mode = "predator_prey"
//! minimum_population = 12
//! maximum_population = 24
//!
//! [cell]
//! gestation_age = 400
//!
//! [[evolution.mutation_schedule]]
//! from_generation = 0
//! rate = 1.0
//! ```

use crate::inference::OUTPUT_COUNT;
use biots_data::GenomeShape;
use serde::{Deserialize, Serialize};

/// How the population manager chooses genomes when the world runs low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMode {
    /// Unborn cache first, then the seed pool.
    #[default]
    Normal,
    /// Every dispensed genome is freshly randomized.
    Random,
    /// Separate predator and prey quotas, each topped off independently.
    PredatorPrey,
}

/// World-level population and dispensing parameters.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorldConfig {
    pub radius: f64,
    pub seed: Option<u64>,
    pub simulation_mode: SimulationMode,
    pub minimum_population: usize,
    pub maximum_population: usize,
    pub predator_fraction: f64,
    pub prey_fraction: f64,
    pub unborn_cache_capacity: usize,
    pub dispense_delay: u64,
    pub dispense_interval: u64,
    pub self_replication: bool,
    pub pairwise_mating: bool,
    pub generation_training_threshold: u32,
    pub markers_in_effect: u8,
    pub stats_interval: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            radius: 2000.0,
            seed: None,
            simulation_mode: SimulationMode::Normal,
            minimum_population: 12,
            maximum_population: 24,
            predator_fraction: 0.34,
            prey_fraction: 0.66,
            unborn_cache_capacity: 20,
            dispense_delay: 100,
            dispense_interval: 10,
            self_replication: true,
            pairwise_mating: false,
            generation_training_threshold: 1000,
            markers_in_effect: 0,
            stats_interval: 50,
        }
    }
}

/// Per-cell thresholds. Ages and intervals are in ticks.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CellConfig {
    pub radius: f64,
    pub maximum_energy: f64,
    pub initial_energy: f64,
    pub mature_age: u64,
    pub old_age: u64,
    pub gestation_age: u64,
    pub self_replication_age: u64,
    pub self_replication_interval: u64,
    pub interaction_age: u64,
    pub mate_health: f64,
    pub spawn_health: f64,
    pub max_spawn_count: u32,
    pub spawn_energy_divisor: f64,
    pub spawn_stamina_cost: f64,
    pub blink_age: u64,
    pub blink_cooldown: u64,
    pub blink_exertion: f64,
    pub idle_energy_cost: f64,
    pub thrust_energy_cost: f64,
    pub boost_multiplier: f64,
    pub boost_stamina_cost: f64,
    pub stamina_recovery: f64,
    pub time_between_bites: u64,
    pub contact_purge_interval: u64,
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            radius: 16.0,
            maximum_energy: 100.0,
            initial_energy: 60.0,
            mature_age: 800,
            old_age: 6000,
            gestation_age: 400,
            self_replication_age: 1200,
            self_replication_interval: 10,
            interaction_age: 100,
            mate_health: 0.6,
            spawn_health: 0.5,
            max_spawn_count: 5,
            spawn_energy_divisor: 2.0,
            spawn_stamina_cost: 0.1,
            blink_age: 300,
            blink_cooldown: 30,
            blink_exertion: 0.5,
            idle_energy_cost: 0.01,
            thrust_energy_cost: 0.02,
            boost_multiplier: 2.0,
            boost_stamina_cost: 0.001,
            stamina_recovery: 0.0005,
            time_between_bites: 20,
            contact_purge_interval: 30,
        }
    }
}

/// Food resources and the energy a dead cell returns to the world.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ResourceConfig {
    pub bite: f64,
    pub donation_bites: f64,
    pub donation_radius_fraction: f64,
    pub algae_target: f64,
    pub algae_energy: f64,
    pub algae_radius: f64,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            bite: 5.0,
            donation_bites: 5.0,
            donation_radius_fraction: 0.5,
            algae_target: 4000.0,
            algae_energy: 40.0,
            algae_radius: 10.0,
        }
    }
}

/// Network topology of freshly created genomes.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct NeuralConfig {
    pub input_count: usize,
    pub hidden_counts: Vec<usize>,
    pub output_count: usize,
    pub max_weight_value: f32,
}

impl Default for NeuralConfig {
    fn default() -> Self {
        Self {
            input_count: 12,
            hidden_counts: vec![16],
            output_count: OUTPUT_COUNT,
            max_weight_value: 1.0,
        }
    }
}

impl NeuralConfig {
    #[must_use]
    pub fn shape(&self) -> GenomeShape {
        GenomeShape::new(self.input_count, self.hidden_counts.clone(), self.output_count)
    }
}

/// One step of the mutation-rate schedule, active from `from_generation` on.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MutationStep {
    pub from_generation: u32,
    pub rate: f32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EvolutionConfig {
    pub mutation_schedule: Vec<MutationStep>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        // 4, 3 and then 2 weight-mutation chances as lineages age.
        Self {
            mutation_schedule: vec![
                MutationStep {
                    from_generation: 0,
                    rate: 1.0,
                },
                MutationStep {
                    from_generation: 50,
                    rate: 0.5,
                },
                MutationStep {
                    from_generation: 200,
                    rate: 0.0,
                },
            ],
        }
    }
}

impl EvolutionConfig {
    /// Mutation rate for children of a parent at `generation`.
    #[must_use]
    pub fn rate_for_generation(&self, generation: u32) -> f32 {
        self.mutation_schedule
            .iter()
            .take_while(|step| step.from_generation <= generation)
            .last()
            .map_or(1.0, |step| step.rate)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub cell: CellConfig,
    pub resource: ResourceConfig,
    pub neural: NeuralConfig,
    pub evolution: EvolutionConfig,
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        let world = &self.world;
        anyhow::ensure!(world.radius > 0.0, "World radius must be positive");
        anyhow::ensure!(
            world.maximum_population > 0,
            "Maximum population must be positive"
        );
        anyhow::ensure!(
            world.minimum_population <= world.maximum_population,
            "Minimum population exceeds maximum population"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&world.predator_fraction)
                && (0.0..=1.0).contains(&world.prey_fraction),
            "Species fractions must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            (world.predator_fraction + world.prey_fraction - 1.0).abs() < 1e-6,
            "Predator and prey fractions must sum to 1.0"
        );
        anyhow::ensure!(
            world.dispense_interval > 0,
            "Dispense interval must be positive"
        );
        anyhow::ensure!(world.markers_in_effect <= 2, "At most 2 markers exist");
        anyhow::ensure!(world.stats_interval > 0, "Stats interval must be positive");

        let cell = &self.cell;
        anyhow::ensure!(cell.radius > 0.0, "Cell radius must be positive");
        anyhow::ensure!(
            cell.maximum_energy > 0.0,
            "Maximum energy must be positive"
        );
        anyhow::ensure!(
            cell.initial_energy > 0.0 && cell.initial_energy <= cell.maximum_energy,
            "Initial energy must be in (0, maximum_energy]"
        );
        anyhow::ensure!(
            cell.old_age > cell.mature_age,
            "Old age must come after maturity"
        );
        anyhow::ensure!(
            cell.spawn_energy_divisor >= 1.0,
            "Spawn energy divisor must be at least 1.0"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&cell.spawn_stamina_cost),
            "Spawn stamina cost must be in [0.0, 1.0]"
        );
        anyhow::ensure!(cell.blink_age > 0, "Blink age must be positive");
        anyhow::ensure!(
            cell.contact_purge_interval > 0,
            "Contact purge interval must be positive"
        );
        anyhow::ensure!(
            cell.self_replication_interval > 0,
            "Self replication interval must be positive"
        );
        anyhow::ensure!(
            cell.idle_energy_cost >= 0.0
                && cell.thrust_energy_cost >= 0.0
                && cell.blink_exertion >= 0.0,
            "Energy costs must be non-negative"
        );

        let resource = &self.resource;
        anyhow::ensure!(resource.bite > 0.0, "Bite must be positive");
        anyhow::ensure!(
            resource.donation_bites >= 0.0,
            "Donation bites must be non-negative"
        );
        anyhow::ensure!(
            resource.algae_energy > 0.0 && resource.algae_radius > 0.0,
            "Algae energy and radius must be positive"
        );

        let neural = &self.neural;
        anyhow::ensure!(neural.input_count > 0, "Input count must be positive");
        anyhow::ensure!(
            !neural.hidden_counts.is_empty() && neural.hidden_counts.iter().all(|&n| n > 0),
            "At least one non-empty hidden layer is required"
        );
        anyhow::ensure!(
            neural.output_count == OUTPUT_COUNT,
            "Output count must be {OUTPUT_COUNT}"
        );
        anyhow::ensure!(
            neural.max_weight_value.is_finite() && neural.max_weight_value > 0.0,
            "Max weight value must be positive"
        );

        let schedule = &self.evolution.mutation_schedule;
        anyhow::ensure!(
            schedule.iter().all(|step| (0.0..=1.0).contains(&step.rate)),
            "Mutation rates must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            schedule
                .windows(2)
                .all(|pair| pair[0].from_generation < pair[1].from_generation),
            "Mutation schedule must be sorted by generation"
        );

        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// SHA-256 over the sections that change evolutionary outcomes.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.world.simulation_mode).as_bytes());
        hasher.update(format!("{:?}", self.cell).as_bytes());
        hasher.update(format!("{:?}", self.resource).as_bytes());
        hasher.update(format!("{:?}", self.neural).as_bytes());
        hasher.update(format!("{:?}", self.evolution).as_bytes());
        hex::encode(hasher.finalize())
    }
}
