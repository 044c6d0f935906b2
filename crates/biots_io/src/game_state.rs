//! Saved game states.
//!
//! A game state captures the genomes of a running world (live cells first,
//! then the unborn cache) together with the settings needed to resume it.
//! Positions and energies are not kept: a restored world re-dispenses the
//! saved genomes as seeds.

use crate::error::{IoError, Result};
use crate::serialization::{read_json_file, write_json_file};
use biots_core::config::SimulationMode;
use biots_core::{AppConfig, SeedPools, World};
use biots_data::Genome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub name: String,
    pub simulation_mode: SimulationMode,
    pub algae_target: f64,
    pub saved_at: DateTime<Utc>,
    pub config_fingerprint: String,
    #[serde(default)]
    pub tick: u64,
    pub genomes: Vec<Genome>,
}

impl GameState {
    #[must_use]
    pub fn capture(name: impl Into<String>, world: &World) -> Self {
        let genomes: Vec<Genome> = world
            .cells
            .iter()
            .filter(|c| !c.expired)
            .map(|c| c.genome.clone())
            .chain(world.population.unborn().iter().cloned())
            .collect();
        Self {
            name: name.into(),
            simulation_mode: world.config.world.simulation_mode,
            algae_target: world.config.resource.algae_target,
            saved_at: Utc::now(),
            config_fingerprint: world.config.fingerprint(),
            tick: world.tick,
            genomes,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_file(self, path)
            .map_err(|e| e.with_context(format!("saving game state '{}'", self.name)))?;
        tracing::info!(
            name = %self.name,
            path = %path.display(),
            genomes = self.genomes.len(),
            "Saved game state"
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let state: Self = read_json_file(path)?;
        if state.genomes.is_empty() {
            return Err(IoError::validation(format!(
                "game state '{}' holds no genomes",
                state.name
            )));
        }
        tracing::info!(name = %state.name, genomes = state.genomes.len(), "Loaded game state");
        Ok(state)
    }

    /// True when the state was saved under the same evolutionary settings.
    #[must_use]
    pub fn matches_config(&self, config: &AppConfig) -> bool {
        self.config_fingerprint == config.fingerprint()
    }

    /// Applies the saved mode and algae target onto `config`.
    pub fn apply_to(&self, config: &mut AppConfig) {
        config.world.simulation_mode = self.simulation_mode;
        config.resource.algae_target = self.algae_target;
    }

    #[must_use]
    pub fn into_seed_pools(self) -> SeedPools {
        SeedPools::from_genomes(self.genomes)
    }
}
