//! Population replenishment.
//!
//! When the live population drops below its quota the manager picks the next
//! genome to enter the world: a fresh random one, the best unborn genome, or
//! the next seed from the configured pools, in that order.

use crate::config::{AppConfig, SimulationMode, WorldConfig};
use crate::genome::{dispensed_id, GenomeLogic};
use crate::lifecycle::Cell;
use biots_data::{Genome, GenomeShape, Species};
use rand::Rng;
use std::collections::VecDeque;

/// Species a top-off is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Need {
    Any,
    Prey,
    Predator,
}

impl Need {
    /// `Prey` accepts every non-predator, including neutral genomes.
    #[must_use]
    pub fn matches(self, genome: &Genome) -> bool {
        match self {
            Self::Any => true,
            Self::Prey => !genome.is_predator(),
            Self::Predator => genome.is_predator(),
        }
    }
}

/// Live population counts by species.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Census {
    pub total: usize,
    pub prey: usize,
    pub predators: usize,
}

impl Census {
    pub fn from_genomes<'a>(genomes: impl IntoIterator<Item = &'a Genome>) -> Self {
        genomes
            .into_iter()
            .fold(Self::default(), |mut census, genome| {
                census.total += 1;
                if genome.is_predator() {
                    census.predators += 1;
                } else {
                    census.prey += 1;
                }
                census
            })
    }

    /// Counts cells that have not expired.
    #[must_use]
    pub fn from_cells(cells: &[Cell]) -> Self {
        Self::from_genomes(cells.iter().filter(|c| !c.expired).map(|c| &c.genome))
    }
}

/// Externally supplied genomes to dispense from, split by species.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedPools {
    pub any: Vec<Genome>,
    pub prey: Vec<Genome>,
    pub predator: Vec<Genome>,
}

impl SeedPools {
    #[must_use]
    pub fn from_genomes(genomes: Vec<Genome>) -> Self {
        let (predator, prey): (Vec<_>, Vec<_>) =
            genomes.iter().cloned().partition(Genome::is_predator);
        Self {
            any: genomes,
            prey,
            predator,
        }
    }

    #[must_use]
    pub fn pool(&self, need: Need) -> &[Genome] {
        match need {
            Need::Any => &self.any,
            Need::Prey => &self.prey,
            Need::Predator => &self.predator,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.any.is_empty() && self.prey.is_empty() && self.predator.is_empty()
    }
}

/// Bounded FIFO of genomes waiting for room in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct UnbornCache {
    capacity: usize,
    genomes: VecDeque<Genome>,
}

impl UnbornCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            genomes: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends `genome`, evicting the oldest entry when full.
    ///
    /// Returns the genome that did not make it into the cache, if any.
    pub fn push(&mut self, genome: Genome) -> Option<Genome> {
        if self.capacity == 0 {
            return Some(genome);
        }
        let evicted = if self.genomes.len() >= self.capacity {
            self.genomes.pop_front()
        } else {
            None
        };
        self.genomes.push_back(genome);
        evicted
    }

    /// Removes the highest-generation genome matching `need`. Ties go to the
    /// genome that has waited longest.
    pub fn take_best(&mut self, need: Need) -> Option<Genome> {
        let mut best: Option<(usize, u32)> = None;
        for (index, genome) in self.genomes.iter().enumerate() {
            if need.matches(genome) && best.map_or(true, |(_, generation)| genome.generation > generation) {
                best = Some((index, genome.generation));
            }
        }
        best.and_then(|(index, _)| self.genomes.remove(index))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Genome> {
        self.genomes.iter()
    }

    pub fn clear(&mut self) {
        self.genomes.clear();
    }
}

/// Next pool index per species.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispenseCursors {
    pub any: usize,
    pub prey: usize,
    pub predator: usize,
}

impl DispenseCursors {
    fn cursor_mut(&mut self, need: Need) -> &mut usize {
        match need {
            Need::Any => &mut self.any,
            Need::Prey => &mut self.prey,
            Need::Predator => &mut self.predator,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispenseSource {
    Random,
    Unborn,
    Pool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dispensed {
    pub genome: Genome,
    pub source: DispenseSource,
    pub need: Need,
}

#[derive(Debug, Clone)]
pub struct PopulationManager {
    config: WorldConfig,
    shape: GenomeShape,
    max_weight: f32,
    seeds: SeedPools,
    unborn: UnbornCache,
    cursors: DispenseCursors,
}

impl PopulationManager {
    #[must_use]
    pub fn new(config: &AppConfig, seeds: SeedPools) -> Self {
        Self {
            config: config.world.clone(),
            shape: config.neural.shape(),
            max_weight: config.neural.max_weight_value,
            seeds,
            unborn: UnbornCache::new(config.world.unborn_cache_capacity),
            cursors: DispenseCursors::default(),
        }
    }

    #[must_use]
    pub fn unborn(&self) -> &UnbornCache {
        &self.unborn
    }

    #[must_use]
    pub fn cursors(&self) -> DispenseCursors {
        self.cursors
    }

    #[must_use]
    pub fn seeds(&self) -> &SeedPools {
        &self.seeds
    }

    /// Species below quota, predators first.
    #[must_use]
    pub fn needs(&self, census: &Census) -> Vec<Need> {
        let minimum = self.config.minimum_population;
        match self.config.simulation_mode {
            SimulationMode::Normal | SimulationMode::Random => {
                if census.total < minimum {
                    vec![Need::Any]
                } else {
                    Vec::new()
                }
            }
            SimulationMode::PredatorPrey => {
                let quota = |fraction: f64| (minimum as f64 * fraction).floor() as usize;
                let mut needs = Vec::with_capacity(2);
                if census.predators < quota(self.config.predator_fraction) {
                    needs.push(Need::Predator);
                }
                if census.prey < quota(self.config.prey_fraction) {
                    needs.push(Need::Prey);
                }
                needs
            }
        }
    }

    #[must_use]
    pub fn is_dispense_tick(&self, tick: u64) -> bool {
        tick >= self.config.dispense_delay && tick % self.config.dispense_interval == 0
    }

    /// Picks at most one genome to bring the population back towards quota.
    pub fn top_off<R: Rng>(&mut self, tick: u64, census: &Census, rng: &mut R) -> Option<Dispensed> {
        if !self.is_dispense_tick(tick) {
            return None;
        }
        let needs = self.needs(census);
        let &first_need = needs.first()?;

        let dispensed = if self.config.simulation_mode == SimulationMode::Random {
            let species = if rng.gen_bool(0.5) {
                Species::Predator
            } else {
                Species::Prey
            };
            Some(Dispensed {
                genome: Genome::new_random_with_rng(species, &self.shape, self.max_weight, rng),
                source: DispenseSource::Random,
                need: first_need,
            })
        } else {
            self.dispense_unborn(&needs)
                .or_else(|| self.dispense_seed(&needs))
        };

        match &dispensed {
            Some(d) => tracing::info!(
                tick,
                genome = %d.genome,
                source = ?d.source,
                need = ?d.need,
                unborn = self.unborn.len(),
                "Dispensing genome"
            ),
            None => tracing::debug!(tick, ?needs, "No genome available to dispense"),
        }
        dispensed
    }

    fn dispense_unborn(&mut self, needs: &[Need]) -> Option<Dispensed> {
        needs.iter().find_map(|&need| {
            self.unborn.take_best(need).map(|genome| Dispensed {
                genome,
                source: DispenseSource::Unborn,
                need,
            })
        })
    }

    fn dispense_seed(&mut self, needs: &[Need]) -> Option<Dispensed> {
        for &need in needs {
            let pool = self.seeds.pool(need);
            if pool.is_empty() {
                tracing::warn!(?need, "No seed genomes for needed species");
                continue;
            }
            let cursor = self.cursors.cursor_mut(need);
            let mut genome = pool[*cursor % pool.len()].clone();
            genome.id = dispensed_id(&genome.id, *cursor);
            *cursor += 1;
            return Some(Dispensed {
                genome,
                source: DispenseSource::Pool,
                need,
            });
        }
        None
    }

    /// Queues a genome that could not be born yet.
    pub fn add_unborn(&mut self, genome: Genome) {
        let id = genome.id.clone();
        match self.unborn.push(genome) {
            Some(dropped) if dropped.id == id => {
                tracing::debug!(genome = %dropped, "Unborn cache disabled, genome dropped");
            }
            Some(evicted) => {
                tracing::debug!(genome = %evicted, size = self.unborn.len(), "Unborn cache full, evicted oldest");
            }
            None => tracing::debug!(genome = %id, size = self.unborn.len(), "Added unborn genome"),
        }
    }

    /// Forgets the cache and cursors for a new world.
    pub fn reset(&mut self) {
        self.unborn.clear();
        self.cursors = DispenseCursors::default();
    }
}
