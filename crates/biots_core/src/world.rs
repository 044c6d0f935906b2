//! The explicit simulation context.
//!
//! A [`World`] owns the cells, the population manager and the random stream.
//! Each tick runs in two phases: [`World::evaluate`] decodes network outputs
//! for every cell (in parallel with the `parallel` feature), then
//! [`World::update`] applies dispensing, mating, lifecycle steps, births and
//! removals sequentially.

use crate::collaborators::{Environment, NetworkEvaluator, SensoryInput};
use crate::config::AppConfig;
use crate::lifecycle::{pair_mate, Cell, ExpiryCause, LifeEvent, StepContext};
use crate::metrics::{Metrics, ABORTED_SPAWNS, BIRTHS, DISPENSED, EXPIRATIONS};
use crate::population::{Census, DispenseSource, PopulationManager, SeedPools};
use crate::stats::{record_stat_death, update_population_stats, PopulationStats, StatsContext};
use biots_data::{Genome, Position};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::TAU;
use std::time::Instant;

/// Range of the initial frame counter, which staggers periodic checks.
const FRAME_PHASES: u64 = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    Dispensed {
        cell: u64,
        genome_id: String,
        source: DispenseSource,
    },
    Mated {
        a: u64,
        b: u64,
    },
    Born {
        cell: u64,
        parent: u64,
        generation: u32,
    },
    Unborn {
        genome_id: String,
        parent: u64,
    },
    SpawnAborted {
        cell: u64,
    },
    Expired {
        cell: u64,
        cause: ExpiryCause,
        age: u64,
    },
}

#[derive(Debug)]
pub struct World {
    pub config: AppConfig,
    pub tick: u64,
    pub cells: Vec<Cell>,
    pub population: PopulationManager,
    pub stats: PopulationStats,
    pub metrics: Metrics,
    rng: ChaCha8Rng,
    next_id: u64,
}

impl World {
    pub fn new(config: AppConfig, seeds: SeedPools) -> anyhow::Result<Self> {
        config.validate()?;
        let rng = config
            .world
            .seed
            .map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64);
        tracing::info!(
            mode = ?config.world.simulation_mode,
            seeds = seeds.any.len(),
            seed = ?config.world.seed,
            "World created"
        );
        Ok(Self {
            population: PopulationManager::new(&config, seeds),
            config,
            tick: 0,
            cells: Vec::new(),
            stats: PopulationStats::default(),
            metrics: Metrics::new(),
            rng,
            next_id: 0,
        })
    }

    #[must_use]
    pub fn census(&self) -> Census {
        Census::from_cells(&self.cells)
    }

    #[must_use]
    pub fn cell(&self, id: u64) -> Option<&Cell> {
        self.cells.iter().find(|c| c.id == id)
    }

    /// Places a new cell and returns its id.
    pub fn spawn_cell(&mut self, genome: Genome, position: Position, heading: f64) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let frame = self.rng.gen_range(0..FRAME_PHASES);
        self.cells
            .push(Cell::new(id, genome, position, heading, frame, &self.config.cell));
        id
    }

    fn dispense_placement(&mut self) -> (Position, f64) {
        let radius = self.config.world.radius;
        let distance = self.rng.gen_range(radius * 0.35..=radius * 0.9);
        let angle = self.rng.gen_range(0.0..TAU);
        let heading = self.rng.gen_range(0.0..TAU);
        (Position::ORIGIN.offset(angle, distance), heading)
    }

    /// Runs the networks of all live cells and folds the outputs into their
    /// decoders.
    pub fn evaluate(
        &mut self,
        evaluator: Option<&dyn NetworkEvaluator>,
        senses: Option<&dyn SensoryInput>,
    ) {
        let (Some(evaluator), Some(senses)) = (evaluator, senses) else {
            tracing::warn!(tick = self.tick, "Network evaluation skipped, collaborator missing");
            return;
        };
        let decode = |cell: &mut Cell| {
            if cell.expired {
                return;
            }
            let inputs = senses.sense(cell);
            if let Some(outputs) = evaluator.evaluate(&cell.genome, &inputs) {
                // Rejected outputs are logged by the decoder.
                cell.inference.infer(&outputs).ok();
            }
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            self.cells.par_iter_mut().for_each(decode);
        }
        #[cfg(not(feature = "parallel"))]
        self.cells.iter_mut().for_each(decode);
    }

    /// Advances the world by one tick.
    pub fn update<E: Environment + ?Sized>(
        &mut self,
        mut environment: Option<&mut E>,
    ) -> Vec<WorldEvent> {
        let started = Instant::now();
        let mut events = Vec::new();

        self.top_off(&mut events);
        if self.config.world.pairwise_mating {
            self.pair_mating(&mut events);
        }

        let mut births = Vec::new();
        let mut ctx = StepContext {
            config: &self.config,
            population: self.cells.iter().filter(|c| !c.expired).count(),
            rng: &mut self.rng,
        };
        for cell in &mut self.cells {
            for event in cell.step(&mut ctx, environment.as_deref_mut()) {
                match event {
                    LifeEvent::Spawned(offspring) => {
                        births.extend(offspring.into_iter().map(|child| (cell.id, child)));
                    }
                    LifeEvent::SpawnAborted => {
                        self.metrics.increment_counter(ABORTED_SPAWNS);
                        events.push(WorldEvent::SpawnAborted { cell: cell.id });
                    }
                    LifeEvent::Expired { cause } => {
                        self.metrics.increment_counter(EXPIRATIONS);
                        record_stat_death(&mut self.stats, cell.age);
                        events.push(WorldEvent::Expired {
                            cell: cell.id,
                            cause,
                            age: cell.age,
                        });
                    }
                    LifeEvent::Fed { .. }
                    | LifeEvent::Donated { .. }
                    | LifeEvent::SelfReplicated
                    | LifeEvent::Blinked => {}
                }
            }
        }

        let mut live = self.cells.iter().filter(|c| !c.expired).count();
        for (parent, child) in births {
            if live < self.config.world.maximum_population {
                let generation = child.genome.generation;
                let id = self.spawn_cell(child.genome, child.position, child.heading);
                live += 1;
                self.metrics.increment_counter(BIRTHS);
                events.push(WorldEvent::Born {
                    cell: id,
                    parent,
                    generation,
                });
            } else {
                events.push(WorldEvent::Unborn {
                    genome_id: child.genome.id.clone(),
                    parent,
                });
                self.population.add_unborn(child.genome);
            }
        }

        self.cells.retain(|c| !c.expired);
        self.tick += 1;

        if self.tick % self.config.world.stats_interval == 0 {
            self.refresh_stats();
            tracing::info!(
                tick = self.tick,
                population = self.stats.population,
                prey = self.stats.prey,
                predators = self.stats.predators,
                generations = %format!("{}-{}", self.stats.min_generation, self.stats.max_generation),
                avg_health = self.stats.avg_health,
                unborn = self.stats.unborn,
                "Population stats"
            );
        }
        self.metrics
            .record_tick(started.elapsed(), self.cells.len(), self.population.unborn().len());
        events
    }

    fn top_off(&mut self, events: &mut Vec<WorldEvent>) {
        let census = self.census();
        let Some(dispensed) = self.population.top_off(self.tick, &census, &mut self.rng) else {
            return;
        };
        let genome_id = dispensed.genome.id.clone();
        let (position, heading) = self.dispense_placement();
        let cell = self.spawn_cell(dispensed.genome, position, heading);
        self.metrics.increment_counter(DISPENSED);
        events.push(WorldEvent::Dispensed {
            cell,
            genome_id,
            source: dispensed.source,
        });
    }

    fn pair_mating(&mut self, events: &mut Vec<WorldEvent>) {
        let config = &self.config.cell;
        let reach = 2.0 * config.radius;
        for j in 1..self.cells.len() {
            let (left, right) = self.cells.split_at_mut(j);
            let b = &mut right[0];
            for a in left.iter_mut() {
                if a.position.distance(&b.position) <= reach && pair_mate(a, b, config) {
                    tracing::debug!(a = a.id, b = b.id, "Cells mated");
                    events.push(WorldEvent::Mated { a: a.id, b: b.id });
                }
            }
        }
    }

    pub fn refresh_stats(&mut self) {
        update_population_stats(StatsContext {
            stats: &mut self.stats,
            cells: &self.cells,
            config: &self.config.cell,
            unborn: self.population.unborn().len(),
        });
    }

    /// Empties the world for a fresh run. The random stream continues.
    pub fn reset(&mut self) {
        self.cells.clear();
        self.tick = 0;
        self.population.reset();
        self.stats = PopulationStats::default();
        tracing::info!("World reset");
    }
}
