use crate::config::CellConfig;
use crate::lifecycle::Cell;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

const LIFESPAN_WINDOW: usize = 100;

/// Snapshot of the live population.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    pub population: usize,
    pub prey: usize,
    pub predators: usize,
    pub min_generation: u32,
    pub max_generation: u32,
    pub avg_health: f64,
    /// Mean of `energy / maximum_energy`.
    pub avg_energy: f64,
    pub avg_stamina: f64,
    pub pregnant_fraction: f64,
    pub avg_spawn_count: f64,
    pub unborn: usize,
    /// Mean age at expiry over the most recent deaths.
    pub avg_lifespan: f64,
    #[serde(skip)]
    pub recent_lifespans: VecDeque<u64>,
}

pub struct StatsContext<'a> {
    pub stats: &'a mut PopulationStats,
    pub cells: &'a [Cell],
    pub config: &'a CellConfig,
    pub unborn: usize,
}

pub fn update_population_stats(ctx: StatsContext<'_>) {
    let live: Vec<&Cell> = ctx.cells.iter().filter(|c| !c.expired).collect();
    let stats = ctx.stats;
    stats.population = live.len();
    stats.unborn = ctx.unborn;
    stats.predators = live.iter().filter(|c| c.genome.is_predator()).count();
    stats.prey = live.len() - stats.predators;
    stats.min_generation = live.iter().map(|c| c.genome.generation).min().unwrap_or(0);
    stats.max_generation = live.iter().map(|c| c.genome.generation).max().unwrap_or(0);

    if live.is_empty() {
        stats.avg_health = 0.0;
        stats.avg_energy = 0.0;
        stats.avg_stamina = 0.0;
        stats.pregnant_fraction = 0.0;
        stats.avg_spawn_count = 0.0;
        return;
    }

    let config = ctx.config;
    stats.avg_health = mean(&live, |c| c.health(config));
    stats.avg_energy = mean(&live, |c| c.energy / c.maximum_energy(config));
    stats.avg_stamina = mean(&live, |c| c.stamina);
    stats.pregnant_fraction = mean(&live, |c| if c.is_pregnant() { 1.0 } else { 0.0 });
    stats.avg_spawn_count = mean(&live, |c| f64::from(c.spawn_count));
}

fn mean(cells: &[&Cell], f: impl Fn(&Cell) -> f64) -> f64 {
    cells.iter().map(|&c| f(c)).sum::<f64>() / cells.len() as f64
}

pub fn record_stat_death(stats: &mut PopulationStats, lifespan: u64) {
    stats.recent_lifespans.push_back(lifespan);
    if stats.recent_lifespans.len() > LIFESPAN_WINDOW {
        stats.recent_lifespans.pop_front();
    }
    stats.avg_lifespan = stats.recent_lifespans.iter().sum::<u64>() as f64
        / stats.recent_lifespans.len() as f64;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{GenomeLogic, WeightFill};
    use biots_data::{Genome, GenomeShape, Position, Species};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn cells(config: &CellConfig) -> Vec<Cell> {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let shape = GenomeShape::new(2, vec![2], 8);
        [(Species::Prey, 2), (Species::Predator, 5), (Species::Neutral, 3)]
            .into_iter()
            .enumerate()
            .map(|(i, (species, generation))| {
                let mut genome = Genome::new_with_fill(species, &shape, WeightFill::Random, 1.0, &mut rng);
                genome.generation = generation;
                Cell::new(i as u64, genome, Position::ORIGIN, 0.0, 0, config)
            })
            .collect()
    }

    #[test]
    fn test_stats_summarize_live_cells() {
        let config = CellConfig::default();
        let mut population = cells(&config);
        population[2].expired = true;
        population[0].energy = config.maximum_energy;
        population[1].energy = config.maximum_energy / 2.0;

        let mut stats = PopulationStats::default();
        update_population_stats(StatsContext {
            stats: &mut stats,
            cells: &population,
            config: &config,
            unborn: 4,
        });

        assert_eq!(stats.population, 2);
        assert_eq!(stats.prey, 1);
        assert_eq!(stats.predators, 1);
        assert_eq!((stats.min_generation, stats.max_generation), (2, 5));
        assert!((stats.avg_energy - 0.75).abs() < 1e-12);
        assert!((stats.avg_health - 0.75).abs() < 1e-12);
        assert_eq!(stats.unborn, 4);
    }

    #[test]
    fn test_empty_population_zeroes_averages() {
        let config = CellConfig::default();
        let mut stats = PopulationStats {
            avg_health: 0.9,
            ..Default::default()
        };
        update_population_stats(StatsContext {
            stats: &mut stats,
            cells: &[],
            config: &config,
            unborn: 0,
        });
        assert_eq!(stats.population, 0);
        assert_eq!(stats.avg_health, 0.0);
    }

    #[test]
    fn test_lifespan_window() {
        let mut stats = PopulationStats::default();
        for _ in 0..LIFESPAN_WINDOW {
            record_stat_death(&mut stats, 10);
        }
        record_stat_death(&mut stats, 110);
        assert_eq!(stats.recent_lifespans.len(), LIFESPAN_WINDOW);
        assert!((stats.avg_lifespan - 11.0).abs() < 1e-9);
    }
}
