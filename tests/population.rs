mod common;

use biots_data::{Genome, Species};
use biots_lib::model::config::{AppConfig, SimulationMode};
use biots_lib::model::population::{
    Census, DispenseSource, Need, PopulationManager, SeedPools, UnbornCache,
};
use biots_lib::model::world::WorldEvent;
use common::{random_genome, WorldBuilder};
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn labelled(id: &str, generation: u32, species: Species) -> Genome {
    let mut genome = random_genome(species, u64::from(generation));
    genome.id = id.to_string();
    genome.generation = generation;
    genome
}

#[test]
fn test_unborn_cache_evicts_oldest() {
    let mut cache = UnbornCache::new(3);
    for id in ["A", "B", "C"] {
        assert!(cache.push(labelled(id, 1, Species::Prey)).is_none());
    }
    let evicted = cache.push(labelled("D", 1, Species::Prey)).expect("eviction");

    assert_eq!(evicted.id, "A");
    let ids: Vec<&str> = cache.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, ["B", "C", "D"]);
}

#[test]
fn test_unborn_cache_prefers_highest_generation() {
    let mut cache = UnbornCache::new(5);
    cache.push(labelled("old", 2, Species::Prey));
    cache.push(labelled("deep", 7, Species::Predator));
    cache.push(labelled("tie", 7, Species::Prey));

    assert_eq!(cache.take_best(Need::Prey).map(|g| g.id), Some("tie".to_string()));
    assert_eq!(cache.take_best(Need::Any).map(|g| g.id), Some("deep".to_string()));
    assert_eq!(cache.take_best(Need::Predator), None);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_unborn_genomes_dispensed_before_pool() {
    let (mut world, mut soup) = WorldBuilder::new()
        .with_config(|config| {
            config.world.minimum_population = 2;
            config.world.dispense_delay = 0;
            config.world.dispense_interval = 1;
        })
        .with_seed_genomes(1, Species::Prey)
        .build();
    world.population.add_unborn(labelled("waiting", 9, Species::Prey));

    let first = world.update(Some(&mut soup));
    let second = world.update(Some(&mut soup));

    let source = |events: &[WorldEvent]| {
        events.iter().find_map(|e| match e {
            WorldEvent::Dispensed { source, genome_id, .. } => Some((*source, genome_id.clone())),
            _ => None,
        })
    };
    assert_eq!(source(&first), Some((DispenseSource::Unborn, "waiting".to_string())));
    let (pool_source, pool_id) = source(&second).expect("pool dispense");
    assert_eq!(pool_source, DispenseSource::Pool);
    assert!(pool_id.ends_with("-0"));
    assert_population!(world, 2);
    assert_unborn!(world, 0);
}

#[test]
fn test_predator_prey_quotas_filled() {
    let (mut world, mut soup) = WorldBuilder::new()
        .with_config(|config| {
            config.world.simulation_mode = SimulationMode::PredatorPrey;
            config.world.minimum_population = 12;
            config.world.dispense_delay = 0;
            config.world.dispense_interval = 1;
        })
        .with_seed_genomes(2, Species::Predator)
        .with_seed_genomes(3, Species::Prey)
        .build();

    for _ in 0..30 {
        world.update(Some(&mut soup));
    }

    let census = world.census();
    assert_eq!(census.predators, 4);
    assert_eq!(census.prey, 7);
    assert_eq!(world.population.cursors().predator, 4);
    assert_eq!(world.population.cursors().prey, 7);
}

fn predator_prey_manager(minimum: usize) -> PopulationManager {
    let mut config = AppConfig::default();
    config.world.simulation_mode = SimulationMode::PredatorPrey;
    config.world.minimum_population = minimum;
    config.world.maximum_population = minimum.max(1) * 2;
    PopulationManager::new(&config, SeedPools::default())
}

proptest! {
    #[test]
    fn test_needs_follow_quotas(minimum in 0usize..60, predators in 0usize..40, prey in 0usize..40) {
        let manager = predator_prey_manager(minimum);
        let census = Census { total: predators + prey, prey, predators };
        let needs = manager.needs(&census);

        let predator_quota = (minimum as f64 * 0.34).floor() as usize;
        let prey_quota = (minimum as f64 * 0.66).floor() as usize;
        prop_assert_eq!(needs.contains(&Need::Predator), predators < predator_quota);
        prop_assert_eq!(needs.contains(&Need::Prey), prey < prey_quota);
        if needs.len() == 2 {
            prop_assert_eq!(needs[0], Need::Predator);
        }
    }

    #[test]
    fn test_cache_never_exceeds_capacity(capacity in 0usize..8, pushes in 0usize..20) {
        let mut cache = UnbornCache::new(capacity);
        let mut rng = ChaCha8Rng::seed_from_u64(pushes as u64);
        for i in 0..pushes {
            let species = if rng.gen_bool(0.5) {
                Species::Prey
            } else {
                Species::Predator
            };
            let mut genome = random_genome(species, i as u64);
            genome.id = format!("g{i}");
            cache.push(genome);
            prop_assert!(cache.len() <= capacity);
        }
        prop_assert_eq!(cache.len(), pushes.min(capacity));
    }
}
