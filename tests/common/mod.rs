pub mod macros;

use biots_data::{Genome, Position, Species};
use biots_lib::model::config::AppConfig;
use biots_lib::model::population::SeedPools;
use biots_lib::model::soup::Soup;
use biots_lib::model::world::World;
use biots_lib::model::GenomeLogic;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A random genome with the default network shape.
#[allow(dead_code)]
pub fn random_genome(species: Species, seed: u64) -> Genome {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let shape = AppConfig::default().neural.shape();
    Genome::new_random_with_rng(species, &shape, 1.0, &mut rng)
}

/// Cells that mature, self-replicate and give birth within a few dozen ticks.
#[allow(dead_code)]
pub fn fast_lifecycle(config: &mut AppConfig) {
    config.cell.initial_energy = config.cell.maximum_energy;
    config.cell.mature_age = 5;
    config.cell.self_replication_age = 10;
    config.cell.self_replication_interval = 1;
    config.cell.gestation_age = 5;
    config.cell.spawn_health = 0.3;
}

#[allow(dead_code)]
pub struct WorldBuilder {
    config: AppConfig,
    seeds: Vec<Genome>,
    cells: Vec<(Genome, Position)>,
}

#[allow(dead_code)]
impl WorldBuilder {
    /// An empty world that never dispenses on its own.
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.world.minimum_population = 0;
        config.world.seed = Some(0);
        config.resource.algae_target = 0.0;
        Self {
            config,
            seeds: Vec::new(),
            cells: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_seed_genomes(mut self, count: usize, species: Species) -> Self {
        let offset = self.seeds.len() as u64;
        self.seeds
            .extend((0..count as u64).map(|i| random_genome(species, 1000 + offset + i)));
        self
    }

    pub fn with_cell(mut self, genome: Genome, position: Position) -> Self {
        self.cells.push((genome, position));
        self
    }

    pub fn build(self) -> (World, Soup) {
        let mut soup = Soup::new(&self.config);
        soup.regrow();
        let mut world = World::new(self.config, SeedPools::from_genomes(self.seeds))
            .expect("Failed to create world in test builder");
        for (genome, position) in self.cells {
            world.spawn_cell(genome, position, 0.0);
        }
        (world, soup)
    }
}
