//! A minimal resource field for running the engine headless.
//!
//! Algae are circles scattered over the world disc. Contacts are plain
//! circle overlaps, motion is linear along the heading, and nothing collides.

use biots_core::config::{AppConfig, CellConfig, ResourceConfig};
use biots_core::{Cell, Environment, ResourceId, SensoryInput};
use biots_data::Position;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::f64::consts::TAU;

/// Distance covered per tick at full thrust.
pub const MAX_SPEED: f64 = 2.0;
/// Heading change per tick at full differential thrust (radians).
pub const TURN_RATE: f64 = 0.1;
/// How far a cell can see algae.
pub const SENSE_RANGE: f64 = 250.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Algae {
    pub position: Position,
    pub energy: f64,
}

#[derive(Debug)]
pub struct Soup {
    radius: f64,
    input_count: usize,
    cell: CellConfig,
    resource: ResourceConfig,
    algae: BTreeMap<ResourceId, Algae>,
    next_id: ResourceId,
    rng: ChaCha8Rng,
}

impl Soup {
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        let rng = config
            .world
            .seed
            .map_or_else(ChaCha8Rng::from_entropy, |seed| {
                ChaCha8Rng::seed_from_u64(seed.wrapping_add(1))
            });
        Self {
            radius: config.world.radius,
            input_count: config.neural.input_count,
            cell: config.cell.clone(),
            resource: config.resource.clone(),
            algae: BTreeMap::new(),
            next_id: 0,
            rng,
        }
    }

    #[must_use]
    pub fn algae(&self, id: ResourceId) -> Option<&Algae> {
        self.algae.get(&id)
    }

    #[must_use]
    pub fn algae_count(&self) -> usize {
        self.algae.len()
    }

    #[must_use]
    pub fn total_energy(&self) -> f64 {
        self.algae.values().map(|a| a.energy).sum()
    }

    pub fn set_algae_target(&mut self, target: f64) {
        self.resource.algae_target = target;
    }

    fn insert(&mut self, position: Position, energy: f64) -> ResourceId {
        let id = self.next_id;
        self.next_id += 1;
        self.algae.insert(id, Algae { position, energy });
        id
    }

    /// Clears eaten algae and grows new ones until the field holds the
    /// target energy. Returns the number of algae added.
    pub fn regrow(&mut self) -> usize {
        self.algae.retain(|_, a| a.energy > 0.0);
        let mut total = self.total_energy();
        let mut added = 0;
        while total < self.resource.algae_target {
            // Uniform over the disc.
            let distance = self.radius * self.rng.gen::<f64>().sqrt();
            let angle = self.rng.gen_range(0.0..TAU);
            self.insert(Position::ORIGIN.offset(angle, distance), self.resource.algae_energy);
            total += self.resource.algae_energy;
            added += 1;
        }
        if added > 0 {
            tracing::trace!(added, algae = self.algae.len(), "Algae regrown");
        }
        added
    }

    /// Moves every live cell along its decoded thrust, keeping it inside the
    /// world disc.
    pub fn move_cells(&self, cells: &mut [Cell]) {
        let limit = (self.radius - self.cell.radius).max(0.0);
        for cell in cells.iter_mut().filter(|c| !c.expired) {
            let [left, right] = cell.inference.thrust().map(f64::from);
            let mut speed = (left + right) / 2.0 * MAX_SPEED;
            if cell.inference.speed_boost() {
                speed *= self.cell.boost_multiplier;
            }
            cell.heading = (cell.heading + (left - right) * TURN_RATE).rem_euclid(TAU);
            let mut next = cell.position.offset(cell.heading, speed);
            let distance = next.distance_to_origin();
            if distance > limit {
                next = Position::new(next.x * limit / distance, next.y * limit / distance);
            }
            cell.position = next;
        }
    }

    fn nearest_algae(&self, position: Position) -> Option<(f64, Position)> {
        self.algae
            .values()
            .filter(|a| a.energy > 0.0)
            .map(|a| (position.distance(&a.position), a.position))
            .filter(|(d, _)| *d <= SENSE_RANGE)
            .min_by(|a, b| a.0.total_cmp(&b.0))
    }
}

impl Environment for Soup {
    fn contacted_resources(&self, position: Position, radius: f64) -> Vec<ResourceId> {
        let reach = radius + self.resource.algae_radius;
        self.algae
            .iter()
            .filter(|(_, a)| a.position.distance(&position) <= reach)
            .map(|(&id, _)| id)
            .collect()
    }

    fn resource_energy(&self, id: ResourceId) -> Option<f64> {
        self.algae.get(&id).map(|a| a.energy)
    }

    fn set_resource_energy(&mut self, id: ResourceId, energy: f64) {
        if let Some(algae) = self.algae.get_mut(&id) {
            algae.energy = energy.max(0.0);
        }
    }

    fn deposit_resource(&mut self, position: Position, energy: f64) -> ResourceId {
        self.insert(position, energy)
    }
}

impl SensoryInput for Soup {
    fn sense(&self, cell: &Cell) -> Vec<f32> {
        let (proximity, bearing) = match self.nearest_algae(cell.position) {
            Some((distance, target)) => {
                let direction = (target.y - cell.position.y).atan2(target.x - cell.position.x);
                (1.0 - distance / SENSE_RANGE, direction - cell.heading)
            }
            None => (0.0, 0.0),
        };
        let mut inputs = vec![
            cell.health(&self.cell),
            cell.stamina,
            cell.heading.sin(),
            cell.heading.cos(),
            proximity,
            bearing.sin(),
            bearing.cos(),
            cell.position.distance_to_origin() / self.radius,
            cell.age as f64 / self.cell.old_age as f64,
            if cell.is_pregnant() { 1.0 } else { 0.0 },
            if cell.genome.is_predator() { 1.0 } else { 0.0 },
            1.0,
        ];
        inputs.resize(self.input_count, 0.0);
        inputs.into_iter().map(|v| v as f32).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biots_core::GenomeLogic;
    use biots_data::{Genome, Species};

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.world.seed = Some(11);
        config.resource.algae_target = 400.0;
        config
    }

    fn cell(config: &AppConfig, position: Position) -> Cell {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let genome =
            Genome::new_random_with_rng(Species::Prey, &config.neural.shape(), 1.0, &mut rng);
        Cell::new(0, genome, position, 0.0, 0, &config.cell)
    }

    #[test]
    fn test_regrow_reaches_target() {
        let config = config();
        let mut soup = Soup::new(&config);
        assert_eq!(soup.regrow(), 10);
        assert!(soup.total_energy() >= 400.0);
        assert_eq!(soup.regrow(), 0);
        for id in 0..10 {
            let algae = soup.algae(id).unwrap();
            assert!(algae.position.distance_to_origin() <= config.world.radius);
        }
    }

    #[test]
    fn test_eaten_algae_replaced() {
        let mut soup = Soup::new(&config());
        soup.regrow();
        soup.set_resource_energy(3, 0.0);
        assert_eq!(soup.regrow(), 1);
        assert!(soup.algae(3).is_none());
        assert_eq!(soup.algae_count(), 10);
    }

    #[test]
    fn test_contacts_and_deposit() {
        let mut soup = Soup::new(&config());
        let id = soup.deposit_resource(Position::new(100.0, 0.0), 25.0);
        assert_eq!(soup.resource_energy(id), Some(25.0));
        assert_eq!(soup.contacted_resources(Position::new(80.0, 0.0), 16.0), vec![id]);
        assert!(soup.contacted_resources(Position::new(60.0, 0.0), 16.0).is_empty());

        soup.set_resource_energy(id, -3.0);
        assert_eq!(soup.resource_energy(id), Some(0.0));
    }

    #[test]
    fn test_sense_matches_input_count() {
        let config = config();
        let mut soup = Soup::new(&config);
        soup.deposit_resource(Position::new(50.0, 0.0), 40.0);
        let inputs = soup.sense(&cell(&config, Position::ORIGIN));

        assert_eq!(inputs.len(), config.neural.input_count);
        assert!(inputs.iter().all(|v| v.is_finite()));
        assert!((inputs[4] - 0.8).abs() < 1e-6);
        // Straight ahead.
        assert!((inputs[6] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cells_stay_inside() {
        let config = config();
        let soup = Soup::new(&config);
        let edge = config.world.radius - config.cell.radius;
        let mut cells = vec![cell(&config, Position::new(edge, 0.0))];
        cells[0].inference.infer(&[1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0]).unwrap();

        for _ in 0..20 {
            soup.move_cells(&mut cells);
        }
        assert!(cells[0].position.distance_to_origin() <= edge + 1e-9);
    }
}
