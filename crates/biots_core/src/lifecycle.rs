//! Per-cell lifecycle: aging, energy accounting, feeding, mating, spawning
//! and expiry.

use crate::collaborators::{Environment, ResourceId};
use crate::config::{AppConfig, CellConfig};
use crate::genome::GenomeLogic;
use crate::inference::Inference;
use biots_data::{Genome, Position};
use rand::Rng;
use std::f64::consts::{PI, TAU};

/// Angular offsets of the two children of one pregnancy.
pub const SPAWN_ANGLES: [f64; 2] = [-PI / 8.0, PI / 8.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellPhase {
    Growing,
    Mature,
    /// Mature and eligible to mate.
    Mating,
    Pregnant,
    /// Gestation elapsed, waiting on health to give birth.
    Spawning,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpiryCause {
    OldAge,
    Exhaustion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceContact {
    pub resource: ResourceId,
    pub when: u64,
}

/// A child genome with its birth placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Offspring {
    pub genome: Genome,
    pub position: Position,
    pub heading: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LifeEvent {
    Fed { resource: ResourceId, energy: f64 },
    Expired { cause: ExpiryCause },
    Donated { resource: ResourceId, energy: f64 },
    SelfReplicated,
    Spawned(Vec<Offspring>),
    SpawnAborted,
    Blinked,
}

/// Shared inputs of one lifecycle step.
pub struct StepContext<'a, R: Rng> {
    pub config: &'a AppConfig,
    /// Live population including births earlier in the same tick.
    pub population: usize,
    pub rng: &'a mut R,
}

#[derive(Debug, Clone)]
pub struct Cell {
    pub id: u64,
    pub genome: Genome,
    pub energy: f64,
    pub stamina: f64,
    pub age: u64,
    pub last_spawned_age: u64,
    pub last_pregnant_age: u64,
    pub last_interacted_age: u64,
    pub last_blink_age: u64,
    pub spawn_count: u32,
    pub mated_count: u32,
    pub mating_genome: Option<Genome>,
    pub expired: bool,
    pub position: Position,
    pub heading: f64,
    pub frame: u64,
    pub contacts: Vec<ResourceContact>,
    pub inference: Inference,
}

pub(crate) fn normalize_angle(angle: f64) -> f64 {
    angle.rem_euclid(TAU)
}

impl Cell {
    #[must_use]
    pub fn new(
        id: u64,
        genome: Genome,
        position: Position,
        heading: f64,
        frame: u64,
        config: &CellConfig,
    ) -> Self {
        Self {
            id,
            genome,
            energy: config.initial_energy,
            stamina: 1.0,
            age: 0,
            last_spawned_age: 0,
            last_pregnant_age: 0,
            last_interacted_age: 0,
            last_blink_age: 0,
            spawn_count: 0,
            mated_count: 0,
            mating_genome: None,
            expired: false,
            position,
            heading: normalize_angle(heading),
            frame,
            contacts: Vec::new(),
            inference: Inference::new(),
        }
    }

    #[must_use]
    pub fn is_pregnant(&self) -> bool {
        self.mating_genome.is_some()
    }

    /// Doubles while pregnant.
    #[must_use]
    pub fn maximum_energy(&self, config: &CellConfig) -> f64 {
        if self.is_pregnant() {
            config.maximum_energy * 2.0
        } else {
            config.maximum_energy
        }
    }

    #[must_use]
    pub fn health(&self, config: &CellConfig) -> f64 {
        self.energy / self.maximum_energy(config) - (1.0 - self.stamina)
    }

    /// 1 right after a blink, fading linearly to 0 over `blink_age` ticks.
    #[must_use]
    pub fn visibility(&self, config: &CellConfig) -> f64 {
        let blink_age = config.blink_age as f64;
        let since_blink = (self.age.saturating_sub(self.last_blink_age) as f64).clamp(0.0, blink_age);
        1.0 - since_blink / blink_age
    }

    #[must_use]
    pub fn effective_visibility(&self, config: &CellConfig) -> f64 {
        let visibility = self.visibility(config);
        if visibility > 0.5 {
            1.0
        } else {
            visibility
        }
    }

    #[must_use]
    pub fn is_mature(&self, config: &CellConfig) -> bool {
        self.age > config.mature_age
    }

    #[must_use]
    pub fn can_mate(&self, config: &CellConfig) -> bool {
        !self.expired
            && self.is_mature(config)
            && !self.is_pregnant()
            && self.health(config) > config.mate_health
    }

    #[must_use]
    pub fn can_interact(&self, config: &CellConfig) -> bool {
        !self.expired
            && self.is_mature(config)
            && self.age.saturating_sub(self.last_interacted_age) > config.interaction_age
    }

    #[must_use]
    pub fn gestation_elapsed(&self, config: &CellConfig) -> bool {
        self.is_pregnant() && self.age.saturating_sub(self.last_pregnant_age) > config.gestation_age
    }

    #[must_use]
    pub fn phase(&self, config: &CellConfig) -> CellPhase {
        if self.expired {
            CellPhase::Expired
        } else if self.gestation_elapsed(config) {
            CellPhase::Spawning
        } else if self.is_pregnant() {
            CellPhase::Pregnant
        } else if self.can_mate(config) {
            CellPhase::Mating
        } else if self.is_mature(config) {
            CellPhase::Mature
        } else {
            CellPhase::Growing
        }
    }

    pub fn incur_energy_change(&mut self, delta: f64, config: &CellConfig) {
        self.energy = (self.energy + delta).clamp(0.0, self.maximum_energy(config));
    }

    /// Positive deltas tire the cell.
    pub fn incur_stamina_change(&mut self, delta: f64) {
        self.stamina = (self.stamina - delta).clamp(0.0, 1.0);
    }

    /// Drains the cell. It expires on its next step.
    pub fn kill(&mut self) {
        self.energy = 0.0;
        self.stamina = 0.0;
    }

    /// Becomes pregnant with `other`. Returns false when already pregnant.
    pub fn mate(&mut self, other: Genome) -> bool {
        if self.is_pregnant() {
            return false;
        }
        self.mating_genome = Some(other);
        self.last_pregnant_age = self.age;
        self.mated_count += 1;
        true
    }

    pub fn start_interacting(&mut self) {
        self.last_interacted_age = self.age;
    }

    /// Advances the cell by one tick.
    pub fn step<R: Rng, E: Environment + ?Sized>(
        &mut self,
        ctx: &mut StepContext<'_, R>,
        mut environment: Option<&mut E>,
    ) -> Vec<LifeEvent> {
        let mut events = Vec::new();
        if self.expired {
            return events;
        }
        let config = ctx.config;
        let cell = &config.cell;
        self.age += 1;

        match environment.as_deref_mut() {
            Some(env) => self.feed(cell, config.resource.bite, env, &mut events),
            None => tracing::warn!(cell = self.id, "No environment, feeding skipped"),
        }

        let cause = if self.age >= cell.old_age {
            Some(ExpiryCause::OldAge)
        } else if self.health(cell) <= 0.0 {
            Some(ExpiryCause::Exhaustion)
        } else {
            None
        };
        if let Some(cause) = cause {
            self.expire(cause, config, environment, &mut events);
            return events;
        }

        if config.world.self_replication
            && self.frame % cell.self_replication_interval == 0
            && self.can_self_replicate(config)
        {
            let clone = self.genome.clone();
            if self.mate(clone) {
                tracing::debug!(cell = self.id, genome = self.genome.id_formatted(), "Self replicating");
                events.push(LifeEvent::SelfReplicated);
            }
        }

        if self.gestation_elapsed(cell) && self.health(cell) >= cell.spawn_health {
            if ctx.population >= config.world.maximum_population {
                tracing::debug!(cell = self.id, population = ctx.population, "Population full, spawn aborted");
                self.mating_genome = None;
                self.last_pregnant_age = 0;
                events.push(LifeEvent::SpawnAborted);
            } else {
                let offspring = self.spawn_children(config, ctx.rng);
                ctx.population += offspring.len();
                events.push(LifeEvent::Spawned(offspring));
            }
            self.last_spawned_age = self.age;
        }

        self.apply_actuator_costs(cell, &mut events);
        self.frame += 1;
        events
    }

    fn can_self_replicate(&self, config: &AppConfig) -> bool {
        let cell = &config.cell;
        !self.is_pregnant()
            && self.can_mate(cell)
            && self.spawn_count < cell.max_spawn_count
            && self.age.saturating_sub(self.last_spawned_age) > cell.gestation_age
            && self.genome.generation <= config.world.generation_training_threshold
            && self.age > cell.self_replication_age
    }

    fn feed<E: Environment + ?Sized>(
        &mut self,
        config: &CellConfig,
        bite: f64,
        env: &mut E,
        events: &mut Vec<LifeEvent>,
    ) {
        let age = self.age;
        if self.frame % config.contact_purge_interval == 0 {
            self.contacts
                .retain(|contact| age.saturating_sub(contact.when) <= config.time_between_bites);
        }

        for resource in env.contacted_resources(self.position, config.radius) {
            let Some(available) = env.resource_energy(resource).filter(|&e| e > 0.0) else {
                continue;
            };
            match self.contacts.iter().position(|c| c.resource == resource) {
                None => {
                    self.contacts.push(ResourceContact { resource, when: age });
                    self.bite(config, resource, available, bite, env, events);
                }
                Some(index) if age.saturating_sub(self.contacts[index].when) > config.time_between_bites => {
                    self.contacts[index].when = age;
                    self.bite(config, resource, available, bite, env, events);
                }
                Some(_) => {}
            }
        }
    }

    fn bite<E: Environment + ?Sized>(
        &mut self,
        config: &CellConfig,
        resource: ResourceId,
        available: f64,
        bite: f64,
        env: &mut E,
        events: &mut Vec<LifeEvent>,
    ) {
        if self.energy + bite / 4.0 >= self.maximum_energy(config) {
            return;
        }
        self.incur_energy_change(bite, config);
        let remaining = available - bite;
        env.set_resource_energy(resource, if remaining < bite { 0.0 } else { remaining });
        events.push(LifeEvent::Fed {
            resource,
            energy: bite,
        });
    }

    fn expire<E: Environment + ?Sized>(
        &mut self,
        cause: ExpiryCause,
        config: &AppConfig,
        environment: Option<&mut E>,
        events: &mut Vec<LifeEvent>,
    ) {
        self.expired = true;
        tracing::debug!(
            cell = self.id,
            genome = self.genome.id_formatted(),
            age = self.age,
            ?cause,
            "Cell expired"
        );
        events.push(LifeEvent::Expired { cause });

        let donation_radius = config.world.radius * config.resource.donation_radius_fraction;
        if self.position.distance_to_origin() >= donation_radius {
            return;
        }
        let energy = config.resource.donation_bites * config.resource.bite;
        match environment {
            Some(env) => {
                let resource = env.deposit_resource(self.position, energy);
                events.push(LifeEvent::Donated { resource, energy });
            }
            None => tracing::warn!(cell = self.id, "No environment, donation skipped"),
        }
    }

    /// Ends the pregnancy with two children, one per parent genome.
    fn spawn_children<R: Rng>(&mut self, config: &AppConfig, rng: &mut R) -> Vec<Offspring> {
        let Some(mate) = self.mating_genome.take() else {
            return Vec::new();
        };
        let cell = &config.cell;
        self.energy /= cell.spawn_energy_divisor;
        self.incur_stamina_change(cell.spawn_stamina_cost);
        // Pregnancy is over, so the energy cap is back to normal.
        self.energy = self.energy.min(self.maximum_energy(cell));
        self.spawn_count += 1;

        let parents = [&self.genome, &mate];
        let offspring: Vec<Offspring> = parents
            .into_iter()
            .zip(SPAWN_ANGLES)
            .map(|(parent, angle)| {
                let rate = config.evolution.rate_for_generation(parent.generation);
                let mut genome =
                    parent.derive_child_with_rng(rate, config.neural.max_weight_value, rng);
                genome.drift_markers_with_rng(config.world.markers_in_effect, rng);
                let direction = self.heading + angle;
                Offspring {
                    genome,
                    position: self.position.offset(direction, -2.0 * cell.radius),
                    heading: normalize_angle(direction + PI),
                }
            })
            .collect();

        tracing::debug!(
            cell = self.id,
            spawn_count = self.spawn_count,
            generation = self.genome.generation + 1,
            "Spawned children"
        );
        offspring
    }

    fn apply_actuator_costs(&mut self, config: &CellConfig, events: &mut Vec<LifeEvent>) {
        let mut thrust_cost = config.thrust_energy_cost * f64::from(self.inference.thrust_magnitude());
        if self.inference.speed_boost() {
            thrust_cost *= config.boost_multiplier;
            self.incur_stamina_change(config.boost_stamina_cost);
        } else {
            self.incur_stamina_change(-config.stamina_recovery);
        }
        self.incur_energy_change(-(config.idle_energy_cost + thrust_cost), config);

        if self.inference.blink() && self.age.saturating_sub(self.last_blink_age) > config.blink_cooldown {
            self.last_blink_age = self.age;
            self.incur_energy_change(-config.blink_exertion, config);
            events.push(LifeEvent::Blinked);
        }
    }
}

/// Pairwise mating between two touching cells. Each becomes pregnant with a
/// clone of the other's genome.
pub fn pair_mate(a: &mut Cell, b: &mut Cell, config: &CellConfig) -> bool {
    let ready = |cell: &Cell| cell.can_interact(config) && cell.can_mate(config);
    if !ready(a) || !ready(b) {
        return false;
    }
    a.mate(b.genome.clone());
    b.mate(a.genome.clone());
    a.start_interacting();
    b.start_interacting();
    true
}
