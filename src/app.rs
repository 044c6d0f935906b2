use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

use crate::model::config::AppConfig;
use crate::model::evaluator::DenseEvaluator;
use crate::model::population::SeedPools;
use crate::model::soup::Soup;
use crate::model::world::{World, WorldEvent};
use biots_core::stats::PopulationStats;

/// Reads a TOML config, falling back to defaults when the file is absent.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "Config not found, using defaults");
        return Ok(AppConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    AppConfig::from_toml(&content).with_context(|| format!("parsing config {}", path.display()))
}

/// Event tallies of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub dispensed: usize,
    pub born: usize,
    pub unborn: usize,
    pub aborted: usize,
    pub expired: usize,
    pub mated: usize,
    pub elapsed_ms: u64,
    pub stats: PopulationStats,
}

impl RunSummary {
    fn record(&mut self, events: &[WorldEvent]) {
        for event in events {
            match event {
                WorldEvent::Dispensed { .. } => self.dispensed += 1,
                WorldEvent::Born { .. } => self.born += 1,
                WorldEvent::Unborn { .. } => self.unborn += 1,
                WorldEvent::SpawnAborted { .. } => self.aborted += 1,
                WorldEvent::Expired { .. } => self.expired += 1,
                WorldEvent::Mated { .. } => self.mated += 1,
            }
        }
    }
}

pub struct App {
    pub running: bool,
    pub world: World,
    pub soup: Soup,
    evaluator: DenseEvaluator,
}

impl App {
    pub fn new(config: AppConfig, seeds: SeedPools) -> Result<Self> {
        let mut soup = Soup::new(&config);
        soup.regrow();
        let world = World::new(config, seeds)?;
        Ok(Self {
            running: true,
            world,
            soup,
            evaluator: DenseEvaluator::new(),
        })
    }

    /// One tick: think, move, live, regrow.
    pub fn step(&mut self) -> Vec<WorldEvent> {
        self.world.evaluate(Some(&self.evaluator), Some(&self.soup));
        self.soup.move_cells(&mut self.world.cells);
        let events = self.world.update(Some(&mut self.soup));
        self.soup.regrow();
        events
    }

    pub fn run(&mut self, ticks: u64) -> RunSummary {
        let started = Instant::now();
        let mut summary = RunSummary::default();
        while self.running && summary.ticks < ticks {
            let events = self.step();
            summary.record(&events);
            summary.ticks += 1;
        }
        self.world.refresh_stats();
        summary.stats = self.world.stats.clone();
        summary.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            ticks = summary.ticks,
            population = self.world.cells.len(),
            born = summary.born,
            expired = summary.expired,
            max_generation = summary.stats.max_generation,
            "Run finished"
        );
        summary
    }
}
