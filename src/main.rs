use anyhow::{Context, Result};
use biots_core::init_logging;
use biots_lib::app::{load_config, App};
use biots_lib::model::config::SimulationMode;
use biots_lib::model::persistence::{load_pool, GameState};
use biots_lib::model::population::SeedPools;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the simulation headless
    Run {
        /// Config file path
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,

        /// Genome pool to seed the world from (JSON, optionally .gz)
        #[arg(short, long)]
        pool: Option<PathBuf>,

        /// Saved game state to resume
        #[arg(long)]
        state: Option<PathBuf>,

        /// Lowest generation taken from the pool
        #[arg(long, default_value_t = 1)]
        min_generation: u32,

        /// Number of ticks to simulate
        #[arg(short, long, default_value_t = 10_000)]
        ticks: u64,

        /// Random seed, overrides the config
        #[arg(short, long)]
        seed: Option<u64>,

        /// Write the final game state here
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Check a genome pool and report what would load
    Verify {
        #[arg(short, long)]
        pool: PathBuf,

        #[arg(long, default_value_t = 0)]
        min_generation: u32,
    },
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    match args.command {
        Command::Run {
            config,
            pool,
            state,
            min_generation,
            ticks,
            seed,
            save,
        } => {
            let mut config = load_config(&config)?;
            if seed.is_some() {
                config.world.seed = seed;
            }

            let mut genomes = Vec::new();
            if let Some(path) = state {
                let state = GameState::load(&path)?;
                if !state.matches_config(&config) {
                    tracing::warn!(name = %state.name, "Game state was saved with different settings");
                }
                state.apply_to(&mut config);
                genomes.extend(state.genomes);
            }
            if let Some(path) = pool {
                genomes.extend(load_pool(&path, min_generation)?.genomes);
            }
            if genomes.is_empty() && config.world.simulation_mode != SimulationMode::Random {
                tracing::warn!("No seed genomes, switching to random dispensing");
                config.world.simulation_mode = SimulationMode::Random;
            }

            let mut app = App::new(config, SeedPools::from_genomes(genomes))?;
            let summary = app.run(ticks);
            println!("{}", serde_json::to_string_pretty(&summary)?);

            if let Some(path) = save {
                GameState::capture("biots", &app.world)
                    .save(&path)
                    .with_context(|| format!("saving to {}", path.display()))?;
            }
        }
        Command::Verify {
            pool,
            min_generation,
        } => {
            let loaded = load_pool(&pool, min_generation)?;
            let pools = SeedPools::from_genomes(loaded.genomes);
            println!("{}", serde_json::to_string_pretty(&loaded.report)?);
            println!(
                "prey: {}, predators: {}",
                pools.prey.len(),
                pools.predator.len()
            );
        }
    }

    Ok(())
}
