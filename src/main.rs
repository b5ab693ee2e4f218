use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};

use flappy::evolve::{self, EvoTrainer};
use flappy::{Champion, NullSink, Settings, World};

const PLAY_TICK_LIMIT: u64 = 20_000;

#[derive(Parser, Debug)]
#[command(author, version, about = "Evolve neural controllers that fly through pipe gaps")]
struct Cli {
    /// Path to a JSON settings file (world + evolve sections)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for population and obstacle generation
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evolve a population and save the best genome
    Train {
        #[arg(long)]
        population: Option<usize>,
        #[arg(long)]
        generations: Option<u32>,
        /// Cut every generation short after this many ticks
        #[arg(long)]
        tick_limit: Option<u64>,
        #[arg(long, default_value = "winner.bin")]
        save: PathBuf,
        /// Watch training in a window (requires the `viewer` feature)
        #[arg(long, default_value_t = false)]
        window: bool,
    },
    /// Fly a saved champion alone
    Play {
        champion: PathBuf,
        #[arg(long)]
        tick_limit: Option<u64>,
        #[arg(long, default_value_t = false)]
        window: bool,
    },
    /// Fly a saved champion on several seeds and report its scores as JSON
    Bench {
        champion: PathBuf,
        #[arg(long, default_value = "16")]
        seeds: u64,
        #[arg(long, default_value = "20000")]
        tick_limit: u64,
    },
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(seed) = cli.seed {
        settings.evolve.seed = Some(seed);
    }

    match cli.command {
        Command::Train { population, generations, tick_limit, save, window } => {
            if let Some(p) = population { settings.evolve.population = p; }
            if let Some(g) = generations { settings.evolve.max_generations = g; }
            if tick_limit.is_some() { settings.evolve.tick_limit = tick_limit; }
            settings.validate()?;
            let world = Arc::new(World::new(settings.world.clone())?);
            let trainer = EvoTrainer::new(settings.evolve.clone());
            if window {
                return watch(world, trainer, Some(save));
            }
            if settings.evolve.tick_limit.is_none() {
                log::warn!("no tick limit set; a flawless generation will never end");
            }
            train_headless(world, trainer, &save)
        }
        Command::Play { champion, tick_limit, window } => {
            let champion = Champion::load(&champion)
                .with_context(|| format!("loading champion {}", champion.display()))?;
            settings.evolve.tick_limit = tick_limit.or(settings.evolve.tick_limit).or(Some(PLAY_TICK_LIMIT));
            settings.validate()?;
            let world = Arc::new(World::new(settings.world.clone())?);
            let mut trainer = EvoTrainer::replay(champion.genome, settings.evolve.clone());
            if window {
                return watch(world, trainer, None);
            }
            evolve::train(&mut trainer, &world, &mut NullSink)?;
            if let Some(stats) = trainer.history().last() {
                log::info!("champion scored {} over {} ticks", stats.score, stats.ticks);
            }
            Ok(())
        }
        Command::Bench { champion, seeds, tick_limit } => {
            let champion = Champion::load(&champion)
                .with_context(|| format!("loading champion {}", champion.display()))?;
            let world = Arc::new(World::new(settings.world.clone())?);
            let base = settings.evolve.seed.unwrap_or(0);
            let seeds: Vec<u64> = (0..seeds).map(|i| base.wrapping_add(i)).collect();
            let runs = evolve::benchmark(&world, &champion.genome, &seeds, tick_limit)?;
            let mean = runs.iter().map(|r| r.score as f64).sum::<f64>() / runs.len().max(1) as f64;
            log::info!("mean score {mean:.2} over {} seeds", runs.len());
            println!("{}", serde_json::to_string_pretty(&runs)?);
            Ok(())
        }
    }
}

fn train_headless(world: Arc<World>, mut trainer: EvoTrainer, save: &Path) -> Result<()> {
    evolve::train(&mut trainer, &world, &mut NullSink)?;
    match trainer.champion() {
        Some(champion) => {
            log::info!(
                "best genome: {:?} fitness {:.1} (generation {})",
                champion.genome,
                champion.fitness,
                champion.generation
            );
            champion
                .save(save)
                .with_context(|| format!("saving champion to {}", save.display()))?;
        }
        None => log::warn!("no generation completed; nothing to save"),
    }
    Ok(())
}

#[cfg(feature = "viewer")]
fn watch(world: Arc<World>, trainer: EvoTrainer, save: Option<PathBuf>) -> Result<()> {
    flappy::viewer::run(world, trainer, save)
}

#[cfg(not(feature = "viewer"))]
fn watch(_world: Arc<World>, _trainer: EvoTrainer, _save: Option<PathBuf>) -> Result<()> {
    anyhow::bail!("--window needs a build with the `viewer` feature")
}
