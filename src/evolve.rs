use std::convert::Infallible;
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::champion::Champion;
use crate::cohort::CohortError;
use crate::config::EvolveConfig;
use crate::controller::{Controller, Observation};
use crate::snapshot::{NullSink, SnapshotSink};
use crate::stepper::{GenerationReport, Stepper};
use crate::world::World;

// ============================
// Genome and its controller
// ============================

/// Three inputs straight into one `tanh` output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub weights: [f32; 3],
    pub bias: f32,
}

impl Genome {
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            weights: std::array::from_fn(|_| rng.gen_range(-1.0..1.0)),
            bias: rng.gen_range(-1.0..1.0),
        }
    }

    pub fn activate(&self, inputs: [f32; 3]) -> f32 {
        let sum: f32 = self.weights.iter().zip(inputs).map(|(w, x)| w * x).sum();
        (sum + self.bias).tanh()
    }

    pub fn mutate(&mut self, rng: &mut impl Rng, rate: f32, power: f32) {
        if power <= 0.0 {
            return;
        }
        for gene in self.weights.iter_mut().chain(std::iter::once(&mut self.bias)) {
            if rng.r#gen::<f32>() < rate {
                *gene += rng.gen_range(-power..power);
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct NetController {
    genome: Genome,
}

impl NetController {
    pub fn new(genome: Genome) -> Self {
        Self { genome }
    }
}

impl Controller for NetController {
    type Error = Infallible;

    fn decide(&mut self, observation: &Observation) -> Result<f32, Infallible> {
        Ok(self.genome.activate(observation.as_array()))
    }
}

// ============================
// Evolutionary trainer (population of genomes)
// ============================

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerationStats {
    pub generation: u32,
    pub best: f32,
    pub mean: f32,
    pub score: u32,
    pub ticks: u64,
}

pub struct EvoTrainer {
    config: EvolveConfig,
    pop: Vec<Genome>,
    generation: u32,
    max_generations: u32,
    history: Vec<GenerationStats>,
    champion: Option<Champion>,
    rng: SmallRng,
    seed: u64,
    solved: bool,
    breeding: bool,
}

impl EvoTrainer {
    pub fn new(config: EvolveConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().r#gen());
        let mut rng = SmallRng::seed_from_u64(seed);
        let pop = (0..config.population).map(|_| Genome::random(&mut rng)).collect();
        log::info!("population of {} seeded with {seed:#x}", config.population);
        Self {
            max_generations: config.max_generations,
            config,
            pop,
            generation: 0,
            history: Vec::new(),
            champion: None,
            rng,
            seed,
            solved: false,
            breeding: true,
        }
    }

    /// A single generation flown by one fixed genome.
    pub fn replay(genome: Genome, config: EvolveConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().r#gen());
        Self {
            config,
            pop: vec![genome],
            generation: 0,
            max_generations: 1,
            history: Vec::new(),
            champion: None,
            rng: SmallRng::seed_from_u64(seed),
            seed,
            solved: false,
            breeding: false,
        }
    }

    pub fn config(&self) -> &EvolveConfig { &self.config }
    pub fn generation(&self) -> u32 { self.generation }
    pub fn population(&self) -> &[Genome] { &self.pop }
    pub fn history(&self) -> &[GenerationStats] { &self.history }
    pub fn champion(&self) -> Option<&Champion> { self.champion.as_ref() }

    pub fn is_finished(&self) -> bool {
        self.solved || self.generation >= self.max_generations
    }

    fn track_seed(&self, generation: u32) -> u64 {
        self.seed ^ u64::from(generation).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }

    /// Builds the stepper for the next generation, or `None` once done.
    pub fn begin_generation(&self, world: &Arc<World>) -> Result<Option<Stepper<NetController>>, CohortError> {
        if self.is_finished() {
            return Ok(None);
        }
        let generation = self.generation + 1;
        let controllers = self.pop.iter().cloned().map(NetController::new).collect();
        let stepper = Stepper::new(world.clone(), controllers, generation, self.track_seed(generation))?;
        Ok(Some(stepper))
    }

    pub fn end_generation(&mut self, report: GenerationReport) -> GenerationStats {
        self.generation = report.generation;
        let (best_idx, best) = report.best().unwrap_or((0, 0.0));
        let stats = GenerationStats {
            generation: report.generation,
            best,
            mean: report.mean(),
            score: report.score,
            ticks: report.ticks,
        };
        log::info!(
            "generation {}: best {:.1} mean {:.2} score {} ticks {}{}",
            stats.generation,
            stats.best,
            stats.mean,
            stats.score,
            stats.ticks,
            if report.aborted { " (cut short)" } else { "" }
        );

        let improved = self.champion.as_ref().is_none_or(|c| best > c.fitness);
        if improved {
            if let Some(genome) = self.pop.get(best_idx) {
                self.champion = Some(Champion { genome: genome.clone(), fitness: best, generation: report.generation });
            }
        }
        if self.config.fitness_threshold.is_some_and(|t| best >= t) {
            log::info!("fitness threshold reached in generation {}", report.generation);
            self.solved = true;
        }
        self.history.push(stats.clone());

        if self.breeding && !self.is_finished() {
            self.reproduce(&report.fitness);
        }
        stats
    }

    fn tournament(&mut self, fitness: &[f32]) -> usize {
        let mut winner = self.rng.gen_range(0..self.pop.len());
        for _ in 1..self.config.tournament {
            let rival = self.rng.gen_range(0..self.pop.len());
            if fitness[rival] > fitness[winner] {
                winner = rival;
            }
        }
        winner
    }

    /// Elites carry over unchanged; the rest are mutated tournament winners.
    pub fn reproduce(&mut self, fitness: &[f32]) {
        debug_assert_eq!(fitness.len(), self.pop.len());
        let mut idxs: Vec<usize> = (0..self.pop.len()).collect();
        idxs.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));

        let size = self.config.population;
        let mut next: Vec<Genome> = Vec::with_capacity(size);
        for &i in idxs.iter().take(self.config.elitism) {
            next.push(self.pop[i].clone());
        }
        while next.len() < size {
            let parent = self.tournament(fitness);
            let mut child = self.pop[parent].clone();
            child.mutate(&mut self.rng, self.config.mutation_rate, self.config.mutation_power);
            next.push(child);
        }
        self.pop = next;
    }
}

/// Flies generations back to back without pacing until the trainer is done.
pub fn train(trainer: &mut EvoTrainer, world: &Arc<World>, sink: &mut impl SnapshotSink) -> Result<(), CohortError> {
    while let Some(mut stepper) = trainer.begin_generation(world)? {
        let Ok(()) = stepper.run(&mut *sink, trainer.config().tick_limit);
        trainer.end_generation(stepper.finish());
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BenchRun {
    pub seed: u64,
    pub score: u32,
    pub ticks: u64,
    pub fitness: f32,
}

/// Flies `genome` alone on each seed. Runs are independent and spread over
/// the rayon pool.
pub fn benchmark(
    world: &Arc<World>,
    genome: &Genome,
    seeds: &[u64],
    tick_limit: u64,
) -> Result<Vec<BenchRun>, CohortError> {
    seeds
        .par_iter()
        .map(|&seed| {
            let controllers = vec![NetController::new(genome.clone())];
            let mut stepper = Stepper::new(world.clone(), controllers, 1, seed)?;
            let Ok(()) = stepper.run(&mut NullSink, Some(tick_limit));
            let report = stepper.finish();
            Ok(BenchRun { seed, score: report.score, ticks: report.ticks, fitness: report.fitness[0] })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;

    fn world() -> Arc<World> {
        Arc::new(World::new(WorldConfig::default()).unwrap())
    }

    fn small(population: usize, generations: u32) -> EvolveConfig {
        EvolveConfig {
            population,
            max_generations: generations,
            tick_limit: Some(400),
            seed: Some(11),
            ..EvolveConfig::default()
        }
    }

    #[test]
    fn activation_is_bounded() {
        let g = Genome { weights: [1.0, -2.0, 0.5], bias: 0.1 };
        let out = g.activate([350.0, 10.0, 90.0]);
        assert!((-1.0..=1.0).contains(&out));
        assert!((Genome { weights: [0.0; 3], bias: 0.0 }.activate([1.0, 2.0, 3.0])).abs() < 1e-6);
    }

    #[test]
    fn reproduce_keeps_size_and_elite() {
        let mut t = EvoTrainer::new(small(8, 5));
        let fitness: Vec<f32> = (0..8).map(|i| i as f32).collect();
        let best = t.population()[7].clone();
        t.reproduce(&fitness);
        assert_eq!(t.population().len(), 8);
        assert_eq!(t.population()[0], best);
    }

    #[test]
    fn training_runs_every_generation_and_keeps_champion() {
        let mut t = EvoTrainer::new(small(6, 3));
        train(&mut t, &world(), &mut NullSink).unwrap();
        assert!(t.is_finished());
        assert_eq!(t.generation(), 3);
        assert_eq!(t.history().len(), 3);
        let best = t.history().iter().map(|s| s.best).fold(f32::MIN, f32::max);
        assert_eq!(t.champion().unwrap().fitness, best);
    }

    #[test]
    fn threshold_stops_early() {
        let cfg = EvolveConfig { fitness_threshold: Some(0.0), ..small(4, 10) };
        let mut t = EvoTrainer::new(cfg);
        train(&mut t, &world(), &mut NullSink).unwrap();
        assert_eq!(t.generation(), 1);
    }

    #[test]
    fn replay_flies_once_without_breeding() {
        let genome = Genome { weights: [0.0; 3], bias: -1.0 };
        let mut t = EvoTrainer::replay(genome.clone(), small(1, 30));
        train(&mut t, &world(), &mut NullSink).unwrap();
        assert_eq!(t.history().len(), 1);
        assert_eq!(t.population(), &[genome][..]);
    }

    #[test]
    fn benchmark_is_deterministic_per_seed() {
        let genome = Genome { weights: [0.0; 3], bias: -1.0 };
        let runs = benchmark(&world(), &genome, &[1, 2, 3], 300).unwrap();
        assert_eq!(runs.len(), 3);
        for run in &runs {
            // never flaps, so it always falls onto the floor on tick 21
            assert_eq!(run.ticks, 21);
            assert_eq!(run.score, 0);
        }
        assert_eq!(runs, benchmark(&world(), &genome, &[1, 2, 3], 300).unwrap());
    }
}
