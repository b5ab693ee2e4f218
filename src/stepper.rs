use std::sync::Arc;

use serde::Serialize;

use crate::cohort::{Cohort, CohortError, Elimination};
use crate::collision;
use crate::controller::{Controller, Observation};
use crate::snapshot::{AgentView, ObstacleView, Snapshot, SnapshotSink};
use crate::track::ObstacleTrack;
use crate::world::World;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Running,
    Terminated,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub alive: usize,
    pub scored: bool,
    pub eliminated: Vec<Elimination>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Tick {
    Advanced(TickReport),
    Terminated,
}

/// Outcome of one generation, handed back to the optimizer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerationReport {
    pub generation: u32,
    pub ticks: u64,
    pub score: u32,
    /// Indexed like the controllers the generation started with.
    pub fitness: Vec<f32>,
    /// Stopped from outside while agents were still alive.
    pub aborted: bool,
}

impl GenerationReport {
    pub fn best(&self) -> Option<(usize, f32)> {
        self.fitness
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }

    pub fn mean(&self) -> f32 {
        if self.fitness.is_empty() {
            return 0.0;
        }
        self.fitness.iter().sum::<f32>() / self.fitness.len() as f32
    }
}

/// Runs one generation: agents, their controllers and fitness advance in
/// lockstep through a shared obstacle track until no agent is left.
pub struct Stepper<C> {
    world: Arc<World>,
    cohort: Cohort<C>,
    track: ObstacleTrack,
    generation: u32,
    tick: u64,
    score: u32,
    phase: Phase,
    aborted: bool,
}

impl<C: Controller> Stepper<C> {
    pub fn new(world: Arc<World>, controllers: Vec<C>, generation: u32, seed: u64) -> Result<Self, CohortError> {
        let cohort = Cohort::new(controllers, &world.config)?;
        let track = ObstacleTrack::seeded(&world.config, seed);
        log::info!("generation {generation}: {} agents, seed {seed:#x}", cohort.len());
        Ok(Self {
            world,
            cohort,
            track,
            generation,
            tick: 0,
            score: 0,
            phase: Phase::Running,
            aborted: false,
        })
    }

    pub fn generation(&self) -> u32 { self.generation }
    pub fn tick(&self) -> u64 { self.tick }
    pub fn score(&self) -> u32 { self.score }
    pub fn alive(&self) -> usize { self.cohort.len() }
    pub fn is_running(&self) -> bool { self.phase == Phase::Running }
    pub fn cohort(&self) -> &Cohort<C> { &self.cohort }
    pub fn track(&self) -> &ObstacleTrack { &self.track }
    pub fn world(&self) -> &Arc<World> { &self.world }

    /// Advances one tick. A failing controller stops the generation and its
    /// error is returned untouched; the failed tick leaves agents and fitness
    /// as they were.
    pub fn step(&mut self) -> Result<Tick, C::Error> {
        if self.phase == Phase::Terminated {
            return Ok(Tick::Terminated);
        }
        if self.cohort.is_empty() {
            self.phase = Phase::Terminated;
            log::debug!("generation {} extinct after {} ticks", self.generation, self.tick);
            return Ok(Tick::Terminated);
        }

        let world = &*self.world;
        let cfg = &world.config;
        let tick = self.tick + 1;
        let lead_x = cfg.agent_x;
        // every decision this tick sees the track as it was at the start
        let target = *self.track.nearest_unpassed(lead_x);

        // decide on advanced copies; the cohort only changes once every
        // controller has answered
        let mut staged = Vec::with_capacity(self.cohort.len());
        for member in self.cohort.iter_mut() {
            let mut agent = member.agent.clone();
            agent.advance(cfg);
            let observation = Observation::new(&agent, &target);
            match member.controller.decide(&observation) {
                Ok(action) => staged.push((agent, action)),
                Err(err) => {
                    log::warn!(
                        "controller {} failed at tick {tick}, stopping generation {}",
                        member.id(),
                        self.generation
                    );
                    self.phase = Phase::Terminated;
                    return Err(err);
                }
            }
        }

        self.tick = tick;
        for (member, (agent, action)) in self.cohort.iter_mut().zip(staged) {
            member.reward(cfg.survival_reward);
            member.agent = agent;
            if action > cfg.decision_threshold {
                member.agent.impulse(cfg);
            }
        }

        let track = &self.track;
        let eliminated = self
            .cohort
            .eliminate(|agent| collision::detect(agent, track.iter(), &world.sprites, cfg));
        for e in &eliminated {
            log::trace!("tick {}: agent {} hit {:?} with fitness {:.1}", self.tick, e.id, e.cause, e.fitness);
        }

        let mut scored = false;
        if !self.cohort.is_empty() {
            scored = self.track.step(lead_x, cfg).scored;
            if scored {
                self.score += 1;
                self.cohort.reward_all(cfg.pass_bonus);
                log::debug!("tick {}: score {} with {} alive", self.tick, self.score, self.cohort.len());
            }
        }

        Ok(Tick::Advanced(TickReport {
            tick: self.tick,
            alive: self.cohort.len(),
            scored,
            eliminated,
        }))
    }

    /// Steps until extinction or `tick_limit`, presenting every tick.
    pub fn run(&mut self, sink: &mut impl SnapshotSink, tick_limit: Option<u64>) -> Result<(), C::Error> {
        while let Tick::Advanced(_) = self.step()? {
            sink.present(&self.snapshot());
            if tick_limit.is_some_and(|limit| self.tick >= limit) {
                self.abort();
                break;
            }
        }
        Ok(())
    }

    /// Stops between ticks. Survivors keep the fitness earned so far.
    pub fn abort(&mut self) {
        if self.phase == Phase::Running && !self.cohort.is_empty() {
            log::info!(
                "generation {} aborted at tick {} with {} alive",
                self.generation,
                self.tick,
                self.cohort.len()
            );
            self.aborted = true;
        }
        self.phase = Phase::Terminated;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            generation: self.generation,
            tick: self.tick,
            score: self.score,
            alive: self.cohort.len(),
            agents: self
                .cohort
                .iter()
                .map(|m| AgentView {
                    id: m.id(),
                    x: m.agent.x(),
                    y: m.agent.y(),
                    tilt: m.agent.tilt(),
                    frame: m.agent.frame(),
                })
                .collect(),
            obstacles: self
                .track
                .iter()
                .map(|o| ObstacleView { x: o.x(), gap_start: o.gap_start(), gap_end: o.gap_end() })
                .collect(),
        }
    }

    pub fn finish(self) -> GenerationReport {
        GenerationReport {
            generation: self.generation,
            ticks: self.tick,
            score: self.score,
            aborted: self.aborted,
            fitness: self.cohort.into_fitness(),
        }
    }
}
