//! Flappy-style flight simulation that scores a population of neural
//! controllers for neuro-evolution.
//!
//! One [`Stepper`] run is one generation: every controller flies its own
//! agent through a shared, procedurally generated obstacle track and earns
//! fitness for each tick survived and each obstacle passed.

pub mod agent;
pub mod champion;
pub mod cohort;
pub mod collision;
pub mod config;
pub mod controller;
pub mod draw;
pub mod evolve;
pub mod mask;
pub mod obstacle;
pub mod snapshot;
pub mod sprite;
pub mod stepper;
pub mod track;
#[cfg(feature = "viewer")]
pub mod viewer;
pub mod world;

pub use agent::Agent;
pub use champion::{Champion, ChampionError};
pub use cohort::{AgentId, Cohort, CohortError, Elimination};
pub use collision::Collision;
pub use config::{ConfigError, EvolveConfig, Settings, WorldConfig};
pub use controller::{Controller, Observation};
pub use evolve::{EvoTrainer, Genome, NetController};
pub use obstacle::Obstacle;
pub use snapshot::{NullSink, Snapshot, SnapshotSink};
pub use stepper::{GenerationReport, Stepper, Tick, TickReport};
pub use track::ObstacleTrack;
pub use world::World;
