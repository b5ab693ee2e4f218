use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid world config: {0}")]
    InvalidWorld(&'static str),
    #[error("invalid evolution config: {0}")]
    InvalidEvolve(&'static str),
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Constants shared by every agent and obstacle of a run. Units are screen
/// pixels and logical ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: u32,
    pub height: u32,
    pub floor_y: i32,
    pub agent_x: i32,
    pub agent_start_y: f32,

    pub gap_size: i32,
    pub gap_start_min: i32,
    pub gap_start_max: i32,
    pub obstacle_width: i32,
    pub barrier_height: i32,
    pub scroll_velocity: i32,
    pub initial_obstacle_x: i32,
    pub spawn_x: i32,

    pub impulse_velocity: f32,
    pub gravity: f32,
    pub max_fall: f32,
    /// Extra lift applied whenever the displacement of a tick is upward.
    pub upward_bias: f32,

    pub max_tilt: f32,
    pub min_tilt: f32,
    pub tilt_velocity: f32,
    pub tilt_hold_distance: f32,
    pub wing_period: u32,

    pub survival_reward: f32,
    pub pass_bonus: f32,
    pub decision_threshold: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 530,
            height: 780,
            floor_y: 700,
            agent_x: 230,
            agent_start_y: 350.0,
            gap_size: 200,
            gap_start_min: 50,
            gap_start_max: 450,
            obstacle_width: 104,
            barrier_height: 640,
            scroll_velocity: 5,
            initial_obstacle_x: 700,
            spawn_x: 550,
            impulse_velocity: -10.5,
            gravity: 3.0,
            max_fall: 16.0,
            upward_bias: 2.0,
            max_tilt: 25.0,
            min_tilt: -90.0,
            tilt_velocity: 20.0,
            tilt_hold_distance: 50.0,
            wing_period: 5,
            survival_reward: 0.1,
            pass_bonus: 5.0,
            decision_threshold: 0.5,
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bad = |msg| Err(ConfigError::InvalidWorld(msg));
        if self.width == 0 || self.height == 0 {
            return bad("world width and height must be non-zero");
        }
        if self.floor_y <= 0 || self.floor_y > self.height as i32 {
            return bad("floor_y must lie inside the world");
        }
        if self.agent_x <= 0 || self.agent_x >= self.width as i32 {
            return bad("agent_x must lie inside the world");
        }
        if self.agent_start_y <= 0.0 || self.agent_start_y >= self.floor_y as f32 {
            return bad("agent_start_y must lie between ceiling and floor");
        }
        if self.gap_size <= 0 || self.obstacle_width <= 0 || self.barrier_height <= 0 {
            return bad("obstacle dimensions must be positive");
        }
        if self.gap_start_min < 0 || self.gap_start_min > self.gap_start_max {
            return bad("gap start range is empty");
        }
        if self.gap_start_max + self.gap_size > self.floor_y {
            return bad("gap must end above the floor");
        }
        if self.barrier_height < self.gap_start_max {
            return bad("top barrier is shorter than the deepest gap");
        }
        if self.scroll_velocity <= 0 {
            return bad("scroll_velocity must be positive");
        }
        if self.spawn_x < self.agent_x || self.initial_obstacle_x < self.agent_x {
            return bad("obstacles must spawn ahead of the agents");
        }
        if self.max_fall <= 0.0 || self.gravity < 0.0 || self.impulse_velocity >= 0.0 {
            return bad("motion constants must produce a rise after an impulse and a bounded fall");
        }
        if self.min_tilt > self.max_tilt || self.tilt_velocity < 0.0 {
            return bad("tilt range is inverted");
        }
        if self.wing_period == 0 {
            return bad("wing_period must be non-zero");
        }
        if self.survival_reward < 0.0 || self.pass_bonus < 0.0 {
            return bad("rewards must be non-negative");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolveConfig {
    pub population: usize,
    pub max_generations: u32,
    /// Logical ticks per second for windowed runs.
    pub fps: u32,
    /// Generations are cut short after this many ticks.
    pub tick_limit: Option<u64>,
    pub mutation_rate: f32,
    pub mutation_power: f32,
    pub elitism: usize,
    pub tournament: usize,
    pub fitness_threshold: Option<f32>,
    pub seed: Option<u64>,
}

impl Default for EvolveConfig {
    fn default() -> Self {
        Self {
            population: 50,
            max_generations: 30,
            fps: 30,
            tick_limit: None,
            mutation_rate: 0.8,
            mutation_power: 0.5,
            elitism: 2,
            tournament: 3,
            fitness_threshold: None,
            seed: None,
        }
    }
}

impl EvolveConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bad = |msg| Err(ConfigError::InvalidEvolve(msg));
        if self.population == 0 {
            return bad("population must be non-zero");
        }
        if self.elitism > self.population {
            return bad("elitism exceeds population");
        }
        if self.tournament == 0 {
            return bad("tournament size must be non-zero");
        }
        if self.fps == 0 {
            return bad("fps must be non-zero");
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) || self.mutation_power < 0.0 {
            return bad("mutation rate must be in [0, 1] and power non-negative");
        }
        if self.tick_limit == Some(0) {
            return bad("tick_limit must be non-zero when set");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub world: WorldConfig,
    pub evolve: EvolveConfig,
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        settings.validate()?;
        log::info!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world.validate()?;
        self.evolve.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Settings::default().validate().unwrap();
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s = Settings::from_json(r#"{ "world": { "gap_size": 180 }, "evolve": { "population": 7 } }"#)
            .unwrap();
        assert_eq!(s.world.gap_size, 180);
        assert_eq!(s.world.floor_y, 700);
        assert_eq!(s.evolve.population, 7);
        assert_eq!(s.evolve.max_generations, 30);
    }

    #[test]
    fn rejects_gap_below_floor() {
        let world = WorldConfig { gap_start_max: 600, ..WorldConfig::default() };
        assert!(matches!(world.validate(), Err(ConfigError::InvalidWorld(_))));
    }

    #[test]
    fn rejects_empty_population() {
        let evolve = EvolveConfig { population: 0, ..EvolveConfig::default() };
        assert!(evolve.validate().is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Settings::load("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
