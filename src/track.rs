use std::collections::VecDeque;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::WorldConfig;
use crate::obstacle::Obstacle;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrackStep {
    pub scored: bool,
}

/// Active obstacles ordered by ascending x. Never empty: a new obstacle is
/// appended whenever one is passed, and again if the last one scrolls off
/// without being passed.
#[derive(Debug, Clone)]
pub struct ObstacleTrack {
    obstacles: VecDeque<Obstacle>,
    rng: SmallRng,
}

impl ObstacleTrack {
    pub fn new(cfg: &WorldConfig, mut rng: SmallRng) -> Self {
        let mut obstacles = VecDeque::with_capacity(3);
        obstacles.push_back(Obstacle::new(cfg.initial_obstacle_x, cfg, &mut rng));
        Self { obstacles, rng }
    }

    pub fn seeded(cfg: &WorldConfig, seed: u64) -> Self {
        Self::new(cfg, SmallRng::seed_from_u64(seed))
    }

    pub fn len(&self) -> usize { self.obstacles.len() }
    pub fn is_empty(&self) -> bool { self.obstacles.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> + '_ {
        self.obstacles.iter()
    }

    /// The obstacle agents at `lead_x` are approaching. Once the front one is
    /// behind them they look ahead to the next.
    pub fn nearest_unpassed(&self, lead_x: i32) -> &Obstacle {
        let front = &self.obstacles[0];
        match self.obstacles.get(1) {
            Some(next) if front.is_passed_by(lead_x) => next,
            _ => front,
        }
    }

    pub fn step(&mut self, lead_x: i32, cfg: &WorldConfig) -> TrackStep {
        let mut scored = false;
        if let Some(o) = self
            .obstacles
            .iter_mut()
            .find(|o| !o.passed && o.is_passed_by(lead_x))
        {
            o.passed = true;
            scored = true;
        }

        for o in self.obstacles.iter_mut() {
            o.advance(cfg.scroll_velocity);
        }

        if scored {
            let fresh = Obstacle::new(cfg.spawn_x, cfg, &mut self.rng);
            log::trace!("spawned obstacle at x={} gap={}", fresh.x(), fresh.gap_start());
            self.obstacles.push_back(fresh);
        }

        self.obstacles.retain(|o| !o.is_off_screen());
        // a lead behind the left edge never passes anything
        if self.obstacles.is_empty() {
            self.obstacles.push_back(Obstacle::new(cfg.spawn_x, cfg, &mut self.rng));
        }
        TrackStep { scored }
    }
}
