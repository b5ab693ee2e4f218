use rand::Rng;

use crate::agent::Agent;
use crate::config::WorldConfig;
use crate::sprite::Silhouettes;

/// A top and a bottom barrier separated by a fixed gap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    x: i32,
    gap_start: i32,
    gap_size: i32,
    width: i32,
    barrier_height: i32,
    pub(crate) passed: bool,
}

impl Obstacle {
    pub fn new(spawn_x: i32, cfg: &WorldConfig, rng: &mut impl Rng) -> Self {
        let gap_start = rng.gen_range(cfg.gap_start_min..=cfg.gap_start_max);
        Self::with_gap(spawn_x, gap_start, cfg)
    }

    pub fn with_gap(x: i32, gap_start: i32, cfg: &WorldConfig) -> Self {
        Self {
            x,
            gap_start,
            gap_size: cfg.gap_size,
            width: cfg.obstacle_width,
            barrier_height: cfg.barrier_height,
            passed: false,
        }
    }

    pub fn x(&self) -> i32 { self.x }
    pub fn width(&self) -> i32 { self.width }
    pub fn passed(&self) -> bool { self.passed }

    /// Bottom edge of the top barrier.
    pub fn gap_start(&self) -> i32 { self.gap_start }

    /// Top edge of the bottom barrier.
    pub fn gap_end(&self) -> i32 { self.gap_start + self.gap_size }

    /// Row where the top barrier's silhouette begins.
    pub fn top_y(&self) -> i32 { self.gap_start - self.barrier_height }

    pub fn advance(&mut self, velocity: i32) {
        self.x -= velocity;
    }

    pub fn overlaps(&self, agent: &Agent, sprites: &Silhouettes) -> bool {
        let mask = agent.silhouette(sprites);
        let dx = self.x - agent.x();
        let ay = agent.pixel_y();
        mask.overlaps(sprites.barrier_top(), (dx, self.top_y() - ay))
            || mask.overlaps(sprites.barrier_bottom(), (dx, self.gap_end() - ay))
    }

    pub fn is_off_screen(&self) -> bool {
        self.x + self.width < 0
    }

    pub fn is_passed_by(&self, agent_x: i32) -> bool {
        self.x + self.width < agent_x
    }
}
