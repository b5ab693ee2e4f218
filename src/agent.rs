use crate::config::WorldConfig;
use crate::mask::Bitmask;
use crate::sprite::{AGENT_HEIGHT, AGENT_WIDTH, Silhouettes, WingFrame};

/// One flying entity. `x` never changes after construction; every agent of a
/// generation shares it.
#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    x: i32,
    y: f32,
    velocity: f32,
    ticks_since_impulse: u32,
    // height at the last impulse, drives the tilt
    launch_y: f32,
    tilt: f32,
    wing_clock: u32,
    frame: WingFrame,
}

impl Agent {
    pub fn new(x: i32, y: f32) -> Self {
        Self {
            x,
            y,
            velocity: 0.0,
            ticks_since_impulse: 0,
            launch_y: y,
            tilt: 0.0,
            wing_clock: 0,
            frame: WingFrame::Up,
        }
    }

    pub fn spawn(cfg: &WorldConfig) -> Self {
        Self::new(cfg.agent_x, cfg.agent_start_y)
    }

    pub fn x(&self) -> i32 { self.x }
    pub fn y(&self) -> f32 { self.y }
    pub fn velocity(&self) -> f32 { self.velocity }
    pub fn tilt(&self) -> f32 { self.tilt }
    pub fn frame(&self) -> WingFrame { self.frame }
    pub fn width(&self) -> u32 { AGENT_WIDTH }
    pub fn height(&self) -> u32 { AGENT_HEIGHT }

    /// Row of the silhouette's origin; halves round to even.
    pub fn pixel_y(&self) -> i32 {
        self.y.round_ties_even() as i32
    }

    pub fn impulse(&mut self, cfg: &WorldConfig) {
        self.velocity = cfg.impulse_velocity;
        self.ticks_since_impulse = 0;
        self.launch_y = self.y;
    }

    /// Vertical displacement the next `advance` will apply.
    pub fn displacement(&self, cfg: &WorldConfig) -> f32 {
        let t = (self.ticks_since_impulse + 1) as f32;
        let mut d = self.velocity * t + 0.5 * cfg.gravity * t * t;
        if d >= cfg.max_fall {
            d = cfg.max_fall;
        }
        if d < 0.0 {
            d -= cfg.upward_bias;
        }
        d
    }

    pub fn advance(&mut self, cfg: &WorldConfig) {
        let d = self.displacement(cfg);
        self.ticks_since_impulse += 1;
        self.y += d;

        if self.y < self.launch_y + cfg.tilt_hold_distance {
            self.tilt = cfg.max_tilt;
        } else if self.tilt > cfg.min_tilt {
            self.tilt = (self.tilt - cfg.tilt_velocity).max(cfg.min_tilt);
        }

        self.flap(cfg.wing_period);
    }

    // Wing cycle Up, Level, Down, Level; a steep dive holds the wings level.
    fn flap(&mut self, period: u32) {
        self.wing_clock += 1;
        if self.wing_clock > period * 4 {
            self.wing_clock = 1;
        }
        self.frame = match (self.wing_clock - 1) / period {
            0 => WingFrame::Up,
            1 | 3 => WingFrame::Level,
            _ => WingFrame::Down,
        };
        if self.tilt < -80.0 {
            self.frame = WingFrame::Level;
            self.wing_clock = period * 2;
        }
    }

    pub fn silhouette<'a>(&self, sprites: &'a Silhouettes) -> &'a Bitmask {
        sprites.agent(self.frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_fall_accelerates_then_caps() {
        let cfg = WorldConfig::default();
        let mut a = Agent::spawn(&cfg);
        let mut ys = vec![a.y()];
        for _ in 0..6 {
            a.advance(&cfg);
            ys.push(a.y());
        }
        assert_eq!(ys, vec![350.0, 351.5, 357.5, 371.0, 387.0, 403.0, 419.0]);
    }

    #[test]
    fn impulse_lifts_with_bias() {
        let cfg = WorldConfig::default();
        let mut a = Agent::spawn(&cfg);
        a.impulse(&cfg);
        a.advance(&cfg);
        // -10.5 + 1.5 = -9, plus the upward bias of 2
        assert_eq!(a.y(), 339.0);
        a.advance(&cfg);
        // -21 + 6 = -15 - 2
        assert_eq!(a.y(), 322.0);
    }

    #[test]
    fn tilt_holds_near_launch_then_dives_to_limit() {
        let cfg = WorldConfig::default();
        let mut a = Agent::spawn(&cfg);
        a.advance(&cfg);
        assert_eq!(a.tilt(), cfg.max_tilt);
        for _ in 0..20 {
            a.advance(&cfg);
        }
        assert_eq!(a.tilt(), cfg.min_tilt);
        assert_eq!(a.frame(), WingFrame::Level);
    }

    #[test]
    fn wings_cycle_while_level() {
        let cfg = WorldConfig::default();
        let mut a = Agent::spawn(&cfg);
        let mut frames = Vec::new();
        for _ in 0..21 {
            a.advance(&cfg);
            a.impulse(&cfg);
            frames.push(a.frame());
        }
        assert_eq!(frames[0], WingFrame::Up);
        assert_eq!(frames[5], WingFrame::Level);
        assert_eq!(frames[10], WingFrame::Down);
        assert_eq!(frames[15], WingFrame::Level);
        assert_eq!(frames[20], WingFrame::Up);
    }

    #[test]
    fn pixel_row_rounds_half_to_even() {
        assert_eq!(Agent::new(0, 351.5).pixel_y(), 352);
        assert_eq!(Agent::new(0, 340.5).pixel_y(), 340);
    }
}
