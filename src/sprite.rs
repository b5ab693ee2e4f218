use serde::Serialize;

use crate::config::WorldConfig;
use crate::mask::Bitmask;

pub const AGENT_WIDTH: u32 = 68;
pub const AGENT_HEIGHT: u32 = 48;
// Height of the wider lip at the open end of each barrier.
pub(crate) const CAP_HEIGHT: u32 = 48;
const CAP_OVERHANG: u32 = 4;

/// How far the lip sticks out past the shaft on each side.
pub(crate) fn cap_overhang(width: u32) -> u32 {
    CAP_OVERHANG.min(width / 4)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum WingFrame {
    Up,
    Level,
    Down,
}

impl WingFrame {
    pub fn index(self) -> usize {
        match self {
            WingFrame::Up => 0,
            WingFrame::Level => 1,
            WingFrame::Down => 2,
        }
    }
}

/// Collision shapes for one run: three wing frames for agents and the two
/// barrier orientations.
#[derive(Debug, Clone)]
pub struct Silhouettes {
    agent: [Bitmask; 3],
    barrier_top: Bitmask,
    barrier_bottom: Bitmask,
}

impl Silhouettes {
    pub fn new(cfg: &WorldConfig) -> Self {
        let bottom = barrier(cfg.obstacle_width as u32, cfg.barrier_height as u32);
        Self {
            agent: [agent_frame(0), agent_frame(1), agent_frame(2)],
            barrier_top: bottom.flipped_vertical(),
            barrier_bottom: bottom,
        }
    }

    pub fn agent(&self, frame: WingFrame) -> &Bitmask { &self.agent[frame.index()] }
    pub fn barrier_top(&self) -> &Bitmask { &self.barrier_top }
    pub fn barrier_bottom(&self) -> &Bitmask { &self.barrier_bottom }
}

fn inside_ellipse(x: u32, y: u32, cx: f32, cy: f32, rx: f32, ry: f32) -> bool {
    let dx = (x as f32 + 0.5 - cx) / rx;
    let dy = (y as f32 + 0.5 - cy) / ry;
    dx * dx + dy * dy <= 1.0
}

// Body, beak and a wing whose height depends on the frame.
fn agent_frame(frame: u32) -> Bitmask {
    let wing_cy = 14.0 + 10.0 * frame as f32;
    Bitmask::from_fn(AGENT_WIDTH, AGENT_HEIGHT, |x, y| {
        let body = inside_ellipse(x, y, 30.0, 24.0, 28.0, 20.0);
        let beak = (54..AGENT_WIDTH).contains(&x) && (24..32).contains(&y);
        let wing = inside_ellipse(x, y, 16.0, wing_cy, 14.0, 7.0);
        body || beak || wing
    })
}

// Bottom-barrier orientation: lip on the top rows, narrower shaft below.
fn barrier(width: u32, height: u32) -> Bitmask {
    let overhang = cap_overhang(width);
    Bitmask::from_fn(width, height, |x, y| {
        y < CAP_HEIGHT || (x >= overhang && x < width - overhang)
    })
}
