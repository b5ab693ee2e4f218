use std::convert::Infallible;

use serde::Serialize;

use crate::agent::Agent;
use crate::obstacle::Obstacle;

/// What a controller sees each tick: its own height and its distances to the
/// two edges of the upcoming gap.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Observation {
    pub y: f32,
    pub to_gap_start: f32,
    pub to_gap_end: f32,
}

impl Observation {
    pub fn new(agent: &Agent, target: &Obstacle) -> Self {
        let y = agent.y();
        Self {
            y,
            to_gap_start: (y - target.gap_start() as f32).abs(),
            to_gap_end: (y + agent.height() as f32 - target.gap_end() as f32).abs(),
        }
    }

    pub fn as_array(&self) -> [f32; 3] {
        [self.y, self.to_gap_start, self.to_gap_end]
    }
}

/// Decision function supplied per agent by the optimizer. An action above the
/// world's decision threshold triggers an impulse.
pub trait Controller {
    type Error;

    fn decide(&mut self, observation: &Observation) -> Result<f32, Self::Error>;
}

impl<F> Controller for F
where
    F: FnMut(&Observation) -> f32,
{
    type Error = Infallible;

    fn decide(&mut self, observation: &Observation) -> Result<f32, Infallible> {
        Ok(self(observation))
    }
}
