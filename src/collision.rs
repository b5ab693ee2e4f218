use serde::Serialize;

use crate::agent::Agent;
use crate::config::WorldConfig;
use crate::obstacle::Obstacle;
use crate::sprite::Silhouettes;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Collision {
    Obstacle,
    Ceiling,
    Floor,
}

pub fn collides(agent: &Agent, obstacle: &Obstacle, sprites: &Silhouettes) -> bool {
    obstacle.overlaps(agent, sprites)
}

pub fn out_of_bounds(agent: &Agent, cfg: &WorldConfig) -> Option<Collision> {
    if agent.y() <= 0.0 {
        Some(Collision::Ceiling)
    } else if agent.y() + agent.height() as f32 >= cfg.floor_y as f32 {
        Some(Collision::Floor)
    } else {
        None
    }
}

/// Why `agent` must leave the cohort, if it must. Obstacles are checked
/// before the world bounds.
pub fn detect<'a>(
    agent: &Agent,
    obstacles: impl IntoIterator<Item = &'a Obstacle>,
    sprites: &Silhouettes,
    cfg: &WorldConfig,
) -> Option<Collision> {
    if obstacles.into_iter().any(|o| collides(agent, o, sprites)) {
        return Some(Collision::Obstacle);
    }
    out_of_bounds(agent, cfg)
}
