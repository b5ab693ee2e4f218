use serde::Serialize;

use crate::cohort::AgentId;
use crate::sprite::WingFrame;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AgentView {
    pub id: AgentId,
    pub x: i32,
    pub y: f32,
    pub tilt: f32,
    pub frame: WingFrame,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ObstacleView {
    pub x: i32,
    pub gap_start: i32,
    pub gap_end: i32,
}

/// Read-only picture of one tick handed to presentation.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub generation: u32,
    pub tick: u64,
    pub score: u32,
    pub alive: usize,
    pub agents: Vec<AgentView>,
    pub obstacles: Vec<ObstacleView>,
}

/// Consumer of per-tick snapshots. Presenting never feeds back into the
/// simulation.
pub trait SnapshotSink {
    fn present(&mut self, snapshot: &Snapshot);
}

/// Discards every snapshot.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn present(&mut self, _snapshot: &Snapshot) {}
}

impl SnapshotSink for Vec<Snapshot> {
    fn present(&mut self, snapshot: &Snapshot) {
        self.push(snapshot.clone());
    }
}

impl<S: SnapshotSink + ?Sized> SnapshotSink for &mut S {
    fn present(&mut self, snapshot: &Snapshot) {
        (**self).present(snapshot);
    }
}
