use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::agent::Agent;
use crate::collision::Collision;
use crate::config::WorldConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CohortError {
    #[error("a cohort needs at least one controller")]
    Empty,
}

/// Position of a controller in the set the cohort was built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AgentId(pub usize);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An agent together with the controller flying it and the fitness it has
/// earned. The three only ever move as one record.
#[derive(Debug)]
pub struct Member<C> {
    id: AgentId,
    pub agent: Agent,
    pub controller: C,
    fitness: f32,
}

impl<C> Member<C> {
    pub fn id(&self) -> AgentId { self.id }
    pub fn fitness(&self) -> f32 { self.fitness }

    pub fn reward(&mut self, amount: f32) {
        self.fitness += amount;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Elimination {
    pub id: AgentId,
    pub cause: Collision,
    pub fitness: f32,
}

/// Live members in their original relative order, plus the frozen fitness of
/// every member already eliminated.
#[derive(Debug)]
pub struct Cohort<C> {
    members: Vec<Member<C>>,
    frozen: Vec<Option<f32>>,
}

impl<C> Cohort<C> {
    pub fn new(controllers: Vec<C>, cfg: &WorldConfig) -> Result<Self, CohortError> {
        if controllers.is_empty() {
            return Err(CohortError::Empty);
        }
        let frozen = vec![None; controllers.len()];
        let members = controllers
            .into_iter()
            .enumerate()
            .map(|(i, controller)| Member {
                id: AgentId(i),
                agent: Agent::spawn(cfg),
                controller,
                fitness: 0.0,
            })
            .collect();
        Ok(Self { members, frozen })
    }

    pub fn len(&self) -> usize { self.members.len() }
    pub fn is_empty(&self) -> bool { self.members.is_empty() }

    /// Number of controllers the cohort was built with.
    pub fn capacity(&self) -> usize { self.frozen.len() }

    pub fn iter(&self) -> impl Iterator<Item = &Member<C>> + '_ {
        self.members.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Member<C>> + '_ {
        self.members.iter_mut()
    }

    pub fn reward_all(&mut self, amount: f32) {
        for m in &mut self.members {
            m.reward(amount);
        }
    }

    /// Current fitness of a live member or the frozen fitness of an
    /// eliminated one.
    pub fn fitness_of(&self, id: AgentId) -> Option<f32> {
        if let Some(f) = self.frozen.get(id.0).copied().flatten() {
            return Some(f);
        }
        self.members.iter().find(|m| m.id == id).map(|m| m.fitness)
    }

    /// Removes every member `fate` condemns in one compaction pass. Survivors
    /// keep their relative order.
    pub fn eliminate(&mut self, mut fate: impl FnMut(&Agent) -> Option<Collision>) -> Vec<Elimination> {
        let mut out = Vec::new();
        let frozen = &mut self.frozen;
        self.members.retain(|m| match fate(&m.agent) {
            Some(cause) => {
                frozen[m.id.0] = Some(m.fitness);
                out.push(Elimination { id: m.id, cause, fitness: m.fitness });
                false
            }
            None => true,
        });
        out
    }

    /// Fitness per original controller. Survivors report what they have
    /// earned so far.
    pub fn into_fitness(self) -> Vec<f32> {
        let mut frozen = self.frozen;
        for m in self.members {
            frozen[m.id.0] = Some(m.fitness);
        }
        frozen.into_iter().map(|f| f.unwrap_or(0.0)).collect()
    }
}
