//! Random activation scheduler
//!
//! Every tick the full agent roster is shuffled and activated one agent at a
//! time. There is no memory between ticks beyond the roster itself.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::types::{ItemId, Tick, UserId};

/// A registered agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Agent {
    Item(ItemId),
    User(UserId),
}

#[derive(Debug, Clone)]
pub struct ActivationScheduler {
    agents: Vec<Agent>,
    activate_items: bool,
    tick: Tick,
}

impl ActivationScheduler {
    pub fn new(activate_items: bool) -> Self {
        Self {
            agents: Vec::new(),
            activate_items,
            tick: 0,
        }
    }

    pub fn add(&mut self, agent: Agent) {
        if matches!(agent, Agent::Item(_)) && !self.activate_items {
            return;
        }
        self.agents.push(agent);
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Shuffle the roster and return this tick's activation order
    ///
    /// The tick counter advances once per call.
    pub fn next_order<R: Rng>(&mut self, rng: &mut R) -> Vec<Agent> {
        let mut order = self.agents.clone();
        order.shuffle(rng);
        self.tick += 1;
        order
    }
}
