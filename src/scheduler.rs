//! Random-activation scheduler.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::city::CityMarker;
use crate::error::Result;
use crate::events::EventLogger;
use crate::grid::Grid;

/// Everything an agent may touch while it is the one stepping.
pub struct StepContext<'a> {
    pub tick: usize,
    pub grid: &'a mut Grid,
    pub city: &'a CityMarker,
    pub rng: &'a mut StdRng,
    pub events: &'a mut EventLogger,
}

/// An entity that acts once per tick.
pub trait Steppable {
    fn step(&mut self, ctx: &mut StepContext<'_>) -> Result<()>;
}

/// Owns the steppable population and activates it in a fresh random order
/// each tick. Steps run strictly one after another, so every agent sees the
/// completed effects of the agents before it.
#[derive(Debug, Clone)]
pub struct Scheduler<A> {
    agents: Vec<A>,
    ticks: usize,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self {
            agents: Vec::new(),
            ticks: 0,
        }
    }
}

impl<A: Steppable> Scheduler<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, agent: A) {
        self.agents.push(agent);
    }

    pub fn agents(&self) -> &[A] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// A uniformly random permutation of agent indices.
    pub fn activation_order(&self, rng: &mut StdRng) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.agents.len()).collect();
        order.shuffle(rng);
        order
    }

    /// Step every agent once. The first failing step aborts the tick.
    pub fn tick(&mut self, ctx: &mut StepContext<'_>) -> Result<()> {
        let order = self.activation_order(ctx.rng);
        for idx in order {
            self.agents[idx].step(ctx)?;
        }
        self.ticks += 1;
        Ok(())
    }
}
