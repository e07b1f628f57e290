//! The simulation orchestrator: owns the grid, the city, the scheduled
//! population and the statistics time series for one run.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::agent::CommuteAgent;
use crate::city::CityMarker;
use crate::config::SimulationConfig;
use crate::error::{ConfigError, PlacementError, Result};
use crate::events::EventLogger;
use crate::grid::{Grid, Occupant};
use crate::scheduler::{Scheduler, StepContext};
use crate::statistics::{Snapshot, StatisticsCollector};
use crate::types::{AgentId, EntityKind, Position};

/// Random draws allowed per agent before placement gives up.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 10_000;

/// Read-only view of one grid entity for renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub kind: EntityKind,
    pub id: Option<AgentId>,
    pub position: Position,
    pub wealth: Option<Decimal>,
}

pub struct Simulation {
    config: SimulationConfig,
    grid: Grid,
    city: CityMarker,
    scheduler: Scheduler<CommuteAgent>,
    statistics: StatisticsCollector,
    rng: StdRng,
    events: EventLogger,
}

impl Simulation {
    /// Build a run with agents on uniformly random empty cells, then record
    /// the tick 0 snapshot.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let mut sim = Self::empty(config)?;

        for i in 0..sim.config.population {
            let pos = sim.random_empty_cell(i)?;
            sim.add_agent(AgentId(i), pos)?;
        }

        sim.collect_initial();
        Ok(sim)
    }

    /// Build a run with one agent per entry of `positions`. The configured
    /// population is replaced by `positions.len()`. Agents may share cells
    /// with each other but never with the city.
    pub fn with_positions(mut config: SimulationConfig, positions: &[Position]) -> Result<Self> {
        config.population = positions.len();
        config.validate_parameters()?;
        let mut sim = Self::empty(config)?;

        for (i, &pos) in positions.iter().enumerate() {
            if pos == sim.city.position() {
                return Err(PlacementError::CityCell { pos }.into());
            }
            sim.add_agent(AgentId(i), pos)?;
        }

        sim.collect_initial();
        Ok(sim)
    }

    fn empty(config: SimulationConfig) -> Result<Self> {
        let mut grid = Grid::new(config.width, config.height, config.torus)?;
        let city = CityMarker::place(&mut grid, config.city)?;
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            config,
            grid,
            city,
            scheduler: Scheduler::new(),
            statistics: StatisticsCollector::new(),
            rng,
            events: EventLogger::disabled(),
        })
    }

    fn random_empty_cell(&mut self, agent: usize) -> std::result::Result<Position, ConfigError> {
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let pos = Position::new(
                self.rng.random_range(0..self.grid.width()),
                self.rng.random_range(0..self.grid.height()),
            );
            if self.grid.is_empty(pos) {
                return Ok(pos);
            }
        }
        Err(ConfigError::UnsatisfiablePlacement {
            agent,
            attempts: MAX_PLACEMENT_ATTEMPTS,
        })
    }

    fn add_agent(&mut self, id: AgentId, pos: Position) -> Result<()> {
        self.grid.place(Occupant::Agent(id), pos)?;
        self.scheduler.add(CommuteAgent::new(
            id,
            pos,
            self.city.position(),
            self.config.initial_wealth,
            self.config.costs(),
        ));
        Ok(())
    }

    fn collect_initial(&mut self) {
        let snapshot = self.statistics.collect(0, self.scheduler.agents());
        info!(
            "Initialized '{}': {} agents on {}x{} grid, city at {}, Gini {:.3}",
            self.config.name,
            self.scheduler.len(),
            self.grid.width(),
            self.grid.height(),
            self.city.position(),
            snapshot.gini
        );
    }

    /// Run a single tick: every agent steps once in random order, then the
    /// population is observed.
    pub fn step(&mut self) -> Result<&Snapshot> {
        let tick = self.scheduler.ticks() + 1;
        let mut ctx = StepContext {
            tick,
            grid: &mut self.grid,
            city: &self.city,
            rng: &mut self.rng,
            events: &mut self.events,
        };
        self.scheduler.tick(&mut ctx)?;

        let snapshot = self.statistics.collect(tick, self.scheduler.agents());
        debug!("{}", snapshot);
        Ok(snapshot)
    }

    pub fn advance(&mut self, ticks: usize) -> Result<()> {
        info!("Advancing '{}' by {} ticks", self.config.name, ticks);
        for _ in 0..ticks {
            self.step()?;
        }
        Ok(())
    }

    /// Advance by the configured number of ticks.
    pub fn run(&mut self) -> Result<()> {
        self.advance(self.config.ticks)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn city(&self) -> &CityMarker {
        &self.city
    }

    pub fn agents(&self) -> &[CommuteAgent] {
        self.scheduler.agents()
    }

    pub fn agent(&self, id: AgentId) -> Option<&CommuteAgent> {
        self.scheduler.agents().iter().find(|a| a.id() == id)
    }

    /// Completed ticks.
    pub fn tick(&self) -> usize {
        self.scheduler.ticks()
    }

    pub fn statistics(&self) -> &StatisticsCollector {
        &self.statistics
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        self.statistics.snapshots()
    }

    /// The city followed by every agent.
    pub fn entities(&self) -> Vec<EntityView> {
        let mut out = Vec::with_capacity(self.scheduler.len() + 1);
        out.push(EntityView {
            kind: EntityKind::City,
            id: None,
            position: self.city.position(),
            wealth: None,
        });
        out.extend(self.scheduler.agents().iter().map(|a| EntityView {
            kind: EntityKind::Agent,
            id: Some(a.id()),
            position: a.position(),
            wealth: Some(a.wealth()),
        }));
        out
    }

    pub fn enable_events(&mut self) {
        self.events.set_enabled(true);
    }

    pub fn events(&self) -> &EventLogger {
        &self.events
    }
}
