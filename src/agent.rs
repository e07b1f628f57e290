use log::trace;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::events::{CommuteMode, EventType};
use crate::grid::{Grid, Occupant};
use crate::scheduler::{StepContext, Steppable};
use crate::types::{AgentId, Position};

/// Paid for every completed commute, whichever mode was used.
pub const COMMUTE_INCOME: Decimal = dec!(5);
/// Deducted unconditionally at the end of every step.
pub const COST_OF_LIVING: Decimal = dec!(1);
/// Wealth an agent keeps in reserve on top of the moving cost.
pub const MOVE_SAFETY_MARGIN: Decimal = dec!(5);

/// Price list shared by every agent of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommuteCosts {
    pub cost_per_unit_distance: Decimal,
    pub transit_cost: Decimal,
    pub cost_to_move: Decimal,
    pub transit_availability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommuteOutcome {
    Paid { mode: CommuteMode, cost: Decimal },
    /// The chosen mode was unaffordable; there is no fallback to the other.
    Skipped { mode: CommuteMode, cost: Decimal },
}

impl CommuteOutcome {
    pub fn mode(&self) -> CommuteMode {
        match self {
            CommuteOutcome::Paid { mode, .. } | CommuteOutcome::Skipped { mode, .. } => *mode,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommuteAgent {
    id: AgentId,
    wealth: Decimal,
    position: Position,
    city: Position,
    city_distance: f64,
    costs: CommuteCosts,
    last_commute: Option<CommuteOutcome>,
}

impl CommuteAgent {
    /// The caller is responsible for registering the agent on the grid at
    /// `position`.
    pub fn new(
        id: AgentId,
        position: Position,
        city: Position,
        initial_wealth: Decimal,
        costs: CommuteCosts,
    ) -> Self {
        Self {
            id,
            wealth: initial_wealth,
            position,
            city,
            city_distance: position.distance_to(city),
            costs,
            last_commute: None,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn wealth(&self) -> Decimal {
        self.wealth
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn city_distance(&self) -> f64 {
        self.city_distance
    }

    pub fn costs(&self) -> &CommuteCosts {
        &self.costs
    }

    pub fn last_commute(&self) -> Option<CommuteOutcome> {
        self.last_commute
    }

    /// Whole-unit price of driving to the city from here.
    pub fn car_cost(&self) -> Decimal {
        Decimal::from_f64(self.city_distance)
            .map(|d| (d * self.costs.cost_per_unit_distance).floor())
            .unwrap_or(Decimal::ZERO)
    }

    /// Chance of taking transit, capped at 1 but not floored: agents far
    /// enough out get a negative value and never draw transit.
    ///
    /// `reference_distance` is the origin-to-city distance. A city at the
    /// origin has no scale, so the distance ratio is taken as zero.
    pub fn transit_probability(&self, reference_distance: f64) -> f64 {
        let ratio = if reference_distance > 0.0 {
            self.city_distance / reference_distance
        } else {
            0.0
        };
        let p = self.costs.transit_availability - ratio;
        if p >= 1.0 { 1.0 } else { p }
    }

    /// Choose a mode for the uniform draw `draw` and pay for it.
    pub fn commute_with_draw(&mut self, draw: f64, reference_distance: f64) -> CommuteOutcome {
        let car_cost = self.car_cost();
        let transit_cost = self.costs.transit_cost;
        let takes_transit =
            draw <= self.transit_probability(reference_distance) && transit_cost <= car_cost;

        let (mode, cost) = if takes_transit {
            (CommuteMode::Transit, transit_cost)
        } else {
            (CommuteMode::Car, car_cost)
        };

        let outcome = if self.wealth >= cost {
            self.wealth -= cost;
            self.wealth += COMMUTE_INCOME;
            CommuteOutcome::Paid { mode, cost }
        } else {
            CommuteOutcome::Skipped { mode, cost }
        };
        self.last_commute = Some(outcome);
        outcome
    }

    fn commute(&mut self, ctx: &mut StepContext<'_>) {
        let draw: f64 = ctx.rng.random();
        let outcome = self.commute_with_draw(draw, ctx.city.reference_distance());
        trace!(
            "{} draw={:.3} distance={:.2} -> {:?}",
            self.id, draw, self.city_distance, outcome
        );

        let event = match outcome {
            CommuteOutcome::Paid { mode, cost } => EventType::Commuted {
                mode,
                cost,
                income: COMMUTE_INCOME,
            },
            CommuteOutcome::Skipped { mode, cost } => EventType::CommuteSkipped {
                mode,
                cost,
                wealth: self.wealth,
            },
        };
        ctx.events.log(ctx.tick, self.id, event);
    }

    /// The empty neighbouring cell closest to the city, provided it is
    /// strictly closer than where the agent stands. Ties go to the first
    /// cell in neighbourhood order.
    pub fn relocation_target(&self, grid: &Grid) -> Option<Position> {
        let mut best = None;
        let mut best_distance = self.city_distance;
        for candidate in grid.neighbors(self.position, false) {
            if !grid.is_empty(candidate) {
                continue;
            }
            let distance = candidate.distance_to(self.city);
            if distance < best_distance {
                best = Some(candidate);
                best_distance = distance;
            }
        }
        best
    }

    pub fn can_afford_move(&self) -> bool {
        self.wealth >= self.costs.cost_to_move + MOVE_SAFETY_MARGIN
    }

    /// Step one cell toward the city if affordable and an improving cell
    /// is free. Returns the new position when the agent moved.
    pub fn relocate(&mut self, grid: &mut Grid) -> Result<Option<Position>> {
        if !self.can_afford_move() {
            return Ok(None);
        }
        let Some(target) = self.relocation_target(grid) else {
            return Ok(None);
        };

        grid.move_to(Occupant::Agent(self.id), target)?;
        self.position = target;
        self.city_distance = target.distance_to(self.city);
        self.wealth -= self.costs.cost_to_move;
        Ok(Some(target))
    }

    pub fn pay_cost_of_living(&mut self) {
        self.wealth -= COST_OF_LIVING;
    }
}

impl Steppable for CommuteAgent {
    fn step(&mut self, ctx: &mut StepContext<'_>) -> Result<()> {
        self.commute(ctx);

        let from = self.position;
        if let Some(to) = self.relocate(ctx.grid)? {
            trace!("{} relocated {} -> {}", self.id, from, to);
            ctx.events.log(
                ctx.tick,
                self.id,
                EventType::Relocated {
                    from,
                    to,
                    cost: self.costs.cost_to_move,
                },
            );
        }

        self.pay_cost_of_living();
        ctx.events.log(
            ctx.tick,
            self.id,
            EventType::LivingCostPaid {
                cost: COST_OF_LIVING,
                wealth: self.wealth,
            },
        );
        Ok(())
    }
}
