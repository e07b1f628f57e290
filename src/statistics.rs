use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::agent::{CommuteAgent, CommuteOutcome};
use crate::events::CommuteMode;
use crate::types::AgentId;

/// How the population commuted on the tick a snapshot was taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeShare {
    pub transit: usize,
    pub car: usize,
    pub skipped: usize,
}

impl ModeShare {
    pub fn total(&self) -> usize {
        self.transit + self.car + self.skipped
    }

    pub fn transit_fraction(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.transit as f64 / self.total() as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: usize,
    pub gini: f64,
    pub average_wealth: Decimal,
    pub mean_city_distance: f64,
    pub mode_share: ModeShare,
    pub wealth: BTreeMap<AgentId, Decimal>,
}

/// Append-only time series of population snapshots.
#[derive(Debug, Clone, Default)]
pub struct StatisticsCollector {
    snapshots: Vec<Snapshot>,
}

impl StatisticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the population as it stands after `tick`.
    pub fn collect(&mut self, tick: usize, agents: &[CommuteAgent]) -> &Snapshot {
        let wealths: Vec<Decimal> = agents.iter().map(|a| a.wealth()).collect();

        let mut mode_share = ModeShare::default();
        for agent in agents {
            match agent.last_commute() {
                Some(CommuteOutcome::Paid {
                    mode: CommuteMode::Transit,
                    ..
                }) => mode_share.transit += 1,
                Some(CommuteOutcome::Paid {
                    mode: CommuteMode::Car,
                    ..
                }) => mode_share.car += 1,
                Some(CommuteOutcome::Skipped { .. }) => mode_share.skipped += 1,
                None => {}
            }
        }

        let mean_city_distance = if agents.is_empty() {
            0.0
        } else {
            agents.iter().map(|a| a.city_distance()).sum::<f64>() / agents.len() as f64
        };

        self.snapshots.push(Snapshot {
            tick,
            gini: gini_coefficient(&wealths),
            average_wealth: average_wealth(&wealths),
            mean_city_distance,
            mode_share,
            wealth: agents.iter().map(|a| (a.id(), a.wealth())).collect(),
        });
        &self.snapshots[self.snapshots.len() - 1]
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Snapshot for `tick`; tick 0 is the initial population.
    pub fn get(&self, tick: usize) -> Option<&Snapshot> {
        self.snapshots.get(tick)
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Gini coefficient `1 + 1/N - 2B`, where `B = Σ x[i]·(N-i) / (N·Σx)` over
/// wealth sorted ascending. A zero total reports 0.
///
/// The terms are combined over the common denominator `N·Σx` before the
/// single division, so equal distributions come out at exactly zero.
pub fn gini_coefficient(wealths: &[Decimal]) -> f64 {
    if wealths.is_empty() {
        return 0.0;
    }

    let mut sorted = wealths.to_vec();
    sorted.sort();

    let total: Decimal = sorted.iter().sum();
    if total.is_zero() {
        return 0.0;
    }

    let n = sorted.len();
    let n_dec = Decimal::from(n);
    let weighted: Decimal = sorted
        .iter()
        .enumerate()
        .map(|(i, x)| x * Decimal::from(n - i))
        .sum();

    let numerator = n_dec * total + total - dec!(2) * weighted;
    let denominator = n_dec * total;
    (numerator / denominator).to_f64().unwrap_or(0.0)
}

pub fn average_wealth(wealths: &[Decimal]) -> Decimal {
    if wealths.is_empty() {
        return Decimal::ZERO;
    }
    wealths.iter().sum::<Decimal>() / Decimal::from(wealths.len())
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] Gini: {:.3}  Avg wealth: {:.2}  Transit: {}  Car: {}  Skipped: {}  Mean distance: {:.1}",
            self.tick,
            self.gini,
            self.average_wealth,
            self.mode_share.transit,
            self.mode_share.car,
            self.mode_share.skipped,
            self.mean_city_distance
        )
    }
}
