//! Run reports and the summaries derived from them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::simulation::Simulation;
use crate::statistics::Snapshot;
use crate::types::{AgentId, Position};

/// Final state of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: AgentId,
    pub position: Position,
    pub wealth: Decimal,
    pub city_distance: f64,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub config: SimulationConfig,
    pub generated_at: DateTime<Utc>,
    pub snapshots: Vec<Snapshot>,
    pub agents: Vec<AgentRecord>,
}

impl RunReport {
    pub fn from_simulation(sim: &Simulation) -> Self {
        Self {
            config: sim.config().clone(),
            generated_at: Utc::now(),
            snapshots: sim.snapshots().to_vec(),
            agents: sim
                .agents()
                .iter()
                .map(|a| AgentRecord {
                    id: a.id(),
                    position: a.position(),
                    wealth: a.wealth(),
                    city_distance: a.city_distance(),
                })
                .collect(),
        }
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let report: Self = serde_json::from_str(&json)?;
        Ok(report)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub name: String,
    pub ticks: usize,
    pub population: usize,
    pub initial_gini: f64,
    pub final_gini: f64,
    pub peak_gini: f64,
    pub peak_gini_tick: usize,
    pub initial_average_wealth: Decimal,
    pub final_average_wealth: Decimal,
    pub agents_in_debt: usize,
    pub final_transit_share: f64,
    pub initial_mean_distance: f64,
    pub final_mean_distance: f64,
    pub insights: Vec<String>,
}

pub fn summarize(report: &RunReport) -> RunSummary {
    let first = report.snapshots.first();
    let last = report.snapshots.last();

    let (peak_gini_tick, peak_gini) = report
        .snapshots
        .iter()
        .map(|s| (s.tick, s.gini))
        .fold((0, f64::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });

    let mut summary = RunSummary {
        name: report.config.name.clone(),
        ticks: last.map(|s| s.tick).unwrap_or(0),
        population: report.agents.len(),
        initial_gini: first.map(|s| s.gini).unwrap_or(0.0),
        final_gini: last.map(|s| s.gini).unwrap_or(0.0),
        peak_gini: if report.snapshots.is_empty() { 0.0 } else { peak_gini },
        peak_gini_tick,
        initial_average_wealth: first.map(|s| s.average_wealth).unwrap_or(Decimal::ZERO),
        final_average_wealth: last.map(|s| s.average_wealth).unwrap_or(Decimal::ZERO),
        agents_in_debt: last
            .map(|s| s.wealth.values().filter(|w| **w < Decimal::ZERO).count())
            .unwrap_or(0),
        final_transit_share: last.map(|s| s.mode_share.transit_fraction()).unwrap_or(0.0),
        initial_mean_distance: first.map(|s| s.mean_city_distance).unwrap_or(0.0),
        final_mean_distance: last.map(|s| s.mean_city_distance).unwrap_or(0.0),
        insights: Vec::new(),
    };
    summary.insights = generate_insights(&summary);
    summary
}

pub fn analyze_report(path: &Path) -> Result<RunSummary> {
    let report = RunReport::load_from_file(path)?;
    Ok(summarize(&report))
}

fn generate_insights(summary: &RunSummary) -> Vec<String> {
    let mut insights = Vec::new();

    let gini_change = summary.final_gini - summary.initial_gini;
    if gini_change > 0.1 {
        insights.push(format!(
            "Inequality rose sharply: Gini {:.3} -> {:.3}",
            summary.initial_gini, summary.final_gini
        ));
    } else if gini_change < -0.1 {
        insights.push(format!(
            "Inequality fell: Gini {:.3} -> {:.3}",
            summary.initial_gini, summary.final_gini
        ));
    }

    if summary.agents_in_debt > 0 {
        insights.push(format!(
            "{} of {} agents ended in debt",
            summary.agents_in_debt, summary.population
        ));
    }

    let moved = summary.initial_mean_distance - summary.final_mean_distance;
    if moved > 1.0 {
        insights.push(format!(
            "Agents moved {:.1} cells closer to the city on average",
            moved
        ));
    }

    if summary.population > 0 && summary.final_transit_share < 0.1 {
        insights.push("Almost nobody uses public transit by the end of the run".to_string());
    }

    insights
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run {} ({} ticks, {} agents):", self.name, self.ticks, self.population)?;
        writeln!(
            f,
            "  Gini: {:.3} -> {:.3} (peak {:.3} at tick {})",
            self.initial_gini, self.final_gini, self.peak_gini, self.peak_gini_tick
        )?;
        writeln!(
            f,
            "  Average wealth: {:.2} -> {:.2}",
            self.initial_average_wealth, self.final_average_wealth
        )?;
        writeln!(
            f,
            "  Mean distance to city: {:.1} -> {:.1}",
            self.initial_mean_distance, self.final_mean_distance
        )?;
        writeln!(f, "  Agents in debt: {}", self.agents_in_debt)?;
        writeln!(
            f,
            "  Final transit share: {:.1}%",
            self.final_transit_share * 100.0
        )?;
        if !self.insights.is_empty() {
            writeln!(f, "\nInsights:")?;
            for insight in &self.insights {
                writeln!(f, "  - {}", insight)?;
            }
        }
        Ok(())
    }
}
