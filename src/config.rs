use log::warn;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::agent::CommuteCosts;
use crate::error::{ConfigError, Result};
use crate::grid::checked_cell_count;
use crate::types::Position;

/// Random placement refuses populations above this share of the grid.
pub const MAX_POPULATION_DENSITY: f64 = 0.9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub population: usize,
    pub initial_wealth: Decimal,
    pub cost_per_unit_distance: Decimal,
    pub transit_cost: Decimal,
    pub cost_to_move: Decimal,
    pub transit_availability: f64,
    pub width: usize,
    pub height: usize,
    pub city: Position,
    #[serde(default)]
    pub torus: bool,
    pub ticks: usize,
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            description: String::new(),
            population: 100,
            initial_wealth: dec!(10),
            cost_per_unit_distance: dec!(0.1),
            transit_cost: dec!(2),
            cost_to_move: dec!(20),
            transit_availability: 1.0,
            width: 200,
            height: 200,
            city: Position::new(100, 100),
            torus: false,
            ticks: 100,
            random_seed: None,
        }
    }
}

/// Optional replacements for individual parameters, shared by the CLI and
/// sweep files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    pub population: Option<usize>,
    pub ticks: Option<usize>,
    pub random_seed: Option<u64>,
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub city: Option<Position>,
    pub initial_wealth: Option<Decimal>,
    pub cost_per_unit_distance: Option<Decimal>,
    pub transit_cost: Option<Decimal>,
    pub cost_to_move: Option<Decimal>,
    pub transit_availability: Option<f64>,
    pub torus: Option<bool>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut SimulationConfig) {
        if let Some(population) = self.population {
            config.population = population;
        }
        if let Some(ticks) = self.ticks {
            config.ticks = ticks;
        }
        if let Some(seed) = self.random_seed {
            config.random_seed = Some(seed);
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(city) = self.city {
            config.city = city;
        }
        if let Some(wealth) = self.initial_wealth {
            config.initial_wealth = wealth;
        }
        if let Some(cost) = self.cost_per_unit_distance {
            config.cost_per_unit_distance = cost;
        }
        if let Some(cost) = self.transit_cost {
            config.transit_cost = cost;
        }
        if let Some(cost) = self.cost_to_move {
            config.cost_to_move = cost;
        }
        if let Some(availability) = self.transit_availability {
            config.transit_availability = availability;
        }
        if let Some(torus) = self.torus {
            config.torus = torus;
        }
    }
}

impl SimulationConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn costs(&self) -> CommuteCosts {
        CommuteCosts {
            cost_per_unit_distance: self.cost_per_unit_distance,
            transit_cost: self.transit_cost,
            cost_to_move: self.cost_to_move,
            transit_availability: self.transit_availability,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    /// Largest population random placement will attempt. One cell always
    /// belongs to the city.
    pub fn population_limit(&self) -> usize {
        let by_density = (self.cell_count() as f64 * MAX_POPULATION_DENSITY).floor() as usize;
        by_density.min(self.cell_count().saturating_sub(1))
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        Ok(config)
    }

    /// Check grid geometry and parameter ranges. Population density is
    /// checked separately by [`Self::validate_population`] because explicit
    /// placement does not need it.
    pub fn validate_parameters(&self) -> std::result::Result<(), ConfigError> {
        checked_cell_count(self.width, self.height)?;
        if self.city.x >= self.width || self.city.y >= self.height {
            return Err(ConfigError::CityOutOfBounds {
                city: self.city,
                width: self.width,
                height: self.height,
            });
        }

        let non_negative = [
            ("initial_wealth", self.initial_wealth),
            ("cost_per_unit_distance", self.cost_per_unit_distance),
            ("transit_cost", self.transit_cost),
            ("cost_to_move", self.cost_to_move),
        ];
        for (name, value) in non_negative {
            if value < Decimal::ZERO {
                return Err(ConfigError::InvalidParameter {
                    name,
                    reason: format!("must be >= 0, got {}", value),
                });
            }
        }

        if !self.transit_availability.is_finite() || self.transit_availability < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "transit_availability",
                reason: format!("must be a finite value >= 0, got {}", self.transit_availability),
            });
        }

        if self.cost_per_unit_distance.is_zero() {
            warn!("cost_per_unit_distance is 0: driving is free for every agent");
        }
        Ok(())
    }

    pub fn validate_population(&self) -> std::result::Result<(), ConfigError> {
        let limit = self.population_limit();
        if self.population > limit {
            return Err(ConfigError::TooDense {
                population: self.population,
                limit,
                cells: self.cell_count(),
            });
        }
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.validate_parameters()?;
        self.validate_population()
    }
}

impl fmt::Display for SimulationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Configuration: {}", self.name)?;
        if !self.description.is_empty() {
            writeln!(f, "Description: {}", self.description)?;
        }
        writeln!(f, "\nPopulation:")?;
        writeln!(f, "  Agents: {}", self.population)?;
        writeln!(f, "  Initial wealth: {}", self.initial_wealth)?;
        writeln!(f, "\nGrid:")?;
        writeln!(
            f,
            "  Size: {}x{}{}",
            self.width,
            self.height,
            if self.torus { " (torus)" } else { "" }
        )?;
        writeln!(f, "  City: {}", self.city)?;
        writeln!(f, "\nCosts:")?;
        writeln!(f, "  Car per unit distance: {}", self.cost_per_unit_distance)?;
        writeln!(f, "  Transit fare: {}", self.transit_cost)?;
        writeln!(f, "  Relocation: {}", self.cost_to_move)?;
        writeln!(f, "  Transit availability: {}", self.transit_availability)?;
        writeln!(f, "\nRun:")?;
        writeln!(f, "  Ticks: {}", self.ticks)?;
        match self.random_seed {
            Some(seed) => writeln!(f, "  Seed: {}", seed)?,
            None => writeln!(f, "  Seed: (entropy)")?,
        }
        Ok(())
    }
}

pub fn create_standard_configs() -> HashMap<String, SimulationConfig> {
    let mut configs = HashMap::new();

    let mut default = SimulationConfig::new("default");
    default.description = "100 agents on a 200x200 grid around a central city".to_string();
    configs.insert("default".to_string(), default);

    let mut small_town = SimulationConfig::new("small_town");
    small_town.description = "A compact town where most agents live near the centre".to_string();
    small_town.population = 40;
    small_town.width = 30;
    small_town.height = 30;
    small_town.city = Position::new(15, 15);
    small_town.cost_to_move = dec!(5);
    configs.insert("small_town".to_string(), small_town);

    let mut transit_poor = SimulationConfig::new("transit_poor");
    transit_poor.description = "Sparse public transit; distant agents must drive".to_string();
    transit_poor.transit_availability = 0.5;
    configs.insert("transit_poor".to_string(), transit_poor);

    let mut expensive_cars = SimulationConfig::new("expensive_cars");
    expensive_cars.description = "Driving costs scale steeply with distance".to_string();
    expensive_cars.cost_per_unit_distance = dec!(0.25);
    expensive_cars.initial_wealth = dec!(30);
    configs.insert("expensive_cars".to_string(), expensive_cars);

    let mut edge_city = SimulationConfig::new("edge_city");
    edge_city.description = "City in a corner of the grid, far from most residents".to_string();
    edge_city.width = 100;
    edge_city.height = 100;
    edge_city.city = Position::new(90, 90);
    edge_city.population = 80;
    configs.insert("edge_city".to_string(), edge_city);

    configs
}

pub fn standard_config(name: &str) -> std::result::Result<SimulationConfig, ConfigError> {
    create_standard_configs()
        .remove(name)
        .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))
}
