use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::Result;
use crate::types::{AgentId, Position};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub tick: usize,
    pub agent_id: AgentId,
    pub event_type: EventType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventType {
    Commuted {
        mode: CommuteMode,
        cost: Decimal,
        income: Decimal,
    },
    CommuteSkipped {
        mode: CommuteMode,
        cost: Decimal,
        wealth: Decimal,
    },
    Relocated {
        from: Position,
        to: Position,
        cost: Decimal,
    },
    LivingCostPaid {
        cost: Decimal,
        wealth: Decimal,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommuteMode {
    Transit,
    Car,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: ", self.tick, self.agent_id)?;

        match &self.event_type {
            EventType::Commuted { mode, cost, income } => {
                write!(f, "Commuted by {:?} for {} (earned {})", mode, cost, income)
            }
            EventType::CommuteSkipped { mode, cost, wealth } => {
                write!(
                    f,
                    "Could not afford {:?} at {} (wealth: {})",
                    mode, cost, wealth
                )
            }
            EventType::Relocated { from, to, cost } => {
                write!(f, "Relocated {} -> {} for {}", from, to, cost)
            }
            EventType::LivingCostPaid { cost, wealth } => {
                write!(f, "Paid {} cost of living (wealth: {})", cost, wealth)
            }
        }
    }
}

/// Collects agent events. A disabled logger drops everything, so stepping
/// pays nothing for tracing unless it was asked for.
#[derive(Debug)]
pub struct EventLogger {
    enabled: bool,
    events: Vec<Event>,
}

impl EventLogger {
    pub fn new() -> Self {
        Self {
            enabled: true,
            events: Vec::new(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            events: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn log(&mut self, tick: usize, agent_id: AgentId, event_type: EventType) {
        if !self.enabled {
            return;
        }
        self.events.push(Event {
            timestamp: Utc::now(),
            tick,
            agent_id,
            event_type,
        });
    }

    pub fn get_events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.events)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let events: Vec<Event> = serde_json::from_str(&json)?;
        Ok(Self {
            enabled: true,
            events,
        })
    }
}

impl Default for EventLogger {
    fn default() -> Self {
        Self::disabled()
    }
}
