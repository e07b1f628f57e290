pub mod agent;
pub mod analysis;
pub mod city;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod grid;
pub mod scheduler;
pub mod simulation;
pub mod statistics;
pub mod sweep;
pub mod types;

pub use simulation::Simulation;

#[cfg(test)]
mod agent_test;
#[cfg(test)]
mod grid_test;
#[cfg(test)]
mod sweep_test;
