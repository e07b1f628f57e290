//! Bounded 2D grid with multi-occupancy cells.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ConfigError, PlacementError};
use crate::types::{AgentId, Position};

/// Largest number of cells a grid may hold.
pub const MAX_CELLS: usize = 1 << 24;

/// Total cell count for valid dimensions.
pub fn checked_cell_count(width: usize, height: usize) -> Result<usize, ConfigError> {
    match width.checked_mul(height) {
        Some(cells) if width > 0 && height > 0 && cells <= MAX_CELLS => Ok(cells),
        _ => Err(ConfigError::InvalidDimensions { width, height }),
    }
}

/// Anything that can be registered in a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupant {
    Agent(AgentId),
    City,
}

#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    torus: bool,
    cells: Vec<Vec<Occupant>>,
    /// Reverse index; always agrees with `cells`.
    positions: HashMap<Occupant, Position>,
}

impl Grid {
    pub fn new(width: usize, height: usize, torus: bool) -> Result<Self, ConfigError> {
        let cells = checked_cell_count(width, height)?;
        Ok(Self {
            width,
            height,
            torus,
            cells: vec![Vec::new(); cells],
            positions: HashMap::new(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_torus(&self) -> bool {
        self.torus
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    #[inline]
    fn index(&self, pos: Position) -> usize {
        pos.y * self.width + pos.x
    }

    fn check_bounds(&self, pos: Position) -> Result<(), PlacementError> {
        if self.contains(pos) {
            Ok(())
        } else {
            Err(PlacementError::OutOfBounds {
                pos,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Register `occupant` at `pos`. An occupant that is already on the grid
    /// is moved instead, so it is never indexed in two cells.
    pub fn place(&mut self, occupant: Occupant, pos: Position) -> Result<(), PlacementError> {
        self.check_bounds(pos)?;
        if self.positions.contains_key(&occupant) {
            return self.move_to(occupant, pos);
        }
        let idx = self.index(pos);
        self.cells[idx].push(occupant);
        self.positions.insert(occupant, pos);
        Ok(())
    }

    pub fn move_to(&mut self, occupant: Occupant, new_pos: Position) -> Result<(), PlacementError> {
        self.check_bounds(new_pos)?;
        let old_pos = *self
            .positions
            .get(&occupant)
            .ok_or(PlacementError::NotPlaced(occupant))?;

        let old_idx = self.index(old_pos);
        self.cells[old_idx].retain(|o| *o != occupant);
        let new_idx = self.index(new_pos);
        self.cells[new_idx].push(occupant);
        self.positions.insert(occupant, new_pos);
        Ok(())
    }

    pub fn position_of(&self, occupant: Occupant) -> Option<Position> {
        self.positions.get(&occupant).copied()
    }

    /// Occupants registered at `pos`; empty for out-of-bounds positions.
    pub fn occupants(&self, pos: Position) -> &[Occupant] {
        if self.contains(pos) {
            &self.cells[self.index(pos)]
        } else {
            &[]
        }
    }

    pub fn is_empty(&self, pos: Position) -> bool {
        self.occupants(pos).is_empty()
    }

    /// Moore neighborhood of `pos`, enumerated column by column (x outer,
    /// y inner). Bounded grids clip at the edges; toroidal grids wrap.
    pub fn neighbors(&self, pos: Position, include_center: bool) -> Vec<Position> {
        let mut out = Vec::with_capacity(9);
        for dx in -1isize..=1 {
            for dy in -1isize..=1 {
                if dx == 0 && dy == 0 && !include_center {
                    continue;
                }
                let nx = pos.x as isize + dx;
                let ny = pos.y as isize + dy;
                let candidate = if self.torus {
                    Position::new(
                        nx.rem_euclid(self.width as isize) as usize,
                        ny.rem_euclid(self.height as isize) as usize,
                    )
                } else if nx < 0 || ny < 0 {
                    continue;
                } else {
                    Position::new(nx as usize, ny as usize)
                };
                if !self.contains(candidate) || (!include_center && candidate == pos) {
                    continue;
                }
                // Narrow toroidal grids wrap onto the same cell more than once.
                if !out.contains(&candidate) {
                    out.push(candidate);
                }
            }
        }
        out
    }
}
