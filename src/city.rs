use crate::error::PlacementError;
use crate::grid::{Grid, Occupant};
use crate::types::Position;

/// The fixed city centre. It never steps; it only anchors distances and
/// keeps its cell non-empty for relocating agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CityMarker {
    position: Position,
}

impl CityMarker {
    /// Create the marker and register it on `grid`.
    pub fn place(grid: &mut Grid, position: Position) -> Result<Self, PlacementError> {
        grid.place(Occupant::City, position)?;
        Ok(Self { position })
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Distance from the grid origin to the city, used to scale transit
    /// availability.
    pub fn reference_distance(&self) -> f64 {
        Position::ORIGIN.distance_to(self.position)
    }
}
