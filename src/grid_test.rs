#[cfg(test)]
mod tests {
    use super::super::error::{ConfigError, PlacementError};
    use super::super::grid::*;
    use super::super::types::{AgentId, Position};

    fn agent(id: usize) -> Occupant {
        Occupant::Agent(AgentId(id))
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert_eq!(
            Grid::new(0, 5, false).unwrap_err(),
            ConfigError::InvalidDimensions {
                width: 0,
                height: 5
            }
        );
        assert!(Grid::new(5, 0, false).is_err());
    }

    #[test]
    fn test_overflowing_dimensions_rejected() {
        assert_eq!(
            Grid::new(usize::MAX / 2 + 1, 2, false).unwrap_err(),
            ConfigError::InvalidDimensions {
                width: usize::MAX / 2 + 1,
                height: 2
            }
        );
        assert!(Grid::new(MAX_CELLS + 1, 1, false).is_err());
        assert_eq!(checked_cell_count(4, 5), Ok(20));
    }

    #[test]
    fn test_place_and_multi_occupancy() {
        let mut grid = Grid::new(3, 3, false).unwrap();
        let cell = Position::new(1, 2);
        assert!(grid.is_empty(cell));

        grid.place(agent(0), cell).unwrap();
        grid.place(agent(1), cell).unwrap();

        assert!(!grid.is_empty(cell));
        assert_eq!(grid.occupants(cell), &[agent(0), agent(1)]);
        assert_eq!(grid.position_of(agent(1)), Some(cell));
    }

    #[test]
    fn test_place_out_of_bounds() {
        let mut grid = Grid::new(3, 3, false).unwrap();
        let err = grid.place(agent(0), Position::new(3, 0)).unwrap_err();
        assert_eq!(
            err,
            PlacementError::OutOfBounds {
                pos: Position::new(3, 0),
                width: 3,
                height: 3
            }
        );
        assert_eq!(grid.position_of(agent(0)), None);
    }

    #[test]
    fn test_move_updates_both_indexes() {
        let mut grid = Grid::new(4, 4, false).unwrap();
        let from = Position::new(0, 0);
        let to = Position::new(1, 1);
        grid.place(agent(7), from).unwrap();

        grid.move_to(agent(7), to).unwrap();

        assert!(grid.is_empty(from));
        assert_eq!(grid.occupants(to), &[agent(7)]);
        assert_eq!(grid.position_of(agent(7)), Some(to));
    }

    #[test]
    fn test_move_out_of_bounds_leaves_state_untouched() {
        let mut grid = Grid::new(2, 2, false).unwrap();
        let start = Position::new(1, 1);
        grid.place(agent(0), start).unwrap();

        assert!(grid.move_to(agent(0), Position::new(2, 1)).is_err());
        assert_eq!(grid.position_of(agent(0)), Some(start));
        assert_eq!(grid.occupants(start), &[agent(0)]);
    }

    #[test]
    fn test_move_unplaced_occupant() {
        let mut grid = Grid::new(2, 2, false).unwrap();
        assert_eq!(
            grid.move_to(agent(3), Position::new(0, 0)),
            Err(PlacementError::NotPlaced(agent(3)))
        );
    }

    #[test]
    fn test_replacing_moves_instead_of_duplicating() {
        let mut grid = Grid::new(3, 3, false).unwrap();
        grid.place(agent(0), Position::new(0, 0)).unwrap();
        grid.place(agent(0), Position::new(2, 2)).unwrap();

        assert!(grid.is_empty(Position::new(0, 0)));
        assert_eq!(grid.occupants(Position::new(2, 2)), &[agent(0)]);
    }

    #[test]
    fn test_neighbors_interior() {
        let grid = Grid::new(5, 5, false).unwrap();
        let center = Position::new(2, 2);

        let neighbors = grid.neighbors(center, false);
        assert_eq!(neighbors.len(), 8);
        assert!(!neighbors.contains(&center));

        let with_center = grid.neighbors(center, true);
        assert_eq!(with_center.len(), 9);
        assert!(with_center.contains(&center));
    }

    #[test]
    fn test_neighbors_clipped_at_corner() {
        let grid = Grid::new(3, 3, false).unwrap();
        let neighbors = grid.neighbors(Position::new(0, 0), false);
        assert_eq!(
            neighbors,
            vec![Position::new(0, 1), Position::new(1, 0), Position::new(1, 1)]
        );
    }

    #[test]
    fn test_neighbors_wrap_on_torus() {
        let grid = Grid::new(5, 5, true).unwrap();
        let neighbors = grid.neighbors(Position::new(0, 0), false);
        assert_eq!(neighbors.len(), 8);
        assert!(neighbors.contains(&Position::new(4, 4)));
        assert!(neighbors.contains(&Position::new(0, 4)));
        assert!(neighbors.contains(&Position::new(4, 0)));
    }

    #[test]
    fn test_narrow_torus_has_no_duplicates() {
        let grid = Grid::new(2, 1, true).unwrap();
        let neighbors = grid.neighbors(Position::new(0, 0), false);
        assert_eq!(neighbors, vec![Position::new(1, 0)]);
    }
}
