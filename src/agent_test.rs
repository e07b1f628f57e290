#[cfg(test)]
mod tests {
    use super::super::agent::*;
    use super::super::city::CityMarker;
    use super::super::events::{CommuteMode, EventLogger, EventType};
    use super::super::grid::{Grid, Occupant};
    use super::super::scheduler::{StepContext, Steppable};
    use super::super::types::{AgentId, Position};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn costs(per_distance: Decimal, transit: Decimal, moving: Decimal, availability: f64) -> CommuteCosts {
        CommuteCosts {
            cost_per_unit_distance: per_distance,
            transit_cost: transit,
            cost_to_move: moving,
            transit_availability: availability,
        }
    }

    fn free_costs() -> CommuteCosts {
        costs(dec!(0), dec!(0), dec!(0), 1.0)
    }

    /// A 3x3 grid with the city in the middle and one agent placed at `pos`.
    fn small_world(pos: Position, wealth: Decimal, costs: CommuteCosts) -> (Grid, CityMarker, CommuteAgent) {
        let mut grid = Grid::new(3, 3, false).unwrap();
        let city = CityMarker::place(&mut grid, Position::new(1, 1)).unwrap();
        grid.place(Occupant::Agent(AgentId(0)), pos).unwrap();
        let agent = CommuteAgent::new(AgentId(0), pos, city.position(), wealth, costs);
        (grid, city, agent)
    }

    #[test]
    fn test_distance_computed_on_creation() {
        let (_, _, agent) = small_world(Position::new(0, 0), dec!(10), free_costs());
        assert!((agent.city_distance() - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_car_cost_is_floored() {
        let agent = CommuteAgent::new(
            AgentId(0),
            Position::new(0, 0),
            Position::new(3, 4),
            dec!(10),
            costs(dec!(1.3), dec!(2), dec!(0), 1.0),
        );
        // 5 * 1.3 = 6.5
        assert_eq!(agent.car_cost(), dec!(6));
    }

    #[test]
    fn test_transit_probability_literal_formula() {
        let agent = CommuteAgent::new(
            AgentId(0),
            Position::new(0, 0),
            Position::new(3, 4),
            dec!(10),
            costs(dec!(1), dec!(2), dec!(0), 0.5),
        );
        // 0.5 - 5/10, not 0.5 * (1 - 5/10)
        assert!((agent.transit_probability(10.0) - 0.0).abs() < 1e-12);
        // Far agents go negative; no lower clamp.
        assert!(agent.transit_probability(2.5) < 0.0);
    }

    #[test]
    fn test_transit_probability_capped_at_one() {
        let agent = CommuteAgent::new(
            AgentId(0),
            Position::new(1, 1),
            Position::new(1, 1),
            dec!(10),
            costs(dec!(1), dec!(2), dec!(0), 3.0),
        );
        assert_eq!(agent.transit_probability(10.0), 1.0);
        assert_eq!(agent.transit_probability(0.0), 1.0);
    }

    #[test]
    fn test_transit_taken_when_drawn_and_cheaper() {
        // distance 5, car cost 5, transit 2, p = 2 - 0.5 -> capped at 1
        let mut agent = CommuteAgent::new(
            AgentId(0),
            Position::new(0, 0),
            Position::new(3, 4),
            dec!(10),
            costs(dec!(1), dec!(2), dec!(0), 2.0),
        );
        let outcome = agent.commute_with_draw(0.99, 5.0);
        assert_eq!(
            outcome,
            CommuteOutcome::Paid {
                mode: CommuteMode::Transit,
                cost: dec!(2)
            }
        );
        assert_eq!(agent.wealth(), dec!(13));
        assert_eq!(agent.last_commute(), Some(outcome));
    }

    #[test]
    fn test_car_used_when_transit_dearer() {
        // car cost 5 < transit 8, so driving regardless of the draw
        let mut agent = CommuteAgent::new(
            AgentId(0),
            Position::new(0, 0),
            Position::new(3, 4),
            dec!(10),
            costs(dec!(1), dec!(8), dec!(0), 2.0),
        );
        let outcome = agent.commute_with_draw(0.0, 5.0);
        assert_eq!(outcome.mode(), CommuteMode::Car);
        assert_eq!(agent.wealth(), dec!(10));
    }

    #[test]
    fn test_unaffordable_mode_is_skipped_without_fallback() {
        // Driving costs 5 but only 3 in hand; transit (2) would be affordable
        // but the draw rules it out.
        let mut agent = CommuteAgent::new(
            AgentId(0),
            Position::new(0, 0),
            Position::new(3, 4),
            dec!(3),
            costs(dec!(1), dec!(2), dec!(0), 0.5),
        );
        let outcome = agent.commute_with_draw(0.9, 5.0);
        assert_eq!(
            outcome,
            CommuteOutcome::Skipped {
                mode: CommuteMode::Car,
                cost: dec!(5)
            }
        );
        assert_eq!(agent.wealth(), dec!(3));
    }

    #[test]
    fn test_identical_draws_give_identical_wealth() {
        let template = CommuteAgent::new(
            AgentId(0),
            Position::new(2, 7),
            Position::new(10, 10),
            dec!(12),
            costs(dec!(0.4), dec!(2), dec!(3), 1.0),
        );
        let mut a = template.clone();
        let mut b = template;
        for draw in [0.1, 0.7, 0.3, 0.95, 0.0] {
            a.commute_with_draw(draw, 14.14);
            b.commute_with_draw(draw, 14.14);
            a.pay_cost_of_living();
            b.pay_cost_of_living();
            assert_eq!(a.wealth(), b.wealth());
        }
    }

    #[test]
    fn test_relocation_picks_first_closest_empty_cell() {
        let (grid, _, agent) = small_world(Position::new(0, 0), dec!(10), free_costs());
        // (1,1) holds the city; (0,1) and (1,0) tie at distance 1.
        assert_eq!(agent.relocation_target(&grid), Some(Position::new(0, 1)));
    }

    #[test]
    fn test_relocation_stays_put_without_improving_cell() {
        let (mut grid, _, _) = small_world(Position::new(0, 0), dec!(10), free_costs());
        // Agent standing next to the city: no empty neighbour is closer.
        let pos = Position::new(1, 0);
        grid.place(Occupant::Agent(AgentId(1)), pos).unwrap();
        let mut agent = CommuteAgent::new(AgentId(1), pos, Position::new(1, 1), dec!(50), free_costs());

        assert_eq!(agent.relocation_target(&grid), None);
        assert_eq!(agent.relocate(&mut grid).unwrap(), None);
        assert_eq!(agent.position(), pos);
        assert_eq!(agent.wealth(), dec!(50));
    }

    #[test]
    fn test_relocation_requires_safety_margin() {
        let (mut grid, _, mut agent) = small_world(
            Position::new(0, 0),
            dec!(7),
            costs(dec!(0), dec!(0), dec!(3), 1.0),
        );
        // 7 < 3 + 5
        assert!(!agent.can_afford_move());
        assert_eq!(agent.relocate(&mut grid).unwrap(), None);
        assert_eq!(agent.position(), Position::new(0, 0));
    }

    #[test]
    fn test_relocation_charges_and_updates_distance() {
        let (mut grid, _, mut agent) = small_world(
            Position::new(0, 0),
            dec!(8),
            costs(dec!(0), dec!(0), dec!(3), 1.0),
        );
        let moved = agent.relocate(&mut grid).unwrap();

        assert_eq!(moved, Some(Position::new(0, 1)));
        assert_eq!(agent.wealth(), dec!(5));
        assert!((agent.city_distance() - 1.0).abs() < 1e-12);
        assert_eq!(
            grid.position_of(Occupant::Agent(AgentId(0))),
            Some(Position::new(0, 1))
        );
        assert!(grid.is_empty(Position::new(0, 0)));
    }

    #[test]
    fn test_single_agent_step_scenario() {
        let (mut grid, city, mut agent) = small_world(Position::new(0, 0), dec!(10), free_costs());
        let mut rng = StdRng::seed_from_u64(1);
        let mut events = EventLogger::new();
        let mut ctx = StepContext {
            tick: 1,
            grid: &mut grid,
            city: &city,
            rng: &mut rng,
            events: &mut events,
        };

        agent.step(&mut ctx).unwrap();

        // 10 - 0 + 5 commute income, free move, 1 cost of living
        assert_eq!(agent.wealth(), dec!(14));
        assert_eq!(agent.position(), Position::new(0, 1));
        assert!((agent.city_distance() - 1.0).abs() < 1e-12);

        let logged = events.get_events();
        assert_eq!(logged.len(), 3);
        assert!(matches!(logged[0].event_type, EventType::Commuted { .. }));
        assert!(matches!(logged[1].event_type, EventType::Relocated { .. }));
        assert!(matches!(
            logged[2].event_type,
            EventType::LivingCostPaid { .. }
        ));
    }

    #[test]
    fn test_cost_of_living_can_push_wealth_negative() {
        let (mut grid, city, mut agent) = small_world(
            Position::new(0, 0),
            dec!(0),
            costs(dec!(10), dec!(50), dec!(0), 0.0),
        );
        let mut rng = StdRng::seed_from_u64(9);
        let mut events = EventLogger::disabled();
        let mut ctx = StepContext {
            tick: 1,
            grid: &mut grid,
            city: &city,
            rng: &mut rng,
            events: &mut events,
        };

        agent.step(&mut ctx).unwrap();

        // Car costs floor(1.414 * 10) = 14, unaffordable; living cost still paid.
        assert_eq!(agent.wealth(), dec!(-1));
        assert!(events.get_events().is_empty());
    }
}
