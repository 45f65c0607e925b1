//! One simulation tick.
//!
//! A tick reads the previous grid and writes a fresh, all-empty buffer in
//! three phases: ships, then turtles, then trash. Each phase visits the cells
//! that held its kind in the *previous* grid, in row-major order, and resolves
//! collisions against what earlier movers already committed to the buffer.
//! The buffer only becomes the grid once all three phases are done.

use crate::collision;
use crate::grid::Grid;
use crate::movement::{MovePlan, MovePolicy};
use ocean_core::{Cell, Error, Occupancy, Outcome, Population, Result};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Counters gathered while building the next grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepStats {
    /// Entities that changed cell.
    pub moved: u64,
    /// Moves rejected by the boundary or by a blocking occupant.
    pub blocked: u64,
    /// Entities destroyed this tick, by kind.
    pub deaths: Population,
}

/// A tick in progress: the read-only previous grid plus the buffer being
/// written.
pub struct Tick<'a> {
    previous: &'a Grid,
    next: Grid,
    stats: StepStats,
}

impl<'a> Tick<'a> {
    pub fn begin(previous: &'a Grid) -> Self {
        Self {
            previous,
            next: previous.blank_like(),
            stats: StepStats::default(),
        }
    }

    /// The buffer as committed so far.
    pub fn buffer(&self) -> &Grid {
        &self.next
    }

    pub fn stats(&self) -> StepStats {
        self.stats
    }

    /// Move every entity of `kind` from the previous grid into the buffer.
    pub fn run_phase<P: MovePolicy + ?Sized>(&mut self, kind: Occupancy, policy: &mut P) -> Result<()> {
        if kind.is_empty() {
            return Err(Error::InvalidState("empty cells have no movement phase".to_string()));
        }

        let origins: Vec<Cell> = self.previous.cells_of(kind).collect();
        for origin in origins {
            let direction = policy.choose(kind, origin);
            let plan = MovePlan::new(kind, origin, direction, self.next.rows(), self.next.cols());
            self.apply(plan)?;
        }

        trace!(
            phase = %kind,
            moved = self.stats.moved,
            blocked = self.stats.blocked,
            "Phase complete"
        );
        Ok(())
    }

    /// Hand back the finished buffer.
    pub fn finish(self) -> (Grid, StepStats) {
        (self.next, self.stats)
    }

    fn apply(&mut self, plan: MovePlan) -> Result<()> {
        let destination = match plan.destination {
            None => {
                self.stats.blocked += 1;
                return self.stay(plan.kind, plan.origin);
            }
            Some(cell) if cell == plan.origin => return self.stay(plan.kind, plan.origin),
            Some(cell) => cell,
        };

        let occupant = self.occupant_for(plan.kind, plan.origin, destination)?;
        let resolution = collision::resolve(plan.kind, occupant)?;

        match resolution.outcome {
            Outcome::Move => {
                self.next.set_cell(destination, resolution.destination)?;
                self.stats.moved += 1;
                self.stats.deaths.add(occupant);
                Ok(())
            }
            Outcome::Die => {
                trace!(kind = %plan.kind, from = %plan.origin, to = %destination, killer = %occupant, "Mover destroyed");
                self.stats.deaths.add(plan.kind);
                Ok(())
            }
            Outcome::Block => {
                self.stats.blocked += 1;
                self.stay(plan.kind, plan.origin)
            }
        }
    }

    /// What `kind` sees when it tries to enter `destination`. Anything already
    /// committed to the buffer decides the collision; an empty buffer cell is
    /// still held by a same-kind entity whose turn in this phase is ahead.
    fn occupant_for(&self, kind: Occupancy, origin: Cell, destination: Cell) -> Result<Occupancy> {
        let committed = self.next.get_cell(destination)?;
        if !committed.is_empty() {
            return Ok(committed);
        }

        let waiting = self.previous.get_cell(destination)? == kind
            && self.previous.index_of(destination.row, destination.col)?
                > self.previous.index_of(origin.row, origin.col)?;

        Ok(if waiting { kind } else { Occupancy::Empty })
    }

    /// Keep `kind` at its origin, colliding with anything that moved there
    /// earlier this tick.
    fn stay(&mut self, kind: Occupancy, origin: Cell) -> Result<()> {
        let occupant = self.next.get_cell(origin)?;
        if occupant.is_empty() {
            return self.next.set_cell(origin, kind);
        }

        let resolution = collision::resolve(kind, occupant)?;
        match resolution.outcome {
            Outcome::Move => {
                self.stats.deaths.add(occupant);
                self.next.set_cell(origin, kind)
            }
            Outcome::Die => {
                trace!(kind = %kind, at = %origin, killer = %occupant, "Overrun in place");
                self.stats.deaths.add(kind);
                Ok(())
            }
            // A same-kind entity overran whatever sat here first; with no
            // cell left to hold it, the one staying behind is lost.
            Outcome::Block => {
                trace!(kind = %kind, at = %origin, "Crowded out");
                self.stats.deaths.add(kind);
                Ok(())
            }
        }
    }
}

/// Advance `previous` by one tick: ships, turtles, trash, in that order.
pub fn step<P: MovePolicy + ?Sized>(previous: &Grid, policy: &mut P) -> Result<(Grid, StepStats)> {
    let mut tick = Tick::begin(previous);
    for kind in Occupancy::MOBILE {
        tick.run_phase(kind, policy)?;
    }
    Ok(tick.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::{MovementPlanner, RandomWalk};
    use ocean_core::Direction;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn idle(_: Occupancy, _: Cell) -> Direction {
        Direction::Idle
    }

    #[test]
    fn test_all_idle_is_identity() {
        let grid = Grid::from_rows(&["o.x.", "..|x", "o|.x", "...|"]).unwrap();
        let (next, stats) = step(&grid, &mut idle).unwrap();
        assert_eq!(next, grid);
        assert_eq!(stats.moved, 0);
        assert_eq!(stats.deaths, Population::default());
    }

    #[test]
    fn test_turtle_blocked_by_boundary() {
        let grid = Grid::from_rows(&["o...", "....", "....", "...."]).unwrap();
        let mut north = |_: Occupancy, _: Cell| Direction::North;
        let (next, stats) = step(&grid, &mut north).unwrap();
        assert_eq!(next.get(0, 0).unwrap(), Occupancy::Turtle);
        assert_eq!(stats.blocked, 1);
        assert_eq!(next.census(), grid.census());
    }

    #[test]
    fn test_ship_moves_onto_idle_trash() {
        let grid = Grid::from_rows(&["|x", ".."]).unwrap();
        let mut policy = |kind: Occupancy, _: Cell| match kind {
            Occupancy::Ship => Direction::East,
            _ => Direction::Idle,
        };

        let (next, stats) = step(&grid, &mut policy).unwrap();
        assert_eq!(next.get(0, 0).unwrap(), Occupancy::Empty);
        assert_eq!(next.get(0, 1).unwrap(), Occupancy::Ship);
        assert_eq!(stats.deaths, Population::new(0, 1, 0));
        assert_eq!(next.census(), Population::new(0, 0, 1));
    }

    #[test]
    fn test_trash_escapes_incoming_ship() {
        let grid = Grid::from_rows(&["|x.", "..."]).unwrap();
        let mut policy = |_: Occupancy, _: Cell| Direction::East;

        let (next, stats) = step(&grid, &mut policy).unwrap();
        assert_eq!(next.get(0, 1).unwrap(), Occupancy::Ship);
        assert_eq!(next.get(0, 2).unwrap(), Occupancy::Trash);
        assert_eq!(stats.deaths, Population::default());
    }

    #[test]
    fn test_turtle_dies_entering_ship() {
        let grid = Grid::from_rows(&["o|"]).unwrap();
        let mut policy = |kind: Occupancy, _: Cell| match kind {
            Occupancy::Turtle => Direction::East,
            _ => Direction::Idle,
        };

        let (next, stats) = step(&grid, &mut policy).unwrap();
        assert_eq!(next.get(0, 0).unwrap(), Occupancy::Empty);
        assert_eq!(next.get(0, 1).unwrap(), Occupancy::Ship);
        assert_eq!(stats.deaths.turtles, 1);
    }

    #[test]
    fn test_trash_overruns_turtle() {
        let grid = Grid::from_rows(&["xo"]).unwrap();
        let mut policy = |kind: Occupancy, _: Cell| match kind {
            Occupancy::Trash => Direction::East,
            _ => Direction::Idle,
        };

        let (next, stats) = step(&grid, &mut policy).unwrap();
        assert_eq!(next.get(0, 0).unwrap(), Occupancy::Empty);
        assert_eq!(next.get(0, 1).unwrap(), Occupancy::Trash);
        assert_eq!(stats.deaths, Population::new(1, 0, 0));
    }

    #[test]
    fn test_ships_block_each_other() {
        // Both ships head for the middle cell; the first one in scan order wins.
        let grid = Grid::from_rows(&["|.|"]).unwrap();
        let mut policy = |_: Occupancy, from: Cell| {
            if from.col == 0 {
                Direction::East
            } else {
                Direction::West
            }
        };

        let (next, stats) = step(&grid, &mut policy).unwrap();
        assert_eq!(next.get(0, 0).unwrap(), Occupancy::Empty);
        assert_eq!(next.get(0, 1).unwrap(), Occupancy::Ship);
        assert_eq!(next.get(0, 2).unwrap(), Occupancy::Ship);
        assert_eq!(stats.blocked, 1);
    }

    #[test]
    fn test_ship_cannot_enter_cell_of_ship_yet_to_move() {
        let grid = Grid::from_rows(&["||."]).unwrap();
        let mut policy = |_: Occupancy, from: Cell| {
            if from.col == 0 {
                Direction::East
            } else {
                Direction::Idle
            }
        };

        let (next, _) = step(&grid, &mut policy).unwrap();
        assert_eq!(next.census().ships, 2);
        assert_eq!(next.get(0, 0).unwrap(), Occupancy::Ship);
        assert_eq!(next.get(0, 1).unwrap(), Occupancy::Ship);
    }

    #[test]
    fn test_ship_follows_ship_that_already_moved() {
        let grid = Grid::from_rows(&["||."]).unwrap();
        let mut policy = |_: Occupancy, _: Cell| Direction::East;

        // (0,0) is visited first and is held by the ship still waiting at
        // (0,1), so it stays; (0,1) then moves on.
        let (next, stats) = step(&grid, &mut policy).unwrap();
        assert_eq!(next.get(0, 0).unwrap(), Occupancy::Ship);
        assert_eq!(next.get(0, 1).unwrap(), Occupancy::Empty);
        assert_eq!(next.get(0, 2).unwrap(), Occupancy::Ship);
        assert_eq!(stats.blocked, 1);
    }

    #[test]
    fn test_turtle_phase_sees_ship_phase() {
        let grid = Grid::from_rows(&["o..", "..|"]).unwrap();
        let mut policy = |kind: Occupancy, _: Cell| match kind {
            Occupancy::Ship => Direction::NorthWest,
            _ => Direction::East,
        };

        let mut tick = Tick::begin(&grid);
        tick.run_phase(Occupancy::Ship, &mut policy).unwrap();
        assert_eq!(tick.buffer().get(0, 1).unwrap(), Occupancy::Ship);
        assert_eq!(tick.buffer().census(), Population::new(0, 0, 1));

        tick.run_phase(Occupancy::Turtle, &mut policy).unwrap();
        let (next, stats) = tick.finish();
        assert_eq!(next.get(0, 0).unwrap(), Occupancy::Empty);
        assert_eq!(stats.deaths.turtles, 1);
    }

    #[test]
    fn test_trash_phase_sees_turtle_phase() {
        let grid = Grid::from_rows(&["o.x"]).unwrap();
        let mut policy = |kind: Occupancy, _: Cell| match kind {
            Occupancy::Turtle => Direction::East,
            _ => Direction::West,
        };

        let (next, stats) = step(&grid, &mut policy).unwrap();
        assert_eq!(next.get(0, 1).unwrap(), Occupancy::Trash);
        assert_eq!(next.get(0, 2).unwrap(), Occupancy::Empty);
        assert_eq!(stats.deaths, Population::new(1, 0, 0));
    }

    #[test]
    fn test_turtle_dies_on_ship_over_waiting_turtle() {
        // The ship lands on (0,1) before either turtle moves; the turtle
        // heading there must meet the ship, not its neighbour.
        let grid = Grid::from_rows(&["oo", ".|"]).unwrap();
        let mut policy = |kind: Occupancy, from: Cell| match (kind, from.col) {
            (Occupancy::Ship, _) => Direction::North,
            (Occupancy::Turtle, 0) => Direction::East,
            _ => Direction::Idle,
        };

        let mut tick = Tick::begin(&grid);
        tick.run_phase(Occupancy::Ship, &mut policy).unwrap();
        assert_eq!(tick.buffer().get(0, 1).unwrap(), Occupancy::Ship);

        tick.run_phase(Occupancy::Turtle, &mut policy).unwrap();
        let (next, stats) = tick.finish();
        assert_eq!(next.get(0, 0).unwrap(), Occupancy::Empty);
        assert_eq!(next.get(0, 1).unwrap(), Occupancy::Ship);
        assert_eq!(stats.deaths, Population::new(2, 0, 0));
    }

    #[test]
    fn test_waiting_trash_crowded_out() {
        // A turtle moves onto the waiting trash at (0,1); the trash from (0,0)
        // then overruns the turtle, leaving no room for the trash that stays.
        let grid = Grid::from_rows(&["xx", ".o"]).unwrap();
        let mut policy = |kind: Occupancy, from: Cell| match (kind, from.col) {
            (Occupancy::Turtle, _) => Direction::North,
            (Occupancy::Trash, 0) => Direction::East,
            _ => Direction::Idle,
        };

        let (next, stats) = step(&grid, &mut policy).unwrap();
        assert_eq!(next.get(0, 0).unwrap(), Occupancy::Empty);
        assert_eq!(next.get(0, 1).unwrap(), Occupancy::Trash);
        assert_eq!(next.get(1, 1).unwrap(), Occupancy::Empty);
        assert_eq!(stats.deaths, Population::new(1, 1, 0));
        assert_eq!(next.census(), Population::new(0, 1, 0));
    }

    #[test]
    fn test_empty_phase_rejected() {
        let grid = Grid::from_rows(&["o"]).unwrap();
        let mut tick = Tick::begin(&grid);
        assert!(tick.run_phase(Occupancy::Empty, &mut idle).is_err());
    }

    fn arb_layout() -> impl Strategy<Value = Vec<String>> {
        (1usize..8, 1usize..8).prop_flat_map(|(rows, cols)| {
            proptest::collection::vec(
                proptest::collection::vec(
                    prop_oneof![
                        6 => Just('.'),
                        2 => Just('o'),
                        2 => Just('x'),
                        1 => Just('|'),
                    ],
                    cols,
                )
                .prop_map(|row| row.into_iter().collect::<String>()),
                rows,
            )
        })
    }

    proptest! {
        #[test]
        fn deaths_account_for_every_loss(layout in arb_layout(), seed in any::<u64>()) {
            let rows: Vec<&str> = layout.iter().map(String::as_str).collect();
            let grid = Grid::from_rows(&rows).unwrap();
            let mut walk = RandomWalk::new(MovementPlanner::default(), ChaCha8Rng::seed_from_u64(seed));

            let (next, stats) = step(&grid, &mut walk).unwrap();
            let before = grid.census();
            let after = next.census();

            prop_assert_eq!(after.ships, before.ships);
            prop_assert!(after.turtles <= before.turtles);
            prop_assert!(after.trash <= before.trash);
            prop_assert_eq!(before.turtles - stats.deaths.turtles, after.turtles);
            prop_assert_eq!(before.trash - stats.deaths.trash, after.trash);
            prop_assert_eq!(stats.deaths.ships, 0);
        }

        #[test]
        fn ship_phase_ignores_later_phases(layout in arb_layout(), seed in any::<u64>()) {
            let rows: Vec<&str> = layout.iter().map(String::as_str).collect();
            let grid = Grid::from_rows(&rows).unwrap();

            let mut walk = RandomWalk::new(MovementPlanner::default(), ChaCha8Rng::seed_from_u64(seed));
            let mut tick = Tick::begin(&grid);
            tick.run_phase(Occupancy::Ship, &mut walk).unwrap();
            let ships_only: Vec<Cell> = tick.buffer().cells_of(Occupancy::Ship).collect();

            let mut walk = RandomWalk::new(MovementPlanner::default(), ChaCha8Rng::seed_from_u64(seed));
            let (next, _) = step(&grid, &mut walk).unwrap();
            let ships_full: Vec<Cell> = next.cells_of(Occupancy::Ship).collect();

            prop_assert_eq!(ships_only, ships_full);
        }
    }
}
