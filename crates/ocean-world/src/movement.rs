//! Movement planning: how each kind picks a direction and where it lands.

use ocean_core::{Cell, Direction, MovementConfig, Occupancy};
use rand::Rng;

/// Chooses a direction for an entity about to move.
///
/// The step engine only ever asks a policy for directions, so any
/// `FnMut(Occupancy, Cell) -> Direction` can stand in for the random walk.
pub trait MovePolicy {
    fn choose(&mut self, kind: Occupancy, from: Cell) -> Direction;
}

impl<F> MovePolicy for F
where
    F: FnMut(Occupancy, Cell) -> Direction,
{
    fn choose(&mut self, kind: Occupancy, from: Cell) -> Direction {
        self(kind, from)
    }
}

/// Kind-specific idle probabilities and direction sampling.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementPlanner {
    turtle_idle: f64,
    trash_idle: f64,
    ship_idle: f64,
}

impl MovementPlanner {
    pub fn new(config: &MovementConfig) -> Self {
        Self {
            turtle_idle: config.turtle_idle,
            trash_idle: config.trash_idle,
            ship_idle: config.ship_idle,
        }
    }

    /// Chance that `kind` stays put for a tick. Empty cells never move.
    pub fn idle_probability(&self, kind: Occupancy) -> f64 {
        match kind {
            Occupancy::Empty => 1.0,
            Occupancy::Turtle => self.turtle_idle,
            Occupancy::Trash => self.trash_idle,
            Occupancy::Ship => self.ship_idle,
        }
    }

    /// Draw a direction: idle with the kind's probability, otherwise one of
    /// the eight active directions uniformly.
    pub fn sample_direction<R: Rng + ?Sized>(&self, kind: Occupancy, rng: &mut R) -> Direction {
        if rng.gen::<f64>() < self.idle_probability(kind) {
            return Direction::Idle;
        }
        Direction::ACTIVE[rng.gen_range(0..Direction::ACTIVE.len())]
    }
}

impl Default for MovementPlanner {
    fn default() -> Self {
        Self::new(&MovementConfig::default())
    }
}

/// An entity's intended move for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePlan {
    pub kind: Occupancy,
    pub origin: Cell,
    pub direction: Direction,
    /// `None` when the direction leads off the grid.
    pub destination: Option<Cell>,
}

impl MovePlan {
    pub fn new(kind: Occupancy, origin: Cell, direction: Direction, rows: usize, cols: usize) -> Self {
        Self {
            kind,
            origin,
            direction,
            destination: origin.step(direction, rows, cols),
        }
    }
}

/// The stochastic policy: an owned generator threaded through the planner.
#[derive(Debug, Clone)]
pub struct RandomWalk<R> {
    planner: MovementPlanner,
    rng: R,
}

impl<R: Rng> RandomWalk<R> {
    pub fn new(planner: MovementPlanner, rng: R) -> Self {
        Self { planner, rng }
    }
}

impl<R: Rng> MovePolicy for RandomWalk<R> {
    fn choose(&mut self, kind: Occupancy, _from: Cell) -> Direction {
        self.planner.sample_direction(kind, &mut self.rng)
    }
}
