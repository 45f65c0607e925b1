//! Ocean simulation engine.
//!
//! A bounded 2D grid of turtles, trash and ships that wander at random each
//! tick and collide according to a fixed outcome table.

pub mod collision;
pub mod grid;
pub mod movement;
pub mod simulation;
pub mod step;

pub use collision::Resolution;
pub use grid::Grid;
pub use movement::{MovePlan, MovePolicy, MovementPlanner, RandomWalk};
pub use simulation::{Frontend, Headless, Simulation, SimulationResult, TickReport};
pub use step::{step, StepStats, Tick};
