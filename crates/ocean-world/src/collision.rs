//! Collision outcome table.
//!
//! Every interaction between a moving entity and whatever already holds its
//! destination is decided here, from a fixed table:
//!
//! | Moving \ Occupying | Empty | Turtle | Trash | Ship  |
//! |--------------------|-------|--------|-------|-------|
//! | Turtle             | Move  | Block  | Die   | Die   |
//! | Trash              | Move  | Move   | Block | Die   |
//! | Ship               | Move  | Move   | Move  | Block |
//!
//! Turtles are destroyed by trash and ships, trash is destroyed only by ships,
//! and nothing destroys a ship.

use ocean_core::{Error, Occupancy, Outcome, Result};
use serde::{Deserialize, Serialize};

/// Rows: moving Turtle, Trash, Ship. Columns: occupying kind by storage code.
const RULES: [[Outcome; 4]; 3] = [
    [Outcome::Move, Outcome::Block, Outcome::Die, Outcome::Die],
    [Outcome::Move, Outcome::Move, Outcome::Block, Outcome::Die],
    [Outcome::Move, Outcome::Move, Outcome::Move, Outcome::Block],
];

/// What a collision leaves behind at both ends of the attempted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub outcome: Outcome,
    /// Kind left at the mover's starting cell.
    pub origin: Occupancy,
    /// Kind left at the attempted destination.
    pub destination: Occupancy,
}

/// Look up the table entry for `moving` entering a cell held by `occupying`.
pub fn outcome(moving: Occupancy, occupying: Occupancy) -> Result<Outcome> {
    let row = match moving {
        Occupancy::Turtle => 0,
        Occupancy::Trash => 1,
        Occupancy::Ship => 2,
        Occupancy::Empty => {
            return Err(Error::UnresolvableCollision { moving, occupying });
        }
    };
    Ok(RULES[row][occupying.code() as usize])
}

/// Resolve `moving` entering a cell held by `occupying`.
pub fn resolve(moving: Occupancy, occupying: Occupancy) -> Result<Resolution> {
    let outcome = outcome(moving, occupying)?;
    let (origin, destination) = match outcome {
        Outcome::Move => (Occupancy::Empty, moving),
        Outcome::Die => (Occupancy::Empty, occupying),
        Outcome::Block => (moving, occupying),
    };

    Ok(Resolution {
        outcome,
        origin,
        destination,
    })
}
