//! Core type definitions for the simulation.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a single cell of the ocean holds.
///
/// Stored as one byte per cell; the discriminants are the raw storage codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Occupancy {
    #[default]
    Empty = 0,
    Turtle = 1,
    Trash = 2,
    Ship = 3,
}

impl Occupancy {
    pub const ALL: [Occupancy; 4] = [
        Occupancy::Empty,
        Occupancy::Turtle,
        Occupancy::Trash,
        Occupancy::Ship,
    ];

    /// Kinds that move on their own, in the order a tick moves them.
    pub const MOBILE: [Occupancy; 3] = [Occupancy::Ship, Occupancy::Turtle, Occupancy::Trash];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn glyph(self) -> char {
        match self {
            Occupancy::Empty => ' ',
            Occupancy::Turtle => 'o',
            Occupancy::Trash => 'x',
            Occupancy::Ship => '|',
        }
    }

    /// Glyph for a raw storage code; codes outside the enum render as `'?'`.
    pub fn glyph_for_code(code: u8) -> char {
        Occupancy::try_from(code).map_or('?', Occupancy::glyph)
    }

    pub fn from_glyph(glyph: char) -> Result<Self, Error> {
        match glyph {
            ' ' | '.' => Ok(Occupancy::Empty),
            'o' => Ok(Occupancy::Turtle),
            'x' => Ok(Occupancy::Trash),
            '|' => Ok(Occupancy::Ship),
            other => Err(Error::UnknownGlyph(other)),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Occupancy::Empty
    }
}

impl TryFrom<u8> for Occupancy {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Occupancy::Empty),
            1 => Ok(Occupancy::Turtle),
            2 => Ok(Occupancy::Trash),
            3 => Ok(Occupancy::Ship),
            other => Err(Error::UnknownOccupancyCode(other)),
        }
    }
}

impl fmt::Display for Occupancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Occupancy::Empty => "empty",
            Occupancy::Turtle => "turtle",
            Occupancy::Trash => "trash",
            Occupancy::Ship => "ship",
        };
        f.write_str(name)
    }
}

/// A (row, col) coordinate inside a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Neighbouring cell in `direction`, or `None` if it falls outside a
    /// `rows x cols` grid.
    pub fn step(&self, direction: Direction, rows: usize, cols: usize) -> Option<Cell> {
        let (dr, dc) = direction.offset();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        (row < rows && col < cols).then_some(Cell { row, col })
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Direction for movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Idle,
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    /// The eight directions that actually move an entity.
    pub const ACTIVE: [Direction; 8] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// (Δrow, Δcol). Row 0 is the top of the grid, so north decreases the row.
    pub fn offset(&self) -> (isize, isize) {
        match self {
            Direction::Idle => (0, 0),
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::East => (0, 1),
            Direction::West => (0, -1),
            Direction::NorthEast => (-1, 1),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (1, -1),
        }
    }

    pub fn all() -> [Direction; 9] {
        [
            Direction::Idle,
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
            Direction::NorthEast,
            Direction::NorthWest,
            Direction::SouthEast,
            Direction::SouthWest,
        ]
    }
}

/// Result of a mover meeting an occupant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Mover takes the destination, origin is vacated.
    Move,
    /// Mover is destroyed, occupant is unaffected.
    Die,
    /// Move rejected, nothing changes.
    Block,
}

/// Head counts of each mobile kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Population {
    pub turtles: usize,
    pub trash: usize,
    pub ships: usize,
}

impl Population {
    pub fn new(turtles: usize, trash: usize, ships: usize) -> Self {
        Self {
            turtles,
            trash,
            ships,
        }
    }

    pub fn count(&self, kind: Occupancy) -> usize {
        match kind {
            Occupancy::Empty => 0,
            Occupancy::Turtle => self.turtles,
            Occupancy::Trash => self.trash,
            Occupancy::Ship => self.ships,
        }
    }

    pub fn add(&mut self, kind: Occupancy) {
        match kind {
            Occupancy::Empty => {}
            Occupancy::Turtle => self.turtles += 1,
            Occupancy::Trash => self.trash += 1,
            Occupancy::Ship => self.ships += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.turtles + self.trash + self.ships
    }
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Turtles: {}", self.turtles)?;
        writeln!(f, "Trash: {}", self.trash)?;
        writeln!(f, "Ships: {}", self.ships)
    }
}
