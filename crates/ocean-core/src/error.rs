//! Error types for the simulation.

use crate::types::Occupancy;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("cell ({row}, {col}) is outside a {rows}x{cols} grid")]
    OutOfBounds {
        row: i64,
        col: i64,
        rows: usize,
        cols: usize,
    },

    #[error("no collision rule for {moving} moving into {occupying}")]
    UnresolvableCollision {
        moving: Occupancy,
        occupying: Occupancy,
    },

    #[error("unknown glyph {0:?} in grid layout")]
    UnknownGlyph(char),

    #[error("unknown occupancy code {0}")]
    UnknownOccupancyCode(u8),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
