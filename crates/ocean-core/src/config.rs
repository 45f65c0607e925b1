//! Configuration types for the simulation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Ocean dimensions and the advisory initial population
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OceanConfig {
    /// Number of grid rows
    pub rows: usize,
    /// Number of grid columns
    pub cols: usize,
    /// Requested turtle count (advisory, used by seeding only)
    pub turtles: usize,
    /// Requested trash count (advisory, used by seeding only)
    pub trash: usize,
    /// Requested ship count (advisory, used by seeding only)
    pub ships: usize,
}

impl Default for OceanConfig {
    fn default() -> Self {
        Self {
            rows: 20,
            cols: 20,
            turtles: 25,
            trash: 25,
            ships: 2,
        }
    }
}

/// Per-cell probabilities and hard caps for the initial stochastic fill.
///
/// The three probabilities are disjoint bands of one draw, so their sum must
/// not exceed 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedingConfig {
    /// Chance a cell starts as a turtle
    pub turtle_probability: f64,
    /// Chance a cell starts as trash
    pub trash_probability: f64,
    /// Chance a cell starts as a ship
    pub ship_probability: f64,
    pub max_turtles: usize,
    pub max_trash: usize,
    pub max_ships: usize,
}

impl Default for SeedingConfig {
    fn default() -> Self {
        Self {
            turtle_probability: 0.0025,
            trash_probability: 0.005,
            ship_probability: 0.0002,
            max_turtles: 25,
            max_trash: 25,
            max_ships: 2,
        }
    }
}

/// Chance that each kind sits still for a tick
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub turtle_idle: f64,
    pub trash_idle: f64,
    pub ship_idle: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            turtle_idle: 1.0 / 9.0,
            trash_idle: 0.5,
            ship_idle: 0.2,
        }
    }
}

/// Simulation run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of ticks to run the simulation
    pub num_ticks: u64,
    /// Pause between ticks (milliseconds)
    pub tick_delay_ms: u64,
    /// Random seed for reproducibility; `None` seeds from OS entropy
    pub seed: Option<u64>,
    /// Emit a population snapshot every this many ticks (0 disables)
    pub report_interval: u64,
    /// Keep a per-tick report for the whole run; totals are kept either way
    pub record_history: bool,
    pub ocean: OceanConfig,
    pub seeding: SeedingConfig,
    pub movement: MovementConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_ticks: 100,
            tick_delay_ms: 500,
            seed: None,
            report_interval: 10,
            record_history: true,
            ocean: OceanConfig::default(),
            seeding: SeedingConfig::default(),
            movement: MovementConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn tick_delay(&self) -> Duration {
        Duration::from_millis(self.tick_delay_ms)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading simulation config");
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ocean.rows == 0 || self.ocean.cols == 0 {
            return Err(Error::InvalidConfig(format!(
                "grid must be at least 1x1, got {}x{}",
                self.ocean.rows, self.ocean.cols
            )));
        }

        let probabilities = [
            ("seeding.turtle_probability", self.seeding.turtle_probability),
            ("seeding.trash_probability", self.seeding.trash_probability),
            ("seeding.ship_probability", self.seeding.ship_probability),
            ("movement.turtle_idle", self.movement.turtle_idle),
            ("movement.trash_idle", self.movement.trash_idle),
            ("movement.ship_idle", self.movement.ship_idle),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        let seeded = self.seeding.turtle_probability
            + self.seeding.trash_probability
            + self.seeding.ship_probability;
        if seeded > 1.0 {
            return Err(Error::InvalidConfig(format!(
                "seeding probabilities sum to {seeded}, which exceeds 1"
            )));
        }

        Ok(())
    }
}
