//! Command-line driver for the ocean simulation.

mod frontend;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use ocean_core::SimulationConfig;
use ocean_world::{Grid, Simulation};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "ocean",
    version,
    about = "Turtles, trash and ships drifting on a grid"
)]
struct Cli {
    /// JSON configuration file; flags below override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start from a glyph layout file instead of a random fill.
    #[arg(long)]
    layout: Option<PathBuf>,

    #[arg(long)]
    rows: Option<usize>,

    #[arg(long)]
    cols: Option<usize>,

    /// Requested initial turtles.
    #[arg(long)]
    turtles: Option<usize>,

    /// Requested initial trash.
    #[arg(long)]
    trash: Option<usize>,

    /// Requested initial ships.
    #[arg(long)]
    ships: Option<usize>,

    /// Number of ticks to simulate.
    #[arg(long, env = "OCEAN_TICKS")]
    ticks: Option<u64>,

    /// Pause between ticks in milliseconds.
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Random seed for a reproducible run.
    #[arg(long, env = "OCEAN_SEED")]
    seed: Option<u64>,

    /// Skip frame output and pauses; only logs are written.
    #[arg(short, long)]
    quiet: bool,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn simulation_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_json_file(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => SimulationConfig::default(),
        };

        if let Some(rows) = self.rows {
            config.ocean.rows = rows;
        }
        if let Some(cols) = self.cols {
            config.ocean.cols = cols;
        }
        if let Some(turtles) = self.turtles {
            config.ocean.turtles = turtles;
        }
        if let Some(trash) = self.trash {
            config.ocean.trash = trash;
        }
        if let Some(ships) = self.ships {
            config.ocean.ships = ships;
        }
        if let Some(ticks) = self.ticks {
            config.num_ticks = ticks;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.tick_delay_ms = delay_ms;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        // Only run totals are reported, and the tick count may be unbounded.
        config.record_history = false;

        config.validate().context("invalid simulation config")?;
        Ok(config)
    }
}

fn build_simulation(cli: &Cli, config: SimulationConfig) -> Result<Simulation> {
    let Some(path) = &cli.layout else {
        return Ok(Simulation::new(config)?);
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read layout {}", path.display()))?;
    let grid = Grid::parse_layout(&text)
        .with_context(|| format!("failed to parse layout {}", path.display()))?;
    let rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    Ok(Simulation::with_grid(config, grid, rng)?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    telemetry::init_telemetry(cli.json_logs)?;

    let config = cli.simulation_config()?;
    let mut simulation = build_simulation(&cli, config)?;

    info!(
        run_id = %simulation.run_id(),
        rows = simulation.grid().rows(),
        cols = simulation.grid().cols(),
        seed = ?simulation.config().seed,
        "Starting ocean simulation"
    );

    let mut frontend = frontend::TerminalFrontend::new(cli.quiet);
    let result = simulation.run(&mut frontend)?;

    if !cli.quiet {
        print!("{}", simulation.grid());
    }

    let deaths = result.deaths;
    info!(
        ticks = result.total_ticks,
        turtles_lost = deaths.turtles,
        trash_cleared = deaths.trash,
        "Done"
    );

    Ok(())
}
