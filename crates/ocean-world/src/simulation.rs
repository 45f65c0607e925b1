//! Simulation driver: runs the step engine for a configured number of ticks.

use crate::grid::Grid;
use crate::movement::{MovementPlanner, RandomWalk};
use crate::step::{self, StepStats};
use ocean_core::{Population, Result, RunId, SimulationConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Where frames go and how the driver waits between ticks.
pub trait Frontend {
    fn render(&mut self, frame: &str);
    fn pause(&mut self, delay: Duration);
}

/// Frontend that draws nothing and never sleeps.
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

impl Frontend for Headless {
    fn render(&mut self, _frame: &str) {}
    fn pause(&mut self, _delay: Duration) {}
}

pub struct Simulation<R = ChaCha8Rng> {
    run_id: RunId,
    grid: Grid,
    population: Population,
    walk: RandomWalk<R>,
    config: SimulationConfig,
    tick: u64,
}

impl Simulation<ChaCha8Rng> {
    /// Seed the generator once (from `config.seed`, or OS entropy) and use it
    /// for both the initial fill and every later move.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let grid = Grid::from_config(&config.ocean, &config.seeding, &mut rng)?;
        Self::with_grid(config, grid, rng)
    }
}

impl<R: Rng> Simulation<R> {
    /// Start from an existing grid with an injected generator.
    pub fn with_grid(config: SimulationConfig, grid: Grid, rng: R) -> Result<Self> {
        config.validate()?;
        let walk = RandomWalk::new(MovementPlanner::new(&config.movement), rng);
        let population = grid.census();

        Ok(Self {
            run_id: RunId::new(),
            grid,
            population,
            walk,
            config,
            tick: 0,
        })
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn population(&self) -> Population {
        self.population
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Advance one tick and swap in the new grid.
    pub fn step(&mut self) -> Result<TickReport> {
        let (next, stats) = step::step(&self.grid, &mut self.walk)?;
        self.grid = next;
        self.population = self.grid.census();
        self.tick += 1;

        debug!(
            tick = self.tick,
            turtles = self.population.turtles,
            trash = self.population.trash,
            ships = self.population.ships,
            moved = stats.moved,
            blocked = stats.blocked,
            turtle_deaths = stats.deaths.turtles,
            trash_deaths = stats.deaths.trash,
            "Tick complete"
        );

        Ok(TickReport {
            tick: self.tick,
            population: self.population,
            stats,
        })
    }

    /// Run the configured number of ticks: render, step, pause.
    #[instrument(skip(self, frontend), fields(run_id = %self.run_id, num_ticks = self.config.num_ticks))]
    pub fn run<F: Frontend + ?Sized>(&mut self, frontend: &mut F) -> Result<SimulationResult> {
        info!("Starting simulation for {} ticks", self.config.num_ticks);

        let initial = self.population;
        let delay = self.config.tick_delay();
        let mut history = Vec::new();
        let mut deaths = Population::default();

        for _ in 0..self.config.num_ticks {
            frontend.render(&self.grid.render());
            let report = self.step()?;

            if self.config.report_interval > 0 && report.tick % self.config.report_interval == 0 {
                self.emit_population_metrics(&report);
            }

            deaths.turtles += report.stats.deaths.turtles;
            deaths.trash += report.stats.deaths.trash;
            deaths.ships += report.stats.deaths.ships;
            if self.config.record_history {
                history.push(report);
            }
            frontend.pause(delay);
        }

        let result = SimulationResult {
            run_id: self.run_id,
            total_ticks: self.tick,
            initial,
            final_population: self.population,
            deaths,
            history,
        };
        self.emit_run_summary(&result);

        Ok(result)
    }

    fn emit_population_metrics(&self, report: &TickReport) {
        info!(
            event = "population_metrics",
            tick = report.tick,
            turtles = report.population.turtles,
            trash = report.population.trash,
            ships = report.population.ships,
            total_population = report.population.total(),
            "Population snapshot"
        );
    }

    fn emit_run_summary(&self, result: &SimulationResult) {
        let deaths = result.deaths;
        info!(
            event = "run_summary",
            run_id = %result.run_id,
            total_ticks = result.total_ticks,
            initial_turtles = result.initial.turtles,
            initial_trash = result.initial.trash,
            initial_ships = result.initial.ships,
            final_turtles = result.final_population.turtles,
            final_trash = result.final_population.trash,
            final_ships = result.final_population.ships,
            turtle_deaths = deaths.turtles,
            trash_deaths = deaths.trash,
            "Simulation complete"
        );
    }
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick number, starting at 1 for the first completed tick.
    pub tick: u64,
    pub population: Population,
    pub stats: StepStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub run_id: RunId,
    pub total_ticks: u64,
    pub initial: Population,
    pub final_population: Population,
    /// Entities destroyed over the whole run, by kind.
    pub deaths: Population,
    /// Per-tick reports; empty unless `record_history` is set.
    pub history: Vec<TickReport>,
}
