//! 2D grid for the ocean.

use ocean_core::{
    Cell, Error, OceanConfig, Occupancy, Population, Result, SeedingConfig,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// A bounded 2D grid, one [`Occupancy`] per cell, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Occupancy>,
    /// Requested starting population; only the seeding pass reads it.
    targets: Population,
}

impl Grid {
    /// An all-empty grid. Both dimensions must be at least 1.
    pub fn new(rows: usize, cols: usize, targets: Population) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidConfig(format!(
                "grid must be at least 1x1, got {rows}x{cols}"
            )));
        }

        Ok(Self {
            rows,
            cols,
            cells: vec![Occupancy::Empty; rows * cols],
            targets,
        })
    }

    /// Create a stochastically seeded grid from configuration
    pub fn from_config<R: Rng + ?Sized>(
        ocean: &OceanConfig,
        seeding: &SeedingConfig,
        rng: &mut R,
    ) -> Result<Self> {
        let targets = Population::new(ocean.turtles, ocean.trash, ocean.ships);
        let mut grid = Self::new(ocean.rows, ocean.cols, targets)?;
        grid.seed(seeding, rng);
        Ok(grid)
    }

    /// Build a grid from glyph rows (`o` turtle, `x` trash, `|` ship, space or
    /// `.` empty). Short rows are padded with empty cells.
    pub fn from_rows(rows: &[&str]) -> Result<Self> {
        let parsed = rows
            .iter()
            .map(|row| row.chars().map(Occupancy::from_glyph).collect::<Result<Vec<_>>>())
            .collect::<Result<Vec<_>>>()?;

        let cols = parsed.iter().map(Vec::len).max().unwrap_or(0);
        let mut grid = Self::new(parsed.len(), cols, Population::default())?;
        for (i, row) in parsed.into_iter().enumerate() {
            for (j, kind) in row.into_iter().enumerate() {
                grid.cells[i * cols + j] = kind;
            }
        }
        grid.targets = grid.census();

        Ok(grid)
    }

    /// Parse a multi-line layout, one grid row per line.
    pub fn parse_layout(text: &str) -> Result<Self> {
        let rows: Vec<&str> = text.lines().collect();
        Self::from_rows(&rows)
    }

    /// Fill every cell independently: each kind owns a probability band of a
    /// single [0, 1) draw. A draw for a kind whose cap is reached leaves the
    /// cell empty.
    fn seed<R: Rng + ?Sized>(&mut self, seeding: &SeedingConfig, rng: &mut R) {
        let caps = Population::new(
            self.targets.turtles.min(seeding.max_turtles),
            self.targets.trash.min(seeding.max_trash),
            self.targets.ships.min(seeding.max_ships),
        );
        let mut placed = Population::default();

        let turtle_band = seeding.turtle_probability;
        let trash_band = turtle_band + seeding.trash_probability;
        let ship_band = trash_band + seeding.ship_probability;

        for cell in self.cells.iter_mut() {
            let roll = rng.gen::<f64>();

            let drawn = if roll < turtle_band {
                Occupancy::Turtle
            } else if roll < trash_band {
                Occupancy::Trash
            } else if roll < ship_band {
                Occupancy::Ship
            } else {
                Occupancy::Empty
            };
            let kind = if placed.count(drawn) < caps.count(drawn) {
                drawn
            } else {
                Occupancy::Empty
            };

            placed.add(kind);
            *cell = kind;
        }

        debug!(
            turtles = placed.turtles,
            trash = placed.trash,
            ships = placed.ships,
            "Seeded initial population"
        );
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// An all-empty grid with the same shape, used as the next tick's buffer.
    pub fn blank_like(&self) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            cells: vec![Occupancy::Empty; self.cells.len()],
            targets: self.targets,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Result<Occupancy> {
        let index = self.index_of(row, col)?;
        Ok(self.cells[index])
    }

    pub fn set(&mut self, row: usize, col: usize, kind: Occupancy) -> Result<()> {
        let index = self.index_of(row, col)?;
        self.cells[index] = kind;
        Ok(())
    }

    pub fn get_cell(&self, cell: Cell) -> Result<Occupancy> {
        self.get(cell.row, cell.col)
    }

    pub fn set_cell(&mut self, cell: Cell, kind: Occupancy) -> Result<()> {
        self.set(cell.row, cell.col, kind)
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Linear index of (row, col), or an out-of-bounds error.
    pub fn index_of(&self, row: usize, col: usize) -> Result<usize> {
        if !self.contains(row, col) {
            return Err(Error::OutOfBounds {
                row: row as i64,
                col: col as i64,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    pub fn cell_of(&self, index: usize) -> Cell {
        Cell::new(index / self.cols, index % self.cols)
    }

    /// Iterator over all cells with their occupancy
    pub fn iter(&self) -> impl Iterator<Item = (Cell, Occupancy)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, kind)| (self.cell_of(i), *kind))
    }

    /// Cells holding `kind`, in row-major order.
    pub fn cells_of(&self, kind: Occupancy) -> impl Iterator<Item = Cell> + '_ {
        self.iter()
            .filter(move |(_, occupant)| *occupant == kind)
            .map(|(cell, _)| cell)
    }

    /// Count every mobile kind currently on the grid.
    pub fn census(&self) -> Population {
        let mut population = Population::default();
        for kind in &self.cells {
            population.add(*kind);
        }
        population
    }

    /// The text frame shown each tick.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;

        write!(f, " ")?;
        for j in 0..self.cols {
            write!(f, " {}", j % 10)?;
        }
        writeln!(f)?;

        for (i, row) in self.cells.chunks(self.cols).enumerate() {
            write!(f, "{} ", i % 10)?;
            for kind in row {
                write!(f, "{} ", kind.glyph())?;
            }
            writeln!(f)?;
        }

        writeln!(f)?;
        write!(f, "{}", self.census())
    }
}
