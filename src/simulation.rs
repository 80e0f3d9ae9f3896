use crate::error::{PercolationError, Result};
use crate::grid::{CellStatus, Grid};
use crate::solver::PercolationSolver;
use rand::prelude::*;
use std::fmt;
use tracing::info;

/// Parameters controlling a percolation run
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Number of cell rows
    pub rows: usize,
    /// Number of cell columns
    pub cols: usize,
    /// Only pick closed cells when opening at random
    pub restrict_to_closed: bool,
    /// Refresh fill status on the rayon thread pool
    pub parallel_refresh: bool,
    /// End the run on the first iteration that percolates
    pub stop_when_percolated: bool,
    /// Seed for the random source, entropy when absent
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            rows: 12,
            cols: 12,
            restrict_to_closed: true,
            parallel_refresh: false,
            stop_when_percolated: false,
            seed: None,
        }
    }
}

/// State of the grid after one iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationReport {
    pub iteration: usize,
    /// The cell picked this iteration
    pub cell: (usize, usize),
    pub opened_cells: usize,
    pub total_cells: usize,
    pub percolates: bool,
}

impl IterationReport {
    /// Opened cells as an integer percentage of all cells
    pub fn porosity(&self) -> usize {
        100 * self.opened_cells / self.total_cells
    }
}

impl fmt::Display for IterationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Iteration: {}, Opened cells = {}, Porosity = {}%, {}",
            self.iteration,
            self.opened_cells,
            self.porosity(),
            if self.percolates {
                "Percolates!"
            } else {
                "Does not percolate"
            }
        )
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationSummary {
    pub iterations: usize,
    pub opened_cells: usize,
    /// First iteration after which the grid percolated
    pub percolated_at: Option<usize>,
    pub percolates: bool,
}

/// Drives a solver through open, refresh and query phases
#[derive(Debug, Clone)]
pub struct Simulation<R = StdRng> {
    solver: PercolationSolver<R>,
    restrict_to_closed: bool,
    stop_when_percolated: bool,
}

impl Simulation<StdRng> {
    /// Build a simulation from a config, seeding from entropy when no seed is set
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> Simulation<R> {
    pub fn with_rng(config: &SimulationConfig, rng: R) -> Result<Self> {
        let grid = Grid::new(config.rows, config.cols)?;
        let solver = PercolationSolver::new(grid, config.parallel_refresh, rng)?;

        Ok(Simulation {
            solver,
            restrict_to_closed: config.restrict_to_closed,
            stop_when_percolated: config.stop_when_percolated,
        })
    }

    pub fn solver(&self) -> &PercolationSolver<R> {
        &self.solver
    }

    pub fn grid(&self) -> &Grid {
        self.solver.grid()
    }

    /// Run one open → refresh → query cycle
    pub fn step(&mut self, iteration: usize) -> Result<IterationReport> {
        let cell = self.solver.open_random_cell(self.restrict_to_closed)?;
        self.solver.refresh_fill_status()?;

        Ok(IterationReport {
            iteration,
            cell,
            opened_cells: self.grid().count_where(CellStatus::is_opened),
            total_cells: self.grid().cell_count(),
            percolates: self.solver.percolates_fully()?,
        })
    }

    /// Run up to one iteration per cell, calling `on_iteration` after each
    ///
    /// The run ends early when no closed cell is left to open, or on the
    /// first percolating iteration if configured to.
    pub fn run<F>(&mut self, mut on_iteration: F) -> Result<SimulationSummary>
    where
        F: FnMut(&IterationReport, &Grid) -> Result<()>,
    {
        let max_iter = self.grid().cell_count();
        info!(
            "Starting percolation on a {}x{} grid",
            self.grid().rows(),
            self.grid().cols()
        );

        let mut iterations = 0;
        let mut percolated_at = None;
        for iteration in 0..max_iter {
            let report = match self.step(iteration) {
                Ok(report) => report,
                Err(PercolationError::NoClosedCellsRemaining) => break,
                Err(e) => return Err(e),
            };
            iterations += 1;

            if report.percolates && percolated_at.is_none() {
                percolated_at = Some(iteration);
            }
            on_iteration(&report, self.grid())?;

            if report.percolates && self.stop_when_percolated {
                break;
            }
        }

        let summary = SimulationSummary {
            iterations,
            opened_cells: self.solver.opened_count(),
            percolated_at,
            percolates: self.solver.percolates_fully()?,
        };
        info!(
            "Finished after {} iterations with {} opened cells",
            summary.iterations, summary.opened_cells
        );
        Ok(summary)
    }
}
