//! Site percolation on a 2D grid, tracked incrementally with a weighted
//! quick-union structure.

pub mod error;
pub mod export;
pub mod grid;
pub mod simulation;
pub mod solver;
pub mod union_find;

pub use error::{PercolationError, Position, Result};
pub use grid::{CellStatus, Grid};
pub use simulation::{IterationReport, Simulation, SimulationConfig, SimulationSummary};
pub use solver::PercolationSolver;
pub use union_find::DynamicConnectivity;
