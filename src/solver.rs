use crate::error::{PercolationError, Result};
use crate::grid::{CellStatus, Grid};
use crate::union_find::DynamicConnectivity;
use rand::prelude::*;
use rayon::prelude::*;
use tracing::debug;

/// Neighbour offsets in visiting order: up, down, left, right
const NEIGHBOURS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Opens cells of a grid and tracks which of them connect to the top and bottom sides
///
/// Two virtual nodes live past the last grid cell in the connectivity
/// structure: `top` is joined with every opened cell of the first row and
/// `bottom` with every opened cell of the last row. The grid percolates once
/// they share a set.
#[derive(Debug, Clone)]
pub struct PercolationSolver<R = StdRng> {
    grid: Grid,
    connectivity: DynamicConnectivity,
    top: usize,
    bottom: usize,
    rng: R,
    parallel_refresh: bool,
}

impl PercolationSolver<StdRng> {
    /// Create a solver whose random cell selection is driven by a seeded `StdRng`
    pub fn with_seed(grid: Grid, parallel_refresh: bool, seed: u64) -> Result<Self> {
        Self::new(grid, parallel_refresh, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PercolationSolver<R> {
    /// Create a solver over `grid`
    ///
    /// # Arguments
    /// * `grid` - The grid to open cells in, usually freshly created
    /// * `parallel_refresh` - Recompute fill status on the rayon thread pool
    /// * `rng` - Random source for [`open_random_cell`](Self::open_random_cell)
    pub fn new(grid: Grid, parallel_refresh: bool, rng: R) -> Result<Self> {
        let cell_count = grid.cell_count();
        let connectivity = DynamicConnectivity::new(cell_count + 2)?;

        let mut solver = PercolationSolver {
            grid,
            connectivity,
            top: cell_count,
            bottom: cell_count + 1,
            rng,
            parallel_refresh,
        };

        // Wire in anything the caller already opened
        for index in solver.grid.indices_where(CellStatus::is_opened) {
            let (row, col) = solver.grid.to_row_col(index)?;
            solver.connect_cell(row, col)?;
        }

        Ok(solver)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn connectivity(&self) -> &DynamicConnectivity {
        &self.connectivity
    }

    /// Number of cells that are opened, filled or not
    pub fn opened_count(&self) -> usize {
        self.grid.count_where(CellStatus::is_opened)
    }

    /// Open the cell at `(row, col)`.
    ///
    /// Returns `false` without touching anything if it was already open.
    pub fn open_cell(&mut self, row: usize, col: usize) -> Result<bool> {
        if self.grid.get_at(row, col)?.is_opened() {
            return Ok(false);
        }

        self.grid.set_at(row, col, CellStatus::Opened)?;
        self.connect_cell(row, col)?;
        Ok(true)
    }

    /// Pick a cell at random and open it, returning its `(row, col)`
    ///
    /// With `restrict_to_closed` the pick is uniform over closed cells only.
    /// Otherwise any cell may be picked, including one that is already open.
    pub fn open_random_cell(&mut self, restrict_to_closed: bool) -> Result<(usize, usize)> {
        let (row, col) = if restrict_to_closed {
            let closed = self.grid.indices_where(|status| status == CellStatus::Closed);
            if closed.is_empty() {
                return Err(PercolationError::NoClosedCellsRemaining);
            }
            let selected = closed[self.rng.gen_range(0..closed.len())];
            self.grid.to_row_col(selected)?
        } else {
            (
                self.rng.gen_range(0..self.grid.rows()),
                self.rng.gen_range(0..self.grid.cols()),
            )
        };

        debug!("Open a cell [{}, {}]", row, col);
        self.open_cell(row, col)?;
        Ok((row, col))
    }

    /// True when fluid entering at the top reaches the cell at `index`
    pub fn is_percolating_at_cell(&mut self, index: usize) -> Result<bool> {
        self.grid.to_row_col(index)?;
        self.connectivity.connected(self.top, index)
    }

    pub fn is_percolating_at(&mut self, row: usize, col: usize) -> Result<bool> {
        let index = self.grid.to_flat_index(row, col)?;
        self.connectivity.connected(self.top, index)
    }

    /// True when an open path joins the top side to the bottom side
    pub fn percolates_fully(&mut self) -> Result<bool> {
        self.connectivity.connected(self.top, self.bottom)
    }

    /// Re-derive the displayed status of every cell from current connectivity
    pub fn refresh_fill_status(&mut self) -> Result<()> {
        let top = self.top;

        if self.parallel_refresh {
            let connectivity = &self.connectivity;
            self.grid
                .cells_mut()
                .par_iter_mut()
                .enumerate()
                .try_for_each(|(index, status)| -> Result<()> {
                    if status.is_opened() {
                        *status = if connectivity.connected_frozen(top, index)? {
                            CellStatus::OpenedAndFilled
                        } else {
                            CellStatus::Opened
                        };
                    }
                    Ok(())
                })
        } else {
            for index in 0..self.grid.cell_count() {
                if !self.grid.get(index)?.is_opened() {
                    continue;
                }
                let status = if self.connectivity.connected(top, index)? {
                    CellStatus::OpenedAndFilled
                } else {
                    CellStatus::Opened
                };
                self.grid.set(index, status)?;
            }
            Ok(())
        }
    }

    /// Union a freshly opened cell with the virtual nodes and its open neighbours
    fn connect_cell(&mut self, row: usize, col: usize) -> Result<()> {
        let index = self.grid.to_flat_index(row, col)?;

        if row == 0 {
            self.connectivity.union(index, self.top)?;
        }
        if row == self.grid.rows() - 1 {
            self.connectivity.union(index, self.bottom)?;
        }

        for (dr, dc) in NEIGHBOURS {
            let (Some(nr), Some(nc)) = (row.checked_add_signed(dr), col.checked_add_signed(dc))
            else {
                continue;
            };
            if !self.grid.contains(nr, nc) {
                continue;
            }
            let neighbour = self.grid.to_flat_index(nr, nc)?;
            if self.grid.get(neighbour)?.is_opened() {
                self.connectivity.union(index, neighbour)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Position;
    use pretty_assertions::assert_eq;

    fn solver(rows: usize, cols: usize) -> PercolationSolver {
        PercolationSolver::with_seed(Grid::new(rows, cols).unwrap(), false, 7).unwrap()
    }

    #[test]
    fn test_single_cell_percolates() {
        let mut sol = solver(1, 1);
        assert!(!sol.percolates_fully().unwrap());
        assert!(sol.open_cell(0, 0).unwrap());
        assert!(sol.percolates_fully().unwrap());
    }

    #[test]
    fn test_column_percolates() {
        let mut sol = solver(3, 3);
        sol.open_cell(0, 1).unwrap();
        sol.open_cell(1, 1).unwrap();
        assert!(!sol.percolates_fully().unwrap());
        sol.open_cell(2, 1).unwrap();
        assert!(sol.percolates_fully().unwrap());
    }

    #[test]
    fn test_gap_does_not_percolate() {
        let mut sol = solver(3, 3);
        sol.open_cell(0, 1).unwrap();
        sol.open_cell(2, 1).unwrap();
        assert!(!sol.percolates_fully().unwrap());
        assert!(sol.is_percolating_at(0, 1).unwrap());
        assert!(!sol.is_percolating_at(2, 1).unwrap());
    }

    #[test]
    fn test_open_cell_is_idempotent() {
        let mut sol = solver(3, 3);
        assert!(sol.open_cell(1, 1).unwrap());
        let grid_once = sol.grid().clone();
        let components = sol.connectivity().component_count();
        assert!(!sol.open_cell(1, 1).unwrap());
        assert_eq!(sol.grid(), &grid_once);
        assert_eq!(sol.connectivity().component_count(), components);
    }

    #[test]
    fn test_open_cell_out_of_range() {
        let mut sol = solver(2, 2);
        assert!(matches!(
            sol.open_cell(2, 0),
            Err(PercolationError::IndexOutOfRange(Position::Cell {
                row: 2,
                col: 0,
                rows: 2,
                cols: 2
            }))
        ));
        assert!(matches!(
            sol.is_percolating_at_cell(4),
            Err(PercolationError::IndexOutOfRange(Position::Flat { index: 4, len: 4 }))
        ));
        assert!(matches!(
            sol.is_percolating_at(0, 7),
            Err(PercolationError::IndexOutOfRange(Position::Cell { .. }))
        ));
    }

    #[test]
    fn test_refresh_fill_status() {
        let mut sol = solver(3, 3);
        sol.open_cell(0, 0).unwrap();
        sol.open_cell(1, 0).unwrap();
        sol.open_cell(2, 2).unwrap();
        sol.refresh_fill_status().unwrap();

        let expected = vec![
            CellStatus::OpenedAndFilled,
            CellStatus::Closed,
            CellStatus::Closed,
            CellStatus::OpenedAndFilled,
            CellStatus::Closed,
            CellStatus::Closed,
            CellStatus::Closed,
            CellStatus::Closed,
            CellStatus::Opened,
        ];
        assert_eq!(sol.grid().cells(), expected.as_slice());
    }

    #[test]
    fn test_parallel_refresh_matches_sequential() {
        let mut seq = PercolationSolver::with_seed(Grid::new(20, 20).unwrap(), false, 99).unwrap();
        let mut par = PercolationSolver::with_seed(Grid::new(20, 20).unwrap(), true, 99).unwrap();
        for _ in 0..150 {
            let a = seq.open_random_cell(true).unwrap();
            let b = par.open_random_cell(true).unwrap();
            assert_eq!(a, b);
        }
        seq.refresh_fill_status().unwrap();
        par.refresh_fill_status().unwrap();
        assert_eq!(seq.grid(), par.grid());
    }

    #[test]
    fn test_open_random_exhausts_closed_cells() {
        let mut sol = solver(3, 4);
        for _ in 0..12 {
            sol.open_random_cell(true).unwrap();
        }
        assert_eq!(sol.opened_count(), 12);
        assert!(sol.percolates_fully().unwrap());
        assert!(matches!(
            sol.open_random_cell(true),
            Err(PercolationError::NoClosedCellsRemaining)
        ));
    }

    #[test]
    fn test_open_random_unrestricted_may_reopen() {
        let mut sol = solver(2, 2);
        for _ in 0..50 {
            let (row, col) = sol.open_random_cell(false).unwrap();
            assert!(sol.grid().contains(row, col));
        }
        assert!(sol.opened_count() <= 4);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let mut a = solver(5, 5);
        let mut b = solver(5, 5);
        for _ in 0..10 {
            assert_eq!(
                a.open_random_cell(true).unwrap(),
                b.open_random_cell(true).unwrap()
            );
        }
    }

    #[test]
    fn test_preopened_grid_is_wired() {
        let mut grid = Grid::new(2, 1).unwrap();
        grid.set_at(0, 0, CellStatus::Opened).unwrap();
        grid.set_at(1, 0, CellStatus::Opened).unwrap();
        let mut sol = PercolationSolver::with_seed(grid, false, 1).unwrap();
        assert!(sol.percolates_fully().unwrap());
    }
}
