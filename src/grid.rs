use crate::error::{PercolationError, Position, Result};
use std::fmt;

/// Status of a single grid cell, ordered by increasing "openness"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum CellStatus {
    #[default]
    Closed,
    Opened,
    OpenedAndFilled,
}

impl CellStatus {
    /// Numeric ordinal of the status (0, 1, 2)
    pub fn value(self) -> u8 {
        self as u8
    }

    /// True for both `Opened` and `OpenedAndFilled`
    pub fn is_opened(self) -> bool {
        self > CellStatus::Closed
    }

    fn glyph(self) -> char {
        match self {
            CellStatus::Closed => '\u{2591}',
            CellStatus::Opened => '\u{2592}',
            CellStatus::OpenedAndFilled => '\u{2588}',
        }
    }
}

/// A flat, row-major store of cell statuses addressed as a 2D grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    data: Vec<CellStatus>,
}

impl Grid {
    /// Create a grid with every cell closed
    ///
    /// # Arguments
    /// * `rows` - Vertical resolution, the number of cells in each column
    /// * `cols` - Horizontal resolution, the number of cells in each row
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        // A Vec can't hold more than isize::MAX bytes
        let cell_count = match rows.checked_mul(cols) {
            Some(count) if count > 0 && count <= isize::MAX as usize => count,
            _ => return Err(PercolationError::InvalidDimension { rows, cols }),
        };

        Ok(Grid {
            rows,
            cols,
            data: vec![CellStatus::Closed; cell_count],
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_count(&self) -> usize {
        self.data.len()
    }

    /// Read-only view of the row-major status data
    pub fn cells(&self) -> &[CellStatus] {
        &self.data
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [CellStatus] {
        &mut self.data
    }

    /// Convert a `(row, col)` pair into a flat index
    pub fn to_flat_index(&self, row: usize, col: usize) -> Result<usize> {
        if !self.contains(row, col) {
            return Err(PercolationError::IndexOutOfRange(Position::Cell {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            }));
        }
        Ok(row * self.cols + col)
    }

    /// Convert a flat index back into its `(row, col)` pair
    pub fn to_row_col(&self, index: usize) -> Result<(usize, usize)> {
        self.check_index(index)?;
        Ok((index / self.cols, index % self.cols))
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    pub fn get(&self, index: usize) -> Result<CellStatus> {
        self.check_index(index)?;
        Ok(self.data[index])
    }

    pub fn set(&mut self, index: usize, status: CellStatus) -> Result<()> {
        self.check_index(index)?;
        self.data[index] = status;
        Ok(())
    }

    pub fn get_at(&self, row: usize, col: usize) -> Result<CellStatus> {
        let index = self.to_flat_index(row, col)?;
        Ok(self.data[index])
    }

    pub fn set_at(&mut self, row: usize, col: usize, status: CellStatus) -> Result<()> {
        let index = self.to_flat_index(row, col)?;
        self.data[index] = status;
        Ok(())
    }

    /// Count the cells whose status satisfies `predicate`
    pub fn count_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(CellStatus) -> bool,
    {
        self.data.iter().filter(|status| predicate(**status)).count()
    }

    /// Flat indices of the cells whose status satisfies `predicate`, ascending
    pub fn indices_where<F>(&self, predicate: F) -> Vec<usize>
    where
        F: Fn(CellStatus) -> bool,
    {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, status)| predicate(**status))
            .map(|(index, _)| index)
            .collect()
    }

    /// Flat indices of every cell in `row`, left to right
    pub fn horizontal_slice(&self, row: usize) -> Result<Vec<usize>> {
        let start = self.to_flat_index(row, 0)?;
        Ok((start..start + self.cols).collect())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.data.len() {
            return Err(PercolationError::IndexOutOfRange(Position::Flat {
                index,
                len: self.data.len(),
            }));
        }
        Ok(())
    }
}

// Two glyphs per cell so the rendering looks roughly square in a terminal
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.data.chunks(self.cols) {
            for status in row {
                let glyph = status.glyph();
                write!(f, "{}{}", glyph, glyph)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
