use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PercolationError>;

/// The offending index of an out-of-range access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// A flat index into `len` elements
    Flat { index: usize, len: usize },
    /// A `(row, col)` pair on a `rows` x `cols` grid
    Cell {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Flat { index, len } => write!(f, "index {} of {} elements", index, len),
            Position::Cell {
                row,
                col,
                rows,
                cols,
            } => write!(f, "cell ({}, {}) of a {}x{} grid", row, col, rows, cols),
        }
    }
}

#[derive(Error, Debug)]
pub enum PercolationError {
    #[error("Grid resolution should be positive and addressable, got {rows}x{cols}")]
    InvalidDimension { rows: usize, cols: usize },

    #[error("Out of range: {0}")]
    IndexOutOfRange(Position),

    #[error("Union-find size should be positive, got {0}")]
    InvalidSize(usize),

    #[error("No closed cells remaining")]
    NoClosedCellsRemaining,

    #[error("Image export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for PercolationError {
    fn from(error: image::ImageError) -> Self {
        PercolationError::Export(error.to_string())
    }
}
