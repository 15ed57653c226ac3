//! # Grid Geometry
//!
//! Resolves how many rows and columns a grid has. Explicit counts are taken
//! as given and checked for capacity; a missing count is derived from the
//! image count; with neither, the layout is near-square and leans toward
//! more columns than rows.

use crate::error::GridError;

/// Resolved rows × columns of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

impl GridShape {
    pub fn capacity(&self) -> usize {
        self.rows * self.cols
    }

    /// (row, col) of the `index`-th slot in row-major order.
    pub fn position(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }
}

/// Resolve the grid shape for `n_images`.
pub fn resolve(
    n_images: usize,
    rows: Option<usize>,
    cols: Option<usize>,
) -> Result<GridShape, GridError> {
    if n_images == 0 {
        return Err(GridError::EmptyInput);
    }
    if rows == Some(0) || cols == Some(0) {
        return Err(GridError::InvalidConfig(
            "rows and cols must be at least 1".to_string(),
        ));
    }

    let shape = match (rows, cols) {
        (Some(rows), Some(cols)) => GridShape { rows, cols },
        (Some(rows), None) => GridShape {
            rows,
            cols: n_images.div_ceil(rows),
        },
        (None, Some(cols)) => GridShape {
            rows: n_images.div_ceil(cols),
            cols,
        },
        (None, None) => {
            let cols = ceil_sqrt(n_images);
            GridShape {
                rows: n_images.div_ceil(cols),
                cols,
            }
        }
    };

    if shape.capacity() < n_images {
        return Err(GridError::InsufficientCapacity {
            rows: shape.rows,
            cols: shape.cols,
            images: n_images,
        });
    }
    Ok(shape)
}

/// Smallest `c` with `c * c >= n`, exact for every `usize`-sized input.
fn ceil_sqrt(n: usize) -> usize {
    let mut c = (n as f64).sqrt().ceil() as usize;
    while c > 1 && (c - 1) * (c - 1) >= n {
        c -= 1;
    }
    while c * c < n {
        c += 1;
    }
    c.max(1)
}
