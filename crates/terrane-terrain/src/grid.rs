//! Dense row-major 2D grid used for every per-cell terrain field.

/// Errors produced when assembling grids from raw data.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// The supplied buffer does not hold `width * height` cells.
    #[error("grid data has {actual} cells, expected {width}x{height}")]
    SizeMismatch {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },
}

/// A `width x height` grid stored row by row (`y` major).
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Creates a grid with every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width * height],
        }
    }
}

impl<T> Grid<T> {
    /// Wraps an existing row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::SizeMismatch`] if `cells.len() != width * height`.
    pub fn from_vec(width: usize, height: usize, cells: Vec<T>) -> Result<Self, GridError> {
        if cells.len() != width * height {
            return Err(GridError::SizeMismatch {
                width,
                height,
                actual: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Builds a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `true` when both grids have the same dimensions.
    pub fn same_shape<U>(&self, other: &Grid<U>) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Cell at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        debug_assert!(x < self.width && y < self.height);
        &self.cells[y * self.width + x]
    }

    /// Overwrites the cell at column `x`, row `y`.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        debug_assert!(x < self.width && y < self.height);
        self.cells[y * self.width + x] = value;
    }

    /// Row-major view of every cell.
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    /// Mutable row-major view of every cell.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.cells
    }

    /// Produces a new grid of the same shape by mapping every cell.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            cells: self.cells.iter().map(f).collect(),
        }
    }
}

impl Grid<f32> {
    /// Smallest and largest cell values, or `None` for an empty grid.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut iter = self.cells.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fn_is_row_major() {
        let grid = Grid::from_fn(3, 2, |x, y| x + 10 * y);
        assert_eq!(grid.as_slice(), &[0, 1, 2, 10, 11, 12]);
        assert_eq!(*grid.get(2, 1), 12);
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        let result = Grid::from_vec(4, 4, vec![0.0_f32; 15]);
        assert!(matches!(result, Err(GridError::SizeMismatch { actual: 15, .. })));
    }

    #[test]
    fn test_min_max() {
        let grid = Grid::from_vec(2, 2, vec![0.5, -1.0, 3.0, 0.0]).unwrap();
        assert_eq!(grid.min_max(), Some((-1.0, 3.0)));
        assert_eq!(Grid::<f32>::from_vec(0, 0, Vec::new()).unwrap().min_max(), None);
    }
}
