//! Bounding box and evaluation grid over the dataset.

use crate::error::PlotError;

/// Axis-aligned bounding box of a point set, expanded by a fixed margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Left edge (min x minus margin).
    pub x_min: f64,
    /// Right edge (max x plus margin).
    pub x_max: f64,
    /// Bottom edge (min y minus margin).
    pub y_min: f64,
    /// Top edge (max y plus margin).
    pub y_max: f64,
}

impl Bounds {
    /// Compute the bounding box of `points` expanded by `margin` per side.
    ///
    /// # Errors
    ///
    /// | Variant                      | When                                  |
    /// |------------------------------|---------------------------------------|
    /// | [`PlotError::EmptyDataset`]  | `points` is empty                     |
    /// | [`PlotError::InvalidMargin`] | `margin` is negative, NaN, or infinite |
    pub fn of(points: &[[f64; 2]], margin: f64) -> Result<Self, PlotError> {
        if points.is_empty() {
            return Err(PlotError::EmptyDataset);
        }
        if !margin.is_finite() || margin < 0.0 {
            return Err(PlotError::InvalidMargin { margin });
        }

        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for &[x, y] in points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }

        Ok(Self {
            x_min: x_min - margin,
            x_max: x_max + margin,
            y_min: y_min - margin,
            y_max: y_max + margin,
        })
    }

    /// Return the horizontal extent.
    #[must_use]
    pub fn x_span(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Return the vertical extent.
    #[must_use]
    pub fn y_span(&self) -> f64 {
        self.y_max - self.y_min
    }
}

/// A regular evaluation lattice over a bounding box.
///
/// Each axis is half-open: values start at the box minimum and advance by
/// `step` while strictly below the box maximum. Points are iterated
/// row-major, y outer and x inner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    bounds: Bounds,
    step: f64,
    n_cols: usize,
    n_rows: usize,
}

impl Grid {
    /// Lay a grid with the given step over `bounds`.
    ///
    /// # Errors
    ///
    /// Returns [`PlotError::InvalidStep`] when `step` is zero, negative,
    /// NaN, or infinite.
    pub fn over(bounds: Bounds, step: f64) -> Result<Self, PlotError> {
        if !step.is_finite() || step <= 0.0 {
            return Err(PlotError::InvalidStep { step });
        }
        let n_cols = (bounds.x_span() / step).ceil() as usize;
        let n_rows = (bounds.y_span() / step).ceil() as usize;
        Ok(Self {
            bounds,
            step,
            n_cols,
            n_rows,
        })
    }

    /// Return the bounding box this grid covers.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Return the lattice step.
    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Return the number of columns (x direction).
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Return the number of rows (y direction).
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Return the total number of lattice points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.n_cols * self.n_rows
    }

    /// Return `true` if the grid has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the x coordinate of column `col`.
    #[must_use]
    pub fn x(&self, col: usize) -> f64 {
        self.bounds.x_min + col as f64 * self.step
    }

    /// Return the y coordinate of row `row`.
    #[must_use]
    pub fn y(&self, row: usize) -> f64 {
        self.bounds.y_min + row as f64 * self.step
    }

    /// Iterate lattice points row-major (y outer, x inner).
    pub fn points(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        (0..self.n_rows)
            .flat_map(move |row| (0..self.n_cols).map(move |col| [self.x(col), self.y(row)]))
    }
}
