//! Class-1 probability surface evaluated over the grid.

use arbor_rf::RandomForest;
use tracing::debug;

use crate::error::PlotError;
use crate::grid::Grid;

/// The forest's class-1 probability at every grid point.
///
/// Values are stored row-major in the grid's iteration order (y outer,
/// x inner), one value per lattice point.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilitySurface {
    grid: Grid,
    values: Vec<f64>,
}

impl ProbabilitySurface {
    /// Evaluate the forest's class-1 probability at every point of `grid`.
    ///
    /// # Errors
    ///
    /// Returns [`PlotError::Forest`] when batch prediction fails (the grid
    /// dimensionality never mismatches a 2-feature forest, so in practice
    /// this only surfaces forests trained on other feature counts).
    pub fn evaluate(forest: &RandomForest, grid: Grid) -> Result<Self, PlotError> {
        let samples: Vec<Vec<f64>> = grid.points().map(|p| p.to_vec()).collect();
        let distributions = forest.predict_proba_batch(&samples)?;
        let values: Vec<f64> = distributions.iter().map(|d| d.prob(1)).collect();

        debug!(
            n_points = values.len(),
            n_cols = grid.n_cols(),
            n_rows = grid.n_rows(),
            "probability surface evaluated"
        );

        Ok(Self { grid, values })
    }

    /// Return the grid this surface was evaluated on.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Return the probabilities in grid iteration order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Return the probability at column `col`, row `row`.
    #[must_use]
    pub fn value_at(&self, col: usize, row: usize) -> f64 {
        self.values[row * self.grid.n_cols() + col]
    }
}

#[cfg(test)]
mod tests {
    use super::ProbabilitySurface;
    use crate::grid::{Bounds, Grid};
    use arbor_rf::ForestConfig;

    fn separable_forest() -> arbor_rf::RandomForest {
        let features = vec![
            vec![0.0, 0.0],
            vec![0.1, 0.1],
            vec![0.2, 0.0],
            vec![10.0, 10.0],
            vec![10.1, 10.1],
            vec![10.2, 10.0],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];
        ForestConfig::new(10)
            .unwrap()
            .with_seed(7)
            .fit(&features, &labels)
            .unwrap()
    }

    #[test]
    fn surface_has_one_value_per_grid_point() {
        let forest = separable_forest();
        let bounds = Bounds {
            x_min: -1.0,
            x_max: 11.0,
            y_min: -1.0,
            y_max: 11.0,
        };
        let grid = Grid::over(bounds, 1.0).unwrap();
        let surface = ProbabilitySurface::evaluate(&forest, grid).unwrap();
        assert_eq!(surface.values().len(), grid.len());
    }

    #[test]
    fn probabilities_follow_the_clusters() {
        let forest = separable_forest();
        let bounds = Bounds {
            x_min: -1.0,
            x_max: 11.0,
            y_min: -1.0,
            y_max: 11.0,
        };
        let grid = Grid::over(bounds, 1.0).unwrap();
        let surface = ProbabilitySurface::evaluate(&forest, grid).unwrap();

        // Near the class-0 cluster (first column, first row).
        assert!(surface.value_at(0, 0) < 0.5);
        // Near the class-1 cluster (last column, last row).
        assert!(surface.value_at(grid.n_cols() - 1, grid.n_rows() - 1) > 0.5);
    }

    #[test]
    fn values_are_probabilities() {
        let forest = separable_forest();
        let bounds = Bounds {
            x_min: 0.0,
            x_max: 10.0,
            y_min: 0.0,
            y_max: 10.0,
        };
        let grid = Grid::over(bounds, 0.5).unwrap();
        let surface = ProbabilitySurface::evaluate(&forest, grid).unwrap();
        for &v in surface.values() {
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn evaluation_is_deterministic() {
        let forest = separable_forest();
        let bounds = Bounds {
            x_min: 0.0,
            x_max: 10.0,
            y_min: 0.0,
            y_max: 10.0,
        };
        let grid = Grid::over(bounds, 0.5).unwrap();
        let a = ProbabilitySurface::evaluate(&forest, grid).unwrap();
        let b = ProbabilitySurface::evaluate(&forest, grid).unwrap();
        assert_eq!(a, b);
    }
}
