//! The boundary plot: filled probability contour plus dataset scatter.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::{debug, info};

use arbor_data::Dataset;
use arbor_rf::ForestConfig;

use crate::colormap::{blend_over_white, diverging_red_blue};
use crate::error::PlotError;
use crate::grid::{Bounds, Grid};
use crate::surface::ProbabilitySurface;

/// Scatter color for class-0 points (tab:blue).
const CLASS_0: RGBColor = RGBColor(31, 119, 180);
/// Scatter color for class-1 points (tab:red).
const CLASS_1: RGBColor = RGBColor(214, 39, 40);

/// Opacity of the contour layer over the white background.
const CONTOUR_ALPHA: f64 = 0.4;

/// Scatter marker radius in pixels.
const MARKER_RADIUS: i32 = 5;

/// Title text for a boundary plot with the given depth cap.
///
/// Depth 0 shows the raw data only and is titled accordingly.
#[must_use]
pub fn plot_title(max_depth: usize) -> String {
    if max_depth == 0 {
        "data set".to_string()
    } else {
        format!("max_depth = {max_depth}")
    }
}

/// Renders the decision boundary of a depth-capped forest over a dataset.
///
/// Construct via [`BoundaryPlot::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter     | Default   |
/// |---------------|-----------|
/// | `step`        | 0.02      |
/// | `margin`      | 0.5       |
/// | `n_trees`     | 20        |
/// | `forest_seed` | 1         |
/// | `size`        | 640 × 480 |
#[derive(Debug, Clone)]
pub struct BoundaryPlot {
    step: f64,
    margin: f64,
    n_trees: usize,
    forest_seed: u64,
    width: u32,
    height: u32,
}

impl BoundaryPlot {
    /// Create a plot config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            step: 0.02,
            margin: 0.5,
            n_trees: 20,
            forest_seed: 1,
            width: 640,
            height: 480,
        }
    }

    /// Set the evaluation grid step.
    #[must_use]
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Set the bounding box margin around the data.
    #[must_use]
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Set the number of trees in the forest.
    #[must_use]
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    /// Set the forest training seed.
    #[must_use]
    pub fn with_forest_seed(mut self, forest_seed: u64) -> Self {
        self.forest_seed = forest_seed;
        self
    }

    /// Set the output image size in pixels.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Render the boundary plot for `max_depth` to a PNG file.
    ///
    /// Depth 0 skips training entirely and plots the raw data.
    ///
    /// # Errors
    ///
    /// Propagates data, classifier, and backend errors unmodified — see
    /// [`PlotError`].
    pub fn render_to_file(
        &self,
        dataset: &Dataset,
        max_depth: usize,
        path: impl AsRef<Path>,
    ) -> Result<(), PlotError> {
        let path = path.as_ref();
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        self.draw(dataset, max_depth, &root)?;
        root.present().map_err(|e| PlotError::Draw {
            message: e.to_string(),
        })?;
        info!(max_depth, path = %path.display(), "boundary plot written");
        Ok(())
    }

    /// Render the boundary plot for `max_depth` into a fresh RGB8 buffer.
    ///
    /// Returns the pixel buffer (`width * height * 3` bytes, row-major)
    /// together with its dimensions; the viewer uploads it as a texture.
    ///
    /// # Errors
    ///
    /// Propagates data, classifier, and backend errors unmodified — see
    /// [`PlotError`].
    pub fn render_to_rgb(
        &self,
        dataset: &Dataset,
        max_depth: usize,
    ) -> Result<(Vec<u8>, (u32, u32)), PlotError> {
        let mut buffer = vec![0u8; self.width as usize * self.height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (self.width, self.height))
                .into_drawing_area();
            self.draw(dataset, max_depth, &root)?;
            root.present().map_err(|e| PlotError::Draw {
                message: e.to_string(),
            })?;
        }
        Ok((buffer, (self.width, self.height)))
    }

    /// Draw the plot onto any plotters drawing area.
    fn draw<DB: DrawingBackend>(
        &self,
        dataset: &Dataset,
        max_depth: usize,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), PlotError> {
        root.fill(&WHITE).map_err(|e| PlotError::Draw {
            message: e.to_string(),
        })?;

        let bounds = Bounds::of(dataset.points(), self.margin)?;

        let mut chart = ChartBuilder::on(root)
            .caption(plot_title(max_depth), ("sans-serif", 22))
            .margin(10)
            .build_cartesian_2d(bounds.x_min..bounds.x_max, bounds.y_min..bounds.y_max)
            .map_err(|e| PlotError::Draw {
                message: e.to_string(),
            })?;
        // No mesh: ticks and tick labels are deliberately suppressed.

        if max_depth > 0 {
            let grid = Grid::over(bounds, self.step)?;
            let forest = ForestConfig::new(self.n_trees)?
                .with_max_depth(Some(max_depth))
                .with_seed(self.forest_seed)
                .fit(&dataset.feature_rows(), dataset.labels())?;
            let surface = ProbabilitySurface::evaluate(&forest, grid)?;

            debug!(
                max_depth,
                n_cells = grid.len(),
                "drawing probability contour"
            );
            chart
                .draw_series((0..grid.n_rows()).flat_map(|row| {
                    (0..grid.n_cols()).map(move |col| (col, row))
                }).map(|(col, row)| {
                    let (r, g, b) = blend_over_white(
                        diverging_red_blue(surface.value_at(col, row)),
                        CONTOUR_ALPHA,
                    );
                    let x = grid.x(col);
                    let y = grid.y(row);
                    Rectangle::new(
                        [(x, y), (x + self.step, y + self.step)],
                        RGBColor(r, g, b).filled(),
                    )
                }))
                .map_err(|e| PlotError::Draw {
                    message: e.to_string(),
                })?;
        }

        chart
            .draw_series(dataset.points().iter().zip(dataset.labels()).map(
                |(&[x, y], &label)| {
                    let color = if label == 0 { CLASS_0 } else { CLASS_1 };
                    Circle::new((x, y), MARKER_RADIUS, color.filled())
                },
            ))
            .map_err(|e| PlotError::Draw {
                message: e.to_string(),
            })?;

        Ok(())
    }
}

impl Default for BoundaryPlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{BoundaryPlot, plot_title};
    use arbor_data::demo_blobs;

    #[test]
    fn title_for_zero_depth_is_data_set() {
        assert_eq!(plot_title(0), "data set");
    }

    #[test]
    fn title_names_the_depth() {
        assert_eq!(plot_title(1), "max_depth = 1");
        assert_eq!(plot_title(8), "max_depth = 8");
    }

    /// Fraction of exactly-white pixels in an RGB buffer.
    fn white_fraction(buffer: &[u8]) -> f64 {
        let white = buffer
            .chunks_exact(3)
            .filter(|&px| px == [255, 255, 255])
            .count();
        white as f64 / (buffer.len() / 3) as f64
    }

    fn has_pixel(buffer: &[u8], rgb: (u8, u8, u8)) -> bool {
        buffer
            .chunks_exact(3)
            .any(|px| px == [rgb.0, rgb.1, rgb.2])
    }

    #[test]
    fn defaults_match_the_demo_contract() {
        let plot = BoundaryPlot::new();
        assert_eq!(plot.step, 0.02);
        assert_eq!(plot.margin, 0.5);
        assert_eq!(plot.n_trees, 20);
        assert_eq!(plot.forest_seed, 1);
    }

    #[test]
    fn depth_zero_plots_data_only() {
        let dataset = demo_blobs();
        // Coarse step keeps the test fast; depth 0 never builds the grid anyway.
        let plot = BoundaryPlot::new().with_step(0.1);
        let (buffer, (w, h)) = plot.render_to_rgb(&dataset, 0).unwrap();
        assert_eq!(buffer.len(), (w * h * 3) as usize);

        // Mostly background, with both scatter colors present.
        assert!(white_fraction(&buffer) > 0.8, "contour drawn at depth 0?");
        assert!(has_pixel(&buffer, (31, 119, 180)), "no class-0 marker");
        assert!(has_pixel(&buffer, (214, 39, 40)), "no class-1 marker");
    }

    #[test]
    fn depth_one_draws_a_contour_layer() {
        let dataset = demo_blobs();
        let plot = BoundaryPlot::new().with_step(0.1);
        let (plain, _) = plot.render_to_rgb(&dataset, 0).unwrap();
        let (contoured, _) = plot.render_to_rgb(&dataset, 1).unwrap();

        assert_ne!(plain, contoured);
        // The tinted cells leave little pure white inside the plot area.
        assert!(white_fraction(&contoured) < 0.5, "no contour layer drawn");
    }

    #[test]
    fn rerender_is_byte_identical() {
        let dataset = demo_blobs();
        let plot = BoundaryPlot::new().with_step(0.1);
        let (a, _) = plot.render_to_rgb(&dataset, 3).unwrap();
        let (b, _) = plot.render_to_rgb(&dataset, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn custom_size_is_respected() {
        let dataset = demo_blobs();
        let plot = BoundaryPlot::new().with_step(0.1).with_size(320, 240);
        let (buffer, (w, h)) = plot.render_to_rgb(&dataset, 0).unwrap();
        assert_eq!((w, h), (320, 240));
        assert_eq!(buffer.len(), 320 * 240 * 3);
    }
}
