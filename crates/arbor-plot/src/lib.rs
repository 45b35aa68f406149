//! Decision boundary rendering for the blob classification demo.
//!
//! Turns a dataset and a depth cap into a filled-contour image of the
//! forest's class-1 probability surface with the training points scattered
//! on top: bounding box (+margin) → evaluation grid → probability surface →
//! per-cell filled contour → scatter overlay. Renders to a PNG file or an
//! in-memory RGB buffer via plotters.

mod colormap;
mod error;
mod grid;
mod render;
mod surface;

pub use colormap::{blend_over_white, diverging_red_blue};
pub use error::PlotError;
pub use grid::{Bounds, Grid};
pub use render::{BoundaryPlot, plot_title};
pub use surface::ProbabilitySurface;
