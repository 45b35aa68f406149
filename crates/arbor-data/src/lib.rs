//! Synthetic 2-D classification datasets for decision boundary demos.
//!
//! Provides seeded Gaussian blob sampling around fixed cluster centers and
//! the two-cluster teaching dataset used by the boundary plotter.

mod blobs;
mod dataset;
mod error;

pub use blobs::{BlobConfig, demo_blobs};
pub use dataset::Dataset;
pub use error::DataError;
