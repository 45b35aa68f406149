use arbor_rf::ForestError;

/// Errors from boundary plot construction and rendering.
#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    /// Returned when the dataset to plot has no points.
    #[error("cannot plot an empty dataset")]
    EmptyDataset,

    /// Returned when the bounding box margin is negative, NaN, or infinite.
    #[error("margin must be a non-negative finite value, got {margin}")]
    InvalidMargin {
        /// The invalid margin value provided.
        margin: f64,
    },

    /// Returned when the grid step is zero, negative, NaN, or infinite.
    #[error("grid step must be a positive finite value, got {step}")]
    InvalidStep {
        /// The invalid step value provided.
        step: f64,
    },

    /// Returned when classifier training or prediction fails.
    #[error("classifier error")]
    Forest(#[from] ForestError),

    /// Returned when the plotters backend fails to draw.
    ///
    /// Backend errors are generic over the backend type, so only the
    /// rendered message is carried.
    #[error("drawing failed: {message}")]
    Draw {
        /// The backend error, rendered to a string.
        message: String,
    },
}
