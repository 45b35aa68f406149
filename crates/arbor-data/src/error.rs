/// Errors from synthetic dataset generation.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Returned when no cluster centers are provided.
    #[error("at least one cluster center is required")]
    NoCenters,

    /// Returned when n_samples is zero.
    #[error("n_samples must be at least 1, got {n_samples}")]
    InvalidSampleCount {
        /// The invalid n_samples value provided.
        n_samples: usize,
    },

    /// Returned when a cluster center coordinate is NaN or infinite.
    #[error("non-finite coordinate in center {center_index}, axis {axis}")]
    NonFiniteCenter {
        /// The zero-based index of the offending center.
        center_index: usize,
        /// The axis (0 = x, 1 = y) of the offending coordinate.
        axis: usize,
    },

    /// Returned when cluster_std is zero, negative, NaN, or infinite.
    #[error("cluster_std must be a positive finite value, got {cluster_std}")]
    InvalidClusterStd {
        /// The invalid cluster_std value provided.
        cluster_std: f64,
    },
}
