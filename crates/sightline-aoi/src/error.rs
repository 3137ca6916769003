//! Index error types.

/// Errors returned when configuring the spatial index.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AoiError {
    /// A plane or cell dimension was zero, negative, or not finite.
    #[error("invalid {name}: {value} (must be finite and > 0)")]
    InvalidDimension {
        /// Which dimension was rejected.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The plane split into cells of the requested size needs more cells
    /// than [`MAX_GRID_CELLS`](crate::MAX_GRID_CELLS).
    #[error("grid of {columns} x {rows} cells exceeds the limit of {max} cells")]
    GridTooLarge {
        /// Cells needed along the x axis.
        columns: f64,
        /// Cells needed along the y axis.
        rows: f64,
        /// The cell limit.
        max: usize,
    },
}
