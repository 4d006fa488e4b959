/// An error type for matrix operations.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum LinalgError {
    /// The operation is only defined for square matrices.
    #[error("Matrix must be square, got {rows}x{cols}")]
    NotSquare {
        /// Number of rows of the offending matrix
        rows: usize,
        /// Number of columns of the offending matrix
        cols: usize,
    },

    /// The matrix dimensions are incompatible with the requested operation.
    ///
    /// Raised by matrix multiplication with disagreeing inner dimensions, elementwise
    /// operations on matrices of different shapes, and rigid-transform inversion on
    /// anything other than a 4x4 matrix.
    #[error("Dimension mismatch: {message}. Expected shape: {expected}, got: {actual}")]
    DimensionMismatch {
        /// Human-readable description of the mismatch
        message: String,
        /// Expected shape description
        expected: String,
        /// Actual shape description
        actual: String,
    },

    /// The matrix is numerically singular and cannot be inverted.
    #[error("Matrix is singular (determinant {0:e})")]
    Singular(f64),

    /// The data buffer does not match the requested shape.
    #[error("Shape mismatch: expected {expected} elements for shape, but got {actual} elements in data")]
    InvalidShape {
        /// Expected number of elements based on shape
        expected: usize,
        /// Actual number of elements in the data
        actual: usize,
    },

    /// Index exceeds the matrix bounds.
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index that was attempted
        index: usize,
        /// The size of the dimension being indexed
        size: usize,
    },
}
