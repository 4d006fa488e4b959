use posekit_linalg::LinalgError;

/// An error type for rotation and pose operations.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum LieError {
    /// The input does not describe a valid rotation or pose.
    #[error("Invalid construction: {0}")]
    InvalidConstruction(String),

    /// Error from the underlying matrix algebra.
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}
