#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # posekit linalg
//!
//! A small dense matrix type with just the algebra needed for rigid-body math:
//! determinant, inverse, block extraction, products, reduced row-echelon form and
//! the specialized inverse of a 4x4 homogeneous rigid transform.
//!
//! ## Example
//!
//! ```rust
//! use posekit_linalg::Matrix;
//!
//! let t = Matrix::from([
//!     [1.0, 0.0, 0.0, 2.0],
//!     [0.0, 1.0, 0.0, 0.0],
//!     [0.0, 0.0, 1.0, 0.0],
//!     [0.0, 0.0, 0.0, 1.0],
//! ]);
//! let t_inv = t.invert_transformation().unwrap();
//! assert_eq!(t_inv[(0, 3)], -2.0);
//! ```

/// Error types for the linalg module.
pub mod error;

/// Dense row-major matrix.
pub mod matrix;

pub use error::LinalgError;
pub use matrix::{is_close, Matrix, EQ_TOLERANCE, RREF_PIVOT_EPSILON};
