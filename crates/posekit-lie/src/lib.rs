#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # posekit lie
//!
//! Rotations in axis-angle form and 6-DoF rigid-body poses built on top of them.
//!
//! - [`AxisAngle`]: conversion between axis + angle, rotation vectors and 3x3 rotation matrices.
//! - [`Pose`]: an SE(3) transform stored as translation + rotation vector, composed and
//!   inverted through 4x4 homogeneous matrices.
//!
//! ## Example
//!
//! ```rust
//! use posekit_lie::Pose;
//!
//! let a = Pose::new([1.0, 0.0, 0.0, 0.0, 0.0, std::f64::consts::FRAC_PI_2]);
//! let b = Pose::new([0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
//!
//! // apply `b` in the frame of `a`
//! let ab = a.trans(&b).unwrap();
//! assert!((ab.translation_vector().x - 0.0).abs() < 1e-12);
//! ```

/// Axis-angle rotations.
pub mod axis_angle;

/// Error types for the lie module.
pub mod error;

/// Rigid-body poses in SE(3).
pub mod pose;

pub use axis_angle::{AxisAngle, AXIS_NORM_CLAMP, IDENTITY_EPSILON, SYMMETRY_EPSILON};
pub use error::LieError;
pub use pose::Pose;
