//! # posekit
//!
//! Axis-angle rotations, rigid-body poses and the small dense matrix algebra behind them.
//!
//! ```rust
//! use posekit::lie::Pose;
//!
//! let pose = Pose::new([1.0, 2.0, 3.0, 0.0, 0.0, 0.5]);
//! let m = pose.transform_matrix();
//! assert_eq!(m.shape(), (4, 4));
//! ```

#[doc(inline)]
pub use posekit_linalg as linalg;

#[doc(inline)]
pub use posekit_lie as lie;
