//! # Axis-angle rotations
//!
//! A rotation in 3D can be written as a unit axis and an angle around it. Scaling the
//! axis by the angle gives the *rotation vector*, a compact 3-element encoding, and
//! Rodrigues' formula turns either form into a 3x3 rotation matrix.
//!
//! [`AxisAngle`] is built from exactly one of the three representations and derives
//! the others on first request.
//!
//! ## Matrix extraction
//!
//! Recovering the axis from a rotation matrix divides by `sin(angle)`, which vanishes at
//! 0 and 180 degrees. Both cases show up as a (nearly) symmetric matrix and are handled
//! separately:
//!
//! - symmetric and close to the identity: angle 0, axis `(1, 0, 0)`.
//! - symmetric otherwise: angle pi, axis read from the diagonal, normalized against the
//!   largest diagonal term.

use std::f64::consts::{FRAC_1_SQRT_2, PI, TAU};
use std::sync::OnceLock;

use glam::DVec3;
use posekit_linalg::{LinalgError, Matrix};

use crate::error::LieError;

/// Off-diagonal asymmetry below which a rotation matrix is treated as singular (0 or 180 degrees).
pub const SYMMETRY_EPSILON: f64 = 0.01;

/// Tolerance separating the identity from a 180 degree rotation among singular matrices.
pub const IDENTITY_EPSILON: f64 = 0.1;

/// Normalizers below this value are clamped to 1 in the general extraction branch.
pub const AXIS_NORM_CLAMP: f64 = 0.001;

/// A rotation stored as a unit axis and an angle in radians.
///
/// The rotation vector and rotation matrix are derived lazily and memoized; the value
/// itself is never mutated after construction, so it can be shared freely across threads.
///
/// Example:
///
/// ```
/// use glam::DVec3;
/// use posekit_lie::AxisAngle;
///
/// let rot = AxisAngle::from_rotation_vector(DVec3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2));
/// let p = rot.rotate(DVec3::X);
/// assert!((p - DVec3::Y).length() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct AxisAngle {
    axis: DVec3,
    angle: f64,
    rotation_vector: OnceLock<DVec3>,
    rotation_matrix: OnceLock<Matrix>,
}

impl AxisAngle {
    /// The identity rotation.
    pub fn identity() -> Self {
        Self::from_components(DVec3::X, 0.0)
    }

    fn from_components(axis: DVec3, angle: f64) -> Self {
        Self {
            axis,
            angle,
            rotation_vector: OnceLock::new(),
            rotation_matrix: OnceLock::new(),
        }
    }

    /// Create a rotation of `angle` radians around `axis`.
    ///
    /// The axis is normalized and the angle wrapped into `[0, pi]`, flipping the axis
    /// where needed, so `(-z, pi / 2)` and `(z, 3 * pi / 2)` give the same value.
    ///
    /// # Errors
    ///
    /// Returns [`LieError::InvalidConstruction`] if the axis is zero or either input is not finite.
    pub fn from_axis_angle(axis: DVec3, angle: f64) -> Result<Self, LieError> {
        if !axis.is_finite() || !angle.is_finite() {
            return Err(LieError::InvalidConstruction(format!(
                "axis {axis} and angle {angle} must be finite"
            )));
        }
        let norm = axis.length();
        if norm == 0.0 {
            return Err(LieError::InvalidConstruction(
                "rotation axis must be non-zero".to_string(),
            ));
        }
        let mut axis = axis / norm;
        let mut angle = angle.rem_euclid(TAU);
        if angle > PI {
            angle = TAU - angle;
            axis = -axis;
        }
        Ok(Self::from_components(axis, angle))
    }

    /// Create a rotation from a rotation vector (axis scaled by angle).
    ///
    /// The zero vector gives the identity with the axis defaulting to `(1, 0, 0)`.
    pub fn from_rotation_vector(rotation_vector: DVec3) -> Self {
        let angle = rotation_vector.length();
        let axis = if angle == 0.0 {
            DVec3::X
        } else {
            rotation_vector / angle
        };
        let out = Self::from_components(axis, angle);
        let _ = out.rotation_vector.set(rotation_vector);
        out
    }

    /// Create a rotation from a rotation vector given as a slice of 3 values.
    ///
    /// # Errors
    ///
    /// Returns [`LieError::InvalidConstruction`] if the slice does not hold exactly 3 values.
    pub fn from_slice(rotation_vector: &[f64]) -> Result<Self, LieError> {
        match rotation_vector {
            [x, y, z] => Ok(Self::from_rotation_vector(DVec3::new(*x, *y, *z))),
            _ => Err(LieError::InvalidConstruction(format!(
                "rotation vector needs 3 elements, got {}",
                rotation_vector.len()
            ))),
        }
    }

    /// Create a rotation from a 3x3 rotation matrix.
    ///
    /// PRECONDITION: the matrix is orthonormal with determinant +1. This is not checked;
    /// see [`Matrix::is_rotation`].
    ///
    /// # Errors
    ///
    /// Returns [`LieError::Linalg`] if the matrix is not 3x3.
    pub fn from_rotation_matrix(rotation_matrix: &Matrix) -> Result<Self, LieError> {
        if rotation_matrix.shape() != (3, 3) {
            return Err(LinalgError::DimensionMismatch {
                message: "rotation matrix must be 3x3".to_string(),
                expected: "(3, 3)".to_string(),
                actual: format!("{:?}", rotation_matrix.shape()),
            }
            .into());
        }
        let (axis, angle) = components_from_matrix(rotation_matrix);
        let out = Self::from_components(axis, angle);
        let _ = out.rotation_matrix.set(rotation_matrix.clone());
        Ok(out)
    }

    /// The unit rotation axis.
    #[inline]
    pub fn axis(&self) -> DVec3 {
        self.axis
    }

    /// The rotation angle in radians.
    #[inline]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// The rotation vector `axis * angle`.
    pub fn rotation_vector(&self) -> DVec3 {
        *self
            .rotation_vector
            .get_or_init(|| self.axis * self.angle)
    }

    /// The 3x3 rotation matrix, from Rodrigues' formula.
    pub fn rotation_matrix(&self) -> &Matrix {
        self.rotation_matrix
            .get_or_init(|| rodrigues(self.axis, self.angle))
    }

    /// Rotate a point.
    pub fn rotate(&self, point: DVec3) -> DVec3 {
        let r = self.rotation_matrix();
        DVec3::new(
            r[(0, 0)] * point.x + r[(0, 1)] * point.y + r[(0, 2)] * point.z,
            r[(1, 0)] * point.x + r[(1, 1)] * point.y + r[(1, 2)] * point.z,
            r[(2, 0)] * point.x + r[(2, 1)] * point.y + r[(2, 2)] * point.z,
        )
    }
}

fn rodrigues(axis: DVec3, angle: f64) -> Matrix {
    if angle == 0.0 {
        return Matrix::identity(3);
    }
    let (s, c) = angle.sin_cos();
    let t = 1.0 - c;
    let DVec3 { x, y, z } = axis;

    Matrix::from([
        [c + x * x * t, x * y * t - z * s, x * z * t + y * s],
        [x * y * t + z * s, c + y * y * t, y * z * t - x * s],
        [x * z * t - y * s, y * z * t + x * s, c + z * z * t],
    ])
}

fn components_from_matrix(m: &Matrix) -> (DVec3, f64) {
    let r = |i: usize, j: usize| m[(i, j)];

    let symmetric = (r(0, 1) - r(1, 0)).abs() < SYMMETRY_EPSILON
        && (r(0, 2) - r(2, 0)).abs() < SYMMETRY_EPSILON
        && (r(1, 2) - r(2, 1)).abs() < SYMMETRY_EPSILON;

    if symmetric {
        let trace = r(0, 0) + r(1, 1) + r(2, 2);
        let identity = (r(0, 1) + r(1, 0)).abs() < IDENTITY_EPSILON
            && (r(0, 2) + r(2, 0)).abs() < IDENTITY_EPSILON
            && (r(1, 2) + r(2, 1)).abs() < IDENTITY_EPSILON
            && (trace - 3.0).abs() < IDENTITY_EPSILON;
        if identity {
            log::debug!("rotation matrix is the identity");
            return (DVec3::X, 0.0);
        }

        log::debug!("rotation matrix is a 180 degree rotation");
        return (half_turn_axis(m), PI);
    }

    let dx = r(2, 1) - r(1, 2);
    let dy = r(0, 2) - r(2, 0);
    let dz = r(1, 0) - r(0, 1);
    let mut s = (dx * dx + dy * dy + dz * dz).sqrt();
    if s.abs() < AXIS_NORM_CLAMP {
        log::warn!("axis normalizer {s:e} too small, clamping to 1");
        s = 1.0;
    }
    let cos_angle = ((r(0, 0) + r(1, 1) + r(2, 2) - 1.0) / 2.0).clamp(-1.0, 1.0);

    (DVec3::new(dx / s, dy / s, dz / s), cos_angle.acos())
}

// For a 180 degree rotation R = 2 a a^T - I, so the diagonal holds the squared axis
// components and the off-diagonal terms their pairwise products.
fn half_turn_axis(m: &Matrix) -> DVec3 {
    let xx = (m[(0, 0)] + 1.0) / 2.0;
    let yy = (m[(1, 1)] + 1.0) / 2.0;
    let zz = (m[(2, 2)] + 1.0) / 2.0;
    let xy = (m[(0, 1)] + m[(1, 0)]) / 4.0;
    let xz = (m[(0, 2)] + m[(2, 0)]) / 4.0;
    let yz = (m[(1, 2)] + m[(2, 1)]) / 4.0;

    if xx >= yy && xx >= zz {
        if xx < SYMMETRY_EPSILON {
            return DVec3::new(0.0, FRAC_1_SQRT_2, FRAC_1_SQRT_2);
        }
        let x = xx.sqrt();
        DVec3::new(x, xy / x, xz / x)
    } else if yy >= zz {
        if yy < SYMMETRY_EPSILON {
            return DVec3::new(FRAC_1_SQRT_2, 0.0, FRAC_1_SQRT_2);
        }
        let y = yy.sqrt();
        DVec3::new(xy / y, y, yz / y)
    } else {
        if zz < SYMMETRY_EPSILON {
            return DVec3::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0);
        }
        let z = zz.sqrt();
        DVec3::new(xz / z, yz / z, z)
    }
}
