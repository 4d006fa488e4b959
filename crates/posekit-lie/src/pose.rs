use std::fmt;
use std::ops::Sub;

use approx::{AbsDiffEq, RelativeEq};
use glam::DVec3;
use posekit_linalg::{is_close, LinalgError, Matrix, EQ_TOLERANCE};

use crate::axis_angle::AxisAngle;
use crate::error::LieError;

/// A rigid-body transform `p -> R * p + t` stored as `[tx, ty, tz, rx, ry, rz]`,
/// where `(rx, ry, rz)` is a rotation vector.
///
/// Equality is tolerant: elements match when `|a - b| <= 1e-13 + 1e-13 * |b|`.
///
/// Example:
///
/// ```
/// use posekit_lie::Pose;
///
/// let pose = Pose::new([1.0, 2.0, 3.0, 0.1, -0.2, 0.3]);
/// let round_trip = pose.trans(&pose.invert().unwrap()).unwrap();
/// assert!(round_trip.as_array().iter().all(|v| v.abs() < 1e-10));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Pose {
    data: [f64; 6],
}

impl Pose {
    /// The identity transform.
    pub const IDENTITY: Self = Self { data: [0.0; 6] };

    /// Create a pose from `[tx, ty, tz, rx, ry, rz]`.
    pub const fn new(data: [f64; 6]) -> Self {
        Self { data }
    }

    /// Create a pose from a translation and a rotation vector.
    pub fn from_parts(translation: DVec3, rotation_vector: DVec3) -> Self {
        Self {
            data: [
                translation.x,
                translation.y,
                translation.z,
                rotation_vector.x,
                rotation_vector.y,
                rotation_vector.z,
            ],
        }
    }

    /// Create a pose from a slice of 6 values.
    ///
    /// # Errors
    ///
    /// Returns [`LieError::InvalidConstruction`] if the slice does not hold exactly 6 values.
    pub fn from_slice(data: &[f64]) -> Result<Self, LieError> {
        let data: [f64; 6] = data.try_into().map_err(|_| {
            LieError::InvalidConstruction(format!("pose needs 6 elements, got {}", data.len()))
        })?;
        Ok(Self { data })
    }

    /// Create a pose from a 4x4 homogeneous transform.
    ///
    /// The rotation block goes through [`AxisAngle::from_rotation_matrix`] and carries the
    /// same precondition: it must be a valid rotation. The bottom row is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`LieError::Linalg`] if the matrix is not 4x4.
    pub fn from_matrix(matrix: &Matrix) -> Result<Self, LieError> {
        if matrix.shape() != (4, 4) {
            return Err(LinalgError::DimensionMismatch {
                message: "pose matrix must be homogeneous".to_string(),
                expected: "(4, 4)".to_string(),
                actual: format!("{:?}", matrix.shape()),
            }
            .into());
        }
        let rotation = AxisAngle::from_rotation_matrix(&matrix.sub_matrix(0, 3, 0, 3)?)?;
        let translation = DVec3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)]);
        Ok(Self::from_parts(translation, rotation.rotation_vector()))
    }

    /// The rotation vector `[rx, ry, rz]`.
    #[inline]
    pub fn rotation_vector(&self) -> DVec3 {
        DVec3::new(self.data[3], self.data[4], self.data[5])
    }

    /// The translation `[tx, ty, tz]`.
    #[inline]
    pub fn translation_vector(&self) -> DVec3 {
        DVec3::new(self.data[0], self.data[1], self.data[2])
    }

    /// The pose as `[tx, ty, tz, rx, ry, rz]`.
    #[inline]
    pub fn as_array(&self) -> [f64; 6] {
        self.data
    }

    /// The rotation part.
    pub fn rotation(&self) -> AxisAngle {
        AxisAngle::from_rotation_vector(self.rotation_vector())
    }

    /// The 4x4 homogeneous matrix `[[R, t], [0, 0, 0, 1]]`.
    pub fn transform_matrix(&self) -> Matrix {
        let rotation = self.rotation();
        let r = rotation.rotation_matrix();
        let t = self.translation_vector();
        Matrix::from([
            [r[(0, 0)], r[(0, 1)], r[(0, 2)], t.x],
            [r[(1, 0)], r[(1, 1)], r[(1, 2)], t.y],
            [r[(2, 0)], r[(2, 1)], r[(2, 2)], t.z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// The inverse transform, so that `self.trans(&self.invert()?)` is the identity.
    ///
    /// # Errors
    ///
    /// Returns [`LieError::Linalg`] if the rotation block is singular.
    pub fn invert(&self) -> Result<Pose, LieError> {
        let inv = self.transform_matrix().invert_transformation()?;
        Self::from_matrix(&inv)
    }

    /// Compose with `other`: apply `other` first, then `self`.
    ///
    /// Composition is associative but not commutative.
    ///
    /// # Errors
    ///
    /// Returns [`LieError::Linalg`] if the product cannot be decomposed.
    pub fn trans(&self, other: &Pose) -> Result<Pose, LieError> {
        let product = self
            .transform_matrix()
            .multiply(&other.transform_matrix())?;
        Self::from_matrix(&product)
    }

    /// Apply the transform to a point: `R * p + t`.
    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.rotation().rotate(point) + self.translation_vector()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f64; 6]> for Pose {
    fn from(data: [f64; 6]) -> Self {
        Self::new(data)
    }
}

impl PartialEq for Pose {
    fn eq(&self, other: &Self) -> bool {
        self.data
            .iter()
            .zip(&other.data)
            .all(|(a, b)| is_close(*a, *b, EQ_TOLERANCE, EQ_TOLERANCE))
    }
}

impl Sub for Pose {
    type Output = [f64; 6];

    /// Elementwise difference of the 6-vectors.
    fn sub(self, rhs: Self) -> Self::Output {
        std::array::from_fn(|i| self.data[i] - rhs.data[i])
    }
}

impl AbsDiffEq for Pose {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.data[..].abs_diff_eq(&other.data[..], epsilon)
    }
}

impl RelativeEq for Pose {
    fn default_max_relative() -> Self::Epsilon {
        f64::EPSILON
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.data[..].relative_eq(&other.data[..], epsilon, max_relative)
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [tx, ty, tz, rx, ry, rz] = self.data;
        write!(f, "Pose(t: [{tx}, {ty}, {tz}], r: [{rx}, {ry}, {rz}])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    const EPSILON: f64 = 1e-10;

    #[test]
    fn test_identity() {
        let pose = Pose::IDENTITY;
        assert_eq!(pose.transform_matrix(), Matrix::identity(4));
        assert_eq!(pose, Pose::default());
    }

    #[test]
    fn test_accessors() {
        let pose = Pose::new([1.0, 2.0, 3.0, 0.1, 0.2, 0.3]);
        assert_eq!(pose.translation_vector(), DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(pose.rotation_vector(), DVec3::new(0.1, 0.2, 0.3));
        assert_eq!(
            Pose::from_parts(DVec3::new(1.0, 2.0, 3.0), DVec3::new(0.1, 0.2, 0.3)),
            pose
        );
    }

    #[test]
    fn test_from_slice() -> Result<(), LieError> {
        let pose = Pose::from_slice(&[1.0, 2.0, 3.0, 0.0, 0.0, 0.5])?;
        assert_eq!(pose.as_array(), [1.0, 2.0, 3.0, 0.0, 0.0, 0.5]);
        assert!(matches!(
            Pose::from_slice(&[1.0, 2.0]),
            Err(LieError::InvalidConstruction(_))
        ));
        Ok(())
    }

    #[test]
    fn test_transform_matrix() {
        let pose = Pose::new([1.0, 2.0, 3.0, 0.0, 0.0, FRAC_PI_2]);
        let expected = Matrix::from([
            [0.0, -1.0, 0.0, 1.0],
            [1.0, 0.0, 0.0, 2.0],
            [0.0, 0.0, 1.0, 3.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let m = pose.transform_matrix();
        assert_relative_eq!(m, expected, epsilon = EPSILON);
        assert!(m.is_rigid_transform(EPSILON));
    }

    #[test]
    fn test_from_matrix() -> Result<(), LieError> {
        let m = Matrix::from([
            [0.0, -1.0, 0.0, 1.0],
            [1.0, 0.0, 0.0, 2.0],
            [0.0, 0.0, 1.0, 3.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let pose = Pose::from_matrix(&m)?;
        assert_relative_eq!(
            pose,
            Pose::new([1.0, 2.0, 3.0, 0.0, 0.0, FRAC_PI_2]),
            epsilon = EPSILON
        );

        assert!(matches!(
            Pose::from_matrix(&Matrix::identity(3)),
            Err(LieError::Linalg(LinalgError::DimensionMismatch { .. }))
        ));
        Ok(())
    }

    #[test]
    fn test_invert_translation() -> Result<(), LieError> {
        let pose = Pose::new([1.0, -2.0, 0.5, 0.0, 0.0, 0.0]);
        let inv = pose.invert()?;
        assert_eq!(inv, Pose::new([-1.0, 2.0, -0.5, 0.0, 0.0, 0.0]));
        Ok(())
    }

    #[test]
    fn test_invert_rotation() -> Result<(), LieError> {
        let pose = Pose::new([1.0, 2.0, 3.0, 0.0, 0.0, FRAC_PI_2]);
        let inv = pose.invert()?;
        assert_relative_eq!(
            inv,
            Pose::new([-2.0, 1.0, -3.0, 0.0, 0.0, -FRAC_PI_2]),
            epsilon = EPSILON
        );
        Ok(())
    }

    #[test]
    fn test_trans_inverse_is_identity() -> Result<(), LieError> {
        let pose = Pose::new([0.4, -1.3, 2.2, 0.3, -0.9, 0.6]);
        let id = pose.trans(&pose.invert()?)?;
        assert_relative_eq!(id, Pose::IDENTITY, epsilon = EPSILON);
        let id = pose.invert()?.trans(&pose)?;
        assert_relative_eq!(id, Pose::IDENTITY, epsilon = EPSILON);
        Ok(())
    }

    #[test]
    fn test_trans_translations() -> Result<(), LieError> {
        let a = Pose::new([1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let b = Pose::new([0.0, 2.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(a.trans(&b)?, Pose::new([1.0, 2.0, 0.0, 0.0, 0.0, 0.0]));
        Ok(())
    }

    #[test]
    fn test_trans_not_commutative() -> Result<(), LieError> {
        let rot = Pose::new([0.0, 0.0, 0.0, 0.0, 0.0, FRAC_PI_2]);
        let shift = Pose::new([1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

        // shift in the rotated frame
        let ab = rot.trans(&shift)?;
        assert_relative_eq!(
            ab,
            Pose::new([0.0, 1.0, 0.0, 0.0, 0.0, FRAC_PI_2]),
            epsilon = EPSILON
        );

        let ba = shift.trans(&rot)?;
        assert_relative_eq!(
            ba,
            Pose::new([1.0, 0.0, 0.0, 0.0, 0.0, FRAC_PI_2]),
            epsilon = EPSILON
        );
        Ok(())
    }

    #[test]
    fn test_trans_half_turns() -> Result<(), LieError> {
        let a = Pose::new([0.0, 0.0, 0.0, FRAC_PI_2, 0.0, 0.0]);
        let half = a.trans(&a)?;
        assert_relative_eq!(half.rotation_vector().x, PI, epsilon = EPSILON);
        assert_relative_eq!(half.rotation_vector().y, 0.0, epsilon = EPSILON);
        assert_relative_eq!(half.rotation_vector().z, 0.0, epsilon = EPSILON);
        Ok(())
    }

    #[test]
    fn test_transform_point() -> Result<(), LieError> {
        let pose = Pose::new([1.0, 2.0, 3.0, 0.0, 0.0, FRAC_PI_2]);
        let p = pose.transform_point(DVec3::new(1.0, 0.0, 0.0));
        assert!((p - DVec3::new(1.0, 3.0, 3.0)).length() < EPSILON);

        let back = pose.invert()?.transform_point(p);
        assert!((back - DVec3::X).length() < EPSILON);
        Ok(())
    }

    #[test]
    fn test_sub() {
        let a = Pose::new([1.0, 2.0, 3.0, 0.1, 0.2, 0.3]);
        let b = Pose::new([0.5, 0.5, 0.5, 0.1, 0.1, 0.1]);
        let diff = a - b;
        assert_relative_eq!(diff[..], [0.5, 1.5, 2.5, 0.0, 0.1, 0.2][..], epsilon = 1e-15);
    }

    #[test]
    fn test_tolerant_eq() {
        let a = Pose::new([1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(a, Pose::new([1.0 + 1e-14, 1e-14, 0.0, 0.0, 0.0, 0.0]));
        assert_ne!(a, Pose::new([1.0, 1e-9, 0.0, 0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_display() {
        let pose = Pose::new([1.0, 2.0, 3.0, 0.5, 0.0, -0.5]);
        assert_eq!(pose.to_string(), "Pose(t: [1, 2, 3], r: [0.5, 0, -0.5])");
    }
}
