use std::fmt;
use std::ops::Index;

use approx::{AbsDiffEq, RelativeEq};
use faer::prelude::SolverCore;

use crate::error::LinalgError;

/// Absolute and relative tolerance used by `PartialEq` on [`Matrix`].
pub const EQ_TOLERANCE: f64 = 1e-13;

/// Pivots with a smaller magnitude are treated as zero by [`Matrix::rref`].
pub const RREF_PIVOT_EPSILON: f64 = 1e-5;

/// Elementwise closeness test: `|a - b| <= atol + rtol * |b|`.
#[inline]
pub fn is_close(a: f64, b: f64, rtol: f64, atol: f64) -> bool {
    (a - b).abs() <= atol + rtol * b.abs()
}

/// A dense, row-major matrix of `f64` values.
///
/// Every operation returns a new matrix; a `Matrix` is never mutated once built.
///
/// Example:
///
/// ```
/// use posekit_linalg::Matrix;
///
/// let m = Matrix::from([[2.0, 0.0], [0.0, 4.0]]);
/// let inv = m.inverse().unwrap();
/// assert_eq!(inv, Matrix::from([[0.5, 0.0], [0.0, 0.25]]));
/// ```
#[derive(Debug, Clone)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Create a matrix from a row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::InvalidShape`] if `data.len() != rows * cols`.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, LinalgError> {
        if data.len() != rows * cols {
            return Err(LinalgError::InvalidShape {
                expected: rows * cols,
                actual: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Create a matrix from a list of rows.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::InvalidShape`] if the rows have different lengths.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, LinalgError> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(nrows * ncols);
        for row in rows {
            if row.len() != ncols {
                return Err(LinalgError::InvalidShape {
                    expected: ncols,
                    actual: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            rows: nrows,
            cols: ncols,
            data,
        })
    }

    /// Create a matrix of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Create the `n`x`n` identity matrix.
    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, n, |i, j| if i == j { 1.0 } else { 0.0 })
    }

    /// Create a matrix by evaluating `f(row, col)` for every element.
    pub fn from_fn(rows: usize, cols: usize, f: impl Fn(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Self { rows, cols, data }
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The shape as `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Whether the matrix has as many rows as columns.
    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// The element at `(row, col)`, or `None` if out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// The underlying row-major buffer.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Copy the matrix out as a list of rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data
            .chunks(self.cols.max(1))
            .take(self.rows)
            .map(<[f64]>::to_vec)
            .collect()
    }

    fn ensure_square(&self) -> Result<(), LinalgError> {
        if !self.is_square() {
            return Err(LinalgError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    fn ensure_same_shape(&self, other: &Matrix, op: &str) -> Result<(), LinalgError> {
        if self.shape() != other.shape() {
            return Err(LinalgError::DimensionMismatch {
                message: format!("{op} requires matrices of the same shape"),
                expected: format!("{:?}", self.shape()),
                actual: format!("{:?}", other.shape()),
            });
        }
        Ok(())
    }

    fn to_faer(&self) -> faer::Mat<f64> {
        faer::Mat::<f64>::from_fn(self.rows, self.cols, |i, j| self[(i, j)])
    }

    fn from_faer(mat: &faer::Mat<f64>) -> Self {
        Self::from_fn(mat.nrows(), mat.ncols(), |i, j| mat.read(i, j))
    }

    /// Compute the determinant.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::NotSquare`] if the matrix is not square.
    pub fn determinant(&self) -> Result<f64, LinalgError> {
        self.ensure_square()?;
        if self.rows == 0 {
            return Ok(1.0);
        }
        Ok(self.to_faer().as_ref().determinant())
    }

    /// Compute the inverse using an LU decomposition with partial pivoting.
    ///
    /// A matrix is considered singular when its determinant is not finite or its
    /// magnitude falls below `f64::EPSILON` times the Hadamard bound `prod_i ||row_i||`.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::NotSquare`] if the matrix is not square and
    /// [`LinalgError::Singular`] if it cannot be inverted.
    pub fn inverse(&self) -> Result<Matrix, LinalgError> {
        let det = self.determinant()?;
        // |det| <= prod ||row_i||, so the ratio is scale invariant
        let hadamard: f64 = self
            .data
            .chunks(self.cols.max(1))
            .map(|row| row.iter().map(|v| v * v).sum::<f64>().sqrt())
            .product();
        let threshold = f64::EPSILON * hadamard;
        if !det.is_finite() || det.abs() <= threshold {
            return Err(LinalgError::Singular(det));
        }

        let inv = Self::from_faer(&self.to_faer().as_ref().partial_piv_lu().inverse());
        if inv.data.iter().any(|v| !v.is_finite()) {
            return Err(LinalgError::Singular(det));
        }
        Ok(inv)
    }

    /// Extract the half-open block `[row_start, row_end) x [col_start, col_end)`.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::IndexOutOfBounds`] if the block does not fit in the matrix.
    pub fn sub_matrix(
        &self,
        row_start: usize,
        row_end: usize,
        col_start: usize,
        col_end: usize,
    ) -> Result<Matrix, LinalgError> {
        if row_end > self.rows || row_start > row_end {
            return Err(LinalgError::IndexOutOfBounds {
                index: row_end.max(row_start),
                size: self.rows,
            });
        }
        if col_end > self.cols || col_start > col_end {
            return Err(LinalgError::IndexOutOfBounds {
                index: col_end.max(col_start),
                size: self.cols,
            });
        }
        Ok(Self::from_fn(
            row_end - row_start,
            col_end - col_start,
            |i, j| self[(row_start + i, col_start + j)],
        ))
    }

    /// The `(n-1)`x`(n-1)` matrix left after deleting `row` and `col`.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::NotSquare`] for non-square input and
    /// [`LinalgError::IndexOutOfBounds`] for invalid indices.
    pub fn minor(&self, row: usize, col: usize) -> Result<Matrix, LinalgError> {
        self.ensure_square()?;
        if row >= self.rows {
            return Err(LinalgError::IndexOutOfBounds {
                index: row,
                size: self.rows,
            });
        }
        if col >= self.cols {
            return Err(LinalgError::IndexOutOfBounds {
                index: col,
                size: self.cols,
            });
        }
        let n = self.rows - 1;
        Ok(Self::from_fn(n, n, |i, j| {
            let src_i = if i < row { i } else { i + 1 };
            let src_j = if j < col { j } else { j + 1 };
            self[(src_i, src_j)]
        }))
    }

    /// Invert a 4x4 rigid homogeneous transform.
    ///
    /// ```text
    /// |   R   | T |    |  R^-1 | -(R^-1)*T |
    /// |-------+---| -> |-------+-----------|
    /// | 0 0 0 | 1 |    | 0 0 0 |     1     |
    /// ```
    ///
    /// PRECONDITION: the top-left block is a rotation and the bottom row is `[0, 0, 0, 1]`.
    /// Neither is verified; use [`Matrix::is_rigid_transform`] to check beforehand.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::DimensionMismatch`] if the matrix is not 4x4, or
    /// [`LinalgError::Singular`] if the rotation block cannot be inverted.
    pub fn invert_transformation(&self) -> Result<Matrix, LinalgError> {
        if self.shape() != (4, 4) {
            return Err(LinalgError::DimensionMismatch {
                message: "rigid transform inversion requires a homogeneous matrix".to_string(),
                expected: "(4, 4)".to_string(),
                actual: format!("{:?}", self.shape()),
            });
        }
        let r_mat = self.sub_matrix(0, 3, 0, 3)?;
        let t_mat = self.sub_matrix(0, 3, 3, 4)?;

        let r_inv = r_mat.inverse()?;
        let t_inv = r_inv.multiply(&t_mat)?.negate();

        Ok(Self::from_fn(4, 4, |i, j| match (i, j) {
            (3, 3) => 1.0,
            (3, _) => 0.0,
            (_, 3) => t_inv[(i, 0)],
            _ => r_inv[(i, j)],
        }))
    }

    /// Matrix product `self * other`.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::DimensionMismatch`] if `self.cols() != other.rows()`.
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix, LinalgError> {
        if self.cols != other.rows {
            return Err(LinalgError::DimensionMismatch {
                message: "inner dimensions of the product must agree".to_string(),
                expected: format!("({}, _)", self.cols),
                actual: format!("{:?}", other.shape()),
            });
        }
        let product = self.to_faer() * other.to_faer();
        Ok(Self::from_faer(&product))
    }

    /// Elementwise sum.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::DimensionMismatch`] if the shapes differ.
    pub fn add(&self, other: &Matrix) -> Result<Matrix, LinalgError> {
        self.ensure_same_shape(other, "add")?;
        let data = self.data.iter().zip(&other.data).map(|(a, b)| a + b);
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            data: data.collect(),
        })
    }

    /// Elementwise difference.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::DimensionMismatch`] if the shapes differ.
    pub fn sub(&self, other: &Matrix) -> Result<Matrix, LinalgError> {
        self.ensure_same_shape(other, "sub")?;
        let data = self.data.iter().zip(&other.data).map(|(a, b)| a - b);
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            data: data.collect(),
        })
    }

    /// Elementwise negation.
    pub fn negate(&self) -> Matrix {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|v| -v).collect(),
        }
    }

    /// Transpose.
    pub fn transpose(&self) -> Matrix {
        Self::from_fn(self.cols, self.rows, |i, j| self[(j, i)])
    }

    /// Reduced row-echelon form by Gauss-Jordan elimination with partial pivoting.
    ///
    /// Columns whose best pivot is below [`RREF_PIVOT_EPSILON`] are skipped, so rank
    /// deficient input ends with zero rows at the bottom.
    pub fn rref(&self) -> Matrix {
        let (nrows, ncols) = self.shape();
        let mut out = self.data.clone();
        let at = |r: usize, c: usize| r * ncols + c;

        let mut r = 0;
        for c in 0..ncols {
            if r >= nrows {
                break;
            }

            let mut pivot = r;
            for i in (r + 1)..nrows {
                if out[at(i, c)].abs() > out[at(pivot, c)].abs() {
                    pivot = i;
                }
            }
            if out[at(pivot, c)].abs() < RREF_PIVOT_EPSILON {
                log::debug!("rref: no pivot in column {c}, skipping");
                continue;
            }

            if pivot != r {
                for j in 0..ncols {
                    out.swap(at(pivot, j), at(r, j));
                }
            }

            let s = 1.0 / out[at(r, c)];
            for j in 0..ncols {
                out[at(r, j)] *= s;
            }

            for i in 0..nrows {
                if i == r {
                    continue;
                }
                let t = out[at(i, c)];
                for j in 0..ncols {
                    out[at(i, j)] -= t * out[at(r, j)];
                }
            }
            r += 1;
        }

        Self {
            rows: nrows,
            cols: ncols,
            data: out,
        }
    }

    /// Whether this is a 3x3 rotation: `R * R^T = I` and `det(R) = 1` within `tol`.
    pub fn is_rotation(&self, tol: f64) -> bool {
        if self.shape() != (3, 3) {
            return false;
        }
        let Ok(rrt) = self.multiply(&self.transpose()) else {
            return false;
        };
        let orthonormal = rrt
            .data
            .iter()
            .zip(&Self::identity(3).data)
            .all(|(a, b)| (a - b).abs() <= tol);
        let proper = self
            .determinant()
            .map(|det| (det - 1.0).abs() <= tol)
            .unwrap_or(false);
        orthonormal && proper
    }

    /// Whether this is a 4x4 homogeneous rigid transform `[[R, T], [0, 0, 0, 1]]` within `tol`.
    pub fn is_rigid_transform(&self, tol: f64) -> bool {
        if self.shape() != (4, 4) {
            return false;
        }
        let bottom_ok = [0.0, 0.0, 0.0, 1.0]
            .iter()
            .enumerate()
            .all(|(j, v)| (self[(3, j)] - v).abs() <= tol);
        bottom_ok
            && self
                .sub_matrix(0, 3, 0, 3)
                .map(|r| r.is_rotation(tol))
                .unwrap_or(false)
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        assert!(row < self.rows && col < self.cols, "index out of bounds");
        &self.data[row * self.cols + col]
    }
}

impl<const R: usize, const C: usize> From<[[f64; C]; R]> for Matrix {
    fn from(rows: [[f64; C]; R]) -> Self {
        Self {
            rows: R,
            cols: C,
            data: rows.iter().flatten().copied().collect(),
        }
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| is_close(*a, *b, EQ_TOLERANCE, EQ_TOLERANCE))
    }
}

impl AbsDiffEq for Matrix {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl RelativeEq for Matrix {
    fn default_max_relative() -> Self::Epsilon {
        f64::EPSILON
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for i in 0..self.rows {
            if i > 0 {
                write!(f, ",\n ")?;
            }
            write!(f, "[")?;
            for j in 0..self.cols {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self[(i, j)])?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}
