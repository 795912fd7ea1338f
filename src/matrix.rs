//! Matrix algebra: RREF, determinant, inverse, null space.
//!
//! Stored row-major as a flat `Vec<f64>` plus `(rows, cols)`, matching the
//! spec's "rectangular on creation" contract. Row reduction uses partial
//! pivoting with `epsilon = 1e-12`; determinant uses Bareiss's
//! fraction-free algorithm so integer matrices get an exact integer
//! result rather than accumulated floating-point error, per spec §4.E.

use crate::error::{CantusError, MathErrorKind};

pub const DEFAULT_EPSILON: f64 = 1e-12;

/// A dense, rectangular matrix of `f64` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixData {
    pub rows: usize,
    pub cols: usize,
    pub entries: Vec<f64>,
}

impl MatrixData {
    pub fn new(rows: usize, cols: usize, entries: Vec<f64>) -> Self {
        assert_eq!(entries.len(), rows * cols, "matrix entries must be rectangular");
        Self { rows, cols, entries }
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, entries: vec![0.0; rows * cols] }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.set(i, i, 1.0);
        }
        m
    }

    pub fn get(&self, r: usize, c: usize) -> f64 {
        self.entries[r * self.cols + c]
    }

    pub fn set(&mut self, r: usize, c: usize, value: f64) {
        self.entries[r * self.cols + c] = value;
    }

    pub fn transpose(&self) -> Self {
        let mut out = Self::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                out.set(c, r, self.get(r, c));
            }
        }
        out
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for c in 0..self.cols {
            self.entries.swap(a * self.cols + c, b * self.cols + c);
        }
    }

    pub fn swap_cols(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for r in 0..self.rows {
            self.entries.swap(r * self.cols + a, r * self.cols + b);
        }
    }

    pub fn scalar_multiply(&self, scalar: f64) -> Self {
        Self { rows: self.rows, cols: self.cols, entries: self.entries.iter().map(|v| v * scalar).collect() }
    }

    /// Sum of squared magnitudes of every entry (spec §4.E).
    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|v| v * v).sum()
    }

    pub fn magnitude(&self) -> f64 {
        self.norm().sqrt()
    }

    /// `IsIdentityMatrix`: square and every entry within `epsilon` of the
    /// identity of the same size.
    pub fn is_identity(&self, epsilon: f64) -> bool {
        if self.rows != self.cols {
            return false;
        }
        (0..self.rows).all(|r| {
            (0..self.cols).all(|c| {
                let expected = if r == c { 1.0 } else { 0.0 };
                (self.get(r, c) - expected).abs() < epsilon
            })
        })
    }

    /// `expo n`: matrix power for a nonnegative integer `n`; identity for
    /// `n == 0`; requires a square matrix.
    pub fn expo(&self, n: u32) -> Result<Self, CantusError> {
        if self.rows != self.cols {
            return Err(CantusError::math(MathErrorKind::DimensionMismatch, "expo requires a square matrix"));
        }
        let mut result = Self::identity(self.rows);
        for _ in 0..n {
            result = result.multiply(self)?;
        }
        Ok(result)
    }

    /// Dot product of two equal-length vectors (single-row or single-column
    /// matrices flattened to their entry list).
    pub fn dot(a: &[f64], b: &[f64]) -> Result<f64, CantusError> {
        if a.len() != b.len() {
            return Err(CantusError::math(MathErrorKind::DimensionMismatch, "dot requires equal-length vectors"));
        }
        Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
    }

    /// Inner product, an alias for [`Self::dot`] in the real-valued case
    /// spec targets (no Hermitian conjugation is specified for `inner`).
    pub fn inner(a: &[f64], b: &[f64]) -> Result<f64, CantusError> {
        Self::dot(a, b)
    }

    /// Cross product of two length-3 vectors; fails `DimensionMismatch`
    /// for any other length, per spec §4.E.
    pub fn cross(a: &[f64], b: &[f64]) -> Result<[f64; 3], CantusError> {
        if a.len() != 3 || b.len() != 3 {
            return Err(CantusError::math(MathErrorKind::DimensionMismatch, "cross requires length-3 vectors"));
        }
        Ok([a[1] * b[2] - a[2] * b[1], a[2] * b[0] - a[0] * b[2], a[0] * b[1] - a[1] * b[0]])
    }

    /// Reduced row-echelon form via Gauss-Jordan elimination with partial
    /// pivoting. Returns the RREF matrix and its rank.
    pub fn rref(&self, epsilon: f64) -> (Self, usize) {
        let mut m = self.clone();
        let mut pivot_row = 0;
        let mut rank = 0;
        for col in 0..m.cols {
            if pivot_row >= m.rows {
                break;
            }
            let best = (pivot_row..m.rows)
                .max_by(|&a, &b| m.get(a, col).abs().partial_cmp(&m.get(b, col).abs()).unwrap())
                .unwrap();
            if m.get(best, col).abs() < epsilon {
                continue;
            }
            m.swap_rows(pivot_row, best);
            let pivot_value = m.get(pivot_row, col);
            for c in 0..m.cols {
                let v = m.get(pivot_row, c) / pivot_value;
                m.set(pivot_row, c, v);
            }
            for r in 0..m.rows {
                if r == pivot_row {
                    continue;
                }
                let factor = m.get(r, col);
                if factor.abs() < epsilon {
                    continue;
                }
                for c in 0..m.cols {
                    let v = m.get(r, c) - factor * m.get(pivot_row, c);
                    m.set(r, c, v);
                }
            }
            pivot_row += 1;
            rank += 1;
        }
        (m, rank)
    }

    /// Exact determinant via Bareiss's fraction-free elimination. Only
    /// meaningful for square matrices.
    pub fn determinant(&self) -> Result<f64, CantusError> {
        if self.rows != self.cols {
            return Err(CantusError::math(MathErrorKind::DimensionMismatch, "determinant requires a square matrix"));
        }
        let n = self.rows;
        let mut m = self.entries.clone();
        let idx = |r: usize, c: usize| r * n + c;
        let mut prev_pivot = 1.0;
        let mut sign = 1.0;
        for k in 0..n.saturating_sub(1) {
            if m[idx(k, k)].abs() < DEFAULT_EPSILON {
                let swap_row = (k + 1..n).find(|&r| m[idx(r, k)].abs() >= DEFAULT_EPSILON);
                match swap_row {
                    Some(r) => {
                        for c in 0..n {
                            m.swap(idx(k, c), idx(r, c));
                        }
                        sign = -sign;
                    }
                    None => return Ok(0.0),
                }
            }
            for i in (k + 1)..n {
                for j in (k + 1)..n {
                    let value = (m[idx(i, j)] * m[idx(k, k)] - m[idx(i, k)] * m[idx(k, j)]) / prev_pivot;
                    m[idx(i, j)] = value;
                }
            }
            prev_pivot = m[idx(k, k)];
        }
        Ok(sign * m[idx(n - 1, n - 1)])
    }

    /// Inverse via RREF of the augmented `[A | I]` matrix. A pivot that
    /// falls below `epsilon` during reduction means `A` is singular, a
    /// structural failure per spec §7's policy.
    pub fn inverse(&self, epsilon: f64) -> Result<Self, CantusError> {
        if self.rows != self.cols {
            return Err(CantusError::math(MathErrorKind::DimensionMismatch, "inverse requires a square matrix"));
        }
        let n = self.rows;
        let mut augmented = Self::zeros(n, 2 * n);
        for r in 0..n {
            for c in 0..n {
                augmented.set(r, c, self.get(r, c));
            }
            augmented.set(r, n + r, 1.0);
        }
        let (reduced, rank) = augmented.rref(epsilon);
        if rank < n {
            return Err(CantusError::math(MathErrorKind::SingularMatrix, "matrix is singular"));
        }
        let mut inverse = Self::zeros(n, n);
        for r in 0..n {
            for c in 0..n {
                inverse.set(r, c, reduced.get(r, n + c));
            }
        }
        Ok(inverse)
    }

    /// A basis for the null space, computed from the RREF of the matrix:
    /// one basis vector per free (non-pivot) column.
    pub fn null_space(&self, epsilon: f64) -> Vec<Vec<f64>> {
        let (reduced, _) = self.rref(epsilon);
        let mut pivot_cols = Vec::new();
        let mut row = 0;
        for col in 0..reduced.cols {
            if row < reduced.rows && (reduced.get(row, col) - 1.0).abs() < epsilon {
                let is_pivot = (0..reduced.rows).all(|r| r == row || reduced.get(r, col).abs() < epsilon);
                if is_pivot {
                    pivot_cols.push(col);
                    row += 1;
                    continue;
                }
            }
        }
        let free_cols: Vec<usize> = (0..reduced.cols).filter(|c| !pivot_cols.contains(c)).collect();
        free_cols
            .iter()
            .map(|&free_col| {
                let mut basis = vec![0.0; reduced.cols];
                basis[free_col] = 1.0;
                for (row_idx, &pivot_col) in pivot_cols.iter().enumerate() {
                    basis[pivot_col] = -reduced.get(row_idx, free_col);
                }
                basis
            })
            .collect()
    }

    pub fn multiply(&self, other: &Self) -> Result<Self, CantusError> {
        if self.cols != other.rows {
            return Err(CantusError::math(MathErrorKind::DimensionMismatch, "matrix dimensions do not conform"));
        }
        let mut out = Self::zeros(self.rows, other.cols);
        for r in 0..self.rows {
            for c in 0..other.cols {
                let mut sum = 0.0;
                for k in 0..self.cols {
                    sum += self.get(r, k) * other.get(k, c);
                }
                out.set(r, c, sum);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn determinant_of_2x2() {
        let m = MatrixData::new(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(m.determinant().unwrap(), -2.0);
    }

    #[test]
    fn inverse_times_original_is_identity() {
        let m = MatrixData::new(2, 2, vec![4.0, 7.0, 2.0, 6.0]);
        let inv = m.inverse(DEFAULT_EPSILON).unwrap();
        let product = m.multiply(&inv).unwrap();
        for r in 0..2 {
            for c in 0..2 {
                let expected = if r == c { 1.0 } else { 0.0 };
                assert!((product.get(r, c) - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn singular_matrix_inverse_is_structural_error() {
        let m = MatrixData::new(2, 2, vec![1.0, 2.0, 2.0, 4.0]);
        assert!(matches!(
            m.inverse(DEFAULT_EPSILON),
            Err(CantusError::Math(MathErrorKind::SingularMatrix, _))
        ));
    }

    #[test]
    fn rref_of_identity_is_identity() {
        let m = MatrixData::identity(3);
        let (reduced, rank) = m.rref(DEFAULT_EPSILON);
        assert_eq!(rank, 3);
        assert_eq!(reduced, m);
    }
}
