//! Dense row-major matrices over ℤ with exact linear algebra.
//!
//! `ExactMatrix` is the currency of piecewise-linear actions: every cell of an
//! encoding's PL map is an action matrix together with a condition matrix
//! (one half-space `row · x ≥ 0` per row). The heavier routines here work
//! over ℚ internally and hand integers back:
//!
//! - [`ExactMatrix::kernel`]: nullspace basis as primitive integer vectors.
//! - [`ExactMatrix::determinant`]: fraction-free Bareiss elimination.
//! - [`ExactMatrix::char_poly`]: Faddeev–LeVerrier.
//! - [`ExactMatrix::lll`]: exact LLL reduction of the row lattice.

use std::fmt;
use std::ops::{Add, Mul, Sub};

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

use crate::exact::polynomial::Polynomial;
use crate::exact::weight::Weight;
use crate::laminar_error::LaminarError;

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExactMatrix {
    rows: usize,
    cols: usize,
    data: Vec<BigInt>,
}

impl ExactMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        ExactMatrix {
            rows,
            cols,
            data: vec![BigInt::zero(); rows * cols],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = BigInt::one();
        }
        m
    }

    /// Builds a matrix with `cols` columns from its rows.
    pub fn from_rows(cols: usize, rows: Vec<Vec<BigInt>>) -> Result<Self, LaminarError> {
        let n = rows.len();
        let mut data = Vec::with_capacity(n * cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(LaminarError::Internal(format!(
                    "matrix row {i} has {} entries, expected {cols}",
                    row.len()
                )));
            }
            data.extend(row);
        }
        Ok(ExactMatrix { rows: n, cols, data })
    }

    /// Convenience constructor from small integers.
    pub fn from_i64(rows: &[&[i64]]) -> Result<Self, LaminarError> {
        let cols = rows.first().map_or(0, |r| r.len());
        Self::from_rows(
            cols,
            rows.iter()
                .map(|r| r.iter().map(|&x| BigInt::from(x)).collect())
                .collect(),
        )
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    #[inline]
    pub fn get(&self, r: usize, c: usize) -> &BigInt {
        &self.data[r * self.cols + c]
    }

    #[inline]
    pub fn set(&mut self, r: usize, c: usize, value: BigInt) {
        self.data[r * self.cols + c] = value;
    }

    #[inline]
    pub fn row(&self, r: usize) -> &[BigInt] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    pub fn row_vecs(&self) -> Vec<Vec<BigInt>> {
        (0..self.rows).map(|r| self.row(r).to_vec()).collect()
    }

    pub fn transpose(&self) -> Self {
        let mut t = Self::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                t.set(c, r, self.get(r, c).clone());
            }
        }
        t
    }

    pub fn trace(&self) -> BigInt {
        (0..self.rows.min(self.cols))
            .map(|i| self.get(i, i))
            .fold(BigInt::zero(), |acc, x| acc + x)
    }

    /// Stacks `other` below `self`.
    pub fn vstack(&self, other: &ExactMatrix) -> Result<Self, LaminarError> {
        if self.rows > 0 && other.rows > 0 && self.cols != other.cols {
            return Err(LaminarError::Internal(format!(
                "cannot stack {}-column and {}-column matrices",
                self.cols, other.cols
            )));
        }
        let cols = if self.rows > 0 { self.cols } else { other.cols };
        let mut data = self.data.clone();
        data.extend(other.data.iter().cloned());
        Ok(ExactMatrix {
            rows: self.rows + other.rows,
            cols,
            data,
        })
    }

    // --- elementary row operations ---

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for c in 0..self.cols {
            self.data.swap(a * self.cols + c, b * self.cols + c);
        }
    }

    pub fn scale_row(&mut self, r: usize, k: &BigInt) {
        for c in 0..self.cols {
            let v = self.get(r, c) * k;
            self.set(r, c, v);
        }
    }

    /// `row[dst] += k · row[src]`.
    pub fn add_row_multiple(&mut self, dst: usize, src: usize, k: &BigInt) {
        for c in 0..self.cols {
            let v = self.get(dst, c) + self.get(src, c) * k;
            self.set(dst, c, v);
        }
    }

    /// Applies the matrix to a weight vector.
    pub fn mul_vec<W: Weight>(&self, v: &[W]) -> Vec<W> {
        debug_assert_eq!(v.len(), self.cols);
        (0..self.rows)
            .map(|r| {
                self.row(r)
                    .iter()
                    .zip(v)
                    .filter(|(a, _)| !a.is_zero())
                    .fold(W::zero(), |acc, (a, x)| acc + W::from_integer(a.clone()) * x.clone())
            })
            .collect()
    }

    /// True when every row satisfies `row · v ≥ 0`.
    pub fn satisfied_by<W: Weight>(&self, v: &[W]) -> bool {
        self.mul_vec(v).iter().all(|x| *x >= W::zero())
    }

    fn to_rational_rows(&self) -> Vec<Vec<BigRational>> {
        (0..self.rows)
            .map(|r| {
                self.row(r)
                    .iter()
                    .map(|x| BigRational::from_integer(x.clone()))
                    .collect()
            })
            .collect()
    }

    /// Reduced row echelon form over ℚ, returning the pivot columns.
    fn rref(&self) -> (Vec<Vec<BigRational>>, Vec<usize>) {
        let mut m = self.to_rational_rows();
        let mut pivots = Vec::new();
        let mut row = 0;
        for col in 0..self.cols {
            if row == self.rows {
                break;
            }
            let Some(p) = (row..self.rows).find(|&r| !m[r][col].is_zero()) else {
                continue;
            };
            m.swap(row, p);
            let inv = m[row][col].recip();
            for x in m[row].iter_mut() {
                *x = &*x * &inv;
            }
            for r in 0..self.rows {
                if r == row || m[r][col].is_zero() {
                    continue;
                }
                let factor = m[r][col].clone();
                for c in 0..self.cols {
                    let delta = &factor * &m[row][c];
                    m[r][c] = &m[r][c] - delta;
                }
            }
            pivots.push(col);
            row += 1;
        }
        (m, pivots)
    }

    pub fn rank(&self) -> usize {
        self.rref().1.len()
    }

    /// Basis of `{x : self · x = 0}` as primitive integer vectors.
    pub fn kernel(&self) -> Vec<Vec<BigInt>> {
        let (m, pivots) = self.rref();
        let free = (0..self.cols).filter(|c| !pivots.contains(c));
        free.map(|f| {
            let mut v = vec![BigRational::zero(); self.cols];
            v[f] = BigRational::one();
            for (r, &pc) in pivots.iter().enumerate() {
                v[pc] = -m[r][f].clone();
            }
            primitive(&v)
        })
        .collect()
    }

    /// Fraction-free (Bareiss) determinant.
    pub fn determinant(&self) -> Option<BigInt> {
        if !self.is_square() {
            return None;
        }
        let n = self.rows;
        if n == 0 {
            return Some(BigInt::one());
        }
        let mut m = self.row_vecs();
        let mut negate = false;
        let mut prev = BigInt::one();
        for k in 0..n - 1 {
            if m[k][k].is_zero() {
                let Some(p) = (k + 1..n).find(|&i| !m[i][k].is_zero()) else {
                    return Some(BigInt::zero());
                };
                m.swap(k, p);
                negate = !negate;
            }
            for i in k + 1..n {
                for j in k + 1..n {
                    let num = &m[i][j] * &m[k][k] - &m[i][k] * &m[k][j];
                    m[i][j] = num / &prev;
                }
            }
            prev = m[k][k].clone();
        }
        let det = m[n - 1][n - 1].clone();
        Some(if negate { -det } else { det })
    }

    /// Characteristic polynomial `det(x·I - self)`.
    pub fn char_poly(&self) -> Option<Polynomial> {
        if !self.is_square() {
            return None;
        }
        let n = self.rows;
        let a = self.to_rational_rows();
        let mut m = vec![vec![BigRational::zero(); n]; n];
        let mut coeffs = vec![BigRational::zero(); n + 1];
        coeffs[n] = BigRational::one();
        for k in 1..=n {
            m = rational_mul(&a, &m);
            for (i, row) in m.iter_mut().enumerate() {
                row[i] = &row[i] + &coeffs[n - k + 1];
            }
            let am = rational_mul(&a, &m);
            let trace = (0..n).fold(BigRational::zero(), |acc, i| acc + &am[i][i]);
            coeffs[n - k] = -trace / BigRational::from_integer(BigInt::from(k));
        }
        Some(Polynomial::new(coeffs))
    }

    /// LLL-reduces the lattice spanned by the rows (Lovász constant `delta`).
    ///
    /// Rows must be linearly independent.
    pub fn lll(&self, delta: &BigRational) -> ExactMatrix {
        let n = self.rows;
        let mut b = self.row_vecs();
        if n <= 1 {
            return self.clone();
        }
        let (mut mu, mut norms) = gram_schmidt(&b);
        let mut k = 1;
        while k < n {
            for j in (0..k).rev() {
                let q = round(&mu[k][j]);
                if q.is_zero() {
                    continue;
                }
                for c in 0..self.cols {
                    let v = &b[k][c] - &q * &b[j][c];
                    b[k][c] = v;
                }
                (mu, norms) = gram_schmidt(&b);
            }
            let mu_sq = &mu[k][k - 1] * &mu[k][k - 1];
            if norms[k] >= (delta - mu_sq) * &norms[k - 1] {
                k += 1;
            } else {
                b.swap(k, k - 1);
                (mu, norms) = gram_schmidt(&b);
                k = (k - 1).max(1);
            }
        }
        ExactMatrix {
            rows: n,
            cols: self.cols,
            data: b.into_iter().flatten().collect(),
        }
    }
}

fn rational_mul(a: &[Vec<BigRational>], b: &[Vec<BigRational>]) -> Vec<Vec<BigRational>> {
    let n = a.len();
    let m = b.first().map_or(0, |r| r.len());
    let mut out = vec![vec![BigRational::zero(); m]; n];
    for i in 0..n {
        for (k, bk) in b.iter().enumerate() {
            if a[i][k].is_zero() {
                continue;
            }
            for j in 0..m {
                out[i][j] = &out[i][j] + &a[i][k] * &bk[j];
            }
        }
    }
    out
}

/// `(mu, |b*_i|²)` for the rows of `b`.
fn gram_schmidt(b: &[Vec<BigInt>]) -> (Vec<Vec<BigRational>>, Vec<BigRational>) {
    let n = b.len();
    let rat: Vec<Vec<BigRational>> = b
        .iter()
        .map(|r| r.iter().map(|x| BigRational::from_integer(x.clone())).collect())
        .collect();
    let mut star: Vec<Vec<BigRational>> = Vec::with_capacity(n);
    let mut norms: Vec<BigRational> = Vec::with_capacity(n);
    let mut mu = vec![vec![BigRational::zero(); n]; n];
    for i in 0..n {
        let mut v = rat[i].clone();
        for j in 0..i {
            if norms[j].is_zero() {
                continue;
            }
            let m = dot(&rat[i], &star[j]) / &norms[j];
            for (x, s) in v.iter_mut().zip(&star[j]) {
                *x = &*x - &m * s;
            }
            mu[i][j] = m;
        }
        norms.push(dot(&v, &v));
        star.push(v);
    }
    (mu, norms)
}

fn dot(a: &[BigRational], b: &[BigRational]) -> BigRational {
    a.iter().zip(b).fold(BigRational::zero(), |acc, (x, y)| acc + x * y)
}

fn round(x: &BigRational) -> BigInt {
    let half = BigRational::new(BigInt::one(), BigInt::from(2));
    (x + half).floor().to_integer()
}

/// Scales a rational vector to integers with content 1.
pub(crate) fn primitive(v: &[BigRational]) -> Vec<BigInt> {
    let denom = v.iter().fold(BigInt::one(), |acc, x| acc.lcm(x.denom()));
    let ints: Vec<BigInt> = v
        .iter()
        .map(|x| (x * BigRational::from_integer(denom.clone())).to_integer())
        .collect();
    let content = ints.iter().fold(BigInt::zero(), |acc, x| acc.gcd(x));
    if content.is_zero() || content.is_one() {
        return ints;
    }
    ints.into_iter().map(|x| x / &content).collect()
}

impl<'a> Mul<&'a ExactMatrix> for &'a ExactMatrix {
    type Output = ExactMatrix;

    /// # Panics
    /// On mismatched dimensions.
    fn mul(self, rhs: &'a ExactMatrix) -> ExactMatrix {
        assert_eq!(self.cols, rhs.rows, "matrix dimensions do not agree");
        let mut out = ExactMatrix::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.get(i, k);
                if a.is_zero() {
                    continue;
                }
                for j in 0..rhs.cols {
                    let v = out.get(i, j) + a * rhs.get(k, j);
                    out.set(i, j, v);
                }
            }
        }
        out
    }
}

impl<'a> Add<&'a ExactMatrix> for &'a ExactMatrix {
    type Output = ExactMatrix;

    fn add(self, rhs: &'a ExactMatrix) -> ExactMatrix {
        assert_eq!((self.rows, self.cols), (rhs.rows, rhs.cols), "matrix shapes differ");
        ExactMatrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().zip(&rhs.data).map(|(a, b)| a + b).collect(),
        }
    }
}

impl<'a> Sub<&'a ExactMatrix> for &'a ExactMatrix {
    type Output = ExactMatrix;

    fn sub(self, rhs: &'a ExactMatrix) -> ExactMatrix {
        assert_eq!((self.rows, self.cols), (rhs.rows, rhs.cols), "matrix shapes differ");
        ExactMatrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().zip(&rhs.data).map(|(a, b)| a - b).collect(),
        }
    }
}

impl fmt::Debug for ExactMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries((0..self.rows).map(|r| self.row(r)))
            .finish()
    }
}

impl fmt::Display for ExactMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            let cells: Vec<String> = self.row(r).iter().map(|x| x.to_string()).collect();
            writeln!(f, "[{}]", cells.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: &[&[i64]]) -> ExactMatrix {
        ExactMatrix::from_i64(rows).unwrap()
    }

    fn ints(xs: &[i64]) -> Vec<BigInt> {
        xs.iter().map(|&x| BigInt::from(x)).collect()
    }

    #[test]
    fn multiplication_and_identity() {
        let a = m(&[&[2, 1], &[1, 1]]);
        assert_eq!(&a * &ExactMatrix::identity(2), a);
        assert_eq!(&a * &a, m(&[&[5, 3], &[3, 2]]));
        assert_eq!(&(&a + &a) - &a, a);
        assert_eq!(a.mul_vec(&ints(&[1, 2])), ints(&[4, 3]));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = ExactMatrix::from_rows(2, vec![ints(&[1, 2]), ints(&[1])]).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn bareiss_determinant() {
        assert_eq!(m(&[&[2, 1], &[1, 1]]).determinant(), Some(BigInt::from(1)));
        assert_eq!(
            m(&[&[0, 2, 1], &[1, 0, 0], &[3, 1, 4]]).determinant(),
            Some(BigInt::from(-7))
        );
        assert_eq!(m(&[&[1, 2], &[2, 4]]).determinant(), Some(BigInt::zero()));
        assert_eq!(m(&[&[1, 2]]).determinant(), None);
    }

    #[test]
    fn characteristic_polynomial() {
        let p = m(&[&[2, 1], &[1, 1]]).char_poly().unwrap();
        assert_eq!(p, Polynomial::from_integers([1, -3, 1]));
        let q = m(&[&[1, 1, 0], &[0, 1, 0], &[0, 0, 2]]).char_poly().unwrap();
        // (x - 1)^2 (x - 2)
        assert_eq!(q, Polynomial::from_integers([-2, 5, -4, 1]));
    }

    #[test]
    fn kernel_is_primitive() {
        let a = m(&[&[1, 2, 3], &[2, 4, 6]]);
        let ker = a.kernel();
        assert_eq!(ker.len(), 2);
        for v in &ker {
            let image = a.mul_vec(v);
            assert!(image.iter().all(|x| x.is_zero()));
        }
        assert_eq!(a.rank(), 1);
        assert!(ExactMatrix::identity(3).kernel().is_empty());
    }

    #[test]
    fn lll_finds_short_vector() {
        // Relation 1·1 + 1·φ - 1·φ² = 0 hidden in a scaled lattice.
        let scale = 1_000_000i64;
        let phi = 1_618_034i64; // round(φ · 10^6)
        let phi2 = 2_618_034i64;
        let basis = m(&[&[1, 0, 0, scale], &[0, 1, 0, phi], &[0, 0, 1, phi2]]);
        let reduced = basis.lll(&BigRational::new(BigInt::from(3), BigInt::from(4)));
        let first = reduced.row(0);
        let coeffs: Vec<i64> = first[..3].iter().map(|x| i64::try_from(x).unwrap()).collect();
        assert!(coeffs == vec![1, 1, -1] || coeffs == vec![-1, -1, 1]);
    }

    #[test]
    fn stacking_and_conditions() {
        let a = m(&[&[1, -1]]);
        let b = m(&[&[0, 1]]);
        let c = a.vstack(&b).unwrap();
        assert_eq!(c.nrows(), 2);
        assert!(c.satisfied_by(&ints(&[2, 1])));
        assert!(!c.satisfied_by(&ints(&[1, 2])));
    }
}
