//! Exact eigenvector oracle for piecewise-linear cells.
//!
//! Given the action matrix `A` of a cell and its condition matrix `C`, an
//! [`ExactEigenSolver`] looks for a real eigenvalue `λ > 1` of `A` with an
//! eigenvector `v ≥ 0` satisfying `C·v ≥ 0`. The invariant-lamination search
//! is written against the trait; [`SturmEigenSolver`] is the implementation
//! shipped with the crate.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

use crate::exact::matrix::ExactMatrix;
use crate::exact::number_field::{AlgebraicNumber, NumberField};
use crate::exact::polynomial::Polynomial;
use crate::exact::weight::Weight;
use crate::laminar_error::LaminarError;

/// Finds a directed eigenvector of a PL cell.
pub trait ExactEigenSolver: Send + Sync {
    /// Returns `(λ, v)` with `A·v = λ·v`, `λ > 1`, `v ≥ 0`, `C·v ≥ 0`.
    ///
    /// Fails with [`LaminarError::NoInterestingEigenvector`] when the cell has
    /// no such vector, and with an assumption failure
    /// ([`LaminarError::Reducible`]) when an integral eigenvalue has an
    /// admissible eigenvector.
    fn directed_eigenvector(
        &self,
        action: &ExactMatrix,
        condition: &ExactMatrix,
    ) -> Result<(AlgebraicNumber, Vec<AlgebraicNumber>), LaminarError>;
}

/// Root isolation by Sturm sequences, minimal polynomials by LLL, kernels by
/// exact Gaussian elimination over ℚ(λ).
#[derive(Debug, Clone)]
pub struct SturmEigenSolver {
    /// Base precision (in bits) of the root approximation fed to LLL.
    pub precision_bits: u32,
}

impl Default for SturmEigenSolver {
    fn default() -> Self {
        SturmEigenSolver { precision_bits: 64 }
    }
}

impl ExactEigenSolver for SturmEigenSolver {
    fn directed_eigenvector(
        &self,
        action: &ExactMatrix,
        condition: &ExactMatrix,
    ) -> Result<(AlgebraicNumber, Vec<AlgebraicNumber>), LaminarError> {
        let char_poly = action
            .char_poly()
            .ok_or_else(|| LaminarError::Internal("action matrix is not square".into()))?;
        let one = BigRational::one();
        let mut f = char_poly.squarefree_part();
        if f.eval(&one).is_zero() {
            f = f
                .exact_div(&Polynomial::from_integers([-1, 1]))
                .ok_or_else(|| LaminarError::Internal("x - 1 does not divide".into()))?;
        }
        if f.is_constant() {
            return Err(LaminarError::NoInterestingEigenvector);
        }
        let bound = f.root_bound();
        for (lo, hi) in f.isolate_roots(&one, &bound) {
            let container = NumberField::new(&f, lo, hi)?;
            if let Some(k) = integral_root(&f, &container) {
                let shifted = action - &scalar(&k, action.nrows());
                let basis = shifted.kernel();
                if admissible(basis, condition).is_some() {
                    return Err(LaminarError::Reducible(format!(
                        "eigenvalue {k} has an invariant rational direction"
                    )));
                }
                continue;
            }
            let field = self.minimal_field(&f, &container)?;
            let lambda = AlgebraicNumber::generator(&field);
            log::trace!("testing eigenvalue ≈ {:.6} ({})", lambda.to_f64(), field.modulus());
            let basis = field_kernel(action, &lambda)?;
            if let Some(v) = admissible(basis, condition) {
                return Ok((lambda, v));
            }
        }
        Err(LaminarError::NoInterestingEigenvector)
    }
}

impl SturmEigenSolver {
    /// Number field for the root isolated by `container`, defined by the
    /// smallest factor of `f` that LLL recovers (or `f` itself).
    fn minimal_field(
        &self,
        f: &Polynomial,
        container: &NumberField,
    ) -> Result<std::sync::Arc<NumberField>, LaminarError> {
        let deg = f.degree().unwrap_or(0);
        let bits = self.precision_bits + 16 * deg as u32;
        let (lo, hi) = container.approximation(bits);
        if deg > 1 {
            if let Some(q) = self.recover_factor(f, deg, bits, &lo, &hi) {
                return NumberField::new(&q, lo, hi);
            }
        }
        NumberField::new(f, lo, hi)
    }

    fn recover_factor(
        &self,
        f: &Polynomial,
        deg: usize,
        bits: u32,
        lo: &BigRational,
        hi: &BigRational,
    ) -> Option<Polynomial> {
        let approx = (lo + hi) / BigRational::from_integer(BigInt::from(2));
        let scale = BigRational::from_integer(BigInt::one() << bits as usize);
        let delta = BigRational::new(BigInt::from(3), BigInt::from(4));
        for d in 1..deg {
            let mut rows = Vec::with_capacity(d + 1);
            let mut power = BigRational::one();
            for i in 0..=d {
                let mut row = vec![BigInt::zero(); d + 2];
                row[i] = BigInt::one();
                row[d + 1] = round(&(&power * &scale));
                rows.push(row);
                power = &power * &approx;
            }
            let Ok(lattice) = ExactMatrix::from_rows(d + 2, rows) else {
                continue;
            };
            let reduced = lattice.lll(&delta);
            for r in 0..reduced.nrows() {
                let q = Polynomial::from_bigints(&reduced.row(r)[..=d]);
                if q.is_constant() || !f.rem(&q).is_zero() {
                    continue;
                }
                let (a, b) = (q.sign_at(lo), q.sign_at(hi));
                if a != b && a.is_ne() && b.is_ne() {
                    return Some(q.monic());
                }
            }
        }
        None
    }
}

/// The integer root of `f` inside the isolating interval, if any.
fn integral_root(f: &Polynomial, container: &NumberField) -> Option<BigInt> {
    let (lo, hi) = container.approximation(1);
    let mut k = lo.ceil().to_integer();
    while BigRational::from_integer(k.clone()) <= hi {
        if f.eval(&BigRational::from_integer(k.clone())).is_zero() {
            return Some(k);
        }
        k += 1;
    }
    None
}

fn scalar(k: &BigInt, n: usize) -> ExactMatrix {
    let mut m = ExactMatrix::zeros(n, n);
    for i in 0..n {
        m.set(i, i, k.clone());
    }
    m
}

fn round(x: &BigRational) -> BigInt {
    (x + BigRational::new(BigInt::one(), BigInt::from(2)))
        .floor()
        .to_integer()
}

/// Kernel of `A - λI` over ℚ(λ).
fn field_kernel(
    action: &ExactMatrix,
    lambda: &AlgebraicNumber,
) -> Result<Vec<Vec<AlgebraicNumber>>, LaminarError> {
    let n = action.nrows();
    let cols = action.ncols();
    let mut m: Vec<Vec<AlgebraicNumber>> = (0..n)
        .map(|r| {
            (0..cols)
                .map(|c| {
                    let entry = AlgebraicNumber::from_integer(action.get(r, c).clone());
                    if r == c { &entry - lambda } else { entry }
                })
                .collect()
        })
        .collect();
    let mut pivots = Vec::new();
    let mut row = 0;
    for col in 0..cols {
        if row == n {
            break;
        }
        let Some(p) = (row..n).find(|&r| !m[r][col].is_zero()) else {
            continue;
        };
        m.swap(row, p);
        let inv = m[row][col]
            .inverse()
            .ok_or_else(|| LaminarError::Internal("non-zero pivot has no inverse".into()))?;
        for x in m[row].iter_mut() {
            *x = &*x * &inv;
        }
        for r in 0..n {
            if r == row || m[r][col].is_zero() {
                continue;
            }
            let factor = m[r][col].clone();
            for c in 0..cols {
                let delta = &factor * &m[row][c];
                m[r][c] = &m[r][c] - &delta;
            }
        }
        pivots.push(col);
        row += 1;
    }
    Ok((0..cols)
        .filter(|c| !pivots.contains(c))
        .map(|free| {
            let mut v = vec![AlgebraicNumber::zero(); cols];
            v[free] = AlgebraicNumber::one();
            for (r, &pc) in pivots.iter().enumerate() {
                v[pc] = -m[r][free].clone();
            }
            v
        })
        .collect())
}

/// Flips `v` to be non-negative, `None` when it has mixed signs or is zero.
fn orient<W: Weight>(v: Vec<W>) -> Option<Vec<W>> {
    let zero = W::zero();
    let positive = v.iter().any(|x| *x > zero);
    let negative = v.iter().any(|x| *x < zero);
    match (positive, negative) {
        (true, false) => Some(v),
        (false, true) => Some(v.into_iter().map(|x| -x).collect()),
        _ => None,
    }
}

/// First basis vector (or the sum of all of them) that is non-negative and
/// inside the cone.
fn admissible<W: Weight>(basis: Vec<Vec<W>>, condition: &ExactMatrix) -> Option<Vec<W>> {
    let mut candidates = basis.clone();
    if basis.len() > 1 {
        let len = basis[0].len();
        let sum = basis.iter().fold(vec![W::zero(); len], |acc, v| {
            acc.into_iter().zip(v).map(|(a, b)| a + b.clone()).collect()
        });
        candidates.push(sum);
    }
    candidates
        .into_iter()
        .filter_map(orient)
        .find(|v| condition.nrows() == 0 || condition.satisfied_by(v))
}
