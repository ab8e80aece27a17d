//! Real algebraic numbers in a simple extension ℚ(λ).
//!
//! A [`NumberField`] is a squarefree defining polynomial `f` together with an
//! isolating interval for one real root `λ`. Elements ([`AlgebraicNumber`])
//! are polynomials in `λ` reduced modulo `f`. `f` need not be irreducible:
//!
//! - `g(λ) = 0` is decided exactly by checking whether `gcd(g, f)` changes
//!   sign across the isolating interval;
//! - signs of non-zero elements come from interval evaluation, bisecting the
//!   interval until it excludes zero;
//! - inverses are taken modulo the cofactor `f / gcd(g, f)`, which still has
//!   `λ` as a root.
//!
//! Refinements of the interval are shared between all elements of the field
//! through a `parking_lot::RwLock`.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::sync::Arc;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use parking_lot::RwLock;

use crate::exact::polynomial::Polynomial;
use crate::laminar_error::LaminarError;

pub struct NumberField {
    modulus: Polynomial,
    interval: RwLock<(BigRational, BigRational)>,
}

impl NumberField {
    /// The field generated by the unique root of `modulus` in `(lo, hi)`.
    pub fn new(
        modulus: &Polynomial,
        lo: BigRational,
        hi: BigRational,
    ) -> Result<Arc<Self>, LaminarError> {
        let modulus = modulus.squarefree_part();
        if modulus.is_constant() {
            return Err(LaminarError::Internal(format!(
                "defining polynomial {modulus} has no roots"
            )));
        }
        if lo >= hi
            || modulus.eval(&lo).is_zero()
            || modulus.eval(&hi).is_zero()
            || modulus.count_roots(&lo, &hi) != 1
        {
            return Err(LaminarError::Internal(format!(
                "({lo}, {hi}) does not isolate a root of {modulus}"
            )));
        }
        Ok(Arc::new(NumberField {
            modulus,
            interval: RwLock::new((lo, hi)),
        }))
    }

    #[inline]
    pub fn modulus(&self) -> &Polynomial {
        &self.modulus
    }

    pub fn degree(&self) -> usize {
        self.modulus.degree().unwrap_or(0)
    }

    /// Current isolating interval of the generator.
    pub fn interval(&self) -> (BigRational, BigRational) {
        self.interval.read().clone()
    }

    /// Halves the isolating interval.
    fn refine(&self) {
        let mut guard = self.interval.write();
        let (lo, hi) = &*guard;
        let two = BigRational::from_integer(BigInt::from(2));
        let mid = (lo + hi) / &two;
        let at_mid = self.modulus.eval(&mid);
        *guard = if at_mid.is_zero() {
            let quarter = (hi - lo) / (&two * &two);
            (&mid - &quarter, &mid + &quarter)
        } else if at_mid.is_positive() == self.modulus.eval(lo).is_positive() {
            (mid, hi.clone())
        } else {
            (lo.clone(), mid)
        };
    }

    /// Refines until the interval is narrower than `2^-bits`.
    pub fn approximation(&self, bits: u32) -> (BigRational, BigRational) {
        let eps = BigRational::new(BigInt::one(), BigInt::one() << bits as usize);
        loop {
            let (lo, hi) = self.interval();
            if &hi - &lo < eps {
                return (lo, hi);
            }
            self.refine();
        }
    }

    fn reduce(&self, p: &Polynomial) -> Polynomial {
        p.rem(&self.modulus)
    }

    /// Whether `p(λ) = 0`.
    pub fn vanishes(&self, p: &Polynomial) -> bool {
        let p = self.reduce(p);
        if p.is_zero() {
            return true;
        }
        let g = p.gcd(&self.modulus);
        if g.is_constant() {
            return false;
        }
        let (lo, hi) = self.interval();
        g.sign_at(&lo) != g.sign_at(&hi)
    }

    /// Sign of `p(λ)`.
    pub fn sign(&self, p: &Polynomial) -> Ordering {
        let p = self.reduce(p);
        if p.is_constant() {
            return p.coefficient(0).cmp(&BigRational::zero());
        }
        if self.vanishes(&p) {
            return Ordering::Equal;
        }
        let zero = BigRational::zero();
        loop {
            let (lo, hi) = self.interval();
            let (min, max) = p.eval_interval(&lo, &hi);
            if min > zero {
                return Ordering::Greater;
            }
            if max < zero {
                return Ordering::Less;
            }
            self.refine();
        }
    }

    /// `q` with `p(λ)·q(λ) = 1`, or `None` when `p(λ) = 0`.
    pub fn inverse(&self, p: &Polynomial) -> Option<Polynomial> {
        let p = self.reduce(p);
        if self.vanishes(&p) {
            return None;
        }
        let d = p.gcd(&self.modulus);
        let cofactor = self.modulus.exact_div(&d)?;
        let (g, s, _) = p.rem(&cofactor).extended_gcd(&cofactor);
        if g != Polynomial::one() {
            return None;
        }
        Some(self.reduce(&s))
    }
}

/// Whether two handles describe the same root of the same polynomial.
fn same_field(a: &Arc<NumberField>, b: &Arc<NumberField>) -> bool {
    if Arc::ptr_eq(a, b) {
        return true;
    }
    if a.modulus != b.modulus {
        return false;
    }
    let (lo_a, hi_a) = a.interval();
    let (lo_b, hi_b) = b.interval();
    let lo = lo_a.max(lo_b);
    let hi = hi_a.min(hi_b);
    lo < hi && a.modulus.count_roots(&lo, &hi) == 1
}

impl fmt::Debug for NumberField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lo, hi) = self.interval();
        f.debug_struct("NumberField")
            .field("modulus", &self.modulus)
            .field("interval", &format_args!("({lo}, {hi})"))
            .finish()
    }
}

/// An element of ℚ or of a [`NumberField`].
///
/// Arithmetic between elements of two different fields is a logic error and
/// panics.
#[derive(Clone)]
pub struct AlgebraicNumber {
    field: Option<Arc<NumberField>>,
    value: Polynomial,
}

impl AlgebraicNumber {
    pub fn from_rational(r: BigRational) -> Self {
        AlgebraicNumber {
            field: None,
            value: Polynomial::constant(r),
        }
    }

    pub fn from_integer(n: BigInt) -> Self {
        Self::from_rational(BigRational::from_integer(n))
    }

    pub fn from_i64(n: i64) -> Self {
        Self::from_integer(BigInt::from(n))
    }

    /// `value(λ)` in `field`.
    pub fn in_field(field: &Arc<NumberField>, value: &Polynomial) -> Self {
        AlgebraicNumber {
            value: field.reduce(value),
            field: Some(field.clone()),
        }
    }

    /// The generator `λ` of `field`.
    pub fn generator(field: &Arc<NumberField>) -> Self {
        Self::in_field(field, &Polynomial::x())
    }

    #[inline]
    pub fn field(&self) -> Option<&Arc<NumberField>> {
        self.field.as_ref()
    }

    #[inline]
    pub fn value(&self) -> &Polynomial {
        &self.value
    }

    /// The rational value when the element is constant.
    pub fn as_rational(&self) -> Option<BigRational> {
        self.value.is_constant().then(|| self.value.coefficient(0))
    }

    fn join(&self, other: &Self) -> Option<Arc<NumberField>> {
        match (&self.field, &other.field) {
            (Some(a), Some(b)) => {
                assert!(
                    same_field(a, b),
                    "arithmetic between algebraic numbers of different number fields"
                );
                Some(a.clone())
            }
            (Some(a), None) | (None, Some(a)) => Some(a.clone()),
            (None, None) => None,
        }
    }

    fn make(field: Option<Arc<NumberField>>, value: Polynomial) -> Self {
        match field {
            Some(f) => AlgebraicNumber {
                value: f.reduce(&value),
                field: Some(f),
            },
            None => AlgebraicNumber { field: None, value },
        }
    }

    pub fn sign(&self) -> Ordering {
        match &self.field {
            Some(f) => f.sign(&self.value),
            None => self.value.coefficient(0).cmp(&BigRational::zero()),
        }
    }

    pub fn is_positive(&self) -> bool {
        self.sign() == Ordering::Greater
    }

    /// Multiplicative inverse, `None` for zero.
    pub fn inverse(&self) -> Option<Self> {
        match &self.field {
            Some(f) => f.inverse(&self.value).map(|v| Self::make(Some(f.clone()), v)),
            None => {
                let c = self.value.coefficient(0);
                (!c.is_zero()).then(|| Self::from_rational(c.recip()))
            }
        }
    }

    pub fn checked_div(&self, other: &Self) -> Option<Self> {
        other.inverse().map(|inv| self * &inv)
    }

    /// Division by a non-zero integer.
    pub fn div_integer(&self, d: &BigInt) -> Self {
        let inv = BigRational::new(BigInt::one(), d.clone());
        AlgebraicNumber {
            field: self.field.clone(),
            value: self.value.scale(&inv),
        }
    }

    /// Floating point approximation accurate to about 60 bits.
    pub fn to_f64(&self) -> f64 {
        match (&self.field, self.as_rational()) {
            (_, Some(r)) => rational_to_f64(&r),
            (Some(f), None) => {
                let (lo, hi) = f.approximation(60);
                let mid = (lo + hi) / BigRational::from_integer(BigInt::from(2));
                rational_to_f64(&self.value.eval(&mid))
            }
            (None, None) => f64::NAN,
        }
    }
}

pub(crate) fn rational_to_f64(r: &BigRational) -> f64 {
    let (n, d) = (r.numer(), r.denom());
    if n.is_zero() {
        return 0.0;
    }
    let shift = d.bits() as i64 - n.bits() as i64 + 64;
    let q = if shift >= 0 {
        (n << shift as usize) / d
    } else {
        n / (d << (-shift) as usize)
    };
    q.to_f64().unwrap_or(f64::NAN) * 2f64.powi(-(shift as i32))
}

impl<'a> Add<&'a AlgebraicNumber> for &'a AlgebraicNumber {
    type Output = AlgebraicNumber;

    fn add(self, rhs: &'a AlgebraicNumber) -> AlgebraicNumber {
        AlgebraicNumber::make(self.join(rhs), &self.value + &rhs.value)
    }
}

impl<'a> Sub<&'a AlgebraicNumber> for &'a AlgebraicNumber {
    type Output = AlgebraicNumber;

    fn sub(self, rhs: &'a AlgebraicNumber) -> AlgebraicNumber {
        AlgebraicNumber::make(self.join(rhs), &self.value - &rhs.value)
    }
}

impl<'a> Mul<&'a AlgebraicNumber> for &'a AlgebraicNumber {
    type Output = AlgebraicNumber;

    fn mul(self, rhs: &'a AlgebraicNumber) -> AlgebraicNumber {
        AlgebraicNumber::make(self.join(rhs), &self.value * &rhs.value)
    }
}

macro_rules! forward_owned_binop {
    ($tr:ident, $method:ident) => {
        impl $tr for AlgebraicNumber {
            type Output = AlgebraicNumber;

            #[inline]
            fn $method(self, rhs: AlgebraicNumber) -> AlgebraicNumber {
                (&self).$method(&rhs)
            }
        }
    };
}

forward_owned_binop!(Add, add);
forward_owned_binop!(Sub, sub);
forward_owned_binop!(Mul, mul);

impl Neg for AlgebraicNumber {
    type Output = AlgebraicNumber;

    fn neg(self) -> AlgebraicNumber {
        AlgebraicNumber {
            field: self.field,
            value: -self.value,
        }
    }
}

impl Neg for &AlgebraicNumber {
    type Output = AlgebraicNumber;

    fn neg(self) -> AlgebraicNumber {
        -self.clone()
    }
}

impl Zero for AlgebraicNumber {
    fn zero() -> Self {
        AlgebraicNumber::from_rational(BigRational::zero())
    }

    fn is_zero(&self) -> bool {
        match &self.field {
            Some(f) => f.vanishes(&self.value),
            None => self.value.is_zero(),
        }
    }
}

impl One for AlgebraicNumber {
    fn one() -> Self {
        AlgebraicNumber::from_rational(BigRational::one())
    }
}

impl PartialEq for AlgebraicNumber {
    fn eq(&self, other: &Self) -> bool {
        (self - other).is_zero()
    }
}

impl Eq for AlgebraicNumber {}

impl PartialOrd for AlgebraicNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AlgebraicNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        (self - other).sign()
    }
}

impl From<BigInt> for AlgebraicNumber {
    fn from(n: BigInt) -> Self {
        AlgebraicNumber::from_integer(n)
    }
}

impl fmt::Debug for AlgebraicNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.field, self.as_rational()) {
            (_, Some(r)) => write!(f, "{r}"),
            (Some(field), None) => write!(
                f,
                "{:.6} [{} mod {}]",
                self.to_f64(),
                self.value,
                field.modulus()
            ),
            (None, None) => write!(f, "{}", self.value),
        }
    }
}

impl fmt::Display for AlgebraicNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_rational() {
            Some(r) => write!(f, "{r}"),
            None => write!(f, "{:.6}", self.to_f64()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    /// ℚ(λ) with λ = (3 + √5)/2, the largest root of x² - 3x + 1.
    fn golden_square() -> Arc<NumberField> {
        NumberField::new(&Polynomial::from_integers([1, -3, 1]), q(2, 1), q(3, 1)).unwrap()
    }

    #[test]
    fn rejects_non_isolating_intervals() {
        let f = Polynomial::from_integers([1, -3, 1]);
        assert!(NumberField::new(&f, q(0, 1), q(3, 1)).is_err());
        assert!(NumberField::new(&Polynomial::one(), q(0, 1), q(1, 1)).is_err());
    }

    #[test]
    fn generator_satisfies_its_polynomial() {
        let field = golden_square();
        let l = AlgebraicNumber::generator(&field);
        let three = AlgebraicNumber::from_i64(3);
        let value = &(&l * &l) - &(&three * &l) + AlgebraicNumber::one();
        assert!(value.is_zero());
        assert!(l > three.clone() - AlgebraicNumber::one());
        assert!(l < three);
        assert!((l.to_f64() - 2.618034).abs() < 1e-6);
    }

    #[test]
    fn inverse_and_division() {
        let field = golden_square();
        let l = AlgebraicNumber::generator(&field);
        let inv = l.inverse().unwrap();
        assert_eq!(&l * &inv, AlgebraicNumber::one());
        // 1/λ = 3 - λ
        assert_eq!(inv, AlgebraicNumber::from_i64(3) - l.clone());
        assert!(AlgebraicNumber::zero().inverse().is_none());
        assert_eq!(l.checked_div(&l).unwrap(), AlgebraicNumber::one());
    }

    #[test]
    fn reducible_modulus_still_decides_zero() {
        // f = (x - 1)(x^2 - 3x + 1), λ the golden root near 2.618
        let f = &Polynomial::from_integers([-1, 1]) * &Polynomial::from_integers([1, -3, 1]);
        let field = NumberField::new(&f, q(2, 1), q(3, 1)).unwrap();
        let l = AlgebraicNumber::generator(&field);
        let g = AlgebraicNumber::in_field(&field, &Polynomial::from_integers([1, -3, 1]));
        assert!(g.is_zero());
        let h = AlgebraicNumber::in_field(&field, &Polynomial::from_integers([-1, 1]));
        assert!(h.is_positive());
        let inv = h.inverse().unwrap();
        assert_eq!(&h * &inv, AlgebraicNumber::one());
        assert!(l > AlgebraicNumber::from_i64(2));
    }

    #[test]
    fn rational_conversion() {
        assert_eq!(rational_to_f64(&q(1, 4)), 0.25);
        assert_eq!(rational_to_f64(&q(-7, 2)), -3.5);
        assert_eq!(AlgebraicNumber::from_i64(5).to_string(), "5");
    }
}
