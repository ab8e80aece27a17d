//! Dense univariate polynomials over ℚ.
//!
//! Coefficients are stored lowest degree first with no trailing zeros, so the
//! zero polynomial has an empty coefficient vector and structural equality is
//! polynomial equality. Besides ring arithmetic this module provides the
//! pieces real root isolation needs: Euclidean division, gcds, squarefree
//! parts, Sturm sequences, and interval evaluation.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Polynomial {
    coeffs: Vec<BigRational>,
}

impl Polynomial {
    /// Builds a polynomial from coefficients, lowest degree first.
    pub fn new(coeffs: Vec<BigRational>) -> Self {
        let mut p = Polynomial { coeffs };
        p.normalize();
        p
    }

    pub fn from_integers<I: IntoIterator<Item = i64>>(coeffs: I) -> Self {
        Self::new(
            coeffs
                .into_iter()
                .map(|c| BigRational::from_integer(BigInt::from(c)))
                .collect(),
        )
    }

    pub fn from_bigints(coeffs: &[BigInt]) -> Self {
        Self::new(
            coeffs
                .iter()
                .map(|c| BigRational::from_integer(c.clone()))
                .collect(),
        )
    }

    pub fn zero() -> Self {
        Polynomial { coeffs: Vec::new() }
    }

    pub fn one() -> Self {
        Self::constant(BigRational::one())
    }

    pub fn constant(c: BigRational) -> Self {
        Self::new(vec![c])
    }

    /// The polynomial `x`.
    pub fn x() -> Self {
        Self::new(vec![BigRational::zero(), BigRational::one()])
    }

    fn normalize(&mut self) {
        while self.coeffs.last().is_some_and(|c| c.is_zero()) {
            self.coeffs.pop();
        }
    }

    #[inline]
    pub fn coefficients(&self) -> &[BigRational] {
        &self.coeffs
    }

    pub fn coefficient(&self, i: usize) -> BigRational {
        self.coeffs.get(i).cloned().unwrap_or_else(BigRational::zero)
    }

    /// `None` for the zero polynomial.
    #[inline]
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.len().checked_sub(1)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// True for zero and for non-zero constants.
    #[inline]
    pub fn is_constant(&self) -> bool {
        self.coeffs.len() <= 1
    }

    #[inline]
    pub fn leading(&self) -> Option<&BigRational> {
        self.coeffs.last()
    }

    /// Horner evaluation.
    pub fn eval(&self, x: &BigRational) -> BigRational {
        let mut acc = BigRational::zero();
        for c in self.coeffs.iter().rev() {
            acc = acc * x + c;
        }
        acc
    }

    pub fn sign_at(&self, x: &BigRational) -> Ordering {
        self.eval(x).cmp(&BigRational::zero())
    }

    pub fn derivative(&self) -> Self {
        Self::new(
            self.coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, c)| c * BigRational::from_integer(BigInt::from(i)))
                .collect(),
        )
    }

    pub fn scale(&self, c: &BigRational) -> Self {
        Self::new(self.coeffs.iter().map(|a| a * c).collect())
    }

    /// Euclidean division; `None` when dividing by zero.
    pub fn div_rem(&self, divisor: &Polynomial) -> Option<(Polynomial, Polynomial)> {
        let d = divisor.degree()?;
        let lead = divisor.leading()?;
        let n = match self.degree() {
            Some(n) if n >= d => n,
            _ => return Some((Polynomial::zero(), self.clone())),
        };
        let mut rem = self.coeffs.clone();
        let mut quot = vec![BigRational::zero(); n - d + 1];
        for k in (0..=n - d).rev() {
            let coef = &rem[k + d] / lead;
            if coef.is_zero() {
                continue;
            }
            for (j, dc) in divisor.coeffs.iter().enumerate() {
                rem[k + j] = &rem[k + j] - &coef * dc;
            }
            quot[k] = coef;
        }
        rem.truncate(d);
        Some((Polynomial::new(quot), Polynomial::new(rem)))
    }

    /// Remainder modulo `divisor` (self when the divisor is zero).
    pub fn rem(&self, divisor: &Polynomial) -> Polynomial {
        match self.div_rem(divisor) {
            Some((_, r)) => r,
            None => self.clone(),
        }
    }

    /// Quotient when `divisor` divides `self` exactly.
    pub fn exact_div(&self, divisor: &Polynomial) -> Option<Polynomial> {
        let (q, r) = self.div_rem(divisor)?;
        r.is_zero().then_some(q)
    }

    pub fn monic(&self) -> Self {
        match self.leading() {
            Some(lead) => self.scale(&lead.recip()),
            None => Polynomial::zero(),
        }
    }

    /// Monic greatest common divisor.
    pub fn gcd(&self, other: &Polynomial) -> Polynomial {
        let (mut a, mut b) = (self.clone(), other.clone());
        while !b.is_zero() {
            let r = a.rem(&b);
            a = b;
            b = r;
        }
        a.monic()
    }

    /// Returns `(g, s, t)` with `s·self + t·other = g`, `g` monic.
    pub fn extended_gcd(&self, other: &Polynomial) -> (Polynomial, Polynomial, Polynomial) {
        let (mut r0, mut r1) = (self.clone(), other.clone());
        let (mut s0, mut s1) = (Polynomial::one(), Polynomial::zero());
        let (mut t0, mut t1) = (Polynomial::zero(), Polynomial::one());
        while let Some((q, r)) = r0.div_rem(&r1) {
            let s2 = &s0 - &(&q * &s1);
            let t2 = &t0 - &(&q * &t1);
            r0 = std::mem::replace(&mut r1, r);
            s0 = std::mem::replace(&mut s1, s2);
            t0 = std::mem::replace(&mut t1, t2);
        }
        match r0.leading().cloned() {
            Some(lead) => {
                let inv = lead.recip();
                (r0.scale(&inv), s0.scale(&inv), t0.scale(&inv))
            }
            None => (Polynomial::zero(), Polynomial::zero(), Polynomial::zero()),
        }
    }

    /// Monic product of the distinct irreducible factors.
    pub fn squarefree_part(&self) -> Polynomial {
        if self.is_constant() {
            return self.monic();
        }
        let g = self.gcd(&self.derivative());
        self.exact_div(&g).unwrap_or_else(|| self.clone()).monic()
    }

    /// Cauchy bound: every real root lies strictly inside `(-B, B)`.
    pub fn root_bound(&self) -> BigRational {
        let one = BigRational::one();
        let Some(lead) = self.leading() else {
            return one;
        };
        let max = self.coeffs[..self.coeffs.len() - 1]
            .iter()
            .map(|c| (c / lead).abs())
            .max()
            .unwrap_or_else(BigRational::zero);
        one.clone() + max + one
    }

    /// Canonical Sturm sequence `p, p', -rem(p, p'), ...`.
    pub fn sturm_sequence(&self) -> Vec<Polynomial> {
        let mut seq = vec![self.clone()];
        if self.is_zero() {
            return seq;
        }
        let mut prev = self.clone();
        let mut cur = self.derivative();
        while !cur.is_zero() {
            seq.push(cur.clone());
            let next = -prev.rem(&cur);
            prev = cur;
            cur = next;
        }
        seq
    }

    /// Number of distinct roots in `(lo, hi]`.
    pub fn count_roots(&self, lo: &BigRational, hi: &BigRational) -> usize {
        let seq = self.sturm_sequence();
        sign_variations(&seq, lo).saturating_sub(sign_variations(&seq, hi))
    }

    /// Disjoint isolating intervals for the roots in `(lo, hi)`, largest
    /// root first. Endpoints are never roots.
    pub fn isolate_roots(&self, lo: &BigRational, hi: &BigRational) -> Vec<(BigRational, BigRational)> {
        let p = self.squarefree_part();
        if p.is_constant() {
            return Vec::new();
        }
        let seq = p.sturm_sequence();
        let mut out = Vec::new();
        let mut stack = vec![(lo.clone(), hi.clone())];
        while let Some((a, b)) = stack.pop() {
            let n = sign_variations(&seq, &a).saturating_sub(sign_variations(&seq, &b));
            match n {
                0 => {}
                1 => out.push((a, b)),
                _ => {
                    let mid = p.split_point(&a, &b);
                    stack.push((a, mid.clone()));
                    stack.push((mid, b));
                }
            }
        }
        out.sort_by(|x, y| y.0.cmp(&x.0));
        out
    }

    /// A point strictly inside `(lo, hi)` that is not a root.
    pub(crate) fn split_point(&self, lo: &BigRational, hi: &BigRational) -> BigRational {
        let width = hi - lo;
        let two = BigRational::from_integer(BigInt::from(2));
        let mid = lo + &width / two;
        if !self.eval(&mid).is_zero() {
            return mid;
        }
        let mut k = 1i64;
        loop {
            let t = BigRational::new(BigInt::from(k), BigInt::from(2 * k + 1));
            let cand = lo + &width * t;
            if !self.eval(&cand).is_zero() {
                return cand;
            }
            k += 1;
        }
    }

    /// Bounds on `self` over the closed interval `[lo, hi]`.
    pub fn eval_interval(&self, lo: &BigRational, hi: &BigRational) -> (BigRational, BigRational) {
        let mut acc = (BigRational::zero(), BigRational::zero());
        for c in self.coeffs.iter().rev() {
            let products = [&acc.0 * lo, &acc.0 * hi, &acc.1 * lo, &acc.1 * hi];
            let min = products.iter().min().cloned().unwrap_or_else(BigRational::zero);
            let max = products.iter().max().cloned().unwrap_or_else(BigRational::zero);
            acc = (min + c, max + c);
        }
        acc
    }

    /// Integer coefficients with content 1 and positive leading term.
    pub fn primitive_integers(&self) -> Vec<BigInt> {
        let denom = self
            .coeffs
            .iter()
            .fold(BigInt::one(), |acc, c| acc.lcm(c.denom()));
        let ints: Vec<BigInt> = self
            .coeffs
            .iter()
            .map(|c| (c * BigRational::from_integer(denom.clone())).to_integer())
            .collect();
        let content = ints.iter().fold(BigInt::zero(), |acc, c| acc.gcd(c));
        if content.is_zero() {
            return ints;
        }
        let sign = if self.leading().is_some_and(|l| l.is_negative()) {
            -BigInt::one()
        } else {
            BigInt::one()
        };
        ints.into_iter().map(|c| c / &content * &sign).collect()
    }
}

fn sign_variations(seq: &[Polynomial], x: &BigRational) -> usize {
    let mut count = 0;
    let mut last: Option<bool> = None;
    for p in seq {
        let v = p.eval(x);
        if v.is_zero() {
            continue;
        }
        let positive = v.is_positive();
        if last.is_some_and(|l| l != positive) {
            count += 1;
        }
        last = Some(positive);
    }
    count
}

impl<'a> Add<&'a Polynomial> for &'a Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: &'a Polynomial) -> Polynomial {
        let n = self.coeffs.len().max(rhs.coeffs.len());
        Polynomial::new((0..n).map(|i| self.coefficient(i) + rhs.coefficient(i)).collect())
    }
}

impl<'a> Sub<&'a Polynomial> for &'a Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: &'a Polynomial) -> Polynomial {
        let n = self.coeffs.len().max(rhs.coeffs.len());
        Polynomial::new((0..n).map(|i| self.coefficient(i) - rhs.coefficient(i)).collect())
    }
}

impl<'a> Mul<&'a Polynomial> for &'a Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: &'a Polynomial) -> Polynomial {
        if self.is_zero() || rhs.is_zero() {
            return Polynomial::zero();
        }
        let mut out = vec![BigRational::zero(); self.coeffs.len() + rhs.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in rhs.coeffs.iter().enumerate() {
                out[i + j] = &out[i + j] + a * b;
            }
        }
        Polynomial::new(out)
    }
}

impl Neg for Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        Polynomial::new(self.coeffs.into_iter().map(|c| -c).collect())
    }
}

impl Neg for &Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        -self.clone()
    }
}

macro_rules! forward_owned_binop {
    ($tr:ident, $method:ident) => {
        impl $tr for Polynomial {
            type Output = Polynomial;

            #[inline]
            fn $method(self, rhs: Polynomial) -> Polynomial {
                (&self).$method(&rhs)
            }
        }
    };
}

forward_owned_binop!(Add, add);
forward_owned_binop!(Sub, sub);
forward_owned_binop!(Mul, mul);

impl fmt::Debug for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        let mut first = true;
        for (i, c) in self.coeffs.iter().enumerate().rev() {
            if c.is_zero() {
                continue;
            }
            let sign = if c.is_negative() { "-" } else { "+" };
            if first {
                if c.is_negative() {
                    write!(f, "-")?;
                }
            } else {
                write!(f, " {sign} ")?;
            }
            first = false;
            let a = c.abs();
            let show_coeff = i == 0 || !a.is_one();
            if show_coeff {
                write!(f, "{a}")?;
            }
            match i {
                0 => {}
                1 => write!(f, "x")?,
                _ => write!(f, "x^{i}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn division_and_gcd() {
        // (x - 1)(x + 2) = x^2 + x - 2
        let p = Polynomial::from_integers([-2, 1, 1]);
        let d = Polynomial::from_integers([-1, 1]);
        let (quot, rem) = p.div_rem(&d).unwrap();
        assert_eq!(quot, Polynomial::from_integers([2, 1]));
        assert!(rem.is_zero());
        let other = Polynomial::from_integers([-1, 0, 1]); // (x - 1)(x + 1)
        assert_eq!(p.gcd(&other), d);
        assert!(p.div_rem(&Polynomial::zero()).is_none());
    }

    #[test]
    fn extended_gcd_gives_bezout_identity() {
        let a = Polynomial::from_integers([1, -3, 1]);
        let b = Polynomial::from_integers([2, 1]);
        let (g, s, t) = a.extended_gcd(&b);
        assert_eq!(g, Polynomial::one());
        assert_eq!(&(&s * &a) + &(&t * &b), g);
    }

    #[test]
    fn squarefree_part_drops_repeated_factors() {
        // (x - 1)^2 (x + 3)
        let p = &(&Polynomial::from_integers([-1, 1]) * &Polynomial::from_integers([-1, 1]))
            * &Polynomial::from_integers([3, 1]);
        assert_eq!(p.squarefree_part(), Polynomial::from_integers([-3, 2, 1]));
    }

    #[test]
    fn sturm_isolates_golden_roots() {
        let p = Polynomial::from_integers([1, -3, 1]); // roots (3 ± √5)/2
        let bound = p.root_bound();
        let roots = p.isolate_roots(&-bound.clone(), &bound);
        assert_eq!(roots.len(), 2);
        let (lo, hi) = &roots[0];
        assert!(*lo < q(262, 100) && q(261, 100) < *hi);
        assert_eq!(p.count_roots(lo, hi), 1);
        assert!(roots[0].0 >= roots[1].1);
        assert_eq!(p.count_roots(&q(1, 1), &q(3, 1)), 1);
    }

    #[test]
    fn isolation_skips_rational_midpoints() {
        // roots 0 and 2: the first midpoint of (-3, 3) is exactly the root 0
        let p = Polynomial::from_integers([0, -2, 1]);
        let roots = p.isolate_roots(&q(-3, 1), &q(3, 1));
        assert_eq!(roots.len(), 2);
        for (lo, hi) in &roots {
            assert!(!p.eval(lo).is_zero());
            assert!(!p.eval(hi).is_zero());
        }
    }

    #[test]
    fn interval_evaluation_encloses_values() {
        let p = Polynomial::from_integers([1, -3, 1]);
        let (lo, hi) = p.eval_interval(&q(2, 1), &q(3, 1));
        for x in [q(2, 1), q(5, 2), q(3, 1)] {
            let v = p.eval(&x);
            assert!(lo <= v && v <= hi);
        }
    }

    #[test]
    fn display_is_readable() {
        assert_eq!(Polynomial::from_integers([1, -3, 1]).to_string(), "x^2 - 3x + 1");
        assert_eq!(Polynomial::zero().to_string(), "0");
        assert_eq!(
            Polynomial::from_integers([-2, 0, 4]).primitive_integers(),
            vec![BigInt::from(-1), BigInt::from(0), BigInt::from(2)]
        );
    }
}
