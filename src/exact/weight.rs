//! The numeric domain laminations are measured in.
//!
//! Integer laminations (`BigInt`) carry curves and multicurves; invariant
//! laminations of pseudo-Anosov classes need real algebraic weights
//! ([`AlgebraicNumber`]). Everything in the lamination and encoding layers is
//! generic over [`Weight`] so both flow through the same code.

use std::fmt::Debug;
use std::ops::{Add, Mul, Neg, Sub};

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};

use crate::exact::number_field::AlgebraicNumber;

/// An exact, totally ordered ring element usable as a lamination weight.
pub trait Weight:
    Clone
    + Debug
    + Ord
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    fn from_integer(n: BigInt) -> Self;

    /// `self / d` when the quotient stays in the domain.
    fn div_exact(&self, d: &BigInt) -> Option<Self>;

    /// The integer value, when `self` is an integer.
    fn to_integer(&self) -> Option<BigInt>;

    /// A floating point approximation, for hashing heuristics and display.
    fn approximate(&self) -> f64;

    /// `floor(self · scale / total)` for `total > 0`.
    fn scaled_floor(&self, scale: &BigInt, total: &Self) -> BigInt {
        let target = self.clone() * Self::from_integer(scale.clone());
        let estimate =
            self.approximate() / total.approximate() * ToPrimitive::to_f64(scale).unwrap_or(f64::MAX);
        let mut guess = if estimate.is_finite() {
            BigInt::from(estimate.floor() as i64)
        } else {
            BigInt::zero()
        };
        while Self::from_integer(guess.clone()) * total.clone() > target {
            guess -= 1;
        }
        while Self::from_integer(&guess + 1) * total.clone() <= target {
            guess += 1;
        }
        guess
    }
}

impl Weight for BigInt {
    #[inline]
    fn from_integer(n: BigInt) -> Self {
        n
    }

    fn div_exact(&self, d: &BigInt) -> Option<Self> {
        if d.is_zero() || !self.is_multiple_of(d) {
            return None;
        }
        Some(self / d)
    }

    #[inline]
    fn to_integer(&self) -> Option<BigInt> {
        Some(self.clone())
    }

    fn approximate(&self) -> f64 {
        ToPrimitive::to_f64(self).unwrap_or(f64::NAN)
    }

    fn scaled_floor(&self, scale: &BigInt, total: &Self) -> BigInt {
        (self * scale).div_floor(total)
    }
}

impl Weight for AlgebraicNumber {
    fn from_integer(n: BigInt) -> Self {
        AlgebraicNumber::from_integer(n)
    }

    fn div_exact(&self, d: &BigInt) -> Option<Self> {
        if d.is_zero() {
            return None;
        }
        Some(self.div_integer(d))
    }

    fn to_integer(&self) -> Option<BigInt> {
        self.as_rational()
            .filter(|r| r.is_integer())
            .map(|r| r.to_integer())
    }

    fn approximate(&self) -> f64 {
        self.to_f64()
    }
}

/// Sum of a slice of weights.
pub fn total<W: Weight>(ws: &[W]) -> W {
    ws.iter().cloned().fold(W::zero(), |acc, w| acc + w)
}

/// `2` in any weight domain.
#[inline]
pub(crate) fn two<W: Weight>() -> W {
    W::one() + W::one()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_division_is_exact_only() {
        let six = BigInt::from(6);
        assert_eq!(six.div_exact(&BigInt::from(3)), Some(BigInt::from(2)));
        assert_eq!(six.div_exact(&BigInt::from(4)), None);
        assert_eq!(six.div_exact(&BigInt::zero()), None);
    }

    #[test]
    fn scaled_floor_matches_integer_division() {
        let w = BigInt::from(7);
        let total = BigInt::from(20);
        assert_eq!(w.scaled_floor(&BigInt::from(100), &total), BigInt::from(35));
        let third = AlgebraicNumber::from_integer(BigInt::from(1));
        let three = AlgebraicNumber::from_integer(BigInt::from(3));
        assert_eq!(third.scaled_floor(&BigInt::from(100), &three), BigInt::from(33));
    }

    #[test]
    fn totals() {
        let ws: Vec<BigInt> = (1..=4).map(BigInt::from).collect();
        assert_eq!(total(&ws), BigInt::from(10));
        assert_eq!(two::<BigInt>(), BigInt::from(2));
    }
}
