//! `EdgeLabel`: a strong, zero-cost handle for oriented edges
//!
//! Every edge of an ideal triangulation has an index `0..ζ` and two
//! orientations. The positive orientation carries label `i`, the negative
//! one carries `~i = -i - 1`, so inversion is bitwise negation and needs no
//! back pointer.
//!
//! This module provides:
//! - A transparent `EdgeLabel` newtype around `i32`.
//! - `!label` as the orientation reversal, plus index and sign accessors.
//! - `Debug`/`Display` printing negative labels in `~i` form.

use std::{fmt, ops::Not};

/// An oriented edge of a triangulation.
///
/// # Memory layout
/// This type is `repr(transparent)` over `i32`.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct EdgeLabel(i32);

impl EdgeLabel {
    /// Wraps a raw label; negative values denote `~index`.
    #[inline]
    pub const fn new(raw: i32) -> Self {
        EdgeLabel(raw)
    }

    /// The positively oriented label of edge `index`.
    #[inline]
    pub const fn positive(index: usize) -> Self {
        EdgeLabel(index as i32)
    }

    /// The negatively oriented label of edge `index`.
    #[inline]
    pub const fn negative(index: usize) -> Self {
        EdgeLabel(!(index as i32))
    }

    /// Returns the raw `i32` value.
    #[inline]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Index of the underlying unoriented edge.
    #[inline]
    pub const fn index(self) -> usize {
        if self.0 >= 0 {
            self.0 as usize
        } else {
            (!self.0) as usize
        }
    }

    #[inline]
    pub const fn is_positive(self) -> bool {
        self.0 >= 0
    }

    /// `+1` for positive labels and `-1` for negative ones.
    #[inline]
    pub const fn sign(self) -> i32 {
        if self.0 >= 0 { 1 } else { -1 }
    }

    /// Dense slot in `0..2ζ`: `2·index` for `i`, `2·index + 1` for `~i`.
    #[inline]
    pub(crate) const fn slot(self) -> usize {
        2 * self.index() + (self.0 < 0) as usize
    }

    #[inline]
    pub(crate) const fn from_slot(slot: usize) -> Self {
        if slot % 2 == 0 {
            EdgeLabel::positive(slot / 2)
        } else {
            EdgeLabel::negative(slot / 2)
        }
    }
}

impl Not for EdgeLabel {
    type Output = EdgeLabel;

    #[inline]
    fn not(self) -> EdgeLabel {
        EdgeLabel(!self.0)
    }
}

impl From<i32> for EdgeLabel {
    #[inline]
    fn from(raw: i32) -> Self {
        EdgeLabel(raw)
    }
}

impl fmt::Debug for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Prints `i` for positive labels and `~i` for negative ones.
impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_positive() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "~{}", self.index())
        }
    }
}

#[cfg(test)]
mod layout_tests {
    use super::*;
    use static_assertions::assert_eq_size;

    assert_eq_size!(EdgeLabel, i32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_is_an_involution() {
        for raw in -5..5 {
            let l = EdgeLabel::new(raw);
            assert_eq!(!!l, l);
            assert_ne!(!l, l);
            assert_eq!((!l).index(), l.index());
        }
    }

    #[test]
    fn index_and_sign() {
        assert_eq!(EdgeLabel::new(3).index(), 3);
        assert_eq!(EdgeLabel::new(-4).index(), 3);
        assert_eq!(EdgeLabel::new(-4), !EdgeLabel::new(3));
        assert_eq!(EdgeLabel::new(-1).sign(), -1);
        assert_eq!(EdgeLabel::negative(0), EdgeLabel::new(-1));
    }

    #[test]
    fn slots_are_dense() {
        let slots: Vec<usize> = [0, -1, 1, -2, 2, -3]
            .iter()
            .map(|&r| EdgeLabel::new(r).slot())
            .collect();
        assert_eq!(slots, vec![0, 1, 2, 3, 4, 5]);
        for s in 0..6 {
            assert_eq!(EdgeLabel::from_slot(s).slot(), s);
        }
    }

    #[test]
    fn debug_and_display() {
        assert_eq!(format!("{}", EdgeLabel::new(7)), "7");
        assert_eq!(format!("{:?}", EdgeLabel::new(-8)), "~7");
    }
}
