//! Small, copyable permutation groups used for triangle gluing data.
//!
//! `Permutation<K>` maps `[0..K)` to itself. Composition follows the usual
//! convention `p ∘ q` (apply `q`, then `p`). Ranking enumerates S_K in
//! lexicographic order of image arrays, so ranks double as compact symbols
//! inside isomorphism signatures.

use core::fmt::{Debug, Formatter};
use core::ops::Mul;

/// An element of the symmetric group S_K.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Permutation<const K: usize>(pub(crate) [u8; K]);

impl<const K: usize> Default for Permutation<K> {
    fn default() -> Self {
        let mut id = [0u8; K];
        let mut i = 0;
        while i < K {
            id[i] = i as u8;
            i += 1;
        }
        Permutation(id)
    }
}

impl<const K: usize> Debug for Permutation<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Permutation").field(&self.0).finish()
    }
}

impl<const K: usize> Permutation<K> {
    #[inline]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Builds a permutation from its image array, rejecting non-bijections.
    pub fn new(images: [u8; K]) -> Option<Self> {
        let mut seen = [false; K];
        for &x in &images {
            let x = x as usize;
            if x >= K || seen[x] {
                return None;
            }
            seen[x] = true;
        }
        Some(Permutation(images))
    }

    #[inline]
    pub fn new_unchecked(images: [u8; K]) -> Self {
        Permutation(images)
    }

    #[inline]
    pub fn images(&self) -> [u8; K] {
        self.0
    }

    #[inline]
    pub fn apply(&self, i: usize) -> usize {
        self.0[i] as usize
    }

    /// `self ∘ other`.
    #[inline]
    pub fn compose(&self, other: &Self) -> Self {
        let mut out = [0u8; K];
        let mut i = 0;
        while i < K {
            out[i] = self.0[other.0[i] as usize];
            i += 1;
        }
        Permutation(out)
    }

    #[inline]
    pub fn inverse(&self) -> Self {
        let mut inv = [0u8; K];
        let mut i = 0;
        while i < K {
            inv[self.0[i] as usize] = i as u8;
            i += 1;
        }
        Permutation(inv)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// `+1` for even permutations, `-1` for odd ones.
    pub fn sign(&self) -> i32 {
        let mut seen = [false; K];
        let mut transpositions = 0;
        for start in 0..K {
            if seen[start] {
                continue;
            }
            let mut len = 0;
            let mut i = start;
            while !seen[i] {
                seen[i] = true;
                i = self.0[i] as usize;
                len += 1;
            }
            transpositions += len - 1;
        }
        if transpositions % 2 == 0 { 1 } else { -1 }
    }

    #[inline]
    pub fn is_even(&self) -> bool {
        self.sign() == 1
    }

    /// Extends to S_M by fixing `K..M`. `None` when `M < K`.
    pub fn embed<const M: usize>(&self) -> Option<Permutation<M>> {
        if M < K {
            return None;
        }
        let mut out = Permutation::<M>::identity();
        out.0[..K].copy_from_slice(&self.0);
        Some(out)
    }

    /// Position in the lexicographic enumeration of S_K.
    pub fn rank(&self) -> usize {
        let mut rank = 0;
        for i in 0..K {
            let smaller_later = self.0[i + 1..].iter().filter(|&&x| x < self.0[i]).count();
            rank += smaller_later * factorial(K - 1 - i);
        }
        rank
    }

    /// Inverse of [`rank`](Self::rank); `None` when `rank >= K!`.
    pub fn from_rank(mut rank: usize) -> Option<Self> {
        if rank >= factorial(K) {
            return None;
        }
        let mut remaining: Vec<u8> = (0..K as u8).collect();
        let mut out = [0u8; K];
        for (i, slot) in out.iter_mut().enumerate() {
            let f = factorial(K - 1 - i);
            *slot = remaining.remove(rank / f);
            rank %= f;
        }
        Some(Permutation(out))
    }

    /// All of S_K in rank order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..factorial(K)).filter_map(Self::from_rank)
    }
}

impl<const K: usize> Mul for Permutation<K> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.compose(&rhs)
    }
}

fn factorial(n: usize) -> usize {
    (1..=n).product()
}

/// Triangle corner permutations.
pub type S3 = Permutation<3>;
/// Permutations of the four corners of a flip square.
pub type S4 = Permutation<4>;

impl S3 {
    /// Corner correspondence when side `side` of one triangle is glued to
    /// side `other_side` of another with the orientation reversed.
    pub(crate) fn gluing(side: usize, other_side: usize) -> S3 {
        let mut out = [0u8; 3];
        out[side % 3] = (other_side % 3) as u8;
        out[(side + 1) % 3] = ((other_side + 2) % 3) as u8;
        out[(side + 2) % 3] = ((other_side + 1) % 3) as u8;
        Permutation(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_and_inverse() {
        let p = S3::new([1, 2, 0]).unwrap();
        assert_eq!(p.compose(&p.inverse()), S3::identity());
        assert_eq!((p * p * p), S3::identity());
        assert!(S3::new([0, 0, 1]).is_none());
    }

    #[test]
    fn rank_enumerates_lexicographically() {
        let all: Vec<S3> = S3::all().collect();
        assert_eq!(all.len(), 6);
        assert_eq!(all[0], S3::identity());
        assert_eq!(all[5].images(), [2, 1, 0]);
        for (r, p) in all.iter().enumerate() {
            assert_eq!(p.rank(), r);
        }
        assert!(all.windows(2).all(|w| w[0] < w[1]));
        assert!(S4::from_rank(24).is_none());
        assert_eq!(S4::all().count(), 24);
    }

    #[test]
    fn parity() {
        assert_eq!(S3::identity().sign(), 1);
        assert_eq!(S3::new([1, 0, 2]).unwrap().sign(), -1);
        assert!(S3::new([1, 2, 0]).unwrap().is_even());
        let evens = S4::all().filter(|p| p.is_even()).count();
        assert_eq!(evens, 12);
    }

    #[test]
    fn embedding_preserves_sign() {
        for p in S3::all() {
            let q: S4 = p.embed().unwrap();
            assert_eq!(q.sign(), p.sign());
            assert_eq!(q.apply(3), 3);
        }
        assert!(S4::identity().embed::<3>().is_none());
    }

    #[test]
    fn gluings_are_odd() {
        for a in 0..3 {
            for b in 0..3 {
                let g = S3::gluing(a, b);
                assert_eq!(g.apply(a), b);
                assert_eq!(g.sign(), -1);
            }
        }
    }
}
