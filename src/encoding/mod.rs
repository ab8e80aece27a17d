//! Encodings: composable sequences of moves between triangulations.
//!
//! An [`Encoding`] stores its moves in composition order, so `moves()[0]` is
//! applied last, exactly as in `f ∘ g`. An encoding whose source and target
//! agree is a *mapping class*; the predicates and the invariant-lamination
//! search live in [`mapping_class`] and [`invariant`].
//!
//! Each encoding owns a memo ([`EncodingCache`]) that is written at most once
//! per query. Every operation that builds a structurally new encoding starts
//! a fresh memo, so memoised answers never leak between encodings.

pub mod invariant;
pub mod mapping_class;
pub mod moves;
pub mod package;
pub mod pl;

use std::fmt;
use std::ops::Mul;
use std::sync::Arc;

use num_bigint::BigInt;
use once_cell::sync::OnceCell;

use crate::exact::number_field::AlgebraicNumber;
use crate::exact::weight::Weight;
use crate::laminar_error::LaminarError;
use crate::lamination::{same_triangulation, Lamination, SplittingSequence};
use crate::topology::triangulation::Triangulation;

pub use invariant::InvariantLamination;
pub use mapping_class::NielsenThurstonType;
pub use moves::{EdgeFlip, Isometry, LinearTransformation, Move};

/// What two encodings must agree on to be considered equal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodingIdentity {
    pub source: Arc<Triangulation>,
    pub target: Arc<Triangulation>,
    /// Geometric images of the key curves.
    pub key_curve_images: Vec<Vec<BigInt>>,
    /// Algebraic images of the homology basis.
    pub homology_images: Vec<Vec<BigInt>>,
}

/// Per-encoding memo; each slot is written at most once.
#[derive(Default)]
pub struct EncodingCache {
    pub(crate) name: OnceCell<String>,
    pub(crate) identity: OnceCell<Result<EncodingIdentity, LaminarError>>,
    pub(crate) order: OnceCell<Result<usize, LaminarError>>,
    pub(crate) invariant: OnceCell<Result<InvariantLamination, LaminarError>>,
    pub(crate) splitting: OnceCell<Result<SplittingSequence<AlgebraicNumber>, LaminarError>>,
}

#[derive(Clone)]
pub struct Encoding {
    moves: Vec<Move>,
    cache: Arc<EncodingCache>,
}

impl Encoding {
    /// Builds an encoding from moves in composition order, checking that
    /// each move's source is the next move's target.
    pub fn from_moves(moves: Vec<Move>) -> Result<Self, LaminarError> {
        if moves.is_empty() {
            return Err(LaminarError::IncompatibleTriangulations(
                "an encoding needs at least one move".into(),
            ));
        }
        for pair in moves.windows(2) {
            if !same_triangulation(pair[0].source(), pair[1].target()) {
                return Err(LaminarError::IncompatibleTriangulations(
                    "consecutive moves do not chain".into(),
                ));
            }
        }
        Ok(Self::from_moves_unchecked(moves))
    }

    pub(crate) fn from_moves_unchecked(moves: Vec<Move>) -> Self {
        debug_assert!(!moves.is_empty());
        debug_assert!(
            moves
                .windows(2)
                .all(|p| same_triangulation(p[0].source(), p[1].target()))
        );
        Encoding {
            moves,
            cache: Arc::new(EncodingCache::default()),
        }
    }

    /// Builds an encoding from moves listed in the order they are applied.
    pub(crate) fn from_applied(mut applied: Vec<Move>) -> Self {
        applied.reverse();
        Self::from_moves_unchecked(applied)
    }

    /// The identity mapping class of `triangulation`.
    pub fn identity(triangulation: &Arc<Triangulation>) -> Self {
        Self::from_moves_unchecked(vec![Move::Isometry(Isometry::identity(triangulation))])
    }

    /// Same moves with a display name and a fresh memo.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        let cache = EncodingCache::default();
        let _ = cache.name.set(name.into());
        Encoding {
            moves: self.moves,
            cache: Arc::new(cache),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.cache.name.get().map(String::as_str)
    }

    /// Moves in composition order (`moves()[0]` is applied last).
    #[inline]
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn source(&self) -> &Arc<Triangulation> {
        self.moves[self.moves.len() - 1].source()
    }

    pub fn target(&self) -> &Arc<Triangulation> {
        self.moves[0].target()
    }

    pub fn is_mapping_class(&self) -> bool {
        same_triangulation(self.source(), self.target())
    }

    /// `self ∘ other`.
    pub fn compose(&self, other: &Encoding) -> Result<Encoding, LaminarError> {
        if !same_triangulation(self.source(), other.target()) {
            return Err(LaminarError::IncompatibleTriangulations(
                "source of the left factor is not the target of the right one".into(),
            ));
        }
        Ok(self * other)
    }

    pub fn inverse(&self) -> Result<Encoding, LaminarError> {
        let moves = self
            .moves
            .iter()
            .rev()
            .map(Move::inverse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_moves_unchecked(moves))
    }

    /// `self^k`; negative powers go through the inverse.
    pub fn pow(&self, k: i64) -> Result<Encoding, LaminarError> {
        if k == 1 {
            return Ok(Self::from_moves_unchecked(self.moves.clone()));
        }
        if !self.is_mapping_class() {
            return Err(LaminarError::NotMappingClass);
        }
        if k == 0 {
            return Ok(Encoding::identity(self.source()));
        }
        let base = if k < 0 { self.inverse()? } else { self.clone() };
        let n = k.unsigned_abs() as usize;
        let mut moves = Vec::with_capacity(n * base.len());
        for _ in 0..n {
            moves.extend(base.moves.iter().cloned());
        }
        Ok(Self::from_moves_unchecked(moves))
    }

    /// Pushes a lamination on the source through every move.
    pub fn apply<W: Weight>(&self, lamination: &Lamination<W>) -> Result<Lamination<W>, LaminarError> {
        self.moves
            .iter()
            .rev()
            .try_fold(lamination.clone(), |lam, m| m.apply(&lam))
    }

    /// Edge indices of the flips, in the order they are applied.
    pub fn flip_indices(&self) -> Vec<usize> {
        self.moves
            .iter()
            .rev()
            .filter_map(|m| match m {
                Move::EdgeFlip(f) => Some(f.index()),
                _ => None,
            })
            .collect()
    }

    /// The final move, when it is an isometry.
    pub fn closing_isometry(&self) -> Option<&Isometry> {
        match self.moves.first() {
            Some(Move::Isometry(iso)) => Some(iso),
            _ => None,
        }
    }

    /// Source, target and the images of the key curves and homology basis.
    pub fn identify(&self) -> Result<&EncodingIdentity, LaminarError> {
        self.cache
            .identity
            .get_or_init(|| self.compute_identity())
            .as_ref()
            .map_err(Clone::clone)
    }

    fn compute_identity(&self) -> Result<EncodingIdentity, LaminarError> {
        let source = self.source();
        let key_curve_images = source
            .key_curves()
            .iter()
            .map(|c| Ok(self.apply(c)?.geometric().to_vec()))
            .collect::<Result<_, LaminarError>>()?;
        let homology_images = source
            .homology_curves()
            .iter()
            .map(|c| Ok(self.apply(c)?.algebraic().to_vec()))
            .collect::<Result<_, LaminarError>>()?;
        Ok(EncodingIdentity {
            source: Arc::clone(source),
            target: Arc::clone(self.target()),
            key_curve_images,
            homology_images,
        })
    }

    pub(crate) fn cache(&self) -> &EncodingCache {
        &self.cache
    }
}

impl Mul for &Encoding {
    type Output = Encoding;

    /// `self ∘ rhs`; chaining is only checked in debug builds.
    fn mul(self, rhs: &Encoding) -> Encoding {
        let mut moves = Vec::with_capacity(self.len() + rhs.len());
        moves.extend(self.moves.iter().cloned());
        moves.extend(rhs.moves.iter().cloned());
        Encoding::from_moves_unchecked(moves)
    }
}

impl PartialEq for Encoding {
    fn eq(&self, other: &Self) -> bool {
        match (self.identify(), other.identify()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoding")
            .field("name", &self.name())
            .field("moves", &self.moves.len())
            .field("flips", &self.flip_indices())
            .finish()
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "<encoding of {} moves>", self.moves.len()),
        }
    }
}
