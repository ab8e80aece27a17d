//! LaminarError: unified error type for laminar public APIs
//!
//! Every fallible operation in the crate returns `Result<_, LaminarError>`.
//! Variants fall into three non-overlapping kinds, reported by
//! [`LaminarError::kind`]:
//!
//! - **Assumption** failures: a mathematical precondition does not hold
//!   (edge not flippable, lamination not filling, class not pseudo-Anosov).
//!   Callers routinely use these as control flow, e.g. when probing for
//!   reducibility.
//! - **Computation** failures: the eigenvector oracle found nothing in the
//!   examined cell. The search loop retries elsewhere.
//! - **Fatal** failures: an internal invariant was violated. Never retry.

use thiserror::Error;

use crate::topology::label::EdgeLabel;

/// Coarse classification of a [`LaminarError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Assumption,
    Computation,
    Fatal,
}

/// Unified error type for laminar operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LaminarError {
    /// Triangle data does not describe a closed ideal triangulation.
    #[error("invalid triangulation: {0}")]
    InvalidTriangulation(String),
    /// Both sides of the edge lie in the same triangle.
    #[error("edge {0} is not flippable")]
    NotFlippable(EdgeLabel),
    /// Weights are negative, of the wrong length, or violate a triangle inequality.
    #[error("invalid lamination: {0}")]
    InvalidLamination(String),
    /// No isometry satisfies the requested constraints.
    #[error("no isometry: {0}")]
    NoIsometry(String),
    /// Two objects live on different triangulations.
    #[error("incompatible triangulations: {0}")]
    IncompatibleTriangulations(String),
    /// The operation needs an encoding whose source equals its target.
    #[error("encoding is not a mapping class")]
    NotMappingClass,
    /// The move (or encoding containing it) has no inverse.
    #[error("move is not invertible: {0}")]
    NotInvertible(&'static str),
    /// A splitting sequence could not be built from the lamination.
    #[error("lamination is not filling")]
    NotFilling,
    /// The mapping class is periodic or reducible.
    #[error("mapping class is not pseudo-Anosov: {0}")]
    NotPseudoAnosov(String),
    /// A reducing curve (or rational invariant subspace) was found.
    #[error("mapping class is reducible: {0}")]
    Reducible(String),
    #[error("lamination is not a twistable curve")]
    NotTwistable,
    #[error("lamination is not a half-twistable curve")]
    NotHalfTwistable,
    /// A word used a letter with no registered generator.
    #[error("unknown generator `{0}`")]
    UnknownLetter(char),
    /// The eigenvector oracle found no admissible eigenvector in the cell.
    #[error("no interesting eigenvector in this cell")]
    NoInterestingEigenvector,
    /// An internal invariant was violated.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LaminarError {
    /// Which of the three failure kinds this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        use LaminarError::*;
        match self {
            NoInterestingEigenvector => ErrorKind::Computation,
            Internal(_) => ErrorKind::Fatal,
            InvalidTriangulation(_)
            | NotFlippable(_)
            | InvalidLamination(_)
            | NoIsometry(_)
            | IncompatibleTriangulations(_)
            | NotMappingClass
            | NotInvertible(_)
            | NotFilling
            | NotPseudoAnosov(_)
            | Reducible(_)
            | NotTwistable
            | NotHalfTwistable
            | UnknownLetter(_) => ErrorKind::Assumption,
        }
    }

    #[inline]
    pub fn is_assumption(&self) -> bool {
        self.kind() == ErrorKind::Assumption
    }

    #[inline]
    pub fn is_computation(&self) -> bool {
        self.kind() == ErrorKind::Computation
    }

    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Fatal
    }
}
