#![cfg_attr(docsrs, feature(doc_cfg))]
//! # laminar
//!
//! laminar computes with mapping classes of punctured surfaces. A surface is
//! given by an ideal triangulation; measured laminations on it are recorded
//! by their edge weights, and mapping classes are encoded as sequences of
//! edge flips, isometries and puncturing moves acting piecewise linearly on
//! those weights.
//!
//! ## Features
//! - Ideal triangulations with flips, isometry search and canonical signatures
//! - Measured laminations with exact integer or algebraic weights
//! - Dehn twists and half twists built by shortening a curve
//! - Nielsen–Thurston classification, invariant laminations, dilatations and
//!   splitting sequences of pseudo-Anosov classes
//! - Serializable packages of triangulations and encodings
//! - Optional parallel batch classification (`rayon` feature)
//!
//! ## Determinism
//!
//! Nothing in the search is randomized. `random_word` takes the generator
//! from the caller, and tests fix `SmallRng` seeds explicitly.
//!
//! ## Usage
//!
//! ```no_run
//! use laminar::prelude::*;
//!
//! let surface = laminar::equipped::s_1_1()?;
//! let h = surface.mapping_class("aB")?;
//! assert_eq!(h.nielsen_thurston_type()?, NielsenThurstonType::PseudoAnosov);
//! println!("dilatation ≈ {:.4}", h.dilatation()?.to_f64());
//! # Ok::<(), laminar::laminar_error::LaminarError>(())
//! ```
//!
//! ## Invariant checks
//! In debug builds every triangulation and lamination built on a trusted
//! path re-validates itself; the `check-invariants` and `strict-invariants`
//! features keep those checks in release builds.

pub mod batch;
pub mod config;
pub mod debug_invariants;
pub mod encoding;
pub mod equipped;
pub mod exact;
pub mod laminar_error;
pub mod lamination;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::batch::{classify_words, classify_words_serial};
    pub use crate::config::SearchConfig;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::encoding::package::{EncodingPackage, MovePackage, TriangulationPackage};
    pub use crate::encoding::{
        EdgeFlip, Encoding, InvariantLamination, Isometry, LinearTransformation, Move,
        NielsenThurstonType,
    };
    pub use crate::equipped::EquippedTriangulation;
    pub use crate::exact::{AlgebraicNumber, ExactEigenSolver, ExactMatrix, SturmEigenSolver, Weight};
    pub use crate::laminar_error::{ErrorKind, LaminarError};
    pub use crate::lamination::{Lamination, SplittingSequence};
    pub use crate::topology::{EdgeLabel, Permutation, Triangulation};
}
