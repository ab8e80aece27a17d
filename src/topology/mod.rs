//! Top-level module for triangulation topology.
//!
//! This module provides the combinatorial layer everything else is built on:
//! - Signed edge labels and small permutations
//! - Ideal triangulations with corner classes, flips and puncturing
//! - Isometry search and canonical isomorphism signatures
//! - Dual graphs and a tree–cotree homology basis
//!
//! Most users will build a [`Triangulation`] from raw labels and work with it
//! through laminations and encodings.

pub mod dual_graph;
pub mod homology;
pub mod isometry;
pub mod label;
pub mod permutation;
pub mod signature;
pub mod triangulation;
pub mod union_find;

pub use homology::DualCycle;
pub use isometry::LabelMap;
pub use label::EdgeLabel;
pub use permutation::{Permutation, S3, S4};
pub use triangulation::{Corner, Triangle, Triangulation, Vertex};
