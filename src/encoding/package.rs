//! Plain-data packages of triangulations and encodings.
//!
//! A package holds only nested integers (and exact matrices for surgery), so
//! it can be written with any `serde` format and read back without repeating
//! the isometry searches that produced it.

use std::sync::Arc;

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::encoding::moves::{EdgeFlip, Isometry, LinearTransformation, Move};
use crate::encoding::Encoding;
use crate::exact::matrix::ExactMatrix;
use crate::laminar_error::LaminarError;
use crate::lamination::same_triangulation;
use crate::topology::isometry::LabelMap;
use crate::topology::label::EdgeLabel;
use crate::topology::triangulation::Triangulation;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriangulationPackage {
    pub triangles: Vec<[i32; 3]>,
    /// One label pointing into each filled vertex.
    #[serde(default)]
    pub filled: Vec<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MovePackage {
    EdgeFlip {
        label: i32,
        reversed: bool,
    },
    Isometry {
        target: TriangulationPackage,
        /// Images of the positive labels `0..ζ`.
        images: Vec<i32>,
    },
    LinearTransformation {
        target: TriangulationPackage,
        geometric: ExactMatrix,
        algebraic: ExactMatrix,
        denominator: BigInt,
    },
}

/// Source triangulation and moves in the order they are applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingPackage {
    pub source: TriangulationPackage,
    pub moves: Vec<MovePackage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Triangulation {
    pub fn package(&self) -> TriangulationPackage {
        TriangulationPackage {
            triangles: self.raw_triangles(),
            filled: self.filled_targets().into_iter().map(EdgeLabel::get).collect(),
        }
    }

    pub fn from_package(package: &TriangulationPackage) -> Result<Triangulation, LaminarError> {
        let filled: Vec<EdgeLabel> = package.filled.iter().map(|&l| EdgeLabel::new(l)).collect();
        Triangulation::with_filled(package.triangles.clone(), &filled)
    }
}

impl Move {
    pub fn package(&self) -> MovePackage {
        match self {
            Move::EdgeFlip(f) => MovePackage::EdgeFlip {
                label: f.label().get(),
                reversed: f.is_reversed(),
            },
            Move::Isometry(iso) => MovePackage::Isometry {
                target: iso.target().package(),
                images: iso.map().positive_images().into_iter().map(EdgeLabel::get).collect(),
            },
            Move::LinearTransformation(lt) => MovePackage::LinearTransformation {
                target: lt.target().package(),
                geometric: lt.geometric().clone(),
                algebraic: lt.algebraic().clone(),
                denominator: lt.denominator().clone(),
            },
        }
    }

    /// Rebuilds the move starting at `source`. A target equal to `source`
    /// reuses it, so packaged mapping classes stay mapping classes.
    pub fn from_package(
        source: &Arc<Triangulation>,
        package: &MovePackage,
    ) -> Result<Move, LaminarError> {
        let target_of = |p: &TriangulationPackage| -> Result<Arc<Triangulation>, LaminarError> {
            let t = Triangulation::from_package(p)?;
            Ok(if t == **source { Arc::clone(source) } else { Arc::new(t) })
        };
        Ok(match package {
            MovePackage::EdgeFlip { label, reversed } => {
                let label = EdgeLabel::new(*label);
                let flipped = source.flip_edge(label)?;
                let target = if *reversed {
                    flipped.reverse_edge(label.index())?
                } else {
                    flipped
                };
                EdgeFlip::between(source, &Arc::new(target), label)?.into()
            }
            MovePackage::Isometry { target, images } => {
                let labels: Vec<EdgeLabel> = images.iter().map(|&l| EdgeLabel::new(l)).collect();
                let map = LabelMap::from_positive_images(&labels)?;
                Isometry::new(source, &target_of(target)?, map)?.into()
            }
            MovePackage::LinearTransformation {
                target,
                geometric,
                algebraic,
                denominator,
            } => LinearTransformation::new(
                source,
                &target_of(target)?,
                geometric.clone(),
                algebraic.clone(),
                denominator.clone(),
            )?
            .into(),
        })
    }
}

impl Encoding {
    pub fn package(&self) -> EncodingPackage {
        EncodingPackage {
            source: self.source().package(),
            moves: self.moves().iter().rev().map(Move::package).collect(),
            name: self.name().map(str::to_owned),
        }
    }

    pub fn from_package(package: &EncodingPackage) -> Result<Encoding, LaminarError> {
        let source = Arc::new(Triangulation::from_package(&package.source)?);
        let mut current = Arc::clone(&source);
        let mut applied = Vec::with_capacity(package.moves.len());
        for p in &package.moves {
            let m = Move::from_package(&current, p)?;
            current = if same_triangulation(m.target(), &source) {
                Arc::clone(&source)
            } else {
                Arc::clone(m.target())
            };
            applied.push(m);
        }
        applied.reverse();
        let encoding = Encoding::from_moves(applied)?;
        Ok(match &package.name {
            Some(name) => encoding.with_name(name.clone()),
            None => encoding,
        })
    }
}
