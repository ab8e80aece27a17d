//! Label-level isometries between triangulations.
//!
//! An isometry is recorded as a [`LabelMap`]: a bijection on oriented labels
//! that commutes with `!` and carries every triangle of the source onto a
//! triangle of the target, preserving cyclic order. Isometries are found by
//! fixing one corner, matching it against every compatible corner of the
//! target, and propagating the match across edges breadth first.

use std::collections::VecDeque;

use crate::laminar_error::LaminarError;
use crate::topology::label::EdgeLabel;
use crate::topology::triangulation::{Corner, Triangulation};

/// A bijection on the `2ζ` oriented labels commuting with `!`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct LabelMap {
    /// Image of each label, indexed by slot.
    images: Vec<EdgeLabel>,
}

impl LabelMap {
    pub fn identity(zeta: usize) -> Self {
        LabelMap {
            images: (0..2 * zeta).map(EdgeLabel::from_slot).collect(),
        }
    }

    /// Builds a map from the images of the positive labels `0..ζ`.
    pub fn from_positive_images(images: &[EdgeLabel]) -> Result<Self, LaminarError> {
        let zeta = images.len();
        let mut slots = vec![EdgeLabel::new(0); 2 * zeta];
        let mut hit = vec![false; 2 * zeta];
        for (i, &img) in images.iter().enumerate() {
            if img.index() >= zeta || std::mem::replace(&mut hit[img.index()], true) {
                return Err(LaminarError::NoIsometry(format!(
                    "{img} is not a valid distinct image"
                )));
            }
            slots[2 * i] = img;
            slots[2 * i + 1] = !img;
        }
        Ok(LabelMap { images: slots })
    }

    #[inline]
    pub fn zeta(&self) -> usize {
        self.images.len() / 2
    }

    #[inline]
    pub fn apply(&self, label: EdgeLabel) -> EdgeLabel {
        self.images[label.slot()]
    }

    /// Images of `0..ζ`.
    pub fn positive_images(&self) -> Vec<EdgeLabel> {
        self.images.iter().step_by(2).copied().collect()
    }

    /// Where each edge index goes.
    pub fn index_map(&self) -> Vec<usize> {
        self.images.iter().step_by(2).map(|l| l.index()).collect()
    }

    pub fn inverse(&self) -> Self {
        let mut images = vec![EdgeLabel::new(0); self.images.len()];
        for (slot, &img) in self.images.iter().enumerate() {
            images[img.slot()] = EdgeLabel::from_slot(slot);
        }
        LabelMap { images }
    }

    /// `self ∘ other`.
    pub fn compose(&self, other: &LabelMap) -> Self {
        LabelMap {
            images: other.images.iter().map(|&l| self.apply(l)).collect(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.images
            .iter()
            .enumerate()
            .all(|(slot, &l)| l.slot() == slot)
    }

    /// Whether `self` carries `source` onto `target`.
    pub fn is_isometry(&self, source: &Triangulation, target: &Triangulation) -> bool {
        self.zeta() == source.zeta()
            && source.zeta() == target.zeta()
            && source
                .triangles()
                .iter()
                .all(|tri| target.has_triangle(&tri.map(|l| self.apply(l))))
    }
}

impl Triangulation {
    /// All isometries from `self` to `other`, optionally required to send
    /// filled vertices to filled vertices and unfilled to unfilled.
    pub fn isometries_to(&self, other: &Triangulation, respect_fillings: bool) -> Vec<LabelMap> {
        if self.zeta() != other.zeta() || self.num_vertices() != other.num_vertices() {
            return Vec::new();
        }
        let mut ours: Vec<usize> = self.corner_classes().iter().map(Vec::len).collect();
        let mut theirs: Vec<usize> = other.corner_classes().iter().map(Vec::len).collect();
        ours.sort_unstable();
        theirs.sort_unstable();
        if ours != theirs {
            return Vec::new();
        }

        let Some(anchor_class) = self.corner_classes().iter().min_by_key(|c| c.len()) else {
            return Vec::new();
        };
        let anchor = anchor_class[0];
        let anchor_filled = self.vertex_at(anchor).filled;
        let mut out = Vec::new();
        for class in other.corner_classes() {
            if class.len() != anchor_class.len() {
                continue;
            }
            if respect_fillings && other.vertex_at(class[0]).filled != anchor_filled {
                continue;
            }
            for &corner in class {
                let Some(map) = self.extend_corner_match(other, anchor, corner) else {
                    continue;
                };
                if respect_fillings
                    && self
                        .labels()
                        .any(|l| self.vertex_of(l).filled != other.vertex_of(map.apply(l)).filled)
                {
                    continue;
                }
                out.push(map);
            }
        }
        out
    }

    /// The first isometry to `other` satisfying `accept`.
    pub fn find_isometry_by<F>(
        &self,
        other: &Triangulation,
        respect_fillings: bool,
        mut accept: F,
    ) -> Result<LabelMap, LaminarError>
    where
        F: FnMut(&LabelMap) -> bool,
    {
        self.isometries_to(other, respect_fillings)
            .into_iter()
            .find(|m| accept(m))
            .ok_or_else(|| LaminarError::NoIsometry(format!("{self} -> {other}")))
    }

    /// The isometry to `other` sending each `from` index to its `to` index.
    pub fn find_isometry(
        &self,
        other: &Triangulation,
        index_constraints: &[(usize, usize)],
    ) -> Result<LabelMap, LaminarError> {
        self.find_isometry_by(other, false, |m| {
            index_constraints
                .iter()
                .all(|&(from, to)| m.apply(EdgeLabel::positive(from)).index() == to)
        })
    }

    /// The isometry to `other` sending each `from` label to exactly its `to`
    /// label, orientation included.
    pub fn find_isometry_with_labels(
        &self,
        other: &Triangulation,
        label_constraints: &[(EdgeLabel, EdgeLabel)],
    ) -> Result<LabelMap, LaminarError> {
        self.find_isometry_by(other, false, |m| {
            label_constraints.iter().all(|&(from, to)| m.apply(from) == to)
        })
    }

    pub fn is_isometric_to(&self, other: &Triangulation) -> bool {
        !self.isometries_to(other, false).is_empty()
    }

    /// Propagates the match `from ↦ to` across every edge; `None` on conflict.
    fn extend_corner_match(
        &self,
        other: &Triangulation,
        from: Corner,
        to: Corner,
    ) -> Option<LabelMap> {
        let mut images: Vec<Option<EdgeLabel>> = vec![None; 2 * self.zeta()];
        let mut queue: VecDeque<(EdgeLabel, EdgeLabel)> = self
            .corner_labels(from)
            .into_iter()
            .zip(other.corner_labels(to))
            .collect();

        while let Some((l, m)) = queue.pop_front() {
            match images[l.slot()] {
                Some(prev) if prev == m => continue,
                Some(_) => return None,
                None => {}
            }
            match images[(!l).slot()] {
                Some(prev) if prev != !m => return None,
                _ => {}
            }
            images[l.slot()] = Some(m);
            images[(!l).slot()] = Some(!m);
            let across = self.corner_labels(self.corner_of(!l));
            let image = other.corner_labels(other.corner_of(!m));
            queue.extend(across.into_iter().zip(image));
        }

        let images: Vec<EdgeLabel> = images.into_iter().collect::<Option<_>>()?;
        let mut hit = vec![false; images.len()];
        for img in &images {
            if std::mem::replace(&mut hit[img.slot()], true) {
                return None;
            }
        }
        Some(LabelMap { images })
    }
}
