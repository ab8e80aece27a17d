//! The three elementary moves an [`Encoding`](crate::encoding::Encoding) is
//! built from.
//!
//! Every move carries its source and target triangulation and acts on weight
//! vectors piecewise-linearly. Flips and isometries are invertible; linear
//! transformations only appear as the one-way surgery that punctures
//! triangles.

use std::sync::Arc;

use num_bigint::BigInt;

use crate::exact::matrix::ExactMatrix;
use crate::exact::weight::Weight;
use crate::laminar_error::LaminarError;
use crate::lamination::{same_triangulation, Lamination};
use crate::topology::isometry::LabelMap;
use crate::topology::label::EdgeLabel;
use crate::topology::triangulation::Triangulation;

/// Flip of the edge carrying `label`.
#[derive(Clone, Debug)]
pub struct EdgeFlip {
    source: Arc<Triangulation>,
    target: Arc<Triangulation>,
    label: EdgeLabel,
    /// `[a, b, c, d]` around the edge in the source.
    square: [EdgeLabel; 4],
    /// The target stores the new diagonal as `~label` rather than `label`.
    reversed: bool,
}

impl EdgeFlip {
    pub fn new(source: &Arc<Triangulation>, label: EdgeLabel) -> Result<Self, LaminarError> {
        let square = source.square_about_edge(label)?;
        let target = Arc::new(source.flip_edge(label)?);
        Ok(EdgeFlip {
            source: Arc::clone(source),
            target,
            label,
            square,
            reversed: false,
        })
    }

    /// The flip of `label` taking `source` to the given `target`, which may
    /// store the new diagonal with either orientation.
    pub fn between(
        source: &Arc<Triangulation>,
        target: &Arc<Triangulation>,
        label: EdgeLabel,
    ) -> Result<Self, LaminarError> {
        let square = source.square_about_edge(label)?;
        let [a, _, _, d] = square;
        let reversed = if target.has_triangle(&[label, d, a]) {
            false
        } else if target.has_triangle(&[!label, d, a]) {
            true
        } else {
            return Err(LaminarError::IncompatibleTriangulations(format!(
                "flipping {label} does not reach the target"
            )));
        };
        Ok(EdgeFlip {
            source: Arc::clone(source),
            target: Arc::clone(target),
            label,
            square,
            reversed,
        })
    }

    #[inline]
    pub fn label(&self) -> EdgeLabel {
        self.label
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.label.index()
    }

    #[inline]
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    #[inline]
    pub fn source(&self) -> &Arc<Triangulation> {
        &self.source
    }

    #[inline]
    pub fn target(&self) -> &Arc<Triangulation> {
        &self.target
    }

    /// `[a, b, c, d]` around the flipped edge in the source.
    #[inline]
    pub fn square(&self) -> [EdgeLabel; 4] {
        self.square
    }

    pub fn apply_geometric<W: Weight>(&self, w: &[W]) -> Vec<W> {
        let [a, b, c, d] = self.square();
        let g = |l: EdgeLabel| w[l.index()].clone();
        let e = self.index();
        let mut out = w.to_vec();
        out[e] = (g(a) + g(c)).max(g(b) + g(d)) - w[e].clone();
        out
    }

    pub fn apply_algebraic<W: Weight>(&self, alg: &[W]) -> Vec<W> {
        let [_, b, c, _] = self.square();
        let signed = |l: EdgeLabel| {
            let x = alg[l.index()].clone();
            if l.is_positive() { x } else { -x }
        };
        let mut new = signed(b) + signed(c);
        if self.label.is_positive() == self.reversed {
            new = -new;
        }
        let mut out = alg.to_vec();
        out[self.index()] = new;
        out
    }

    /// Flips the new diagonal back.
    pub fn inverse(&self) -> EdgeFlip {
        let [a, b, c, d] = self.square;
        EdgeFlip {
            source: Arc::clone(&self.target),
            target: Arc::clone(&self.source),
            label: if self.reversed { self.label } else { !self.label },
            square: [b, c, d, a],
            reversed: !self.reversed,
        }
    }
}

/// A label-preserving identification of two triangulations.
#[derive(Clone, Debug)]
pub struct Isometry {
    source: Arc<Triangulation>,
    target: Arc<Triangulation>,
    map: LabelMap,
}

impl Isometry {
    pub fn new(
        source: &Arc<Triangulation>,
        target: &Arc<Triangulation>,
        map: LabelMap,
    ) -> Result<Self, LaminarError> {
        if !map.is_isometry(source, target) {
            return Err(LaminarError::NoIsometry(
                "label map does not carry triangles to triangles".into(),
            ));
        }
        Ok(Isometry {
            source: Arc::clone(source),
            target: Arc::clone(target),
            map,
        })
    }

    /// The isometry of `source` that fixes every label.
    pub fn identity(source: &Arc<Triangulation>) -> Self {
        Isometry {
            source: Arc::clone(source),
            target: Arc::clone(source),
            map: LabelMap::identity(source.zeta()),
        }
    }

    /// Trusted constructor for maps produced by isometry search.
    pub(crate) fn from_search(
        source: &Arc<Triangulation>,
        target: &Arc<Triangulation>,
        map: LabelMap,
    ) -> Self {
        debug_assert!(map.is_isometry(source, target));
        Isometry {
            source: Arc::clone(source),
            target: Arc::clone(target),
            map,
        }
    }

    #[inline]
    pub fn map(&self) -> &LabelMap {
        &self.map
    }

    /// Where each edge index goes.
    pub fn index_map(&self) -> Vec<usize> {
        self.map.index_map()
    }

    #[inline]
    pub fn source(&self) -> &Arc<Triangulation> {
        &self.source
    }

    #[inline]
    pub fn target(&self) -> &Arc<Triangulation> {
        &self.target
    }

    pub fn apply_geometric<W: Weight>(&self, w: &[W]) -> Vec<W> {
        let mut out = vec![W::zero(); w.len()];
        for (i, x) in w.iter().enumerate() {
            out[self.map.apply(EdgeLabel::positive(i)).index()] = x.clone();
        }
        out
    }

    pub fn apply_algebraic<W: Weight>(&self, alg: &[W]) -> Vec<W> {
        let mut out = vec![W::zero(); alg.len()];
        for (i, x) in alg.iter().enumerate() {
            let image = self.map.apply(EdgeLabel::positive(i));
            out[image.index()] = if image.is_positive() { x.clone() } else { -x.clone() };
        }
        out
    }

    pub fn inverse(&self) -> Isometry {
        Isometry {
            source: Arc::clone(&self.target),
            target: Arc::clone(&self.source),
            map: self.map.inverse(),
        }
    }
}

/// An exact linear map with a common denominator, used for surgery.
#[derive(Clone, Debug)]
pub struct LinearTransformation {
    source: Arc<Triangulation>,
    target: Arc<Triangulation>,
    geometric: ExactMatrix,
    algebraic: ExactMatrix,
    denominator: BigInt,
}

impl LinearTransformation {
    pub fn new(
        source: &Arc<Triangulation>,
        target: &Arc<Triangulation>,
        geometric: ExactMatrix,
        algebraic: ExactMatrix,
        denominator: BigInt,
    ) -> Result<Self, LaminarError> {
        let shape = (target.zeta(), source.zeta());
        if (geometric.nrows(), geometric.ncols()) != shape
            || (algebraic.nrows(), algebraic.ncols()) != shape
        {
            return Err(LaminarError::IncompatibleTriangulations(format!(
                "matrices must be {}x{}",
                shape.0, shape.1
            )));
        }
        if denominator <= BigInt::from(0) {
            return Err(LaminarError::InvalidLamination("denominator must be positive".into()));
        }
        Ok(LinearTransformation {
            source: Arc::clone(source),
            target: Arc::clone(target),
            geometric,
            algebraic,
            denominator,
        })
    }

    /// The map from `source` to `source` with the listed triangles punctured.
    ///
    /// Spoke `p_i` of triangle `(x, y, z)` crosses the normal arcs around
    /// corner `i`, so its weight is half the doubled dual weight there. Its
    /// algebraic weight follows from the zero-flux condition in the new
    /// triangles.
    pub fn puncture(source: &Arc<Triangulation>, triangles: &[usize]) -> Result<Self, LaminarError> {
        let (punctured, spokes) = source.puncture_triangles(triangles)?;
        let target = Arc::new(punctured);
        let (rows, cols) = (target.zeta(), source.zeta());
        let two = BigInt::from(2);
        let mut geometric = ExactMatrix::zeros(rows, cols);
        let mut algebraic = ExactMatrix::zeros(rows, cols);
        for i in 0..cols {
            geometric.set(i, i, two.clone());
            algebraic.set(i, i, two.clone());
        }
        let bump = |m: &mut ExactMatrix, r: usize, l: EdgeLabel, k: i64| {
            let c = l.index();
            let v = m.get(r, c) + BigInt::from(k);
            m.set(r, c, v);
        };
        for (tri, p) in &spokes {
            for i in 0..3 {
                let r = p[i].index();
                bump(&mut geometric, r, tri[(i + 1) % 3], 1);
                bump(&mut geometric, r, tri[(i + 2) % 3], 1);
                bump(&mut geometric, r, tri[i], -1);
            }
            let [x, _, z] = *tri;
            // p0 = 0, p1 = -alg(z), p2 = alg(p1) - alg(x), all doubled
            let (r1, r2) = (p[1].index(), p[2].index());
            bump(&mut algebraic, r1, z, -2 * z.sign() as i64);
            bump(&mut algebraic, r2, z, -2 * z.sign() as i64);
            bump(&mut algebraic, r2, x, -2 * x.sign() as i64);
        }
        LinearTransformation::new(source, &target, geometric, algebraic, two)
    }

    #[inline]
    pub fn source(&self) -> &Arc<Triangulation> {
        &self.source
    }

    #[inline]
    pub fn target(&self) -> &Arc<Triangulation> {
        &self.target
    }

    #[inline]
    pub fn geometric(&self) -> &ExactMatrix {
        &self.geometric
    }

    #[inline]
    pub fn algebraic(&self) -> &ExactMatrix {
        &self.algebraic
    }

    #[inline]
    pub fn denominator(&self) -> &BigInt {
        &self.denominator
    }

    fn divide<W: Weight>(&self, v: Vec<W>) -> Result<Vec<W>, LaminarError> {
        v.into_iter()
            .map(|x| {
                x.div_exact(&self.denominator).ok_or_else(|| {
                    LaminarError::InvalidLamination(format!(
                        "weight is not divisible by {}",
                        self.denominator
                    ))
                })
            })
            .collect()
    }

    pub fn apply_geometric<W: Weight>(&self, w: &[W]) -> Result<Vec<W>, LaminarError> {
        self.divide(self.geometric.mul_vec(w))
    }

    pub fn apply_algebraic<W: Weight>(&self, alg: &[W]) -> Result<Vec<W>, LaminarError> {
        self.divide(self.algebraic.mul_vec(alg))
    }
}

/// One step of an encoding.
#[derive(Clone, Debug)]
pub enum Move {
    EdgeFlip(EdgeFlip),
    Isometry(Isometry),
    LinearTransformation(LinearTransformation),
}

impl Move {
    pub fn source(&self) -> &Arc<Triangulation> {
        match self {
            Move::EdgeFlip(m) => m.source(),
            Move::Isometry(m) => m.source(),
            Move::LinearTransformation(m) => m.source(),
        }
    }

    pub fn target(&self) -> &Arc<Triangulation> {
        match self {
            Move::EdgeFlip(m) => m.target(),
            Move::Isometry(m) => m.target(),
            Move::LinearTransformation(m) => m.target(),
        }
    }

    pub fn apply_geometric<W: Weight>(&self, w: &[W]) -> Result<Vec<W>, LaminarError> {
        match self {
            Move::EdgeFlip(m) => Ok(m.apply_geometric(w)),
            Move::Isometry(m) => Ok(m.apply_geometric(w)),
            Move::LinearTransformation(m) => m.apply_geometric(w),
        }
    }

    pub fn apply_algebraic<W: Weight>(&self, alg: &[W]) -> Result<Vec<W>, LaminarError> {
        match self {
            Move::EdgeFlip(m) => Ok(m.apply_algebraic(alg)),
            Move::Isometry(m) => Ok(m.apply_algebraic(alg)),
            Move::LinearTransformation(m) => m.apply_algebraic(alg),
        }
    }

    /// Pushes a lamination on the source through the move.
    pub fn apply<W: Weight>(&self, lamination: &Lamination<W>) -> Result<Lamination<W>, LaminarError> {
        if !same_triangulation(lamination.triangulation(), self.source()) {
            return Err(LaminarError::IncompatibleTriangulations(
                "lamination does not live on the move's source".into(),
            ));
        }
        let geometric = self.apply_geometric(lamination.geometric())?;
        let algebraic = self.apply_algebraic(lamination.algebraic())?;
        Ok(Lamination::new_unchecked(
            Arc::clone(self.target()),
            geometric,
            algebraic,
        ))
    }

    pub fn inverse(&self) -> Result<Move, LaminarError> {
        match self {
            Move::EdgeFlip(m) => Ok(Move::EdgeFlip(m.inverse())),
            Move::Isometry(m) => Ok(Move::Isometry(m.inverse())),
            Move::LinearTransformation(_) => Err(LaminarError::NotInvertible(
                "linear transformations have no inverse",
            )),
        }
    }

    /// Number of PL branches of the move.
    pub fn num_branches(&self) -> usize {
        match self {
            Move::EdgeFlip(_) => 2,
            _ => 1,
        }
    }
}

impl From<EdgeFlip> for Move {
    fn from(m: EdgeFlip) -> Self {
        Move::EdgeFlip(m)
    }
}

impl From<Isometry> for Move {
    fn from(m: Isometry) -> Self {
        Move::Isometry(m)
    }
}

impl From<LinearTransformation> for Move {
    fn from(m: LinearTransformation) -> Self {
        Move::LinearTransformation(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn torus() -> Arc<Triangulation> {
        Arc::new(Triangulation::new(vec![[0, 1, 2], [-1, -2, -3]]).unwrap())
    }

    fn big(v: &[i64]) -> Vec<BigInt> {
        v.iter().map(|&x| BigInt::from(x)).collect()
    }

    #[test]
    fn flip_action_on_torus_curves() {
        let t = torus();
        let flip = EdgeFlip::new(&t, EdgeLabel::positive(0)).unwrap();
        // square about 0 is [1, 2, ~1, ~2]
        assert_eq!(flip.apply_geometric(&big(&[1, 0, 1])), big(&[1, 0, 1]));
        assert_eq!(flip.apply_geometric(&big(&[0, 1, 1])), big(&[2, 1, 1]));
        assert_eq!(flip.apply_geometric(&big(&[1, 1, 2])), big(&[3, 1, 2]));
    }

    #[test]
    fn flip_inverse_restores_weights() {
        let t = torus();
        let flip = EdgeFlip::new(&t, EdgeLabel::positive(1)).unwrap();
        let inv = flip.inverse();
        assert_eq!(inv.target().as_ref(), t.as_ref());
        let check = EdgeFlip::between(flip.target(), &t, inv.label()).unwrap();
        assert_eq!(check.is_reversed(), inv.is_reversed());
        let w = big(&[2, 1, 1]);
        assert_eq!(inv.apply_geometric(&flip.apply_geometric(&w)), w);
        let a = big(&[1, -1, 0]);
        assert_eq!(inv.apply_algebraic(&flip.apply_algebraic(&a)), a);
    }

    #[test]
    fn algebraic_flip_keeps_zero_flux() {
        let t = torus();
        let basis = t.homology_basis();
        for cycle in &basis {
            let a: Vec<BigInt> = cycle.algebraic(3).into_iter().map(BigInt::from).collect();
            for i in 0..3 {
                let flip = EdgeFlip::new(&t, EdgeLabel::positive(i)).unwrap();
                let image = flip.apply_algebraic(&a);
                for tri in flip.target().triangles() {
                    let flux = tri.iter().fold(BigInt::from(0), |acc, l| {
                        let x = image[l.index()].clone();
                        if l.is_positive() { acc + x } else { acc - x }
                    });
                    assert_eq!(flux, BigInt::from(0));
                }
            }
        }
    }

    #[test]
    fn isometry_permutes_with_signs() {
        let t = torus();
        let map = t
            .isometries_to(&t, false)
            .into_iter()
            .find(|m| !m.is_identity())
            .unwrap();
        let iso = Isometry::new(&t, &t, map).unwrap();
        let w = big(&[1, 2, 3]);
        let moved = iso.apply_geometric(&w);
        let mut sorted = moved.clone();
        sorted.sort();
        assert_eq!(sorted, w);
        assert_eq!(iso.inverse().apply_geometric(&moved), w);
        let a = big(&[1, -1, 0]);
        assert_eq!(iso.inverse().apply_algebraic(&iso.apply_algebraic(&a)), a);
    }

    #[test]
    fn puncturing_a_tripod() {
        let t = torus();
        let lt = LinearTransformation::puncture(&t, &[0]).unwrap();
        let l = t.lamination(&[1, 1, 2]).unwrap();
        let moved = Move::from(lt).apply(&l).unwrap();
        assert_eq!(moved.zeta(), 6);
        assert_eq!(&moved.geometric()[..3], l.geometric());
        // spokes carry the corner arcs
        let spokes: BigInt = moved.geometric()[3..].iter().sum();
        assert_eq!(spokes, BigInt::from(2));
    }

    #[test]
    fn linear_transformations_do_not_invert() {
        let t = torus();
        let lt = LinearTransformation::puncture(&t, &[1]).unwrap();
        let err = Move::from(lt).inverse().unwrap_err();
        assert!(matches!(err, LaminarError::NotInvertible(_)));
    }
}
