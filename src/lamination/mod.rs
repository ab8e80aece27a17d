//! Measured laminations in normal coordinates.
//!
//! A [`Lamination`] records, for every edge of a triangulation, how many
//! times the lamination crosses it (the *geometric* vector) together with the
//! signed crossing count of an orientation of it (the *algebraic* vector).
//! Geometric weights determine the lamination up to isotopy provided every
//! corner of every triangle carries a non-negative number of normal arcs:
//! the doubled dual weight `w[i+1] + w[i+2] - w[i]` at corner `i`.
//!
//! Laminations are immutable and share their triangulation behind an `Arc`.
//! Weights live in any [`Weight`] domain: `BigInt` for curves, algebraic
//! numbers for invariant laminations of pseudo-Anosov classes.

pub mod curves;
pub mod shorten;
pub mod splitting;

use std::fmt;
use std::ops::{Add, Mul};
use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::Zero;

use crate::debug_invariants::DebugInvariants;
use crate::exact::weight::{total, two, Weight};
use crate::laminar_error::LaminarError;
use crate::topology::label::EdgeLabel;
use crate::topology::triangulation::{Corner, Triangulation};

pub use splitting::SplittingSequence;

/// A measured lamination, recorded by its geometric and algebraic edge
/// weights on a shared triangulation.
///
/// `&a + &b` panics when `a` and `b` live on different triangulations; use
/// [`Lamination::checked_add`] when that is not known in advance.
#[derive(Clone)]
pub struct Lamination<W: Weight = BigInt> {
    triangulation: Arc<Triangulation>,
    geometric: Vec<W>,
    algebraic: Vec<W>,
}

impl<W: Weight> Lamination<W> {
    /// Validates lengths, non-negativity and every corner's dual weight.
    pub fn new(
        triangulation: Arc<Triangulation>,
        geometric: Vec<W>,
        algebraic: Vec<W>,
    ) -> Result<Self, LaminarError> {
        let out = Lamination {
            triangulation,
            geometric,
            algebraic,
        };
        out.validate_invariants()?;
        Ok(out)
    }

    /// A lamination with zero algebraic part.
    pub fn from_geometric(
        triangulation: Arc<Triangulation>,
        geometric: Vec<W>,
    ) -> Result<Self, LaminarError> {
        let algebraic = vec![W::zero(); geometric.len()];
        Self::new(triangulation, geometric, algebraic)
    }

    /// Trusted constructor for weights produced by PL maps; checked only in
    /// debug builds.
    pub(crate) fn new_unchecked(
        triangulation: Arc<Triangulation>,
        geometric: Vec<W>,
        algebraic: Vec<W>,
    ) -> Self {
        let out = Lamination {
            triangulation,
            geometric,
            algebraic,
        };
        crate::debug_invariants!(out.validate_invariants(), "Lamination::new_unchecked");
        out
    }

    /// As [`new`](Self::new), then strips peripheral components.
    pub fn new_removing_peripheral(
        triangulation: Arc<Triangulation>,
        geometric: Vec<W>,
        algebraic: Vec<W>,
    ) -> Result<Self, LaminarError> {
        Ok(Self::new(triangulation, geometric, algebraic)?.remove_peripheral())
    }

    #[inline]
    pub fn triangulation(&self) -> &Arc<Triangulation> {
        &self.triangulation
    }

    #[inline]
    pub fn zeta(&self) -> usize {
        self.geometric.len()
    }

    #[inline]
    pub fn geometric(&self) -> &[W] {
        &self.geometric
    }

    #[inline]
    pub fn algebraic(&self) -> &[W] {
        &self.algebraic
    }

    /// Geometric weight of edge `index`.
    #[inline]
    pub fn get(&self, index: usize) -> &W {
        &self.geometric[index]
    }

    /// Geometric weight of the edge under `label`.
    #[inline]
    pub fn weight_of(&self, label: EdgeLabel) -> &W {
        &self.geometric[label.index()]
    }

    /// Algebraic weight seen along `label`: negated for `~i`.
    pub fn signed_algebraic(&self, label: EdgeLabel) -> W {
        let a = self.algebraic[label.index()].clone();
        if label.is_positive() { a } else { -a }
    }

    /// Total geometric weight.
    pub fn weight(&self) -> W {
        total(&self.geometric)
    }

    pub fn is_empty(&self) -> bool {
        self.geometric.iter().all(Zero::is_zero)
    }

    pub fn is_integral(&self) -> bool {
        self.geometric
            .iter()
            .chain(&self.algebraic)
            .all(|w| w.to_integer().is_some())
    }

    /// Doubled dual weights of triangle `t`, indexed by corner.
    pub fn dual_weights_doubled(&self, t: usize) -> [W; 3] {
        let tri = self.triangulation.triangle(t);
        let w = |i: usize| self.geometric[tri[i % 3].index()].clone();
        [0, 1, 2].map(|i| w(i + 1) + w(i + 2) - w(i))
    }

    /// Doubled dual weight at a single corner.
    pub fn corner_dual_doubled(&self, corner: Corner) -> W {
        let [s, a, b] = self.triangulation.corner_labels(corner);
        self.weight_of(a).clone() + self.weight_of(b).clone() - self.weight_of(s).clone()
    }

    /// Same triangulation, both vectors scaled by `k`.
    pub fn scale(&self, k: &W) -> Self {
        let mul = |v: &[W]| v.iter().map(|x| x.clone() * k.clone()).collect();
        Lamination {
            triangulation: Arc::clone(&self.triangulation),
            geometric: mul(&self.geometric),
            algebraic: mul(&self.algebraic),
        }
    }

    /// Sum of two laminations on the same triangulation.
    pub fn checked_add(&self, other: &Self) -> Result<Self, LaminarError> {
        if !same_triangulation(&self.triangulation, &other.triangulation) {
            return Err(LaminarError::IncompatibleTriangulations(
                "laminations live on different triangulations".into(),
            ));
        }
        let add = |a: &[W], b: &[W]| a.iter().zip(b).map(|(x, y)| x.clone() + y.clone()).collect();
        Ok(Lamination::new_unchecked(
            Arc::clone(&self.triangulation),
            add(&self.geometric, &other.geometric),
            add(&self.algebraic, &other.algebraic),
        ))
    }

    /// Equal up to a positive scalar (geometric weights only).
    pub fn projective_eq(&self, other: &Self) -> bool {
        if self.zeta() != other.zeta() {
            return false;
        }
        let (s, o) = (self.weight(), other.weight());
        self.geometric
            .iter()
            .zip(&other.geometric)
            .all(|(x, y)| x.clone() * o.clone() == y.clone() * s.clone())
    }

    /// Isometry- and scale-invariant key: the triangulation's signature and
    /// the sorted weights rescaled to `denominator`.
    pub fn projective_hash(&self, denominator: u64) -> (String, Vec<BigInt>) {
        let scale = BigInt::from(denominator);
        let weight = self.weight();
        let mut floors: Vec<BigInt> = if weight.is_zero() {
            vec![BigInt::zero(); self.zeta()]
        } else {
            self.geometric
                .iter()
                .map(|w| w.scaled_floor(&scale, &weight))
                .collect()
        };
        floors.sort_unstable();
        (self.triangulation.iso_sig(), floors)
    }

    /// Twice the number of peripheral components around each vertex that
    /// has any, as `(vertex, doubled multiplicity)`.
    pub fn peripheral_components(&self) -> Vec<(usize, W)> {
        self.triangulation
            .corner_classes()
            .iter()
            .enumerate()
            .filter_map(|(v, class)| {
                let m = class
                    .iter()
                    .map(|&c| self.corner_dual_doubled(c))
                    .min()?;
                (m > W::zero()).then_some((v, m))
            })
            .collect()
    }

    /// Strips peripheral components, doubling first when some multiplicity
    /// is half-integral.
    pub fn remove_peripheral(&self) -> Self {
        let peripheral = self.peripheral_components();
        if peripheral.is_empty() {
            return self.clone();
        }
        let halves: Option<Vec<W>> = peripheral
            .iter()
            .map(|(_, m)| m.div_exact(&BigInt::from(2)))
            .collect();
        let (base, amounts) = match halves {
            Some(halves) => (self.clone(), halves),
            None => (
                self.scale(&two()),
                peripheral.iter().map(|(_, m)| m.clone()).collect(),
            ),
        };
        let tri = &self.triangulation;
        let mut geometric = base.geometric.clone();
        for ((v, _), m) in peripheral.iter().zip(amounts) {
            for i in tri.indices() {
                let ends = tri.ends(i, *v);
                if ends > 0 {
                    let cut = W::from_integer(BigInt::from(ends)) * m.clone();
                    geometric[i] = geometric[i].clone() - cut;
                }
            }
        }
        Lamination::new_unchecked(Arc::clone(tri), geometric, base.algebraic)
    }

    /// Non-empty, integral, even around every triangle, no peripheral part.
    pub fn is_multicurve(&self) -> bool {
        if self.is_empty() || !self.is_integral() {
            return false;
        }
        let even = (0..self.triangulation.num_triangles()).all(|t| {
            let tri = self.triangulation.triangle(t);
            let sum = tri
                .iter()
                .fold(W::zero(), |acc, l| acc + self.weight_of(*l).clone());
            sum.div_exact(&BigInt::from(2)).is_some_and(|h| h.to_integer().is_some())
        });
        even && self.peripheral_components().is_empty()
    }

    /// Re-weights with the same triangulation.
    pub(crate) fn with_weights(&self, geometric: Vec<W>, algebraic: Vec<W>) -> Self {
        Lamination::new_unchecked(Arc::clone(&self.triangulation), geometric, algebraic)
    }

    /// Same triangulation, both vectors converted by `f`.
    pub fn map_weights<V: Weight>(&self, f: impl Fn(&W) -> V) -> Lamination<V> {
        Lamination {
            triangulation: Arc::clone(&self.triangulation),
            geometric: self.geometric.iter().map(&f).collect(),
            algebraic: self.algebraic.iter().map(&f).collect(),
        }
    }
}

/// Pointer or structural equality of triangulations.
#[inline]
pub(crate) fn same_triangulation(a: &Arc<Triangulation>, b: &Arc<Triangulation>) -> bool {
    Arc::ptr_eq(a, b) || a == b
}

impl Lamination<BigInt> {
    /// Integer lamination from machine integers.
    pub fn from_i64(
        triangulation: &Arc<Triangulation>,
        geometric: &[i64],
        algebraic: &[i64],
    ) -> Result<Self, LaminarError> {
        let big = |v: &[i64]| v.iter().map(|&x| BigInt::from(x)).collect();
        Self::new(Arc::clone(triangulation), big(geometric), big(algebraic))
    }
}

impl Triangulation {
    /// Integer lamination with the given geometric weights and zero
    /// algebraic part.
    pub fn lamination(self: &Arc<Self>, geometric: &[i64]) -> Result<Lamination, LaminarError> {
        Lamination::from_i64(self, geometric, &vec![0; geometric.len()])
    }

    pub fn empty_lamination<W: Weight>(self: &Arc<Self>) -> Lamination<W> {
        let zeros = vec![W::zero(); self.zeta()];
        Lamination::new_unchecked(Arc::clone(self), zeros.clone(), zeros)
    }

    /// The curve running once around `vertex`.
    pub fn peripheral_curve(self: &Arc<Self>, vertex: usize) -> Result<Lamination, LaminarError> {
        if vertex >= self.num_vertices() {
            return Err(LaminarError::InvalidLamination(format!("no vertex {vertex}")));
        }
        let geometric: Vec<BigInt> = self
            .indices()
            .map(|i| BigInt::from(self.ends(i, vertex)))
            .collect();
        let algebraic = vec![BigInt::zero(); self.zeta()];
        Lamination::new(Arc::clone(self), geometric, algebraic)
    }
}

impl<W: Weight> PartialEq for Lamination<W> {
    fn eq(&self, other: &Self) -> bool {
        same_triangulation(&self.triangulation, &other.triangulation)
            && self.geometric == other.geometric
            && self.algebraic == other.algebraic
    }
}

impl<W: Weight> Eq for Lamination<W> {}

impl<W: Weight> std::hash::Hash for Lamination<W>
where
    W: std::hash::Hash,
{
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.geometric.hash(state);
        self.algebraic.hash(state);
    }
}

impl<W: Weight> Add for &Lamination<W> {
    type Output = Lamination<W>;

    /// Panics when the triangulations differ; see [`Lamination::checked_add`].
    fn add(self, rhs: &Lamination<W>) -> Lamination<W> {
        match self.checked_add(rhs) {
            Ok(sum) => sum,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<W: Weight> Mul<W> for &Lamination<W> {
    type Output = Lamination<W>;

    fn mul(self, k: W) -> Lamination<W> {
        self.scale(&k)
    }
}

impl<W: Weight> fmt::Debug for Lamination<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lamination")
            .field("geometric", &self.geometric)
            .field("algebraic", &self.algebraic)
            .finish()
    }
}

impl<W: Weight + fmt::Display> fmt::Display for Lamination<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.geometric.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

impl<W: Weight> DebugInvariants for Lamination<W> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Lamination");
    }

    fn validate_invariants(&self) -> Result<(), LaminarError> {
        let zeta = self.triangulation.zeta();
        if self.geometric.len() != zeta || self.algebraic.len() != zeta {
            return Err(LaminarError::InvalidLamination(format!(
                "expected {zeta} weights, got {} and {}",
                self.geometric.len(),
                self.algebraic.len()
            )));
        }
        if let Some(i) = self.geometric.iter().position(|w| *w < W::zero()) {
            return Err(LaminarError::InvalidLamination(format!(
                "negative weight on edge {i}"
            )));
        }
        for t in 0..self.triangulation.num_triangles() {
            if self.dual_weights_doubled(t).iter().any(|d| *d < W::zero()) {
                return Err(LaminarError::InvalidLamination(format!(
                    "triangle inequality fails in triangle {t}"
                )));
            }
        }
        Ok(())
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

    fn mirrored_torus() -> Arc<Triangulation> {
        Arc::new(Triangulation::new(vec![[0, 2, 1], [-1, -3, -2]]).unwrap())
    }

    #[test]
    fn sums_across_triangulations_are_refused() {
        let a = torus().lamination(&[1, 0, 1]).unwrap();
        let b = mirrored_torus().lamination(&[1, 0, 1]).unwrap();
        assert!(matches!(
            a.checked_add(&b),
            Err(LaminarError::IncompatibleTriangulations(_))
        ));
    }

    #[test]
    #[should_panic]
    fn operator_sum_across_triangulations_panics() {
        let a = torus().lamination(&[1, 0, 1]).unwrap();
        let b = mirrored_torus().lamination(&[1, 0, 1]).unwrap();
        let _ = &a + &b;
    }

    #[test]
    fn validation() {
        let t = torus();
        assert!(t.lamination(&[1, 0, 1]).is_ok());
        assert!(t.lamination(&[1, 0]).is_err());
        assert!(t.lamination(&[-1, 0, 1]).is_err());
        let err = t.lamination(&[3, 0, 1]).unwrap_err();
        assert!(matches!(err, LaminarError::InvalidLamination(_)));
    }

    #[test]
    fn arithmetic_and_projective_equality() {
        let t = torus();
        let a = t.lamination(&[1, 0, 1]).unwrap();
        let b = t.lamination(&[0, 1, 1]).unwrap();
        let sum = &a + &b;
        assert_eq!(sum.geometric(), &big(&[1, 1, 2])[..]);
        assert_eq!(sum.weight(), BigInt::from(4));
        let tripled = &a * BigInt::from(3);
        assert!(tripled.projective_eq(&a));
        assert!(!tripled.projective_eq(&b));
        assert_eq!(tripled.projective_hash(1000), a.projective_hash(1000));
    }

    #[test]
    fn dual_weights() {
        let t = torus();
        let l = t.lamination(&[1, 1, 2]).unwrap();
        for tri in 0..2 {
            let d = l.dual_weights_doubled(tri);
            let mut sorted = d.to_vec();
            sorted.sort();
            assert_eq!(sorted, big(&[0, 2, 2]));
        }
    }

    #[test]
    fn peripheral_curves_are_removed() {
        let t = torus();
        let p = t.peripheral_curve(0).unwrap();
        assert_eq!(p.geometric(), &big(&[2, 2, 2])[..]);
        assert_eq!(p.peripheral_components(), vec![(0, BigInt::from(2))]);
        assert!(p.remove_peripheral().is_empty());
        assert!(!p.is_multicurve());

        let a = t.lamination(&[1, 0, 1]).unwrap();
        let mixed = &a + &p;
        assert_eq!(mixed.remove_peripheral(), a);
    }

    #[test]
    fn half_integral_peripheral_parts_double() {
        let t = torus();
        // one arc around each corner of a single triangle side pair
        let l = Lamination::new_removing_peripheral(t.clone(), big(&[1, 1, 1]), big(&[0, 0, 0]))
            .unwrap();
        assert!(l.is_empty());
    }

    #[test]
    fn multicurve_predicate() {
        let t = torus();
        assert!(t.lamination(&[1, 0, 1]).unwrap().is_multicurve());
        assert!(t.lamination(&[2, 0, 2]).unwrap().is_multicurve());
        assert!(!t.empty_lamination::<BigInt>().is_multicurve());
        assert!(!t.lamination(&[1, 1, 1]).unwrap().is_multicurve());
    }
}
