//! Canonical test curves of a triangulation and component counting.

use std::sync::Arc;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};

use crate::laminar_error::LaminarError;
use crate::lamination::Lamination;
use crate::topology::label::EdgeLabel;
use crate::topology::triangulation::Triangulation;
use crate::topology::union_find::UnionFind;

impl Triangulation {
    /// Boundaries of edge neighbourhoods, followed by the homology curves.
    ///
    /// For each edge the curve crosses every other edge once per end it has
    /// at the edge's endpoints. Peripheral parts are stripped, each curve is
    /// made primitive when that keeps it a multicurve, and duplicates are
    /// dropped. Together the curves fill
    /// the surface, so a mapping class is determined by their images.
    pub fn key_curves(self: &Arc<Self>) -> Vec<Lamination> {
        let mut out: Vec<Lamination> = Vec::new();
        for e in self.indices() {
            let label = EdgeLabel::positive(e);
            let (u, v) = (self.source_of(label).label, self.vertex_of(label).label);
            let geometric: Vec<i64> = self
                .indices()
                .map(|f| {
                    if f == e {
                        0
                    } else if u == v {
                        self.ends(f, u) as i64
                    } else {
                        (self.ends(f, u) + self.ends(f, v)) as i64
                    }
                })
                .collect();
            let Ok(lam) = self.lamination(&geometric) else {
                continue;
            };
            let lam = lam.remove_peripheral();
            let reduced = lam.primitive();
            let lam = if reduced.is_multicurve() { reduced } else { lam };
            if !lam.is_empty() && !out.contains(&lam) {
                out.push(lam);
            }
        }
        for lam in self.homology_curves() {
            if !out.contains(&lam) {
                out.push(lam);
            }
        }
        out
    }

    /// One curve per homology basis cycle, carrying its algebraic
    /// intersection numbers.
    pub fn homology_curves(self: &Arc<Self>) -> Vec<Lamination> {
        let zeta = self.zeta();
        self.homology_basis()
            .iter()
            .filter_map(|cycle| {
                Lamination::from_i64(self, &cycle.geometric(zeta), &cycle.algebraic(zeta)).ok()
            })
            .collect()
    }
}

impl Lamination<BigInt> {
    /// Divides both vectors by their common content.
    pub fn primitive(&self) -> Self {
        let content = self
            .geometric()
            .iter()
            .chain(self.algebraic())
            .fold(BigInt::zero(), |acc, x| acc.gcd(x));
        if content.is_zero() || content == BigInt::from(1) {
            return self.clone();
        }
        let div = |v: &[BigInt]| v.iter().map(|x| x / &content).collect();
        self.with_weights(div(self.geometric()), div(self.algebraic()))
    }

    /// Number of connected components of an integral lamination whose
    /// weights are even around every triangle.
    ///
    /// Every crossing of an edge is a point; each normal arc joins two
    /// points and the components are the classes of the resulting union.
    pub fn num_components(&self) -> Result<usize, LaminarError> {
        let tri = self.triangulation();
        let weights: Vec<usize> = self
            .geometric()
            .iter()
            .map(|w| {
                w.to_usize().ok_or_else(|| {
                    LaminarError::InvalidLamination(format!("weight {w} is too large to trace"))
                })
            })
            .collect::<Result<_, _>>()?;
        let mut offsets = Vec::with_capacity(weights.len());
        let mut total = 0;
        for w in &weights {
            offsets.push(total);
            total += w;
        }
        let point = |l: EdgeLabel, p: usize| {
            let w = weights[l.index()];
            offsets[l.index()] + if l.is_positive() { p } else { w - 1 - p }
        };

        let mut uf = UnionFind::new(total);
        for t in 0..tri.num_triangles() {
            let sides = tri.triangle(t);
            let duals = self.dual_weights_doubled(t);
            for c in 0..3 {
                let arcs = duals[c]
                    .to_usize()
                    .filter(|d| d % 2 == 0)
                    .ok_or_else(|| {
                        LaminarError::InvalidLamination(format!(
                            "corner {c} of triangle {t} has a half arc"
                        ))
                    })?
                    / 2;
                let (incoming, outgoing) = (sides[(c + 2) % 3], sides[(c + 1) % 3]);
                let width = weights[outgoing.index()];
                for k in 0..arcs {
                    uf.union(point(incoming, k), point(outgoing, width - 1 - k));
                }
            }
        }
        Ok(uf.count_classes(|_| true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn torus() -> Arc<Triangulation> {
        Arc::new(Triangulation::new(vec![[0, 1, 2], [-1, -2, -3]]).unwrap())
    }

    fn s_1_2() -> Arc<Triangulation> {
        Arc::new(
            Triangulation::new(vec![[0, 2, 1], [-1, 3, -2], [-3, 4, 5], [-4, -5, -6]]).unwrap(),
        )
    }

    #[test]
    fn torus_key_curves_are_simple() {
        let t = torus();
        let curves = t.key_curves();
        assert!(curves.len() >= 3);
        for c in &curves {
            assert!(c.is_multicurve());
            assert_eq!(c.num_components().unwrap(), 1);
        }
    }

    #[test]
    fn homology_curves_span_genus() {
        assert_eq!(torus().homology_curves().len(), 2);
        assert_eq!(s_1_2().homology_curves().len(), 2);
    }

    #[test]
    fn components_of_multicurves() {
        let t = torus();
        assert_eq!(t.lamination(&[1, 0, 1]).unwrap().num_components().unwrap(), 1);
        assert_eq!(t.lamination(&[2, 0, 2]).unwrap().num_components().unwrap(), 2);
        assert_eq!(t.lamination(&[1, 1, 2]).unwrap().num_components().unwrap(), 1);
        assert_eq!(t.empty_lamination::<BigInt>().num_components().unwrap(), 0);
        assert!(t.lamination(&[1, 1, 1]).unwrap().num_components().is_err());
    }

    #[test]
    fn peripheral_curves_count_as_components() {
        let t = s_1_2();
        for v in 0..t.num_vertices() {
            let p = t.peripheral_curve(v).unwrap();
            assert_eq!(p.num_components().unwrap(), 1);
        }
    }

    #[test]
    fn primitive_divides_content() {
        let t = torus();
        let l = t.lamination(&[2, 0, 2]).unwrap();
        assert_eq!(l.primitive(), t.lamination(&[1, 0, 1]).unwrap());
    }
}
