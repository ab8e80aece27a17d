//! Tree–cotree homology basis.
//!
//! A spanning tree of the 1-skeleton is grown first; among the remaining
//! edges a spanning tree of the dual graph is grown next. Each edge in
//! neither tree closes a unique cycle in the dual graph, and these cycles
//! give a basis of `H₁` of the closed surface.

use crate::topology::dual_graph::build_dual;
use crate::topology::label::EdgeLabel;
use crate::topology::triangulation::Triangulation;
use crate::topology::union_find::UnionFind;

/// A closed path in the dual graph, recorded by the labels it leaves each
/// triangle through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualCycle {
    pub crossings: Vec<EdgeLabel>,
}

impl DualCycle {
    /// Number of times the cycle crosses each edge.
    pub fn geometric(&self, zeta: usize) -> Vec<i64> {
        let mut w = vec![0; zeta];
        for l in &self.crossings {
            w[l.index()] += 1;
        }
        w
    }

    /// Signed crossings: `+1` leaving through `i`, `-1` leaving through `~i`.
    pub fn algebraic(&self, zeta: usize) -> Vec<i64> {
        let mut a = vec![0; zeta];
        for l in &self.crossings {
            a[l.index()] += l.sign() as i64;
        }
        a
    }
}

impl Triangulation {
    /// A basis of `H₁` as `2g` dual cycles.
    pub fn homology_basis(&self) -> Vec<DualCycle> {
        let mut primal = UnionFind::new(self.num_vertices());
        let mut tree = vec![false; self.zeta()];
        for i in self.indices() {
            let e = EdgeLabel::positive(i);
            tree[i] = primal.union(self.source_of(e).label, self.vertex_of(e).label);
        }

        let mut dual = UnionFind::new(self.num_triangles());
        let mut cotree = vec![false; self.zeta()];
        for i in self.indices().filter(|&i| !tree[i]) {
            let e = EdgeLabel::positive(i);
            cotree[i] = dual.union(self.triangle_of(e), self.triangle_of(!e));
        }

        let graph = build_dual(self, |i| cotree[i]);
        self.indices()
            .filter(|&i| !tree[i] && !cotree[i])
            .filter_map(|i| {
                let e = EdgeLabel::positive(i);
                let back = graph.path(self.triangle_of(!e), self.triangle_of(e))?;
                let mut crossings = Vec::with_capacity(back.len() + 1);
                crossings.push(e);
                crossings.extend(back);
                Some(DualCycle { crossings })
            })
            .collect()
    }
}
