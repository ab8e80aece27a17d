//! CSR (compressed-sparse-row) dual graph of a triangulation.
//
// Each triangle is a vertex; every selected edge index contributes one arc
// from each triangle holding one of its sides to the triangle across it.
//
// * `xadj[t] .. xadj[t+1]` = arcs leaving triangle `t`
// * `adjncy`               = triangle at the far end of each arc
// * `crossing`             = label of the side the arc leaves through
//
// The graph is symmetric. An edge whose two sides share a triangle gives two
// self-arcs.

use std::collections::VecDeque;

use crate::topology::label::EdgeLabel;
use crate::topology::triangulation::Triangulation;

/// CSR triple
#[derive(Debug, Clone)]
pub struct DualGraph {
    pub xadj: Vec<usize>,
    pub adjncy: Vec<usize>,
    pub crossing: Vec<EdgeLabel>,
}

/// Builds the dual graph through the edges for which `include(index)` holds.
pub fn build_dual(tri: &Triangulation, include: impl Fn(usize) -> bool) -> DualGraph {
    let n = tri.num_triangles();
    let mut xadj = Vec::with_capacity(n + 1);
    let mut adjncy = Vec::new();
    let mut crossing = Vec::new();
    xadj.push(0);
    for t in 0..n {
        for label in tri.triangle(t) {
            if include(label.index()) {
                adjncy.push(tri.triangle_of(!label));
                crossing.push(label);
            }
        }
        xadj.push(adjncy.len());
    }
    DualGraph {
        xadj,
        adjncy,
        crossing,
    }
}

impl DualGraph {
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.xadj.len().saturating_sub(1)
    }

    /// `(neighbour, crossing label)` pairs leaving `t`.
    pub fn neighbours(&self, t: usize) -> impl Iterator<Item = (usize, EdgeLabel)> + '_ {
        let range = self.xadj[t]..self.xadj[t + 1];
        self.adjncy[range.clone()]
            .iter()
            .copied()
            .zip(self.crossing[range].iter().copied())
    }

    /// Labels crossed by a shortest path from `from` to `to`, if connected.
    pub fn path(&self, from: usize, to: usize) -> Option<Vec<EdgeLabel>> {
        let mut previous: Vec<Option<(usize, EdgeLabel)>> = vec![None; self.num_vertices()];
        let mut seen = vec![false; self.num_vertices()];
        let mut queue = VecDeque::from([from]);
        seen[from] = true;
        while let Some(t) = queue.pop_front() {
            if t == to {
                break;
            }
            for (u, label) in self.neighbours(t) {
                if !seen[u] {
                    seen[u] = true;
                    previous[u] = Some((t, label));
                    queue.push_back(u);
                }
            }
        }
        if !seen[to] {
            return None;
        }
        let mut labels = Vec::new();
        let mut at = to;
        while let Some((t, label)) = previous[at] {
            labels.push(label);
            at = t;
        }
        labels.reverse();
        Some(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn torus_dual_is_a_theta_graph() {
        let t = Triangulation::new(vec![[0, 1, 2], [-1, -2, -3]]).unwrap();
        let g = build_dual(&t, |_| true);
        assert_eq!(g.num_vertices(), 2);
        assert_eq!(g.xadj, vec![0, 3, 6]);
        assert!(g.neighbours(0).all(|(u, _)| u == 1));
        assert!(g.neighbours(1).all(|(u, _)| u == 0));
    }

    #[test]
    fn paths_follow_selected_edges() {
        let t = Triangulation::new(vec![[0, 1, 2], [-1, -2, -3]]).unwrap();
        let g = build_dual(&t, |i| i == 1);
        let path = g.path(0, 1).unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].index(), 1);
        assert_eq!(g.path(0, 0), Some(vec![]));
        let none = build_dual(&t, |_| false);
        assert!(none.path(0, 1).is_none());
    }
}
