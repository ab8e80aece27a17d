//! Canonical isomorphism signatures.
//!
//! For every oriented starting label the triangles are numbered breadth first
//! and each side is recorded as either a gluing to a newly discovered
//! triangle or a back reference (target triangle number plus the rank of the
//! S₃ gluing permutation). Filled flags of the vertices follow in the order
//! they are first met. The lexicographically smallest record over all starts
//! is canonical: two triangulations share a signature exactly when an
//! orientation-preserving, filling-respecting isometry relates them.

use std::collections::VecDeque;

use crate::topology::label::EdgeLabel;
use crate::topology::permutation::S3;
use crate::topology::triangulation::{Corner, Triangulation};

const ALPHABET: &[u8; 64] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789+-";

const NEW: u32 = 0;
const BACK: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct SigRecord {
    types: Vec<u32>,
    targets: Vec<u32>,
    gluings: Vec<u32>,
    fills: Vec<u32>,
}

impl Triangulation {
    /// Canonical signature, equal for exactly the isomorphic triangulations.
    pub fn iso_sig(&self) -> String {
        let best = self
            .labels()
            .map(|start| self.record_from(start))
            .min()
            .unwrap_or_else(|| SigRecord {
                types: Vec::new(),
                targets: Vec::new(),
                gluings: Vec::new(),
                fills: Vec::new(),
            });
        let width = digits(self.num_triangles().max(self.num_vertices()) as u32);
        let mut out = encode(self.num_triangles() as u32, width);
        for part in [&best.types, &best.targets, &best.gluings, &best.fills] {
            out.push('.');
            for &x in part {
                out.push_str(&encode(x, width));
            }
        }
        out
    }

    fn record_from(&self, start: EdgeLabel) -> SigRecord {
        let n = self.num_triangles();
        // number assigned to each triangle, and the side that is local side 0
        let mut number = vec![u32::MAX; n];
        let mut offset = vec![0usize; n];
        let mut order = Vec::with_capacity(n);
        let mut queue = VecDeque::new();

        let first = self.corner_of(start);
        number[first.triangle] = 0;
        offset[first.triangle] = first.side;
        order.push(first.triangle);
        queue.push_back(first.triangle);

        let mut rec = SigRecord {
            types: Vec::with_capacity(3 * n),
            targets: Vec::new(),
            gluings: Vec::new(),
            fills: Vec::new(),
        };
        while let Some(t) = queue.pop_front() {
            for j in 0..3 {
                let label = self.triangle(t)[(offset[t] + j) % 3];
                let across = self.corner_of(!label);
                let u = across.triangle;
                if number[u] == u32::MAX {
                    number[u] = order.len() as u32;
                    offset[u] = across.side;
                    order.push(u);
                    queue.push_back(u);
                    rec.types.push(NEW);
                } else {
                    let local = (across.side + 3 - offset[u]) % 3;
                    rec.types.push(BACK);
                    rec.targets.push(number[u]);
                    rec.gluings.push(S3::gluing(j, local).rank() as u32);
                }
            }
        }

        let mut visited = vec![false; self.num_vertices()];
        for &t in &order {
            for k in 0..3 {
                let v = self.vertex_at(Corner::new(t, (offset[t] + k) % 3));
                if !std::mem::replace(&mut visited[v.label], true) {
                    rec.fills.push(v.filled as u32);
                }
            }
        }
        rec
    }
}

fn digits(mut max: u32) -> usize {
    let mut d = 1;
    while max >= 64 {
        max /= 64;
        d += 1;
    }
    d
}

fn encode(mut x: u32, width: usize) -> String {
    let mut chars = vec![ALPHABET[0]; width];
    for c in chars.iter_mut().rev() {
        *c = ALPHABET[(x % 64) as usize];
        x /= 64;
    }
    String::from_utf8_lossy(&chars).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn twice_punctured_torus() -> Triangulation {
        Triangulation::new(vec![[0, 2, 1], [-1, 3, -2], [-3, 4, 5], [-4, -5, -6]]).unwrap()
    }

    #[test]
    fn relabelling_keeps_the_signature() {
        let t = Triangulation::new(vec![[0, 1, 2], [-1, -2, -3]]).unwrap();
        let relabelled = Triangulation::new(vec![[2, 0, 1], [-3, -1, -2]]).unwrap();
        assert_eq!(t.iso_sig(), relabelled.iso_sig());
        let reversed = t.reverse_edge(1).unwrap();
        assert_eq!(t.iso_sig(), reversed.iso_sig());
    }

    #[test]
    fn flip_then_unflip_restores_signature() {
        let t = twice_punctured_torus();
        let sig = t.iso_sig();
        for i in t.indices().filter(|&i| t.is_flippable(i)) {
            let e = EdgeLabel::positive(i);
            let back = t.flip_edge(e).unwrap().flip_edge(!e).unwrap();
            assert_eq!(back.iso_sig(), sig);
        }
    }

    #[test]
    fn different_surfaces_differ() {
        let torus = Triangulation::new(vec![[0, 1, 2], [-1, -2, -3]]).unwrap();
        let sphere = Triangulation::new(vec![[0, 1, -2], [-1, 2, -3]]).unwrap();
        assert_ne!(torus.iso_sig(), sphere.iso_sig());
        let (punctured, _) = torus.puncture_triangles(&[0]).unwrap();
        let sig = punctured.iso_sig();
        assert!(sig.starts_with("e."));
        assert!(sig.ends_with('b') || sig.ends_with('a'));
    }

    #[test]
    fn isometric_triangulations_share_signatures() {
        let t = twice_punctured_torus();
        for i in t.indices().filter(|&i| t.is_flippable(i)) {
            let f = t.flip_edge(EdgeLabel::positive(i)).unwrap();
            assert_eq!(f.iso_sig() == t.iso_sig(), f.is_isometric_to(&t));
        }
    }
}
