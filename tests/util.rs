#![allow(dead_code)]
use std::sync::Arc;

use laminar::lamination::Lamination;
use laminar::topology::triangulation::Triangulation;

pub fn tri(triangles: Vec<[i32; 3]>) -> Arc<Triangulation> {
    Arc::new(Triangulation::new(triangles).unwrap())
}

/// The once-punctured torus.
pub fn torus() -> Arc<Triangulation> {
    tri(vec![[0, 1, 2], [-1, -2, -3]])
}

/// The twice-punctured torus.
pub fn s_1_2() -> Arc<Triangulation> {
    tri(vec![[0, 2, 1], [-1, 3, -2], [-3, 4, 5], [-4, -5, -6]])
}

/// The torus lamination with `n[i]` normal arcs at corner `i` of either
/// triangle.
pub fn torus_lamination(n: [i64; 3]) -> Lamination {
    torus()
        .lamination(&[n[1] + n[2], n[0] + n[2], n[0] + n[1]])
        .unwrap()
}

pub fn weights(l: &Lamination) -> Vec<i64> {
    l.geometric()
        .iter()
        .map(|w| i64::try_from(w).unwrap())
        .collect()
}
