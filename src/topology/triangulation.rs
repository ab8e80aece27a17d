//! Ideal triangulations of punctured surfaces.
//!
//! A [`Triangulation`] is a closed collection of triangles, each an
//! anticlockwise triple of [`EdgeLabel`]s, in which every edge index `0..ζ`
//! appears exactly once positively and once negatively. Corner `i` of a
//! triangle sits opposite side `i`; side `i` runs from the vertex at corner
//! `i + 1` to the vertex at corner `i + 2`.
//!
//! Triangulations are immutable. Each triangle is stored rotated so that its
//! smallest label comes first and triangles are kept sorted, so two
//! triangulations with the same labelled triangles compare equal regardless
//! of the order they were given in. Vertices are discovered by walking corner
//! classes; a vertex may be *filled*, marking an auxiliary puncture created
//! by surgery.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::debug_invariants::DebugInvariants;
use crate::laminar_error::LaminarError;
use crate::topology::label::EdgeLabel;

/// Three labels listed anticlockwise.
pub type Triangle = [EdgeLabel; 3];

/// Corner `side` of triangle `triangle` (the corner opposite that side).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Corner {
    pub triangle: usize,
    pub side: usize,
}

impl Corner {
    #[inline]
    pub const fn new(triangle: usize, side: usize) -> Self {
        Corner { triangle, side }
    }
}

/// A puncture of the surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Vertex {
    pub label: usize,
    pub filled: bool,
}

#[derive(Clone)]
pub struct Triangulation {
    triangles: Vec<Triangle>,
    zeta: usize,
    /// Corner whose side carries each label, indexed by label slot.
    side_of: Vec<Corner>,
    /// Vertex label at each corner, indexed by `3 * triangle + side`.
    corner_vertex: Vec<usize>,
    vertices: Vec<Vertex>,
    corner_classes: Vec<Vec<Corner>>,
}

impl Triangulation {
    /// Builds a triangulation from raw labels (`~i` written as `-i - 1`).
    pub fn new(triangles: Vec<[i32; 3]>) -> Result<Self, LaminarError> {
        Self::with_filled(triangles, &[])
    }

    /// As [`new`](Self::new), marking the targets of `filled_targets` as
    /// filled vertices.
    pub fn with_filled(
        triangles: Vec<[i32; 3]>,
        filled_targets: &[EdgeLabel],
    ) -> Result<Self, LaminarError> {
        let triangles = triangles
            .into_iter()
            .map(|t| t.map(EdgeLabel::new))
            .collect();
        Self::from_triangles(triangles, filled_targets)
    }

    pub fn from_triangles(
        mut triangles: Vec<Triangle>,
        filled_targets: &[EdgeLabel],
    ) -> Result<Self, LaminarError> {
        if triangles.is_empty() {
            return Err(LaminarError::InvalidTriangulation("no triangles".into()));
        }
        if (3 * triangles.len()) % 2 != 0 {
            return Err(LaminarError::InvalidTriangulation(format!(
                "{} triangles cannot be glued in pairs of sides",
                triangles.len()
            )));
        }
        let zeta = 3 * triangles.len() / 2;
        let mut seen = vec![false; 2 * zeta];
        for label in triangles.iter().flatten() {
            if label.index() >= zeta {
                return Err(LaminarError::InvalidTriangulation(format!(
                    "label {label} out of range for {zeta} edges"
                )));
            }
            if std::mem::replace(&mut seen[label.slot()], true) {
                return Err(LaminarError::InvalidTriangulation(format!(
                    "label {label} appears twice"
                )));
            }
        }
        for label in filled_targets {
            if label.index() >= zeta {
                return Err(LaminarError::InvalidTriangulation(format!(
                    "filled label {label} out of range"
                )));
            }
        }

        for tri in triangles.iter_mut() {
            let k = (0..3).min_by_key(|&i| tri[i]).unwrap_or(0);
            tri.rotate_left(k);
        }
        triangles.sort();

        let mut side_of = vec![Corner::default(); 2 * zeta];
        for (t, tri) in triangles.iter().enumerate() {
            for (s, label) in tri.iter().enumerate() {
                side_of[label.slot()] = Corner::new(t, s);
            }
        }

        let mut corner_vertex = vec![usize::MAX; 3 * triangles.len()];
        let mut corner_classes: Vec<Vec<Corner>> = Vec::new();
        for t in 0..triangles.len() {
            for s in 0..3 {
                if corner_vertex[3 * t + s] != usize::MAX {
                    continue;
                }
                let v = corner_classes.len();
                let start = Corner::new(t, s);
                let mut class = Vec::new();
                let mut c = start;
                loop {
                    corner_vertex[3 * c.triangle + c.side] = v;
                    class.push(c);
                    // The side after this corner ends here; walk across it.
                    let incoming = triangles[c.triangle][(c.side + 1) % 3];
                    let across = side_of[(!incoming).slot()];
                    c = Corner::new(across.triangle, (across.side + 1) % 3);
                    if c == start {
                        break;
                    }
                }
                corner_classes.push(class);
            }
        }

        let target = |label: EdgeLabel| {
            let c = side_of[label.slot()];
            corner_vertex[3 * c.triangle + (c.side + 2) % 3]
        };
        let mut filled = vec![false; corner_classes.len()];
        for &label in filled_targets {
            filled[target(label)] = true;
        }
        let vertices = filled
            .into_iter()
            .enumerate()
            .map(|(label, filled)| Vertex { label, filled })
            .collect();

        let out = Triangulation {
            triangles,
            zeta,
            side_of,
            corner_vertex,
            vertices,
            corner_classes,
        };
        crate::debug_invariants!(out.validate_invariants(), "Triangulation::from_triangles");
        Ok(out)
    }

    // --- accessors ---

    #[inline]
    pub fn zeta(&self) -> usize {
        self.zeta
    }

    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    #[inline]
    pub fn triangle(&self, t: usize) -> Triangle {
        self.triangles[t]
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Edge indices `0..ζ`.
    #[inline]
    pub fn indices(&self) -> Range<usize> {
        0..self.zeta
    }

    /// All `2ζ` labels in slot order.
    pub fn labels(&self) -> impl Iterator<Item = EdgeLabel> + '_ {
        (0..2 * self.zeta).map(EdgeLabel::from_slot)
    }

    /// The corner whose side carries `label`.
    #[inline]
    pub fn corner_of(&self, label: EdgeLabel) -> Corner {
        self.side_of[label.slot()]
    }

    #[inline]
    pub fn triangle_of(&self, label: EdgeLabel) -> usize {
        self.side_of[label.slot()].triangle
    }

    /// The labels of the corner's triangle, starting with the corner's side.
    #[inline]
    pub fn corner_labels(&self, corner: Corner) -> [EdgeLabel; 3] {
        let tri = &self.triangles[corner.triangle];
        [
            tri[corner.side],
            tri[(corner.side + 1) % 3],
            tri[(corner.side + 2) % 3],
        ]
    }

    #[inline]
    pub fn vertex_at(&self, corner: Corner) -> Vertex {
        self.vertices[self.corner_vertex[3 * corner.triangle + corner.side]]
    }

    /// Vertex at the head of `label`.
    pub fn vertex_of(&self, label: EdgeLabel) -> Vertex {
        let c = self.corner_of(label);
        self.vertex_at(Corner::new(c.triangle, (c.side + 2) % 3))
    }

    /// Vertex at the tail of `label`.
    #[inline]
    pub fn source_of(&self, label: EdgeLabel) -> Vertex {
        self.vertex_of(!label)
    }

    /// Corners around each vertex, in cyclic order, indexed by vertex label.
    #[inline]
    pub fn corner_classes(&self) -> &[Vec<Corner>] {
        &self.corner_classes
    }

    #[inline]
    pub fn degree(&self, vertex: usize) -> usize {
        self.corner_classes[vertex].len()
    }

    /// Number of ends of edge `index` at `vertex` (0, 1 or 2).
    pub fn ends(&self, index: usize, vertex: usize) -> usize {
        let e = EdgeLabel::positive(index);
        [e, !e]
            .iter()
            .filter(|&&l| self.vertex_of(l).label == vertex)
            .count()
    }

    /// Euler characteristic of the closed surface (punctures filled in).
    pub fn euler_characteristic(&self) -> i64 {
        self.vertices.len() as i64 - self.zeta as i64 + self.triangles.len() as i64
    }

    pub fn genus(&self) -> usize {
        ((2 - self.euler_characteristic()) / 2).max(0) as usize
    }

    /// Upper bound on the order of a periodic mapping class.
    pub fn max_order(&self) -> usize {
        let n = self.vertices.len();
        match self.genus() {
            0 => n.max(2),
            1 => n.max(6),
            g => n.max(4 * g + 2),
        }
    }

    /// One label targeting each filled vertex, avoiding edge `skip` when
    /// another choice exists.
    pub(crate) fn filled_targets_avoiding(&self, skip: Option<usize>) -> Vec<EdgeLabel> {
        self.vertices
            .iter()
            .filter(|v| v.filled)
            .filter_map(|v| {
                let mut targeting = self.labels().filter(|&l| self.vertex_of(l).label == v.label);
                let first = targeting.next()?;
                if Some(first.index()) != skip {
                    return Some(first);
                }
                targeting.find(|l| Some(l.index()) != skip).or(Some(first))
            })
            .collect()
    }

    /// One label targeting each filled vertex.
    pub fn filled_targets(&self) -> Vec<EdgeLabel> {
        self.filled_targets_avoiding(None)
    }

    /// Whether some triangle equals `tri` up to rotation.
    pub fn has_triangle(&self, tri: &Triangle) -> bool {
        let k = (0..3).min_by_key(|&i| tri[i]).unwrap_or(0);
        let mut rotated = *tri;
        rotated.rotate_left(k);
        self.triangles.binary_search(&rotated).is_ok()
    }

    // --- flips ---

    /// True iff the two sides of the edge lie in distinct triangles.
    pub fn is_flippable(&self, index: usize) -> bool {
        let e = EdgeLabel::positive(index);
        index < self.zeta && self.triangle_of(e) != self.triangle_of(!e)
    }

    /// For triangles `(e, a, b)` and `(~e, c, d)` returns `[a, b, c, d]`.
    pub fn square_about_edge(&self, label: EdgeLabel) -> Result<[EdgeLabel; 4], LaminarError> {
        if !self.is_flippable(label.index()) {
            return Err(LaminarError::NotFlippable(label));
        }
        let [_, a, b] = self.corner_labels(self.corner_of(label));
        let [_, c, d] = self.corner_labels(self.corner_of(!label));
        Ok([a, b, c, d])
    }

    /// Replaces `(e, a, b)` and `(~e, c, d)` by `(e, d, a)` and `(~e, b, c)`.
    pub fn flip_edge(&self, label: EdgeLabel) -> Result<Triangulation, LaminarError> {
        let [a, b, c, d] = self.square_about_edge(label)?;
        let (t1, t2) = (self.triangle_of(label), self.triangle_of(!label));
        let mut triangles: Vec<Triangle> = self
            .triangles
            .iter()
            .enumerate()
            .filter(|&(t, _)| t != t1 && t != t2)
            .map(|(_, tri)| *tri)
            .collect();
        triangles.push([label, d, a]);
        triangles.push([!label, b, c]);
        Triangulation::from_triangles(triangles, &self.filled_targets_avoiding(Some(label.index())))
    }

    /// The same triangulation with the orientation of edge `index` swapped.
    pub fn reverse_edge(&self, index: usize) -> Result<Triangulation, LaminarError> {
        let swap = |l: EdgeLabel| if l.index() == index { !l } else { l };
        let triangles = self.triangles.iter().map(|t| t.map(swap)).collect();
        let filled: Vec<EdgeLabel> = self.filled_targets().into_iter().map(swap).collect();
        Triangulation::from_triangles(triangles, &filled)
    }

    /// Cones each listed triangle `(x, y, z)` off to a new filled vertex `P`.
    ///
    /// The `k`-th triangle gets spokes `p_i = ζ + 3k + i` running from the
    /// vertex at its corner `i` to `P`, and is replaced by `(x, p2, ~p1)`,
    /// `(y, p0, ~p2)` and `(z, p1, ~p0)`. Returns the new triangulation and,
    /// per punctured triangle, its original labels with the spokes.
    pub fn puncture_triangles(
        &self,
        which: &[usize],
    ) -> Result<(Triangulation, Vec<(Triangle, [EdgeLabel; 3])>), LaminarError> {
        let mut triangles: Vec<Triangle> = self
            .triangles
            .iter()
            .enumerate()
            .filter(|(t, _)| !which.contains(t))
            .map(|(_, tri)| *tri)
            .collect();
        let mut filled = self.filled_targets();
        let mut spokes = Vec::with_capacity(which.len());
        for (k, &t) in which.iter().enumerate() {
            let [x, y, z] = self.triangles[t];
            let base = self.zeta + 3 * k;
            let p = [
                EdgeLabel::positive(base),
                EdgeLabel::positive(base + 1),
                EdgeLabel::positive(base + 2),
            ];
            triangles.push([x, p[2], !p[1]]);
            triangles.push([y, p[0], !p[2]]);
            triangles.push([z, p[1], !p[0]]);
            filled.push(p[0]);
            spokes.push(([x, y, z], p));
        }
        Ok((Triangulation::from_triangles(triangles, &filled)?, spokes))
    }

    /// Punctures a single triangle.
    pub fn puncture_triangle(&self, t: usize) -> Result<Triangulation, LaminarError> {
        if t >= self.num_triangles() {
            return Err(LaminarError::InvalidTriangulation(format!("no triangle {t}")));
        }
        Ok(self.puncture_triangles(&[t])?.0)
    }

    /// Raw triangle data (`~i` as `-i - 1`).
    pub fn raw_triangles(&self) -> Vec<[i32; 3]> {
        self.triangles.iter().map(|t| t.map(EdgeLabel::get)).collect()
    }

    /// Shares `self` behind an `Arc`.
    pub fn into_shared(self) -> Arc<Triangulation> {
        Arc::new(self)
    }
}

impl PartialEq for Triangulation {
    fn eq(&self, other: &Self) -> bool {
        self.triangles == other.triangles && self.vertices == other.vertices
    }
}

impl Eq for Triangulation {}

impl std::hash::Hash for Triangulation {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.triangles.hash(state);
        self.vertices.hash(state);
    }
}

impl fmt::Debug for Triangulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Triangulation")
            .field("triangles", &self.triangles)
            .field(
                "filled",
                &self
                    .vertices
                    .iter()
                    .filter(|v| v.filled)
                    .map(|v| v.label)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl fmt::Display for Triangulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tris: Vec<String> = self
            .triangles
            .iter()
            .map(|[a, b, c]| format!("({a}, {b}, {c})"))
            .collect();
        write!(f, "[{}]", tris.join(", "))
    }
}

impl DebugInvariants for Triangulation {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Triangulation");
    }

    fn validate_invariants(&self) -> Result<(), LaminarError> {
        if 2 * self.zeta != 3 * self.triangles.len() {
            return Err(LaminarError::Internal("ζ does not match the triangle count".into()));
        }
        for (t, tri) in self.triangles.iter().enumerate() {
            for (s, &l) in tri.iter().enumerate() {
                if self.side_of[l.slot()] != Corner::new(t, s) {
                    return Err(LaminarError::Internal(format!("side table out of date at {l}")));
                }
            }
        }
        let corners: usize = self.corner_classes.iter().map(Vec::len).sum();
        if corners != 3 * self.triangles.len() {
            return Err(LaminarError::Internal("corner classes do not partition corners".into()));
        }
        if (2 - self.euler_characteristic()) % 2 != 0 {
            return Err(LaminarError::Internal("odd Euler characteristic".into()));
        }
        Ok(())
    }
}
