//! Shortening curves and encoding (half-)twists along them.
//!
//! A curve is *short* when it has weight two: it then runs around the core of
//! an annulus made of two triangles glued along both edges it crosses, and a
//! Dehn twist along it is a single flip followed by an isometry. Longer
//! curves are first carried to short position by a sequence of flips, and
//! the twist is conjugated back.

use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::One;

use crate::config::SearchConfig;
use crate::encoding::moves::{EdgeFlip, Isometry, Move};
use crate::encoding::Encoding;
use crate::laminar_error::LaminarError;
use crate::lamination::Lamination;
use crate::topology::label::EdgeLabel;
use crate::topology::triangulation::Triangulation;

/// Labels describing the annulus around a short curve: the curve crosses
/// `core` and `rung`; the triangles are `(core, a, rung)` and
/// `(~core, c, ~rung)`.
#[derive(Copy, Clone, Debug)]
struct Annulus {
    core: EdgeLabel,
    a: EdgeLabel,
    rung: EdgeLabel,
    c: EdgeLabel,
}

impl Lamination<BigInt> {
    /// A connected multicurve.
    pub fn is_curve(&self) -> bool {
        self.is_multicurve() && matches!(self.num_components(), Ok(1))
    }

    pub fn is_twistable(&self) -> bool {
        self.is_curve()
            && self
                .short_form(&SearchConfig::default())
                .is_ok_and(|(_, short)| annulus(&short).is_some())
    }

    /// A curve bounding a disc with exactly two punctures.
    pub fn is_halftwistable(&self) -> bool {
        self.is_curve()
            && self
                .short_form(&SearchConfig::default())
                .is_ok_and(|(_, short)| halftwist_annulus(&short).is_some())
    }

    /// Flips carrying `self` to a triangulation where it is as light as the
    /// greedy search can make it.
    pub fn conjugate_short(&self) -> Result<Encoding, LaminarError> {
        Ok(self.short_form(&SearchConfig::default())?.0)
    }

    pub fn conjugate_short_with(&self, config: &SearchConfig) -> Result<Encoding, LaminarError> {
        Ok(self.short_form(config)?.0)
    }

    /// The `k`-th power of the Dehn twist along this curve.
    pub fn encode_twist(&self, k: i64) -> Result<Encoding, LaminarError> {
        if !self.is_curve() {
            return Err(LaminarError::NotTwistable);
        }
        let (conj, short) = self.short_form(&SearchConfig::default())?;
        let ring = annulus(&short).ok_or(LaminarError::NotTwistable)?;
        let twist = short_twist(short.triangulation(), ring)?;
        conjugate(&conj, &twist.pow(k)?)
    }

    /// The `k`-th power of the half twist swapping the two punctures this
    /// curve encloses.
    pub fn encode_halftwist(&self, k: i64) -> Result<Encoding, LaminarError> {
        if !self.is_curve() {
            return Err(LaminarError::NotHalfTwistable);
        }
        let (conj, short) = self.short_form(&SearchConfig::default())?;
        let (ring, x) = halftwist_annulus(&short).ok_or(LaminarError::NotHalfTwistable)?;
        let tri = short.triangulation();
        let twist_ring = annulus(&short).ok_or(LaminarError::NotHalfTwistable)?;
        let twist = short_twist(tri, twist_ring)?;
        let half = short_halftwist(tri, ring, x)?;
        let half = if half.pow(2)? == twist {
            half
        } else {
            let inverse = half.inverse()?;
            if inverse.pow(2)? != twist {
                return Err(LaminarError::Internal(
                    "half twist does not square to the twist".into(),
                ));
            }
            inverse
        };
        conjugate(&conj, &half.pow(k)?)
    }

    /// Greedy flips towards minimal weight, and the lamination they produce.
    ///
    /// Each round flips the edge whose flip lowers the weight most. The search
    /// stops after two rounds in a row fail to improve on the best weight
    /// seen, and the flips after the best point are discarded.
    pub(crate) fn short_form(
        &self,
        config: &SearchConfig,
    ) -> Result<(Encoding, Lamination), LaminarError> {
        let two = BigInt::from(2);
        let mut current = self.clone();
        let mut moves: Vec<Move> = Vec::new();
        let mut best = (0, self.weight());
        let mut stale = 0;
        while moves.len() < config.shorten_max_flips && best.1 > two {
            let tri = Arc::clone(current.triangulation());
            let candidate = tri
                .indices()
                .filter(|&i| tri.is_flippable(i) && current.get(i) > &BigInt::from(0))
                .map(|i| {
                    let e = EdgeLabel::positive(i);
                    let gain = tri.square_about_edge(e).map(|[a, b, c, d]| {
                        let w = |l: EdgeLabel| current.weight_of(l).clone();
                        (w(a) + w(c)).max(w(b) + w(d)) - current.get(i).clone() * BigInt::from(2)
                    });
                    (i, gain)
                })
                .filter_map(|(i, gain)| gain.ok().map(|g| (g, i)))
                .min();
            let Some((_, i)) = candidate else {
                break;
            };
            let flip = Move::from(EdgeFlip::new(&tri, EdgeLabel::positive(i))?);
            current = flip.apply(&current)?;
            moves.push(flip);
            if current.weight() < best.1 {
                best = (moves.len(), current.weight());
                stale = 0;
            } else {
                stale += 1;
                if stale >= 2 {
                    break;
                }
            }
        }
        moves.truncate(best.0);
        log::debug!("shortened weight {} to {} in {} flips", self.weight(), best.1, best.0);
        let conj = if moves.is_empty() {
            Encoding::identity(self.triangulation())
        } else {
            Encoding::from_applied(moves)
        };
        let short = conj.apply(self)?;
        Ok((conj, short))
    }
}

/// `conj⁻¹ ∘ h ∘ conj`.
fn conjugate(conj: &Encoding, h: &Encoding) -> Result<Encoding, LaminarError> {
    conj.inverse()?.compose(h)?.compose(conj)
}

/// Indices carrying weight one; `None` unless the curve is short.
fn short_edges(short: &Lamination) -> Option<[usize; 2]> {
    if short.weight() != BigInt::from(2) {
        return None;
    }
    let heavy: Vec<usize> = short
        .triangulation()
        .indices()
        .filter(|&i| short.get(i).is_one())
        .collect();
    match heavy.as_slice() {
        &[i, j] => Some([i, j]),
        _ => None,
    }
}

/// Both orientations of each crossed edge, tried as the annulus core.
fn annuli(short: &Lamination) -> Vec<Annulus> {
    let Some(edges) = short_edges(short) else {
        return Vec::new();
    };
    let tri = short.triangulation();
    edges
        .iter()
        .flat_map(|&i| [EdgeLabel::positive(i), EdgeLabel::negative(i)])
        .filter_map(|core| {
            let [a, rung, c, d] = tri.square_about_edge(core).ok()?;
            (d == !rung && short.weight_of(rung).is_one()).then_some(Annulus { core, a, rung, c })
        })
        .collect()
}

/// An annulus whose core label is positive, as the twist needs.
fn annulus(short: &Lamination) -> Option<Annulus> {
    annuli(short).into_iter().find(|ring| ring.core.is_positive())
}

/// An annulus whose `a` side bounds a once-punctured monogon, together with
/// the edge `x` inside the monogon.
fn halftwist_annulus(short: &Lamination) -> Option<(Annulus, EdgeLabel)> {
    let tri = short.triangulation();
    annuli(short).into_iter().find_map(|ring| {
        let [_, _, x, y] = tri.square_about_edge(ring.a).ok()?;
        let separated = tri.vertex_of(ring.a).label != tri.vertex_of(ring.c).label;
        (y == !x && separated).then_some((ring, x))
    })
}

/// Every label fixed except the listed ones, which go where they are sent.
fn constraints(
    tri: &Triangulation,
    moved: &[(EdgeLabel, EdgeLabel)],
) -> Vec<(EdgeLabel, EdgeLabel)> {
    tri.indices()
        .map(EdgeLabel::positive)
        .map(|l| {
            moved
                .iter()
                .find_map(|&(from, to)| {
                    if from == l {
                        Some((l, to))
                    } else if from == !l {
                        Some((l, !to))
                    } else {
                        None
                    }
                })
                .unwrap_or((l, l))
        })
        .collect()
}

/// Flip the core, then slide the annulus back into place: the flipped core
/// becomes the rung and the rung becomes the reversed core.
fn short_twist(tri: &Arc<Triangulation>, ring: Annulus) -> Result<Encoding, LaminarError> {
    let flip = EdgeFlip::new(tri, ring.core)?;
    let moved = [(ring.core, ring.rung), (ring.rung, !ring.core)];
    let map = flip
        .target()
        .find_isometry_with_labels(tri, &constraints(tri, &moved))?;
    let iso = Isometry::new(flip.target(), tri, map)?;
    Encoding::from_moves(vec![iso.into(), flip.into()])
}

/// Flip `a`, the core and the rung in turn, then rotate the three labels
/// back into place with `x` reversed.
fn short_halftwist(
    tri: &Arc<Triangulation>,
    ring: Annulus,
    x: EdgeLabel,
) -> Result<Encoding, LaminarError> {
    let mut applied: Vec<Move> = Vec::with_capacity(4);
    let mut current = Arc::clone(tri);
    for label in [ring.a, ring.core, ring.rung] {
        let flip = EdgeFlip::new(&current, label)?;
        current = Arc::clone(flip.target());
        applied.push(flip.into());
    }
    let moved = [
        (ring.rung, ring.a),
        (ring.core, ring.rung),
        (ring.a, ring.core),
        (x, !x),
    ];
    let map = current.find_isometry_with_labels(tri, &constraints(tri, &moved))?;
    applied.push(Isometry::new(&current, tri, map)?.into());
    Ok(Encoding::from_applied(applied))
}
