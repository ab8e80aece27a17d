//! Maximal splitting sequences of filling laminations.
//!
//! After puncturing every triangle in which the lamination is a tripod, the
//! edges of maximal weight are flipped over and over. For the invariant
//! lamination of a pseudo-Anosov class the sequence eventually repeats up to
//! isometry and scale; the repeat exhibits the class as a flip sequence
//! followed by a closing isometry.

use std::sync::Arc;

use hashbrown::HashMap;
use num_bigint::BigInt;
use num_traits::Zero;

use crate::config::SearchConfig;
use crate::encoding::moves::{EdgeFlip, Isometry, LinearTransformation, Move};
use crate::encoding::Encoding;
use crate::exact::weight::Weight;
use crate::laminar_error::LaminarError;
use crate::lamination::Lamination;
use crate::topology::label::EdgeLabel;

/// A recurrence found while splitting a lamination.
#[derive(Clone, Debug)]
pub struct SplittingSequence<W: Weight = BigInt> {
    lamination: Lamination<W>,
    preperiodic: Encoding,
    periodic: Encoding,
    ratio: (W, W),
}

impl<W: Weight> SplittingSequence<W> {
    /// The lamination at the start of the periodic part.
    pub fn lamination(&self) -> &Lamination<W> {
        &self.lamination
    }

    /// From the original triangulation to the start of the periodic part,
    /// punctures included.
    pub fn preperiodic(&self) -> &Encoding {
        &self.preperiodic
    }

    /// The mapping class realised by the periodic flips and the closing
    /// isometry.
    pub fn periodic(&self) -> &Encoding {
        &self.periodic
    }

    /// `(before, after)` total weights across one period.
    pub fn ratio(&self) -> (&W, &W) {
        (&self.ratio.0, &self.ratio.1)
    }

    /// Edge indices of the periodic flips, in the order they are applied.
    pub fn flips(&self) -> Vec<usize> {
        self.periodic.flip_indices()
    }

    pub fn closing_isometry(&self) -> Option<&Isometry> {
        self.periodic.closing_isometry()
    }
}

impl<W: Weight> Lamination<W> {
    /// Every splitting sequence of this lamination.
    ///
    /// When `dilatation` is given, only recurrences whose weight ratio equals
    /// it (in either direction) are accepted. Fails with
    /// [`LaminarError::NotFilling`] when an edge loses all its weight or no
    /// recurrence appears within `config.splitting_max_steps` rounds.
    pub fn splitting_sequences(
        &self,
        dilatation: Option<&W>,
        config: &SearchConfig,
    ) -> Result<Vec<SplittingSequence<W>>, LaminarError> {
        let lamination = self.remove_peripheral();
        if lamination.is_empty() {
            return Err(LaminarError::NotFilling);
        }
        let source = Arc::clone(lamination.triangulation());
        let tripods: Vec<usize> = (0..source.num_triangles())
            .filter(|&t| {
                lamination
                    .dual_weights_doubled(t)
                    .iter()
                    .all(|d| *d > W::zero())
            })
            .collect();
        let puncture = Move::from(LinearTransformation::puncture(&source, &tripods)?);
        let mut current = puncture.apply(&lamination)?;
        log::debug!("splitting after puncturing {} tripods", tripods.len());

        let mut flips: Vec<Move> = Vec::new();
        let mut history: Vec<(Lamination<W>, usize)> = Vec::new();
        let mut seen: HashMap<(String, Vec<BigInt>), Vec<usize>> = HashMap::new();
        for step in 0..=config.splitting_max_steps {
            let key = current.projective_hash(config.projective_denominator);
            if let Some(earlier) = seen.get(&key) {
                for &j in earlier {
                    let found = recurrences(&history[j], &current, &flips, &puncture, dilatation);
                    if !found.is_empty() {
                        log::debug!(
                            "splitting sequence closes at round {step} with period {}",
                            flips.len() - history[j].1
                        );
                        return Ok(found);
                    }
                }
            }
            seen.entry(key).or_default().push(history.len());
            history.push((current.clone(), flips.len()));

            let heaviest = current
                .geometric()
                .iter()
                .max()
                .cloned()
                .unwrap_or_else(W::zero);
            if heaviest.is_zero() {
                return Err(LaminarError::NotFilling);
            }
            let targets: Vec<usize> = current
                .triangulation()
                .indices()
                .filter(|&i| *current.get(i) == heaviest)
                .collect();
            for i in targets {
                let tri = Arc::clone(current.triangulation());
                if !tri.is_flippable(i) {
                    return Err(LaminarError::NotFilling);
                }
                let flip = Move::from(EdgeFlip::new(&tri, EdgeLabel::positive(i))?);
                current = flip.apply(&current)?;
                flips.push(flip);
            }
            if current.geometric().iter().any(Zero::is_zero) {
                return Err(LaminarError::NotFilling);
            }
            log::trace!("splitting round {step}: {} flips so far", flips.len());
        }
        Err(LaminarError::NotFilling)
    }
}

/// Sequences closing `earlier` onto `current`, one per isometry that carries
/// `current` projectively onto `earlier`.
fn recurrences<W: Weight>(
    earlier: &(Lamination<W>, usize),
    current: &Lamination<W>,
    flips: &[Move],
    puncture: &Move,
    dilatation: Option<&W>,
) -> Vec<SplittingSequence<W>> {
    let (old, start) = earlier;
    let (old_tri, new_tri) = (old.triangulation(), current.triangulation());
    let mut out = Vec::new();
    for map in new_tri.isometries_to(old_tri, true) {
        let iso = Isometry::from_search(new_tri, old_tri, map);
        let geometric = iso.apply_geometric(current.geometric());
        let image = Lamination::new_unchecked(
            Arc::clone(old_tri),
            geometric,
            vec![W::zero(); old.zeta()],
        );
        if !image.projective_eq(old) {
            continue;
        }
        let (before, after) = (old.weight(), image.weight());
        if let Some(d) = dilatation {
            if before != after.clone() * d.clone() && after != before.clone() * d.clone() {
                continue;
            }
        }
        let mut pre: Vec<Move> = vec![puncture.clone()];
        pre.extend(flips[..*start].iter().cloned());
        let mut periodic: Vec<Move> = flips[*start..].to_vec();
        periodic.push(iso.into());
        out.push(SplittingSequence {
            lamination: old.clone(),
            preperiodic: Encoding::from_applied(pre),
            periodic: Encoding::from_applied(periodic),
            ratio: (before, after),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::triangulation::Triangulation;

    fn torus() -> Arc<Triangulation> {
        Arc::new(Triangulation::new(vec![[0, 1, 2], [-1, -2, -3]]).unwrap())
    }

    #[test]
    fn curves_are_not_filling() {
        let t = torus();
        let a = t.lamination(&[1, 0, 1]).unwrap();
        let err = a
            .splitting_sequences(None, &SearchConfig::default())
            .unwrap_err();
        assert_eq!(err, LaminarError::NotFilling);
    }

    #[test]
    fn empty_and_peripheral_laminations_are_not_filling() {
        let t = torus();
        let cfg = SearchConfig::default();
        assert!(t.empty_lamination::<BigInt>().splitting_sequences(None, &cfg).is_err());
        let p = t.peripheral_curve(0).unwrap();
        assert_eq!(
            p.splitting_sequences(None, &cfg).unwrap_err(),
            LaminarError::NotFilling
        );
    }

    #[test]
    fn round_limit_is_respected() {
        let t = torus();
        let cfg = SearchConfig {
            splitting_max_steps: 0,
            ..SearchConfig::default()
        };
        let l = t.lamination(&[2, 3, 5]).unwrap();
        assert!(l.splitting_sequences(None, &cfg).is_err());
    }
}
