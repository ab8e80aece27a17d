//! Search for a projectively invariant lamination of a mapping class.
//!
//! A key curve is pushed forward again and again. Its iterates are hashed at
//! a coarse projective resolution; when two of them share a hash the tail
//! between them is averaged and the PL cell containing the average is handed
//! to the eigenvector oracle. Every few collisions recent iterates are
//! scanned for a reducing curve, and when the iteration budget runs out
//! every PL cell of the encoding is tried in turn.

use std::sync::Arc;

use hashbrown::HashMap;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Zero;

use crate::config::SearchConfig;
use crate::encoding::pl::Cell;
use crate::encoding::Encoding;
use crate::exact::eigen::{ExactEigenSolver, SturmEigenSolver};
use crate::exact::matrix::ExactMatrix;
use crate::exact::number_field::AlgebraicNumber;
use crate::exact::weight::Weight;
use crate::laminar_error::LaminarError;
use crate::lamination::{Lamination, SplittingSequence};
use crate::topology::triangulation::Triangulation;

/// A lamination `L` and `λ > 1` with `h(L) = λ·L`.
#[derive(Clone, Debug)]
pub struct InvariantLamination {
    pub dilatation: AlgebraicNumber,
    pub lamination: Lamination<AlgebraicNumber>,
}

impl Encoding {
    /// Memoised [`invariant_lamination_with`](Self::invariant_lamination_with)
    /// under the default configuration and oracle.
    pub fn invariant_lamination(&self) -> Result<InvariantLamination, LaminarError> {
        self.cache()
            .invariant
            .get_or_init(|| {
                self.invariant_lamination_with(&SearchConfig::default(), &SturmEigenSolver::default())
            })
            .clone()
    }

    pub fn dilatation(&self) -> Result<AlgebraicNumber, LaminarError> {
        Ok(self.invariant_lamination()?.dilatation)
    }

    /// A splitting sequence of the invariant lamination whose weight ratio is
    /// the dilatation.
    pub fn splitting_sequence(&self) -> Result<SplittingSequence<AlgebraicNumber>, LaminarError> {
        self.cache()
            .splitting
            .get_or_init(|| {
                let found = self.invariant_lamination()?;
                found
                    .lamination
                    .splitting_sequences(Some(&found.dilatation), &SearchConfig::default())?
                    .into_iter()
                    .next()
                    .ok_or(LaminarError::NotFilling)
            })
            .clone()
    }

    /// Unmemoised search with explicit constants and oracle.
    ///
    /// Fails with [`LaminarError::NotPseudoAnosov`] for periodic classes and
    /// with [`LaminarError::Reducible`] when a reducing curve is found or no
    /// cell has an admissible eigenvector.
    pub fn invariant_lamination_with(
        &self,
        config: &SearchConfig,
        solver: &dyn ExactEigenSolver,
    ) -> Result<InvariantLamination, LaminarError> {
        let order = self.order()?;
        if order > 0 {
            return Err(LaminarError::NotPseudoAnosov(format!("periodic of order {order}")));
        }
        Search::new(self, config, solver)?.run()
    }
}

struct Search<'a> {
    h: &'a Encoding,
    config: &'a SearchConfig,
    solver: &'a dyn ExactEigenSolver,
    triangulation: Arc<Triangulation>,
    cone: ExactMatrix,
    max_order: usize,
}

impl<'a> Search<'a> {
    fn new(
        h: &'a Encoding,
        config: &'a SearchConfig,
        solver: &'a dyn ExactEigenSolver,
    ) -> Result<Self, LaminarError> {
        let triangulation = Arc::clone(h.source());
        let cone = cone_conditions(&triangulation)?;
        let max_order = triangulation.max_order();
        Ok(Search {
            h,
            config,
            solver,
            triangulation,
            cone,
            max_order,
        })
    }

    fn run(&self) -> Result<InvariantLamination, LaminarError> {
        let seed = self
            .triangulation
            .key_curves()
            .into_iter()
            .next()
            .ok_or_else(|| LaminarError::Internal("triangulation has no key curves".into()))?;
        let mut resolution = BigInt::from(self.config.initial_resolution);
        let mut iterates: Vec<Lamination> = vec![seed];
        let mut table: HashMap<Vec<BigInt>, Vec<usize>> = HashMap::new();
        table.insert(coarse(&iterates[0], &resolution), vec![0]);
        let (mut collisions, mut at_resolution) = (0usize, 0usize);

        let limit = self.config.iteration_limit(self.max_order);
        for i in 1..=limit {
            let next = self.h.apply(&iterates[i - 1])?;
            let key = coarse(&next, &resolution);
            iterates.push(next);
            log::trace!("iterate {i} has weight {}", iterates[i].weight());

            let earlier = table.get(&key).cloned().unwrap_or_default();
            for &j in earlier.iter().rev() {
                if iterates[j] == iterates[i] {
                    return Err(LaminarError::Reducible(format!(
                        "a key curve has period {}",
                        i - j
                    )));
                }
                collisions += 1;
                at_resolution += 1;
                log::debug!("collision {collisions} between iterates {j} and {i}");
                if let Some(found) = self.try_tail(&iterates[j..=i])? {
                    return Ok(found);
                }
                if collisions % self.config.extra_test_every == 0 {
                    self.scan_for_reducing_curve(&iterates)?;
                }
            }
            table.entry(key).or_default().push(i);

            if at_resolution >= self.config.escalate_after {
                resolution *= BigInt::from(10);
                at_resolution = 0;
                log::debug!("raising hash resolution to {resolution}");
                table.clear();
                for (k, lam) in iterates.iter().enumerate() {
                    table.entry(coarse(lam, &resolution)).or_default().push(k);
                }
            }
            if i % self.max_order == 0 {
                self.scan_for_reducing_curve(&iterates)?;
            }
        }

        log::warn!("no invariant lamination after {limit} iterations; trying every PL cell");
        for cell in self.h.pl_action() {
            if let Some(found) = self.try_cell(cell?)? {
                return Ok(found);
            }
        }
        Err(LaminarError::Reducible(
            "no PL cell has an invariant lamination".into(),
        ))
    }

    /// Oracle query on the cell containing the sum of `tail`.
    fn try_tail(&self, tail: &[Lamination]) -> Result<Option<InvariantLamination>, LaminarError> {
        let mut average = tail[0].clone();
        for lam in &tail[1..] {
            average = average.checked_add(lam)?;
        }
        let cell = self.h.applied_geometric(&average)?;
        self.try_cell(cell)
    }

    fn try_cell(&self, cell: Cell) -> Result<Option<InvariantLamination>, LaminarError> {
        let condition = cell.condition.vstack(&self.cone)?;
        let (dilatation, vector) = match self.solver.directed_eigenvector(&cell.action, &condition) {
            Ok(found) => found,
            Err(LaminarError::NoInterestingEigenvector) => return Ok(None),
            Err(e) => return Err(e),
        };
        let Ok(lamination) = Lamination::from_geometric(Arc::clone(&self.triangulation), vector)
        else {
            return Ok(None);
        };
        let lamination = lamination.remove_peripheral();
        if lamination.is_empty() {
            return Ok(None);
        }
        let image = self.h.apply(&lamination)?;
        if image != lamination.scale(&dilatation) {
            log::debug!("eigenvector fails the exact invariance check");
            return Ok(None);
        }
        log::debug!("invariant lamination found, dilatation ≈ {:.6}", dilatation.to_f64());
        Ok(Some(InvariantLamination {
            dilatation,
            lamination,
        }))
    }

    /// Looks for a multicurve among differences of the last iterates that
    /// some power `h^k`, `k ≤ max_order`, fixes.
    fn scan_for_reducing_curve(&self, iterates: &[Lamination]) -> Result<(), LaminarError> {
        let Some(last) = iterates.last() else {
            return Ok(());
        };
        let n = iterates.len();
        for gap in 1..=self.max_order.min(n - 1) {
            let earlier = &iterates[n - 1 - gap];
            let diff: Vec<BigInt> = last
                .geometric()
                .iter()
                .zip(earlier.geometric())
                .map(|(a, b)| a - b)
                .collect();
            let content = diff.iter().fold(BigInt::zero(), |acc, x| acc.gcd(x));
            if content.is_zero() {
                continue;
            }
            let primitive: Vec<BigInt> = diff.into_iter().map(|x| x / &content).collect();
            let Ok(candidate) = Lamination::from_geometric(Arc::clone(&self.triangulation), primitive)
            else {
                continue;
            };
            let candidate = candidate.remove_peripheral().primitive();
            if !candidate.is_multicurve() {
                continue;
            }
            let mut image = candidate.clone();
            for k in 1..=self.max_order {
                image = self.h.apply(&image)?;
                if image.geometric() == candidate.geometric() {
                    return Err(LaminarError::Reducible(format!(
                        "multicurve {candidate} is fixed by the {k}-th power"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Coordinates rescaled to total weight `resolution`, rounded down.
fn coarse(lamination: &Lamination, resolution: &BigInt) -> Vec<BigInt> {
    let total = lamination.weight();
    if total.is_zero() {
        return vec![BigInt::zero(); lamination.zeta()];
    }
    lamination
        .geometric()
        .iter()
        .map(|w| w.scaled_floor(resolution, &total))
        .collect()
}

/// `w ≥ 0` and every doubled corner weight `≥ 0`.
fn cone_conditions(tri: &Triangulation) -> Result<ExactMatrix, LaminarError> {
    let zeta = tri.zeta();
    let mut rows: Vec<Vec<BigInt>> = (0..zeta)
        .map(|i| {
            let mut r = vec![BigInt::zero(); zeta];
            r[i] = BigInt::from(1);
            r
        })
        .collect();
    for t in 0..tri.num_triangles() {
        let sides = tri.triangle(t);
        for c in 0..3 {
            let mut r = vec![BigInt::zero(); zeta];
            r[sides[(c + 1) % 3].index()] += BigInt::from(1);
            r[sides[(c + 2) % 3].index()] += BigInt::from(1);
            r[sides[c].index()] -= BigInt::from(1);
            rows.push(r);
        }
    }
    ExactMatrix::from_rows(zeta, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn torus() -> Arc<Triangulation> {
        Arc::new(Triangulation::new(vec![[0, 1, 2], [-1, -2, -3]]).unwrap())
    }

    #[test]
    fn cone_holds_exactly_on_laminations() {
        let t = torus();
        let cone = cone_conditions(&t).unwrap();
        assert_eq!(cone.nrows(), 3 + 6);
        let ok: Vec<BigInt> = [1, 1, 2].iter().map(|&x| BigInt::from(x)).collect();
        let bad: Vec<BigInt> = [3, 0, 1].iter().map(|&x| BigInt::from(x)).collect();
        assert!(cone.satisfied_by(&ok));
        assert!(!cone.satisfied_by(&bad));
    }

    #[test]
    fn coarse_hash_is_projective() {
        let t = torus();
        let a = t.lamination(&[1, 2, 3]).unwrap();
        let b = t.lamination(&[10, 20, 30]).unwrap();
        let r = BigInt::from(100);
        assert_eq!(coarse(&a, &r), coarse(&b, &r));
        assert_eq!(coarse(&a, &r).iter().sum::<BigInt>(), BigInt::from(99));
    }

    #[test]
    fn periodic_classes_have_no_invariant_lamination() {
        let t = torus();
        let id = Encoding::identity(&t);
        let err = id.invariant_lamination().unwrap_err();
        assert!(matches!(err, LaminarError::NotPseudoAnosov(_)));
        assert!(id.dilatation().is_err());
    }
}
