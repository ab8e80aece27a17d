//! Piecewise-linear structure of an encoding.
//!
//! Each flip acts on weights by one of two linear maps, chosen by which of
//! `a + c` and `b + d` is larger. Fixing a branch for every flip gives a cell
//! of the weight space, cut out by one half-space per flip, on which the
//! whole encoding is a single integer matrix.

use itertools::Itertools;
use num_bigint::BigInt;
use num_traits::Zero;

use crate::encoding::moves::{EdgeFlip, Move};
use crate::encoding::Encoding;
use crate::exact::matrix::ExactMatrix;
use crate::exact::weight::Weight;
use crate::laminar_error::LaminarError;
use crate::lamination::Lamination;

/// Action and condition matrices of one PL cell, in source coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    /// The encoding restricted to the cell.
    pub action: ExactMatrix,
    /// `condition · w ≥ 0` holds exactly on the cell.
    pub condition: ExactMatrix,
}

/// Accumulates the action rows and conditions while walking the moves.
struct CellBuilder {
    zeta: usize,
    rows: Vec<Vec<BigInt>>,
    conditions: Vec<Vec<BigInt>>,
}

fn combine(parts: &[(&[BigInt], i64)]) -> Vec<BigInt> {
    let n = parts.first().map_or(0, |(r, _)| r.len());
    let mut out = vec![BigInt::zero(); n];
    for (row, k) in parts {
        for (o, x) in out.iter_mut().zip(row.iter()) {
            *o += x * BigInt::from(*k);
        }
    }
    out
}

impl CellBuilder {
    fn new(zeta: usize) -> Self {
        let rows = (0..zeta)
            .map(|i| {
                let mut r = vec![BigInt::zero(); zeta];
                r[i] = BigInt::from(1);
                r
            })
            .collect();
        CellBuilder {
            zeta,
            rows,
            conditions: Vec::new(),
        }
    }

    /// Branch 0 is `a + c ≥ b + d`.
    fn flip(&mut self, flip: &EdgeFlip, branch: usize) {
        let [a, b, c, d] = flip.square().map(|l| l.index());
        let ((p, q), (r, s)) = if branch == 0 { ((a, c), (b, d)) } else { ((b, d), (a, c)) };
        let e = flip.index();
        let rows = &self.rows;
        let row = |i: usize| rows[i].as_slice();
        let new_row = combine(&[(row(p), 1), (row(q), 1), (row(e), -1)]);
        let condition = combine(&[(row(p), 1), (row(q), 1), (row(r), -1), (row(s), -1)]);
        self.conditions.push(condition);
        self.rows[e] = new_row;
    }

    fn apply(&mut self, m: &Move, branch: usize) -> Result<(), LaminarError> {
        match m {
            Move::EdgeFlip(f) => self.flip(f, branch),
            Move::Isometry(iso) => {
                let mut out = vec![Vec::new(); self.rows.len()];
                for (i, target) in iso.index_map().into_iter().enumerate() {
                    out[target] = std::mem::take(&mut self.rows[i]);
                }
                self.rows = out;
            }
            Move::LinearTransformation(_) => {
                return Err(LaminarError::Internal(
                    "linear transformations have no PL cells".into(),
                ));
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<Cell, LaminarError> {
        let action = ExactMatrix::from_rows(self.zeta, self.rows)?;
        let condition = if self.conditions.is_empty() {
            ExactMatrix::zeros(0, self.zeta)
        } else {
            ExactMatrix::from_rows(self.zeta, self.conditions)?
        };
        Ok(Cell { action, condition })
    }
}

impl Encoding {
    /// The cell containing `lamination`, with ties resolved to branch 0.
    pub fn applied_geometric<W: Weight>(
        &self,
        lamination: &Lamination<W>,
    ) -> Result<Cell, LaminarError> {
        let mut builder = CellBuilder::new(self.source().zeta());
        let mut weights = lamination.geometric().to_vec();
        for m in self.moves().iter().rev() {
            let branch = match m {
                Move::EdgeFlip(f) => {
                    let [a, b, c, d] = f.square().map(|l| weights[l.index()].clone());
                    usize::from(a + c < b + d)
                }
                _ => 0,
            };
            builder.apply(m, branch)?;
            weights = m.apply_geometric(&weights)?;
        }
        builder.finish()
    }

    /// Every branch combination, whether or not its cell has interior.
    pub fn pl_action(&self) -> impl Iterator<Item = Result<Cell, LaminarError>> + '_ {
        let applied: Vec<&Move> = self.moves().iter().rev().collect();
        let zeta = self.source().zeta();
        let ranges: Vec<_> = applied.iter().map(|m| 0..m.num_branches()).collect();
        ranges
            .into_iter()
            .multi_cartesian_product()
            .map(move |branches| {
                let mut builder = CellBuilder::new(zeta);
                for (m, branch) in applied.iter().zip(branches) {
                    builder.apply(m, branch)?;
                }
                builder.finish()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::moves::{EdgeFlip, Isometry};
    use crate::topology::label::EdgeLabel;
    use crate::topology::triangulation::Triangulation;
    use std::sync::Arc;

    fn flip_and_back() -> (Arc<Triangulation>, Encoding) {
        let t = Arc::new(Triangulation::new(vec![[0, 1, 2], [-1, -2, -3]]).unwrap());
        let flip = EdgeFlip::new(&t, EdgeLabel::positive(0)).unwrap();
        let map = flip.target().find_isometry(&t, &[]).unwrap();
        let iso = Isometry::new(flip.target(), &t, map).unwrap();
        let h = Encoding::from_moves(vec![iso.into(), flip.into()]).unwrap();
        (t, h)
    }

    #[test]
    fn applied_cell_reproduces_the_action() {
        let (t, h) = flip_and_back();
        for w in [[1, 1, 0], [0, 1, 1], [1, 1, 2], [3, 2, 1]] {
            let l = t.lamination(&w).unwrap();
            let cell = h.applied_geometric(&l).unwrap();
            assert!(cell.condition.satisfied_by(l.geometric()));
            assert_eq!(cell.action.mul_vec(l.geometric()), h.apply(&l).unwrap().geometric());
        }
    }

    #[test]
    fn every_point_lies_in_some_enumerated_cell() {
        let (t, h) = flip_and_back();
        let cells: Vec<Cell> = h.pl_action().collect::<Result<_, _>>().unwrap();
        assert_eq!(cells.len(), 2);
        let l = t.lamination(&[1, 2, 1]).unwrap();
        let image = h.apply(&l).unwrap();
        assert!(cells.iter().any(|c| c.condition.satisfied_by(l.geometric())
            && c.action.mul_vec(l.geometric()) == image.geometric()));
    }

    #[test]
    fn identity_has_an_unconditioned_cell() {
        let (t, _) = flip_and_back();
        let id = Encoding::identity(&t);
        let cells: Vec<Cell> = id.pl_action().collect::<Result<_, _>>().unwrap();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].action, ExactMatrix::identity(3));
        assert_eq!(cells[0].condition.nrows(), 0);
    }
}
