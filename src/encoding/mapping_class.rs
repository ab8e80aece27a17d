//! Nielsen–Thurston classification of mapping classes.

use std::fmt;

use crate::encoding::Encoding;
use crate::laminar_error::LaminarError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum NielsenThurstonType {
    Periodic,
    Reducible,
    PseudoAnosov,
}

impl fmt::Display for NielsenThurstonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NielsenThurstonType::Periodic => "Periodic",
            NielsenThurstonType::Reducible => "Reducible",
            NielsenThurstonType::PseudoAnosov => "Pseudo-Anosov",
        })
    }
}

impl Encoding {
    /// The order of a periodic mapping class, or 0 when it has infinite
    /// order.
    ///
    /// Starts from every candidate order up to the bound for the surface and
    /// discards those at which some key curve or homology curve is not back
    /// where it started.
    pub fn order(&self) -> Result<usize, LaminarError> {
        self.cache()
            .order
            .get_or_init(|| self.compute_order())
            .clone()
    }

    fn compute_order(&self) -> Result<usize, LaminarError> {
        if !self.is_mapping_class() {
            return Err(LaminarError::NotMappingClass);
        }
        let source = self.source();
        let max_order = source.max_order();
        let mut candidates: Vec<usize> = (1..=max_order).collect();
        let samples = source.key_curves().into_iter().chain(source.homology_curves());
        for sample in samples {
            let mut image = sample.clone();
            let mut returns = Vec::new();
            for k in 1..=max_order {
                image = self.apply(&image)?;
                if image == sample {
                    returns.push(k);
                }
            }
            candidates.retain(|k| returns.contains(k));
            if candidates.is_empty() {
                log::trace!("infinite order: a sample curve never returns");
                return Ok(0);
            }
        }
        Ok(candidates[0])
    }

    pub fn is_identity(&self) -> Result<bool, LaminarError> {
        Ok(self.order()? == 1)
    }

    pub fn is_periodic(&self) -> Result<bool, LaminarError> {
        Ok(self.nielsen_thurston_type()? == NielsenThurstonType::Periodic)
    }

    pub fn is_reducible(&self) -> Result<bool, LaminarError> {
        Ok(self.nielsen_thurston_type()? == NielsenThurstonType::Reducible)
    }

    pub fn is_pseudo_anosov(&self) -> Result<bool, LaminarError> {
        Ok(self.nielsen_thurston_type()? == NielsenThurstonType::PseudoAnosov)
    }

    /// Periodic when of finite order; otherwise pseudo-Anosov exactly when
    /// an invariant lamination exists and splits into a periodic sequence.
    pub fn nielsen_thurston_type(&self) -> Result<NielsenThurstonType, LaminarError> {
        if self.order()? > 0 {
            return Ok(NielsenThurstonType::Periodic);
        }
        match self.splitting_sequence() {
            Ok(_) => Ok(NielsenThurstonType::PseudoAnosov),
            Err(e) if e.is_assumption() => {
                log::debug!("{self} is reducible: {e}");
                Ok(NielsenThurstonType::Reducible)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::moves::{EdgeFlip, Isometry};
    use crate::topology::label::EdgeLabel;
    use crate::topology::triangulation::Triangulation;
    use std::sync::Arc;

    fn torus() -> Arc<Triangulation> {
        Arc::new(Triangulation::new(vec![[0, 1, 2], [-1, -2, -3]]).unwrap())
    }

    #[test]
    fn identity_has_order_one() {
        let t = torus();
        let id = Encoding::identity(&t);
        assert_eq!(id.order().unwrap(), 1);
        assert!(id.is_identity().unwrap());
        assert_eq!(id.nielsen_thurston_type().unwrap(), NielsenThurstonType::Periodic);
    }

    #[test]
    fn self_isometries_are_periodic() {
        let t = torus();
        for map in t.isometries_to(&t, true) {
            let h = Encoding::from_moves(vec![Isometry::new(&t, &t, map).unwrap().into()]).unwrap();
            let k = h.order().unwrap();
            assert!(k > 0 && k <= t.max_order());
            assert!(h.pow(k as i64).unwrap().is_identity().unwrap());
        }
    }

    #[test]
    fn order_needs_a_mapping_class() {
        let t = torus();
        let flip = EdgeFlip::new(&t, EdgeLabel::positive(0)).unwrap();
        let h = Encoding::from_moves(vec![flip.into()]).unwrap();
        assert!(!h.is_mapping_class());
        assert_eq!(h.order(), Err(LaminarError::NotMappingClass));
    }

    #[test]
    fn display_names() {
        assert_eq!(NielsenThurstonType::PseudoAnosov.to_string(), "Pseudo-Anosov");
    }
}
