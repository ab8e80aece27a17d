//! Triangulations equipped with named curves.
//!
//! Each lower case letter names a curve; the letter stands for the twist
//! along it (or the half twist, for letters registered as such) and the upper
//! case letter for its inverse. Words are read as compositions, so `"ab"` is
//! `a ∘ b`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use rand::Rng;

use crate::encoding::Encoding;
use crate::laminar_error::LaminarError;
use crate::lamination::Lamination;
use crate::topology::triangulation::Triangulation;

pub struct EquippedTriangulation {
    triangulation: Arc<Triangulation>,
    laminations: BTreeMap<char, Lamination>,
    half_twists: BTreeSet<char>,
    generators: RwLock<HashMap<char, Encoding>>,
}

impl EquippedTriangulation {
    /// Every name must be a lower case letter and every lamination must live
    /// on `triangulation`.
    pub fn new(
        triangulation: Arc<Triangulation>,
        laminations: impl IntoIterator<Item = (char, Lamination)>,
    ) -> Result<Self, LaminarError> {
        let mut named = BTreeMap::new();
        for (name, lam) in laminations {
            if !name.is_ascii_lowercase() {
                return Err(LaminarError::UnknownLetter(name));
            }
            if !Arc::ptr_eq(lam.triangulation(), &triangulation)
                && **lam.triangulation() != *triangulation
            {
                return Err(LaminarError::IncompatibleTriangulations(format!(
                    "curve {name} lives on another triangulation"
                )));
            }
            named.insert(name, lam);
        }
        Ok(EquippedTriangulation {
            triangulation,
            laminations: named,
            half_twists: BTreeSet::new(),
            generators: RwLock::new(HashMap::new()),
        })
    }

    /// Marks the curve named `name` as generating a half twist rather than a
    /// twist.
    pub fn with_half_twist(mut self, name: char) -> Result<Self, LaminarError> {
        if !self.laminations.contains_key(&name) {
            return Err(LaminarError::UnknownLetter(name));
        }
        self.half_twists.insert(name);
        self.generators.get_mut().clear();
        Ok(self)
    }

    pub fn triangulation(&self) -> &Arc<Triangulation> {
        &self.triangulation
    }

    pub fn lamination(&self, name: char) -> Option<&Lamination> {
        self.laminations.get(&name)
    }

    /// The lower case letters, in order.
    pub fn letters(&self) -> Vec<char> {
        self.laminations.keys().copied().collect()
    }

    pub fn is_half_twist(&self, name: char) -> bool {
        self.half_twists.contains(&name.to_ascii_lowercase())
    }

    /// The encoding a single letter stands for, built on first use.
    pub fn generator(&self, letter: char) -> Result<Encoding, LaminarError> {
        if let Some(h) = self.generators.read().get(&letter) {
            return Ok(h.clone());
        }
        let name = letter.to_ascii_lowercase();
        let curve = self
            .laminations
            .get(&name)
            .ok_or(LaminarError::UnknownLetter(letter))?;
        let power = if letter.is_ascii_lowercase() { 1 } else { -1 };
        let h = if self.half_twists.contains(&name) {
            curve.encode_halftwist(power)?
        } else {
            curve.encode_twist(power)?
        };
        let h = h.with_name(letter.to_string());
        log::trace!("built generator {letter} with {} moves", h.len());
        self.generators.write().insert(letter, h.clone());
        Ok(h)
    }

    /// The composition of the generators spelt by `word`; the empty word is
    /// the identity.
    pub fn mapping_class(&self, word: &str) -> Result<Encoding, LaminarError> {
        let mut h = Encoding::identity(&self.triangulation);
        for letter in word.chars() {
            h = &h * &self.generator(letter)?;
        }
        Ok(h.with_name(word))
    }

    /// A word of `len` letters drawn uniformly from the generators and their
    /// inverses.
    pub fn random_word<R: Rng + ?Sized>(&self, rng: &mut R, len: usize) -> String {
        let alphabet: Vec<char> = self
            .laminations
            .keys()
            .flat_map(|&c| [c, c.to_ascii_uppercase()])
            .collect();
        if alphabet.is_empty() {
            return String::new();
        }
        (0..len)
            .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
            .collect()
    }
}

impl std::fmt::Debug for EquippedTriangulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EquippedTriangulation")
            .field("triangulation", &self.triangulation)
            .field("letters", &self.letters())
            .field("half_twists", &self.half_twists)
            .finish()
    }
}

fn equip(
    triangles: Vec<[i32; 3]>,
    curves: &[(char, &[i64])],
) -> Result<EquippedTriangulation, LaminarError> {
    let tri = Arc::new(Triangulation::new(triangles)?);
    let laminations = curves
        .iter()
        .map(|&(name, w)| Ok((name, tri.lamination(w)?)))
        .collect::<Result<Vec<_>, LaminarError>>()?;
    EquippedTriangulation::new(tri, laminations)
}

/// The once-punctured torus with its two standard curves.
pub fn s_1_1() -> Result<EquippedTriangulation, LaminarError> {
    equip(
        vec![[0, 1, 2], [-1, -2, -3]],
        &[('a', &[1, 0, 1]), ('b', &[0, 1, 1])],
    )
}

/// The twice-punctured torus with a chain of three curves.
pub fn s_1_2() -> Result<EquippedTriangulation, LaminarError> {
    equip(
        vec![[0, 2, 1], [-1, 3, -2], [-3, 4, 5], [-4, -5, -6]],
        &[
            ('a', &[1, 1, 0, 0, 0, 0]),
            ('b', &[1, 0, 1, 1, 1, 0]),
            ('c', &[0, 0, 0, 0, 1, 1]),
        ],
    )
}

/// The four-punctured sphere, built from two once-punctured monogons glued to
/// an annulus. `x` is the half twist swapping the punctures on one side of
/// the annulus.
pub fn s_0_4() -> Result<EquippedTriangulation, LaminarError> {
    equip(
        vec![[0, 1, 2], [-2, 4, -5], [-1, 3, -3], [-4, 5, -6]],
        &[('x', &[1, 0, 1, 0, 0, 0])],
    )?
    .with_half_twist('x')
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn fixtures_carry_curves() {
        let s = s_1_1().unwrap();
        assert_eq!(s.letters(), vec!['a', 'b']);
        assert!(s.lamination('a').unwrap().is_curve());
        let s = s_1_2().unwrap();
        assert_eq!(s.triangulation().num_vertices(), 2);
        for c in s.letters() {
            assert!(s.lamination(c).unwrap().is_twistable());
        }
    }

    #[test]
    fn letters_are_cached_and_inverted() {
        let s = s_1_1().unwrap();
        let a = s.generator('a').unwrap();
        let big_a = s.generator('A').unwrap();
        assert_eq!(a.name(), Some("a"));
        let id = &a * &big_a;
        assert!(id.is_identity().unwrap());
        assert_eq!(s.generator('a').unwrap().len(), a.len());
    }

    #[test]
    fn unknown_letters_are_rejected() {
        let s = s_1_1().unwrap();
        assert_eq!(s.mapping_class("az").unwrap_err(), LaminarError::UnknownLetter('z'));
        assert!(s.mapping_class("").unwrap().is_identity().unwrap());
        assert!(matches!(
            s.with_half_twist('q'),
            Err(LaminarError::UnknownLetter('q'))
        ));
    }

    #[test]
    fn words_compose_left_to_right_as_functions() {
        let s = s_1_1().unwrap();
        let ab = s.mapping_class("ab").unwrap();
        let a = s.generator('a').unwrap();
        let b = s.generator('b').unwrap();
        let curve = s.lamination('b').unwrap();
        let direct = a.apply(&b.apply(curve).unwrap()).unwrap();
        assert_eq!(ab.apply(curve).unwrap(), direct);
        assert_eq!(ab.name(), Some("ab"));
    }

    #[test]
    fn half_twist_squares_to_the_twist() {
        let s = s_0_4().unwrap();
        assert!(s.is_half_twist('X'));
        let curve = s.lamination('x').unwrap();
        assert!(curve.is_halftwistable());
        let x = s.generator('x').unwrap();
        assert_eq!(x.pow(2).unwrap(), curve.encode_twist(1).unwrap());
        assert_eq!(x.apply(curve).unwrap().geometric(), curve.geometric());
    }

    #[test]
    fn random_words_use_the_alphabet() {
        let s = s_1_2().unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        let w = s.random_word(&mut rng, 20);
        assert_eq!(w.chars().count(), 20);
        assert!(w.chars().all(|c| "abcABC".contains(c)));
        let mut again = SmallRng::seed_from_u64(7);
        assert_eq!(s.random_word(&mut again, 20), w);
    }

    #[test]
    fn twists_grow_crossing_curves() {
        let s = s_1_1().unwrap();
        let b = s.lamination('b').unwrap();
        let image = s.mapping_class("aa").unwrap().apply(b).unwrap();
        assert_eq!(image.weight(), BigInt::from(6));
    }
}
