mod util;

use num_bigint::BigInt;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use laminar::encoding::{EdgeFlip, Encoding, Move};
use laminar::equipped::{self, EquippedTriangulation};
use laminar::topology::label::EdgeLabel;

/// `(T - 1)²` kills every homology class when `T` is a twist.
fn assert_unipotent(t: &Encoding) {
    for g in t.source().homology_curves() {
        let once = t.apply(&g).unwrap();
        let twice = t.apply(&once).unwrap();
        for i in 0..g.algebraic().len() {
            let second_difference =
                &twice.algebraic()[i] - BigInt::from(2) * &once.algebraic()[i] + &g.algebraic()[i];
            assert_eq!(second_difference, BigInt::from(0), "class {:?}", g.algebraic());
        }
    }
}

/// For a few seeded words `h`, twisting along `h(c)` is `h ∘ T_c ∘ h⁻¹`.
fn assert_twists_conjugate(s: &EquippedTriangulation, seed: u64) {
    let mut rng = SmallRng::seed_from_u64(seed);
    for _ in 0..3 {
        let word = s.random_word(&mut rng, 3);
        let h = s.mapping_class(&word).unwrap();
        let h_inv = h.inverse().unwrap();
        for letter in s.letters() {
            let curve = s.lamination(letter).unwrap();
            let moved = h.apply(curve).unwrap();
            let direct = moved.encode_twist(1).unwrap();
            let conjugated = h
                .compose(&s.generator(letter).unwrap())
                .unwrap()
                .compose(&h_inv)
                .unwrap();
            assert_eq!(direct, conjugated, "word {word}, letter {letter}");
        }
    }
}

fn flip_encoding(s: &EquippedTriangulation, index: usize) -> Encoding {
    let flip = EdgeFlip::new(s.triangulation(), EdgeLabel::positive(index)).unwrap();
    Encoding::from_moves(vec![Move::from(flip)]).unwrap()
}

#[test]
fn torus_twists_act_unipotently_on_homology() {
    let s = equipped::s_1_1().unwrap();
    for letter in ['a', 'b', 'A', 'B'] {
        assert_unipotent(&s.generator(letter).unwrap());
    }
    // A twist composed with the elliptic involution fails the same check.
    let a = s.generator('a').unwrap();
    let ab = s.mapping_class("ab").unwrap();
    let involution = ab.pow(3).unwrap();
    assert!(!involution.is_identity().unwrap());
    let g = a.source().homology_curves().remove(0);
    let twisted = (&a * &involution).apply(&g).unwrap();
    let again = (&a * &involution).apply(&twisted).unwrap();
    let second_difference: Vec<BigInt> = (0..g.algebraic().len())
        .map(|i| &again.algebraic()[i] - BigInt::from(2) * &twisted.algebraic()[i] + &g.algebraic()[i])
        .collect();
    assert!(second_difference.iter().any(|x| *x != BigInt::from(0)));
}

#[test]
fn chain_twists_act_unipotently_on_homology() {
    let s = equipped::s_1_2().unwrap();
    for letter in s.letters() {
        assert_unipotent(&s.generator(letter).unwrap());
    }
}

#[test]
fn torus_twists_are_conjugation_equivariant() {
    let s = equipped::s_1_1().unwrap();
    assert_twists_conjugate(&s, 3);
    assert_twists_conjugate(&s, 11);
}

#[test]
fn chain_twists_are_conjugation_equivariant() {
    let s = equipped::s_1_2().unwrap();
    assert_twists_conjugate(&s, 5);
}

#[test]
fn twists_follow_a_change_of_triangulation() {
    let s = equipped::s_1_2().unwrap();
    let tri = s.triangulation();
    for index in tri.indices().filter(|&i| tri.is_flippable(i)) {
        let f = flip_encoding(&s, index);
        let f_inv = f.inverse().unwrap();
        for letter in s.letters() {
            let moved = f.apply(s.lamination(letter).unwrap()).unwrap();
            let direct = moved.encode_twist(1).unwrap();
            let conjugated = f
                .compose(&s.generator(letter).unwrap())
                .unwrap()
                .compose(&f_inv)
                .unwrap();
            assert_eq!(direct, conjugated, "flip {index}, letter {letter}");
        }
    }
}

#[test]
fn half_twist_follows_a_change_of_triangulation() {
    let s = equipped::s_0_4().unwrap();
    let x = s.generator('x').unwrap();
    let curve = s.lamination('x').unwrap();
    assert_eq!(x.pow(2).unwrap(), curve.encode_twist(1).unwrap());

    // Flipping the loop in the far monogon makes the curve longer; shortening
    // flips it back, so the half twist is found on the same side.
    let f = flip_encoding(&s, 3);
    let moved = f.apply(curve).unwrap();
    assert_eq!(moved.weight(), BigInt::from(3));
    let direct = moved.encode_halftwist(1).unwrap();
    let conjugated = f
        .compose(&x)
        .unwrap()
        .compose(&f.inverse().unwrap())
        .unwrap();
    assert_eq!(direct, conjugated);
    assert_eq!(direct.pow(2).unwrap(), moved.encode_twist(1).unwrap());
    assert_eq!(
        moved.encode_halftwist(-1).unwrap(),
        conjugated.inverse().unwrap()
    );
}
