mod util;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use laminar::encoding::{Encoding, Isometry, NielsenThurstonType};
use laminar::equipped;
use laminar::laminar_error::LaminarError;
use util::{s_1_2, torus};

#[test]
fn ab_is_periodic_on_the_punctured_torus() {
    let s = equipped::s_1_1().unwrap();
    let h = s.mapping_class("ab").unwrap();
    let order = h.order().unwrap();
    assert!(order > 0 && 6 % order == 0, "order {order}");
    assert_eq!(h.nielsen_thurston_type().unwrap(), NielsenThurstonType::Periodic);
    assert!(h.is_periodic().unwrap());
    assert!(h.pow(order as i64).unwrap().is_identity().unwrap());
}

#[test]
fn a_b_inverse_is_pseudo_anosov() {
    let s = equipped::s_1_1().unwrap();
    let h = s.mapping_class("aB").unwrap();
    assert_eq!(h.order().unwrap(), 0);
    let found = h.invariant_lamination().unwrap();
    assert!(!found.lamination.is_empty());
    assert_eq!(
        h.apply(&found.lamination).unwrap(),
        found.lamination.scale(&found.dilatation)
    );
    assert!(h.is_pseudo_anosov().unwrap());
}

#[test]
fn dilatation_and_splitting_of_a_b_inverse() {
    let s = equipped::s_1_1().unwrap();
    let h = s.mapping_class("aB").unwrap();
    let lambda = h.dilatation().unwrap().to_f64();
    assert!(lambda > 1.0);
    // The matrix [[2, 1], [1, 1]] has leading eigenvalue (3 + √5) / 2.
    assert!((lambda - (3.0 + 5f64.sqrt()) / 2.0).abs() < 1e-6, "λ = {lambda}");
    let seq = h.splitting_sequence().unwrap();
    assert!(!seq.flips().is_empty());
    assert!(seq.periodic().is_mapping_class());
    assert!(seq.closing_isometry().is_some());
}

#[test]
fn single_twist_is_reducible_on_the_twice_punctured_torus() {
    let s = equipped::s_1_2().unwrap();
    let h = s.mapping_class("a").unwrap();
    assert_eq!(h.order().unwrap(), 0);
    assert_eq!(h.nielsen_thurston_type().unwrap(), NielsenThurstonType::Reducible);
    assert!(h.is_reducible().unwrap());
    assert!(h.invariant_lamination().unwrap_err().is_assumption());
}

#[test]
fn finite_orders_return_to_the_identity() {
    for t in [torus(), s_1_2()] {
        for map in t.isometries_to(&t, true) {
            let h = Encoding::from_moves(vec![Isometry::new(&t, &t, map).unwrap().into()]).unwrap();
            let k = h.order().unwrap();
            assert!(k > 0);
            assert!(h.pow(k as i64).unwrap().is_identity().unwrap());
        }
    }
    let s = equipped::s_1_1().unwrap();
    for word in ["", "ab", "ba", "aba", "AB"] {
        let h = s.mapping_class(word).unwrap();
        let k = h.order().unwrap();
        assert!(k > 0, "{word} should be periodic");
        assert!(h.pow(k as i64).unwrap().is_identity().unwrap());
    }
}

#[test]
fn random_words_are_reproducible_and_classifiable() {
    let s = equipped::s_1_1().unwrap();
    let mut rng = SmallRng::seed_from_u64(2024);
    let words: Vec<String> = (0..4).map(|_| s.random_word(&mut rng, 3)).collect();
    let mut again = SmallRng::seed_from_u64(2024);
    let replay: Vec<String> = (0..4).map(|_| s.random_word(&mut again, 3)).collect();
    assert_eq!(words, replay);
    for (word, kind) in laminar::batch::classify_words(&s, &words) {
        assert!(kind.is_ok(), "{word}: {kind:?}");
    }
}

#[test]
fn powers_of_inverses_cancel() {
    let s = equipped::s_1_1().unwrap();
    let h = s.mapping_class("aB").unwrap();
    let id = &h.pow(3).unwrap() * &h.pow(-3).unwrap();
    assert!(id.is_identity().unwrap());
    assert_eq!(s.mapping_class("aA").unwrap(), Encoding::identity(s.triangulation()));
}

#[test]
fn non_mapping_classes_cannot_be_classified() {
    let t = torus();
    let flip = laminar::encoding::EdgeFlip::new(&t, laminar::topology::EdgeLabel::positive(0)).unwrap();
    let h = Encoding::from_moves(vec![flip.into()]).unwrap();
    assert_eq!(h.nielsen_thurston_type(), Err(LaminarError::NotMappingClass));
}
