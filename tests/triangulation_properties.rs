mod util;

use proptest::prelude::*;

use laminar::topology::label::EdgeLabel;
use util::{s_1_2, torus, tri};

#[test]
fn flipping_back_restores_the_signature() {
    for t in [torus(), s_1_2()] {
        let sig = t.iso_sig();
        for e in t.indices().filter(|&e| t.is_flippable(e)) {
            let label = EdgeLabel::positive(e);
            let there = t.flip_edge(label).unwrap();
            let back = there.flip_edge(!label).unwrap();
            assert_eq!(back.iso_sig(), sig);
            assert!(back.is_isometric_to(&t));
        }
    }
}

#[test]
fn every_triangulation_is_isometric_to_itself() {
    for t in [torus(), s_1_2()] {
        assert!(t.is_isometric_to(&t));
        let maps = t.isometries_to(&t, true);
        assert!(maps.iter().any(|m| m.is_identity()));
        for m in &maps {
            assert!(m.is_isometry(&t, &t));
        }
    }
}

#[test]
fn torus_has_six_self_isometries() {
    let t = torus();
    assert_eq!(t.isometries_to(&t, true).len(), 6);
}

#[test]
fn non_isometric_surfaces_have_distinct_signatures() {
    assert_ne!(torus().iso_sig(), s_1_2().iso_sig());
    let sphere = tri(vec![[0, 1, 2], [-1, 3, -3], [-2, 4, -5], [-4, 5, -6]]);
    assert_ne!(sphere.iso_sig(), s_1_2().iso_sig());
}

proptest! {
    #[test]
    fn random_flip_walks_keep_the_surface(choices in proptest::collection::vec(0usize..6, 1..12)) {
        let start = s_1_2();
        let mut t = (*start).clone();
        let mut walked = Vec::new();
        for c in choices {
            let flippable: Vec<usize> = t.indices().filter(|&e| t.is_flippable(e)).collect();
            prop_assume!(!flippable.is_empty());
            let label = EdgeLabel::positive(flippable[c % flippable.len()]);
            t = t.flip_edge(label).unwrap();
            walked.push(label);
        }
        prop_assert_eq!(t.genus(), start.genus());
        prop_assert_eq!(t.num_vertices(), start.num_vertices());
        for label in walked.into_iter().rev() {
            t = t.flip_edge(!label).unwrap();
        }
        prop_assert_eq!(t.iso_sig(), start.iso_sig());
    }
}
