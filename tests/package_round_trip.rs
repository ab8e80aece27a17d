mod util;

use laminar::encoding::package::EncodingPackage;
use laminar::encoding::Encoding;
use laminar::equipped;
use laminar::topology::triangulation::Triangulation;
use util::s_1_2;

#[test]
fn mapping_classes_survive_json() {
    let s = equipped::s_1_1().unwrap();
    for word in ["a", "aB", "abAB"] {
        let h = s.mapping_class(word).unwrap();
        let json = serde_json::to_string_pretty(&h.package()).unwrap();
        let package: EncodingPackage = serde_json::from_str(&json).unwrap();
        let back = Encoding::from_package(&package).unwrap();
        assert_eq!(back.name(), Some(word));
        assert_eq!(back.len(), h.len());
        assert_eq!(back.flip_indices(), h.flip_indices());
        assert_eq!(back, h);
        let curve = back.source().key_curves().remove(0);
        assert_eq!(back.apply(&curve).unwrap().geometric(), h.apply(&curve).unwrap().geometric());
    }
}

#[test]
fn triangulation_packages_keep_the_signature() {
    let t = s_1_2();
    let json = serde_json::to_value(t.package()).unwrap();
    assert_eq!(json["triangles"].as_array().unwrap().len(), 4);
    let back = Triangulation::from_package(&serde_json::from_value(json).unwrap()).unwrap();
    assert_eq!(back.iso_sig(), t.iso_sig());
}

#[test]
fn malformed_packages_are_rejected() {
    let bad = r#"{"source": {"triangles": [[0, 1, 2], [0, -2, -3]]}, "moves": []}"#;
    let package: EncodingPackage = serde_json::from_str(bad).unwrap();
    assert!(Encoding::from_package(&package).is_err());
}
