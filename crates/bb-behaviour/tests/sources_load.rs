use std::path::Path;

use bb_behaviour::{
    BehaviourDsl, ElasticSymmetry, IntegrationScheme, StandardDsl, VariableCategory, source,
};

fn behaviours_dir() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("behaviours")
}

#[test]
fn sample_behaviours_load() {
    let samples = [
        "isotropic_damage.yaml",
        "thermal_damage.yaml",
        "porous_damage.yaml",
        "hooke_stiffness_tensor.json",
    ];

    for name in samples {
        let path = behaviours_dir().join(name);
        let source = source::load(&path).unwrap_or_else(|e| panic!("Failed to load {name}: {e}"));
        let bd = source
            .to_description()
            .unwrap_or_else(|e| panic!("Failed to build {name}: {e}"));
        assert_eq!(bd.integration_scheme(), IntegrationScheme::Implicit);
        assert!(bd.has_variable("T"), "{name} lacks the temperature");
    }
}

#[test]
fn json_sample_is_orthotropic_hooke() {
    let source = source::load_json(&behaviours_dir().join("hooke_stiffness_tensor.json")).unwrap();
    assert_eq!(source.symmetry, ElasticSymmetry::Orthotropic);
    assert_eq!(source.stress_potential.name, "Hooke");
    assert!(!source.stress_potential.options.contains_key("young_modulus"));
}

#[test]
fn porous_sample_has_state_dependent_modulus() {
    let source = source::load_yaml(&behaviours_dir().join("porous_damage.yaml")).unwrap();
    let bd = source.to_description().unwrap();
    let dsl = StandardDsl::for_behaviour(&bd);
    let young = bb_behaviour::MaterialProperty::from_data(
        "young_modulus",
        &source.stress_potential.options["young_modulus"],
    )
    .unwrap();
    let expr = dsl.resolve_material_property(&bd, "young_modulus", &young).unwrap();
    assert!(bd.is_field_dependent(&expr));
    assert_eq!(bd.state_dependencies(&expr), vec!["f".to_string()]);
    assert_eq!(dsl.resolve(&bd, "f"), Some(VariableCategory::StateVariable));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = source::load_yaml(&behaviours_dir().join("missing.yaml")).unwrap_err();
    assert!(matches!(err, bb_behaviour::BehaviourError::Io(_)));
}
