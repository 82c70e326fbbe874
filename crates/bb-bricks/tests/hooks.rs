use std::path::Path;

use bb_behaviour::{
    BehaviourDescription, BehaviourError, BehaviourSource, CodeBlockKind, Data, DataMap,
    IntegrationScheme, LocalDataStructure, ModellingHypothesis, StandardDsl, SupportedType,
    VariableCategory, VariableDescription, source,
};
use bb_bricks::{
    BrickError, IsotropicDamageHookeStressPotential, JacobianMode, StressPath, StressPotential,
    compile_source, create_stress_potential,
};

fn behaviours_dir() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("behaviours")
}

fn options(pairs: &[(&str, Data)]) -> DataMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn damage_options() -> DataMap {
    options(&[
        ("young_modulus", Data::Real(200e9)),
        ("poisson_ratio", Data::Real(0.3)),
    ])
}

#[test]
fn every_hook_needs_initialization_and_runs_once() {
    let dsl = StandardDsl::implicit();
    let mut bd = BehaviourDescription::new("Damage", IntegrationScheme::Implicit);
    let mut lds = LocalDataStructure::new();
    let mut brick = IsotropicDamageHookeStressPotential::new();

    assert!(brick.declare_elastic_prediction(&mut bd).unwrap_err().is_state());
    assert!(brick.declare_isotropic_stress(&mut bd, &mut lds).unwrap_err().is_state());
    assert!(brick.declare_stress_with_stiffness_tensor(&mut bd).unwrap_err().is_state());
    assert!(brick.add_generic_tangent_operator_support(&mut bd, &dsl).unwrap_err().is_state());
    assert!(brick.add_generic_prediction_operator_support(&mut bd).unwrap_err().is_state());
    assert!(brick.stress_derivatives(&bd).unwrap_err().is_state());

    brick.initialize(&mut bd, &dsl, &damage_options()).unwrap();
    brick.finalize(&mut bd, &dsl, &mut lds).unwrap();
    assert_eq!(brick.evaluator().stress_path(), Some(StressPath::Isotropic));

    assert!(brick.declare_elastic_prediction(&mut bd).unwrap_err().is_state());
    assert!(brick.declare_isotropic_stress(&mut bd, &mut lds).unwrap_err().is_state());
    assert!(brick.add_generic_tangent_operator_support(&mut bd, &dsl).unwrap_err().is_state());
    assert!(brick.add_generic_prediction_operator_support(&mut bd).unwrap_err().is_state());
    // the other stress path is still callable once, and fails on its storage
    let err = brick.declare_stress_with_stiffness_tensor(&mut bd).unwrap_err();
    assert_eq!(err.option(), Some("stiffness_tensor_storage"));
}

#[test]
fn hooks_after_the_constant_stiffness_path_are_state_errors() {
    let dsl = StandardDsl::implicit();
    let mut bd = BehaviourDescription::new("Damage", IntegrationScheme::Implicit);
    let mut lds = LocalDataStructure::new();
    let mut brick = IsotropicDamageHookeStressPotential::new();
    let mut data = damage_options();
    data.insert("stiffness_tensor_storage".into(), Data::from("constant"));
    brick.initialize(&mut bd, &dsl, &data).unwrap();
    brick.finalize(&mut bd, &dsl, &mut lds).unwrap();
    assert_eq!(brick.evaluator().stress_path(), Some(StressPath::StiffnessTensor));
    let blocks = bd.code_blocks(CodeBlockKind::ComputeStress).len();

    assert!(brick.declare_stress_with_stiffness_tensor(&mut bd).unwrap_err().is_state());
    assert!(brick.declare_elastic_prediction(&mut bd).unwrap_err().is_state());
    assert!(brick.add_generic_tangent_operator_support(&mut bd, &dsl).unwrap_err().is_state());
    assert!(brick.add_generic_prediction_operator_support(&mut bd).unwrap_err().is_state());
    assert_eq!(bd.code_blocks(CodeBlockKind::ComputeStress).len(), blocks);
}

#[test]
fn reserved_damage_variable_leaves_the_description_untouched() {
    let dsl = StandardDsl::implicit();
    let mut bd = BehaviourDescription::new("Damage", IntegrationScheme::Implicit);
    let mut brick = IsotropicDamageHookeStressPotential::new();
    let before: Vec<String> = bd.state_variables().map(|v| v.name.clone()).collect();
    for name in ["lambda", "mu", "D"] {
        let mut data = damage_options();
        data.insert("damage_variable".into(), Data::from(name));
        let err = brick.initialize(&mut bd, &dsl, &data).unwrap_err();
        assert_eq!(err.option(), Some("damage_variable"), "{name}: {err}");
    }
    let after: Vec<String> = bd.state_variables().map(|v| v.name.clone()).collect();
    assert_eq!(before, after);
    assert!(!bd.has_variable("eel"));
    assert_eq!(bd.attributes().count(), 0);
    assert!(bd.code_blocks(CodeBlockKind::Integrator).is_empty());

    brick.initialize(&mut bd, &dsl, &damage_options()).unwrap();
    assert_eq!(brick.damage_variable(), Some("d"));
}

#[test]
fn clashing_lame_coefficient_fails_before_any_declaration() {
    let dsl = StandardDsl::implicit();
    let mut bd = BehaviourDescription::new("Damage", IntegrationScheme::Implicit);
    bd.declare(
        VariableCategory::StateVariable,
        VariableDescription::new(SupportedType::Real, "mu"),
    )
    .unwrap();
    let mut brick = IsotropicDamageHookeStressPotential::new();
    let err = brick.initialize(&mut bd, &dsl, &damage_options()).unwrap_err();
    let duplicate = match &err {
        BrickError::Behaviour(BehaviourError::DuplicateVariable { name }) => name.as_str(),
        other => panic!("unexpected error: {other}"),
    };
    assert_eq!(duplicate, "mu");
    assert!(!bd.has_variable("eel"));
    assert!(!bd.has_variable("d"));
    assert!(!bd.has_variable("lambda"));
    assert_eq!(bd.attributes().count(), 0);
    assert!(!brick.evaluator().is_initialized());
}

#[test]
fn isotropic_path_registers_the_damage_factor() {
    let dsl = StandardDsl::implicit();
    let mut bd = BehaviourDescription::new("Damage", IntegrationScheme::Implicit);
    let mut lds = LocalDataStructure::new();
    let mut brick = IsotropicDamageHookeStressPotential::new();
    brick.initialize(&mut bd, &dsl, &damage_options()).unwrap();
    brick.finalize(&mut bd, &dsl, &mut lds).unwrap();

    assert!(lds.contains("omega_d"));
    assert!(!lds.contains("lambda_ets"));
    let stress = bd.code_blocks(CodeBlockKind::ComputeStress)[0].to_string();
    assert_eq!(
        stress,
        "omega_d = 1 - (this->d + this->theta * this->dd);\n\
         this->sig = omega_d * (this->lambda * trace(this->eel + this->theta * this->deel) \
         * Stensor::Id() + 2 * this->mu * (this->eel + this->theta * this->deel));\n"
    );
    let final_stress = bd.code_blocks(CodeBlockKind::ComputeFinalStress)[0].to_string();
    assert!(final_stress.starts_with("omega_d = 1 - this->d;\n"));
}

#[test]
fn operators_are_bounded_and_consistent() {
    let dsl = StandardDsl::implicit();
    let mut bd = BehaviourDescription::new("Damage", IntegrationScheme::Implicit);
    let mut lds = LocalDataStructure::new();
    let mut brick = IsotropicDamageHookeStressPotential::new();
    let mut data = damage_options();
    data.insert("damage_upper_bound".into(), Data::Real(0.9));
    brick.initialize(&mut bd, &dsl, &data).unwrap();
    brick.finalize(&mut bd, &dsl, &mut lds).unwrap();

    let tangent = bd.code_blocks(CodeBlockKind::TangentOperator)[0].to_string();
    assert!(tangent.starts_with("if ((smt == ELASTIC) || (smt == SECANTOPERATOR)) {\n"));
    assert!(tangent.contains("this->Dt = (1 - std::min(this->d, 0.9)) * "));
    assert!(tangent.contains("getPartialJacobianInvert(iJ_eel_eel, iJ_d_eel);"));
    assert!(tangent.contains(") * this->eel) ^ (iJ_d_eel))"), "{tangent}");
    assert!(tangent.ends_with("} else {\n  return false;\n}\n"));

    let prediction = bd.code_blocks(CodeBlockKind::PredictionOperator)[0].to_string();
    assert!(prediction.contains("this->Dt = (1 - std::min(this->d, 0.9)) * "));
    assert!(!prediction.contains("CONSISTENTTANGENTOPERATOR"));
}

#[test]
fn disabled_operators_emit_nothing() {
    let dsl = StandardDsl::implicit();
    let mut bd = BehaviourDescription::new("Damage", IntegrationScheme::Implicit);
    let mut lds = LocalDataStructure::new();
    let mut brick = IsotropicDamageHookeStressPotential::new();
    let mut data = damage_options();
    data.insert("generic_tangent_operator".into(), Data::Bool(false));
    data.insert("generic_prediction_operator".into(), Data::Bool(false));
    brick.initialize(&mut bd, &dsl, &data).unwrap();
    brick.finalize(&mut bd, &dsl, &mut lds).unwrap();
    assert!(bd.code_blocks(CodeBlockKind::TangentOperator).is_empty());
    assert!(bd.code_blocks(CodeBlockKind::PredictionOperator).is_empty());
}

#[test]
fn explicit_scheme_emits_elastic_and_secant_operators() {
    let dsl = StandardDsl::runge_kutta();
    let mut bd = BehaviourDescription::new("Explicit", IntegrationScheme::Explicit);
    let mut lds = LocalDataStructure::new();
    let mut brick = IsotropicDamageHookeStressPotential::new();
    brick.initialize(&mut bd, &dsl, &damage_options()).unwrap();
    brick.finalize(&mut bd, &dsl, &mut lds).unwrap();

    let tangent = bd.code_blocks(CodeBlockKind::TangentOperator)[0].to_string();
    assert!(tangent.starts_with("if ((smt == ELASTIC) || (smt == SECANTOPERATOR)) {\n"));
    assert!(tangent.contains("this->Dt = (1 - std::min(this->d, 0.99)) * "));
    assert!(!tangent.contains("CONSISTENTTANGENTOPERATOR"), "{tangent}");
    assert!(!tangent.contains("getPartialJacobianInvert"), "{tangent}");
    assert!(tangent.ends_with("} else {\n  return false;\n}\n"));
    assert_eq!(bd.code_blocks(CodeBlockKind::PredictionOperator).len(), 1);
}

#[test]
fn plane_stress_support_without_hypothesis_is_dropped() {
    let dsl = StandardDsl::implicit();
    let mut bd = BehaviourDescription::new("Damage", IntegrationScheme::Implicit);
    let mut brick = IsotropicDamageHookeStressPotential::new();
    let mut data = damage_options();
    data.insert("plane_stress_support".into(), Data::Bool(true));
    brick.initialize(&mut bd, &dsl, &data).unwrap();
    assert!(!bd.has_variable("etozz"));
    assert!(!bd.flag("plane_stress_support"));
    let config = brick.evaluator().configuration().unwrap();
    assert!(!config.plane_stress);
}

#[test]
fn plane_stress_support_declares_the_axial_strain() {
    let dsl = StandardDsl::implicit();
    let mut bd = BehaviourDescription::new("Damage", IntegrationScheme::Implicit);
    bd.set_hypotheses(vec![
        ModellingHypothesis::Tridimensional,
        ModellingHypothesis::PlaneStress,
    ]);
    let mut brick = IsotropicDamageHookeStressPotential::new();
    let mut data = damage_options();
    data.insert("plane_stress_support".into(), Data::Bool(true));
    brick.initialize(&mut bd, &dsl, &data).unwrap();
    assert!(bd.has_variable("etozz"));
    assert!(bd.flag("plane_stress_support"));
    let integrator = bd.code_blocks(CodeBlockKind::Integrator)[0].to_string();
    assert!(integrator.contains("if (hypothesis == ModellingHypothesis::PLANESTRESS) {"));
    assert!(integrator.contains("this->feel(2) -= this->detozz;"));
}

#[test]
fn jacobian_blocks_of_the_damage_equation() {
    let dsl = StandardDsl::implicit();
    let mut bd = BehaviourDescription::new("Damage", IntegrationScheme::Implicit);
    let mut brick = create_stress_potential("IsotropicDamageHooke").unwrap();
    brick.initialize(&mut bd, &dsl, &damage_options()).unwrap();

    let analytical = JacobianMode::Analytical;
    let code = brick
        .generate_implicit_equation_derivatives(&bd, "fd", "eel", "dfd_dsig", analytical)
        .unwrap();
    assert!(code.starts_with("dfd_ddeel += (dfd_dsig) * ("));
    let code = brick
        .generate_implicit_equation_derivatives(&bd, "feel", "d", "dfeel_dsig", analytical)
        .unwrap();
    assert!(code.starts_with("dfeel_ddd += (dfeel_dsig) * ("));

    // the stress does not depend on the temperature increment here
    let code = brick
        .generate_implicit_equation_derivatives(&bd, "feel", "T", "J", JacobianMode::Analytical)
        .unwrap();
    assert!(code.is_empty());

    let numerical = brick
        .generate_implicit_equation_derivatives(
            &bd,
            "feel",
            "d",
            "J",
            JacobianMode::Numerical { epsilon: 1e-7 },
        )
        .unwrap();
    assert!(numerical.contains("this->dd + nd_epsilon"));
    bd.add_jacobian_contribution(brick.name(), "feel", "d", numerical.clone()).unwrap();
    assert_eq!(bd.jacobian_contribution("feel", "d"), numerical);
    assert!(bd.add_jacobian_contribution(brick.name(), "feel", "d", numerical).is_err());
}

#[test]
fn sample_behaviours_compile() {
    let samples = [
        ("isotropic_damage.yaml", StressPath::StiffnessTensor, 2),
        ("thermal_damage.yaml", StressPath::Isotropic, 2),
        ("porous_damage.yaml", StressPath::Isotropic, 3),
        ("hooke_stiffness_tensor.json", StressPath::StiffnessTensor, 1),
    ];
    for (name, path, derivatives) in samples {
        let source = source::load(&behaviours_dir().join(name)).unwrap();
        let compiled =
            compile_source(&source).unwrap_or_else(|e| panic!("Failed to compile {name}: {e}"));
        assert_eq!(compiled.stress_potential.derivatives.len(), derivatives, "{name}");
        let stress = compiled.description.code_blocks(CodeBlockKind::ComputeStress)[0].to_string();
        match path {
            StressPath::StiffnessTensor => assert!(stress.contains("this->D * "), "{name}"),
            StressPath::Isotropic => {
                assert!(compiled.stress_potential.local_data.contains("omega_d"), "{name}")
            }
        }
        assert!(!compiled.description.render_code().is_empty(), "{name}");
    }
}

#[test]
fn porous_sample_differentiates_through_the_porosity() {
    let source = source::load(&behaviours_dir().join("porous_damage.yaml")).unwrap();
    let compiled = compile_source(&source).unwrap();
    let entries = &compiled.stress_potential.derivatives;
    let names: Vec<_> = entries.iter().map(|e| e.variable.as_str()).collect();
    assert_eq!(names, ["eel", "d", "f"]);
    assert!(compiled.stress_potential.local_data.contains("lambda_ets"));
    assert!(compiled.stress_potential.local_data.contains("mu_ets"));

    let stress = compiled.description.code_blocks(CodeBlockKind::ComputeStress)[0].to_string();
    assert!(stress.starts_with("this->lambda = "));
    assert!(stress.contains("this->f + this->theta * this->df"));
}

#[test]
fn unknown_brick_is_a_configuration_error() {
    let source = BehaviourSource::from_yaml_str(
        "name: B\nstress_potential:\n  name: DDIF2\n",
    )
    .unwrap();
    let err = compile_source(&source).err().unwrap();
    assert_eq!(err.option(), Some("stress_potential"));
}
