//! The generated stress code and the stress derivative entries agree with
//! direct evaluation.

use std::path::Path;

use bb_behaviour::{
    BehaviourDescription, BehaviourSource, CodeBlockKind, LocalDataStructure, StandardDsl, source,
};
use bb_bricks::{HookeConfiguration, IsotropicDamageHookeStressPotential, Stage, StressPotential};
use bb_core::{Tolerances, nearly_equal_slices};
use bb_tensor::mandel::{Stensor, Stensor4, from_components};
use bb_tensor::{Env, Value, fd};
use proptest::prelude::*;

fn behaviours_dir() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("behaviours")
}

fn damage_source(storage: &str) -> BehaviourSource {
    BehaviourSource::from_yaml_str(&format!(
        r#"
name: Damage
stress_potential:
  name: IsotropicDamageHooke
  options:
    young_modulus: 150e9
    poisson_ratio: 0.3
    stiffness_tensor_storage: {storage}
"#
    ))
    .unwrap()
}

fn compile(
    source: &BehaviourSource,
) -> (BehaviourDescription, IsotropicDamageHookeStressPotential) {
    let mut bd = source.to_description().unwrap();
    let dsl = StandardDsl::for_behaviour(&bd);
    let mut brick = IsotropicDamageHookeStressPotential::new();
    let mut lds = LocalDataStructure::new();
    brick
        .initialize(&mut bd, &dsl, &source.stress_potential.options)
        .unwrap();
    brick.finalize(&mut bd, &dsl, &mut lds).unwrap();
    (bd, brick)
}

fn run(bd: &BehaviourDescription, kinds: &[CodeBlockKind], env: &mut Env) {
    for kind in kinds {
        for block in bd.code_blocks(*kind) {
            block.execute(env).unwrap();
        }
    }
}

fn state(eel: [f64; 6], deel: [f64; 6], d: f64, dd: f64) -> Env {
    let mut env = Env::new();
    env.set_stensor("eel", from_components(eel))
        .set_stensor("deel", from_components(deel))
        .set_scalar("d", d)
        .set_scalar("dd", dd)
        .set_scalar("theta", 0.5);
    env
}

fn stensor(env: &Env, name: &str) -> Stensor {
    match env.get(name) {
        Some(Value::Stensor(s)) => *s,
        other => panic!("{name} is not a stensor: {other:?}"),
    }
}

/// `lambda` and `mu` members at mid-step, as the stress code sets them.
fn bind_mid_step_lame(config: &HookeConfiguration, env: &mut Env) {
    let (lambda, mu) = config.lame(Stage::MidStep).unwrap();
    let (lambda, mu) = (lambda.eval(env).unwrap(), mu.eval(env).unwrap());
    env.set_scalar("lambda", lambda).set_scalar("mu", mu);
}

/// `rel` also bounds the absolute error, scaled by the largest entry of
/// `reference`.
fn scaled_tolerances(reference: &[f64], rel: f64) -> Tolerances {
    let scale = reference.iter().fold(1.0f64, |m, v| m.max(v.abs()));
    Tolerances {
        abs: rel * scale,
        rel,
    }
}

fn check_entries(
    bd: &BehaviourDescription,
    brick: &IsotropicDamageHookeStressPotential,
    env: &Env,
) {
    let config = brick.evaluator().configuration().unwrap();
    let stress = config.explicit_mid_step_stress();
    for entry in brick.stress_derivatives(bd).unwrap() {
        let symbolic = entry.expression.eval(env).unwrap().components();
        let dv = format!("d{}", entry.variable);
        let numeric: Vec<f64> = match env.get(&dv) {
            Some(Value::Stensor(_)) => {
                let m: Stensor4 = fd::d_stensor(&stress, env, &dv, 1e-6).unwrap();
                m.transpose().iter().copied().collect()
            }
            _ => fd::d_scalar(&stress, env, &dv, 1e-6)
                .unwrap()
                .iter()
                .copied()
                .collect(),
        };
        assert!(
            nearly_equal_slices(&symbolic, &numeric, scaled_tolerances(&numeric, 1e-5)),
            "d sig / d {dv}: {symbolic:?} != {numeric:?}"
        );
    }
}

#[test]
fn damage_entries_match_finite_differences() {
    let (bd, brick) = compile(&damage_source("field_dependent"));
    let mut env = state(
        [1e-3, -3e-4, 2e-4, 5e-4, -1e-4, 0.0],
        [2e-5, 1e-5, 0.0, -1e-5, 0.0, 3e-5],
        0.3,
        0.01,
    );
    bind_mid_step_lame(brick.evaluator().configuration().unwrap(), &mut env);
    check_entries(&bd, &brick, &env);
}

#[test]
fn porosity_entry_matches_finite_differences() {
    let source = source::load(&behaviours_dir().join("porous_damage.yaml")).unwrap();
    let (bd, brick) = compile(&source);
    let mut env = state(
        [8e-4, 1e-4, -2e-4, 0.0, 3e-4, 0.0],
        [1e-5, 0.0, 2e-5, 0.0, 0.0, -1e-5],
        0.2,
        0.005,
    );
    env.set_scalar("E0", 70e9)
        .set_scalar("f", 0.05)
        .set_scalar("df", 0.002);
    bind_mid_step_lame(brick.evaluator().configuration().unwrap(), &mut env);
    check_entries(&bd, &brick, &env);
}

#[test]
fn temperature_dependent_modulus_entries_match_finite_differences() {
    let source = source::load(&behaviours_dir().join("thermal_damage.yaml")).unwrap();
    let (bd, brick) = compile(&source);
    let mut env = state(
        [5e-4, 5e-4, -1e-3, 0.0, 0.0, 2e-4],
        [0.0, 1e-5, 1e-5, 2e-5, 0.0, 0.0],
        0.1,
        0.02,
    );
    env.set_scalar("E0", 200e9)
        .set_scalar("k_E", 4e-4)
        .set_scalar("T", 500.0)
        .set_scalar("dT", 25.0);
    bind_mid_step_lame(brick.evaluator().configuration().unwrap(), &mut env);
    check_entries(&bd, &brick, &env);
}

proptest! {
    #[test]
    fn fast_path_matches_isotropic_path(
        eel in prop::array::uniform6(-2e-3f64..2e-3),
        deel in prop::array::uniform6(-1e-4f64..1e-4),
        d in 0.0f64..0.9,
        dd in 0.0f64..0.05,
    ) {
        let (fast, _) = compile(&damage_source("constant"));
        let (isotropic, _) = compile(&damage_source("field_dependent"));
        let kinds = [CodeBlockKind::InitializeLocalVariables, CodeBlockKind::ComputeStress];

        let mut a = state(eel, deel, d, dd);
        run(&fast, &kinds, &mut a);
        let mut b = state(eel, deel, d, dd);
        run(&isotropic, &kinds, &mut b);

        let (sa, sb) = (stensor(&a, "sig"), stensor(&b, "sig"));
        let tol = scaled_tolerances(sb.as_slice(), 1e-12);
        prop_assert!(
            nearly_equal_slices(sa.as_slice(), sb.as_slice(), tol),
            "{:?} != {:?}",
            sa,
            sb
        );
    }
}
