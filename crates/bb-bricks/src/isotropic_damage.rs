//! Hooke law degraded by a scalar isotropic damage variable:
//! `sig = (1 - d) C : eel`.

use bb_behaviour::{BehaviourDescription, BehaviourDsl, DataMap, OptionDescription};

use crate::degradation::Degradation;
use crate::error::BrickResult;
use crate::evaluator::HookeEvaluator;
use crate::options::{OptionReader, damage_options, hooke_options};
use crate::potential::StressPotential;

pub const NAME: &str = "IsotropicDamageHooke";

#[derive(Debug)]
pub struct IsotropicDamageHookeStressPotential {
    hooke: HookeEvaluator,
}

impl Default for IsotropicDamageHookeStressPotential {
    fn default() -> Self {
        Self::new()
    }
}

impl IsotropicDamageHookeStressPotential {
    pub fn new() -> Self {
        Self {
            hooke: HookeEvaluator::new(NAME),
        }
    }

    /// Name of the damage variable once initialized.
    pub fn damage_variable(&self) -> Option<&str> {
        self.hooke
            .configuration()
            .and_then(|c| c.degradation.variable())
    }
}

impl StressPotential for IsotropicDamageHookeStressPotential {
    fn name(&self) -> &'static str {
        NAME
    }

    fn options(
        &self,
        _bd: &BehaviourDescription,
        already_configured: bool,
    ) -> Vec<OptionDescription> {
        let mut options = hooke_options(already_configured);
        options.extend(damage_options());
        options
    }

    fn initialize(
        &mut self,
        bd: &mut BehaviourDescription,
        dsl: &dyn BehaviourDsl,
        data: &DataMap,
    ) -> BrickResult<()> {
        self.hooke.check_not_initialized()?;
        let already_configured = bd.elastic_material_properties().is_some();
        let schema = self.options(bd, already_configured);
        let reader = OptionReader::new(&schema, data)?;
        let degradation = Degradation::from_options(&reader)?;
        self.hooke
            .initialize(bd, dsl, &reader, already_configured, degradation)
    }

    fn evaluator(&self) -> &HookeEvaluator {
        &self.hooke
    }

    fn evaluator_mut(&mut self) -> &mut HookeEvaluator {
        &mut self.hooke
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bb_behaviour::{
        CodeBlockKind, Data, IntegrationScheme, StandardDsl, SupportedType, TypeFlag,
        VariableCategory, VariableDescription,
    };

    use crate::implicit::JacobianMode;
    use crate::options::StiffnessStorage;

    fn data(entries: &[(&str, Data)]) -> DataMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn elastic() -> DataMap {
        data(&[("young_modulus", Data::Real(150e9)), ("poisson_ratio", Data::Real(0.3))])
    }

    fn initialized(
        options: &DataMap,
    ) -> (BehaviourDescription, IsotropicDamageHookeStressPotential) {
        let mut bd = BehaviourDescription::new("Damage", IntegrationScheme::Implicit);
        let mut brick = IsotropicDamageHookeStressPotential::new();
        brick
            .initialize(&mut bd, &StandardDsl::implicit(), options)
            .unwrap();
        (bd, brick)
    }

    #[test]
    fn option_schema() {
        let bd = BehaviourDescription::new("Damage", IntegrationScheme::Implicit);
        let brick = IsotropicDamageHookeStressPotential::new();
        let names: Vec<String> = brick.options(&bd, false).into_iter().map(|o| o.name).collect();
        assert_eq!(
            names,
            [
                "young_modulus",
                "poisson_ratio",
                "stiffness_tensor_storage",
                "thermal_expansion",
                "thermal_expansion_reference_temperature",
                "plane_stress_support",
                "generic_tangent_operator",
                "generic_prediction_operator",
                "damage_variable",
                "damage_upper_bound",
            ]
        );
        assert_eq!(brick.options(&bd, true).len(), 8);
    }

    #[test]
    fn declarations_and_attributes() {
        let (bd, brick) = initialized(&elastic());
        let states: Vec<&str> = bd.state_variables().map(|v| v.name.as_str()).collect();
        assert_eq!(states, ["eel", "d"]);
        let (_, eel) = bd.variable("eel").unwrap();
        assert_eq!(eel.entry_name.as_deref(), Some("ElasticStrain"));
        assert_eq!(bd.variable("lambda").map(|(c, _)| c), Some(VariableCategory::LocalVariable));
        assert_eq!(brick.damage_variable(), Some("d"));
        assert_eq!(brick.stiffness_storage().unwrap(), StiffnessStorage::FieldDependent);
        assert!(!bd.flag("requires_stiffness_tensor"));

        let init = bd.code_blocks(CodeBlockKind::InitializeLocalVariables);
        assert_eq!(init.len(), 1);
        assert!(init[0].to_string().starts_with("this->lambda = 86538461538.4"));
        let integrator = bd.code_blocks(CodeBlockKind::Integrator)[0].to_string();
        assert_eq!(integrator, "this->feel -= this->deto;\n");
    }

    #[test]
    fn derivatives_are_eel_then_damage() {
        let (bd, brick) = initialized(&elastic());
        let entries = brick.stress_derivatives(&bd).unwrap();
        let vars: Vec<(&str, TypeFlag, usize)> = entries
            .iter()
            .map(|e| (e.variable.as_str(), e.type_flag, e.rank()))
            .collect();
        assert_eq!(vars, [("eel", TypeFlag::Stensor, 4), ("d", TypeFlag::Scalar, 2)]);
        assert_eq!(
            entries[1].expression.to_string(),
            "-this->theta * ((this->lambda * Stensor4::IxI() + 2 * this->mu * Stensor4::Id()) \
             * (this->eel + this->theta * this->deel))"
        );
    }

    #[test]
    fn existing_elastic_strain_and_damage_are_reused() {
        let mut bd = BehaviourDescription::new("Damage", IntegrationScheme::Implicit);
        bd.declare(
            VariableCategory::StateVariable,
            VariableDescription::new(SupportedType::Real, "w"),
        )
        .unwrap();
        bd.declare(
            VariableCategory::StateVariable,
            VariableDescription::new(SupportedType::StrainStensor, "eel"),
        )
        .unwrap();
        let mut options = elastic();
        options.insert("damage_variable".into(), Data::from("w"));
        let mut brick = IsotropicDamageHookeStressPotential::new();
        brick
            .initialize(&mut bd, &StandardDsl::implicit(), &options)
            .unwrap();
        assert_eq!(bd.state_variables().count(), 2);
        let entries = brick.stress_derivatives(&bd).unwrap();
        assert_eq!(entries[1].variable, "w");
    }

    #[test]
    fn second_initialization_is_a_state_error() {
        let (mut bd, mut brick) = initialized(&elastic());
        let err = brick
            .initialize(&mut bd, &StandardDsl::implicit(), &elastic())
            .unwrap_err();
        assert!(err.is_state());
    }

    #[test]
    fn queries_before_initialization_are_state_errors() {
        let bd = BehaviourDescription::new("Damage", IntegrationScheme::Implicit);
        let brick = IsotropicDamageHookeStressPotential::new();
        assert!(brick.stress_derivatives(&bd).unwrap_err().is_state());
        assert!(brick.stiffness_storage().unwrap_err().is_state());
        let mode = JacobianMode::Analytical;
        let err = brick
            .generate_implicit_equation_derivatives(&bd, "feel", "eel", "x", mode)
            .unwrap_err();
        assert!(err.is_state());
    }

    #[test]
    fn configuration_errors_name_the_option() {
        let cases: Vec<(DataMap, &str)> = vec![
            (
                data(&[("stiffness_tensor_storage", Data::from("bogus"))]),
                "stiffness_tensor_storage",
            ),
            (data(&[("young_modulus", Data::Real(150e9))]), "poisson_ratio"),
            (data(&[("poisson_ratio", Data::Real(0.3))]), "young_modulus"),
            (DataMap::new(), "young_modulus"),
            (
                data(&[
                    ("young_modulus", Data::from("150e9 * (1 - 1e-4 * (T - 293.15))")),
                    ("poisson_ratio", Data::Real(0.3)),
                    ("stiffness_tensor_storage", Data::from("constant")),
                ]),
                "stiffness_tensor_storage",
            ),
            (
                data(&[("young_modulus", Data::from("E1")), ("poisson_ratio", Data::Real(0.3))]),
                "young_modulus",
            ),
            (
                data(&[("young_modulus", Data::Real(-1.0)), ("poisson_ratio", Data::Real(0.3))]),
                "young_modulus",
            ),
            (
                data(&[("young_modulus", Data::Real(1e9)), ("poisson_ratio", Data::Real(0.5))]),
                "poisson_ratio",
            ),
            (data(&[("plasticity", Data::Bool(true))]), "plasticity"),
            (data(&[("plane_stress_support", Data::Real(1.0))]), "plane_stress_support"),
        ];
        for (options, option) in cases {
            let mut bd = BehaviourDescription::new("Damage", IntegrationScheme::Implicit);
            let err = IsotropicDamageHookeStressPotential::new()
                .initialize(&mut bd, &StandardDsl::implicit(), &options)
                .unwrap_err();
            assert_eq!(err.option(), Some(option), "{options:?}: {err}");
        }
    }
}
