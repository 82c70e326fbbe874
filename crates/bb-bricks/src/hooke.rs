//! Undamaged Hooke law.

use bb_behaviour::{BehaviourDescription, BehaviourDsl, DataMap, OptionDescription};

use crate::degradation::Degradation;
use crate::error::BrickResult;
use crate::evaluator::HookeEvaluator;
use crate::options::{OptionReader, hooke_options};
use crate::potential::StressPotential;

pub const NAME: &str = "Hooke";

#[derive(Debug)]
pub struct HookeStressPotential {
    hooke: HookeEvaluator,
}

impl Default for HookeStressPotential {
    fn default() -> Self {
        Self::new()
    }
}

impl HookeStressPotential {
    pub fn new() -> Self {
        Self {
            hooke: HookeEvaluator::new(NAME),
        }
    }
}

impl StressPotential for HookeStressPotential {
    fn name(&self) -> &'static str {
        NAME
    }

    fn options(
        &self,
        _bd: &BehaviourDescription,
        already_configured: bool,
    ) -> Vec<OptionDescription> {
        hooke_options(already_configured)
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
        self.hooke
            .initialize(bd, dsl, &reader, already_configured, Degradation::None)
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
        CodeBlockKind, Data, ElasticSymmetry, IntegrationScheme, LocalDataStructure, StandardDsl,
        TypeFlag,
    };

    fn data(entries: &[(&str, Data)]) -> DataMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn only_the_elastic_strain_is_differentiated() {
        let mut bd = BehaviourDescription::new("Elastic", IntegrationScheme::Implicit);
        let mut brick = HookeStressPotential::new();
        brick
            .initialize(
                &mut bd,
                &StandardDsl::implicit(),
                &data(&[("young_modulus", Data::Real(200e9)), ("poisson_ratio", Data::Real(0.3))]),
            )
            .unwrap();
        let entries = brick.stress_derivatives(&bd).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].variable, "eel");
        assert_eq!(entries[0].type_flag, TypeFlag::Stensor);
        assert_eq!(
            entries[0].expression.to_string(),
            "this->theta * (this->lambda * Stensor4::IxI() + 2 * this->mu * Stensor4::Id())"
        );
        assert!(!bd.has_variable("d"));
    }

    #[test]
    fn solver_supplied_stiffness_for_orthotropic_behaviours() {
        let mut bd = BehaviourDescription::new("Ortho", IntegrationScheme::Implicit);
        bd.set_elastic_symmetry(ElasticSymmetry::Orthotropic);
        let mut brick = HookeStressPotential::new();
        brick
            .initialize(
                &mut bd,
                &StandardDsl::implicit(),
                &data(&[("stiffness_tensor_storage", Data::from("constant"))]),
            )
            .unwrap();
        assert!(bd.flag("requires_stiffness_tensor"));

        let mut lds = LocalDataStructure::new();
        brick.finalize(&mut bd, &StandardDsl::implicit(), &mut lds).unwrap();
        let stress = bd.code_blocks(CodeBlockKind::ComputeStress)[0].to_string();
        assert_eq!(stress, "this->sig = this->D * (this->eel + this->theta * this->deel);\n");
        let tangent = bd.code_blocks(CodeBlockKind::TangentOperator)[0].to_string();
        assert!(tangent.contains("this->Dt = this->D;"));
        assert!(tangent.contains("getPartialJacobianInvert(iJ_eel_eel);"));
        assert!(tangent.contains("this->Dt = this->D * iJ_eel_eel;"));
        assert!(lds.is_empty());
    }

    #[test]
    fn lame_pair_is_rejected_for_orthotropic_behaviours() {
        let mut bd = BehaviourDescription::new("Ortho", IntegrationScheme::Implicit);
        bd.set_elastic_symmetry(ElasticSymmetry::Orthotropic);
        let err = HookeStressPotential::new()
            .initialize(
                &mut bd,
                &StandardDsl::implicit(),
                &data(&[("young_modulus", Data::Real(200e9)), ("poisson_ratio", Data::Real(0.3))]),
            )
            .unwrap_err();
        assert_eq!(err.option(), Some("young_modulus"));
    }
}
