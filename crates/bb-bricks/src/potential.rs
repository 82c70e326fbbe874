//! The stress potential capability.

use bb_behaviour::{
    BehaviourDescription, BehaviourDsl, DataMap, LocalDataStructure, OptionDescription,
};

use crate::derivatives::StressDerivativeEntry;
use crate::error::{BrickError, BrickResult};
use crate::evaluator::HookeEvaluator;
use crate::implicit::JacobianMode;
use crate::options::StiffnessStorage;

/// A brick computing the stress from the elastic strain.
///
/// `initialize` runs exactly once, before any query or hook; each hook runs
/// at most once.
pub trait StressPotential {
    fn name(&self) -> &'static str;

    /// Option schema; elastic properties are omitted when `already_configured`.
    fn options(
        &self,
        bd: &BehaviourDescription,
        already_configured: bool,
    ) -> Vec<OptionDescription>;

    fn initialize(
        &mut self,
        bd: &mut BehaviourDescription,
        dsl: &dyn BehaviourDsl,
        data: &DataMap,
    ) -> BrickResult<()>;

    /// Shared Hooke evaluation the queries and hooks delegate to.
    fn evaluator(&self) -> &HookeEvaluator;

    fn evaluator_mut(&mut self) -> &mut HookeEvaluator;

    /// Stiffness storage resolved at initialization.
    fn stiffness_storage(&self) -> BrickResult<StiffnessStorage> {
        self.evaluator()
            .configuration()
            .map(|c| c.storage)
            .ok_or_else(|| BrickError::state("stiffness_storage called before initialize"))
    }

    /// `∂σ/∂Δv` for every integration variable `v` the stress depends on.
    fn stress_derivatives(
        &self,
        bd: &BehaviourDescription,
    ) -> BrickResult<Vec<StressDerivativeEntry>> {
        self.evaluator().stress_derivatives(bd)
    }

    fn generate_implicit_equation_derivatives(
        &self,
        bd: &BehaviourDescription,
        equation: &str,
        variable: &str,
        placeholder: &str,
        mode: JacobianMode,
    ) -> BrickResult<String> {
        self.evaluator()
            .generate_implicit_equation_derivatives(bd, equation, variable, placeholder, mode)
    }

    fn declare_elastic_prediction(&mut self, bd: &mut BehaviourDescription) -> BrickResult<()> {
        self.evaluator_mut().declare_elastic_prediction(bd)
    }

    fn declare_stress_with_stiffness_tensor(
        &mut self,
        bd: &mut BehaviourDescription,
    ) -> BrickResult<()> {
        self.evaluator_mut().declare_stress_with_stiffness_tensor(bd)
    }

    fn declare_isotropic_stress(
        &mut self,
        bd: &mut BehaviourDescription,
        lds: &mut LocalDataStructure,
    ) -> BrickResult<()> {
        self.evaluator_mut().declare_isotropic_stress(bd, lds)
    }

    fn add_generic_tangent_operator_support(
        &mut self,
        bd: &mut BehaviourDescription,
        dsl: &dyn BehaviourDsl,
    ) -> BrickResult<()> {
        self.evaluator_mut().add_generic_tangent_operator_support(bd, dsl)
    }

    fn add_generic_prediction_operator_support(
        &mut self,
        bd: &mut BehaviourDescription,
    ) -> BrickResult<()> {
        self.evaluator_mut().add_generic_prediction_operator_support(bd)
    }

    /// Run the hooks in compiler order: elastic prediction, stress, tangent
    /// operator, prediction operator.
    fn finalize(
        &mut self,
        bd: &mut BehaviourDescription,
        dsl: &dyn BehaviourDsl,
        lds: &mut LocalDataStructure,
    ) -> BrickResult<()> {
        self.declare_elastic_prediction(bd)?;
        match self.stiffness_storage()? {
            StiffnessStorage::Constant => self.declare_stress_with_stiffness_tensor(bd)?,
            StiffnessStorage::FieldDependent => self.declare_isotropic_stress(bd, lds)?,
        }
        self.add_generic_tangent_operator_support(bd, dsl)?;
        self.add_generic_prediction_operator_support(bd)
    }
}
