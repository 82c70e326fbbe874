//! Compilation of a stress potential into a behaviour description.

use bb_behaviour::{
    BehaviourDescription, BehaviourDsl, BehaviourSource, DataMap, LocalDataStructure, StandardDsl,
};
use tracing::{debug, info};

use crate::derivatives::StressDerivativeEntry;
use crate::error::BrickResult;
use crate::potential::StressPotential;
use crate::registry::create_stress_potential;

/// What a compiled brick exposes besides the code it appended.
#[derive(Debug)]
pub struct CompiledStressPotential {
    pub brick: &'static str,
    pub derivatives: Vec<StressDerivativeEntry>,
    pub local_data: LocalDataStructure,
}

/// Initialize `brick`, run its hooks and collect its stress derivatives.
pub fn compile_stress_potential(
    brick: &mut dyn StressPotential,
    bd: &mut BehaviourDescription,
    dsl: &dyn BehaviourDsl,
    data: &DataMap,
) -> BrickResult<CompiledStressPotential> {
    info!(
        brick = brick.name(),
        behaviour = bd.name(),
        dsl = dsl.name(),
        "compiling stress potential"
    );
    brick.initialize(bd, dsl, data)?;
    let mut local_data = LocalDataStructure::new();
    brick.finalize(bd, dsl, &mut local_data)?;
    let derivatives = brick.stress_derivatives(bd)?;
    debug!(
        brick = brick.name(),
        derivatives = derivatives.len(),
        local_variables = local_data.len(),
        "stress potential compiled"
    );
    Ok(CompiledStressPotential {
        brick: brick.name(),
        derivatives,
        local_data,
    })
}

/// A behaviour source compiled with the DSL matching its scheme.
pub struct CompiledBehaviour {
    pub description: BehaviourDescription,
    pub brick: Box<dyn StressPotential>,
    pub stress_potential: CompiledStressPotential,
}

pub fn compile_source(source: &BehaviourSource) -> BrickResult<CompiledBehaviour> {
    let mut description = source.to_description()?;
    let dsl = StandardDsl::for_behaviour(&description);
    let mut brick = create_stress_potential(&source.stress_potential.name)?;
    let stress_potential = compile_stress_potential(
        brick.as_mut(),
        &mut description,
        &dsl,
        &source.stress_potential.options,
    )?;
    Ok(CompiledBehaviour {
        description,
        brick,
        stress_potential,
    })
}
