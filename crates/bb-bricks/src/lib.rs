//! bb-bricks: stress potential bricks for implicit behaviours.
//!
//! Contains:
//! - potential (the StressPotential capability and its hook order)
//! - evaluator (Hooke stress evaluation shared by every elastic brick)
//! - hooke / isotropic_damage (the stock bricks)
//! - degradation (isotropic damage factor)
//! - derivatives / implicit (stress derivatives and Jacobian blocks)
//! - options / state (option schemas and hook lifecycle)
//! - registry / driver (bricks by name and compilation of sources)

pub mod degradation;
pub mod derivatives;
pub mod driver;
pub mod error;
pub mod evaluator;
pub mod hooke;
pub mod implicit;
pub mod isotropic_damage;
pub mod options;
pub mod potential;
pub mod registry;
pub mod state;

pub use degradation::Degradation;
pub use derivatives::StressDerivativeEntry;
pub use driver::{
    CompiledBehaviour, CompiledStressPotential, compile_source, compile_stress_potential,
};
pub use error::{BrickError, BrickResult};
pub use evaluator::{HookeConfiguration, HookeEvaluator, Stage, StressPath};
pub use hooke::HookeStressPotential;
pub use implicit::JacobianMode;
pub use isotropic_damage::IsotropicDamageHookeStressPotential;
pub use options::StiffnessStorage;
pub use potential::StressPotential;
pub use registry::{STRESS_POTENTIALS, create_stress_potential};
pub use state::Hook;
