//! Call sequencing of a brick instance.
//!
//! A brick is initialized exactly once, before any query or hook; every hook
//! runs at most once.

use std::collections::BTreeSet;

use crate::error::{BrickError, BrickResult};

/// Operator-declaration hooks of a stress potential.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Hook {
    ElasticPrediction,
    StressWithStiffnessTensor,
    IsotropicStress,
    TangentOperator,
    PredictionOperator,
}

impl Hook {
    pub fn name(self) -> &'static str {
        match self {
            Hook::ElasticPrediction => "declare_elastic_prediction",
            Hook::StressWithStiffnessTensor => "declare_stress_with_stiffness_tensor",
            Hook::IsotropicStress => "declare_isotropic_stress",
            Hook::TangentOperator => "add_generic_tangent_operator_support",
            Hook::PredictionOperator => "add_generic_prediction_operator_support",
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct LifecycleTracker {
    initialized: bool,
    completed: BTreeSet<Hook>,
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn check_not_initialized(&self) -> BrickResult<()> {
        if self.initialized {
            Err(BrickError::state("initialize called twice"))
        } else {
            Ok(())
        }
    }

    pub fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    pub fn require_initialized(&self, what: &str) -> BrickResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(BrickError::state(format!("{what} called before initialize")))
        }
    }

    /// Fails unless `hook` may run now.
    pub fn check_hook(&self, hook: Hook) -> BrickResult<()> {
        self.require_initialized(hook.name())?;
        if self.completed.contains(&hook) {
            return Err(BrickError::state(format!("{} called twice", hook.name())));
        }
        Ok(())
    }

    pub fn complete(&mut self, hook: Hook) {
        self.completed.insert(hook);
    }

    pub fn is_completed(&self, hook: Hook) -> bool {
        self.completed.contains(&hook)
    }
}
