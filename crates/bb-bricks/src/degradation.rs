//! Stiffness degradation by a scalar isotropic damage variable.

use bb_behaviour::{
    Attribute, BehaviourDescription, SupportedType, VariableCategory, VariableDescription,
};
use bb_core::{Real, ensure_in_half_open};
use bb_tensor::ScalarExpr;
use tracing::debug;

use crate::error::{BrickError, BrickResult};
use crate::evaluator::{RESERVED_NAMES, Stage, check_attributes};
use crate::options::{DAMAGE_UPPER_BOUND, DAMAGE_VARIABLE, OptionReader};

#[derive(Clone, Debug, PartialEq)]
pub enum Degradation {
    /// Undamaged elasticity, factor 1.
    None,
    Isotropic { variable: String, upper_bound: Real },
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Degradation {
    /// Read `damage_variable` and `damage_upper_bound`.
    pub fn from_options(reader: &OptionReader<'_>) -> BrickResult<Self> {
        let variable = reader.string(DAMAGE_VARIABLE)?;
        if !is_identifier(variable) {
            return Err(BrickError::configuration(
                DAMAGE_VARIABLE,
                format!("'{variable}' is not a valid variable name"),
            ));
        }
        if RESERVED_NAMES.contains(&variable) {
            return Err(BrickError::configuration(
                DAMAGE_VARIABLE,
                format!("'{variable}' is reserved by the stress potential"),
            ));
        }
        let upper_bound =
            ensure_in_half_open(reader.real(DAMAGE_UPPER_BOUND)?, 0.0, 1.0, "damage upper bound")
                .map_err(|e| BrickError::configuration(DAMAGE_UPPER_BOUND, e.to_string()))?;
        Ok(Degradation::Isotropic {
            variable: variable.to_string(),
            upper_bound,
        })
    }

    pub fn variable(&self) -> Option<&str> {
        match self {
            Degradation::None => None,
            Degradation::Isotropic { variable, .. } => Some(variable),
        }
    }

    /// `1 - d` at `stage`; mid-step damage is `d + weight * dd`.
    pub fn factor(&self, stage: Stage, weight: &ScalarExpr) -> ScalarExpr {
        match self {
            Degradation::None => ScalarExpr::one(),
            Degradation::Isotropic { variable, .. } => {
                let d = ScalarExpr::member(variable.as_str());
                let d = match stage {
                    Stage::MidStep => {
                        d + weight.clone() * ScalarExpr::member(format!("d{variable}"))
                    }
                    Stage::BeginningOfStep | Stage::EndOfStep => d,
                };
                ScalarExpr::one() - d
            }
        }
    }

    /// `1 - min(d, d_max)`, used by operators that must stay invertible.
    pub fn bounded_factor(&self) -> ScalarExpr {
        match self {
            Degradation::None => ScalarExpr::one(),
            Degradation::Isotropic {
                variable,
                upper_bound,
            } => {
                ScalarExpr::one()
                    - ScalarExpr::min(
                        ScalarExpr::member(variable.as_str()),
                        ScalarExpr::Const(*upper_bound),
                    )
            }
        }
    }

    fn attributes(&self) -> Vec<(&'static str, Attribute)> {
        match self {
            Degradation::None => Vec::new(),
            Degradation::Isotropic {
                variable,
                upper_bound,
            } => vec![
                (DAMAGE_VARIABLE, variable.as_str().into()),
                (DAMAGE_UPPER_BOUND, (*upper_bound).into()),
            ],
        }
    }

    /// Fails when `declare` would: the name is taken by anything other than
    /// a scalar state variable, or the attributes disagree.
    pub fn check(&self, bd: &BehaviourDescription) -> BrickResult<()> {
        let Degradation::Isotropic { variable, .. } = self else {
            return Ok(());
        };
        match bd.variable(variable) {
            Some((VariableCategory::StateVariable, v)) if v.type_ == SupportedType::Real => {}
            Some((category, v)) => {
                return Err(BrickError::configuration(
                    DAMAGE_VARIABLE,
                    format!(
                        "'{variable}' is already declared as {category:?} of type {}",
                        v.type_
                    ),
                ));
            }
            None => {}
        }
        check_attributes(bd, &self.attributes())
    }

    /// Declare the damage state variable, reusing a scalar state variable of
    /// the same name.
    pub fn declare(&self, bd: &mut BehaviourDescription, origin: &str) -> BrickResult<()> {
        self.check(bd)?;
        let Degradation::Isotropic { variable, .. } = self else {
            return Ok(());
        };
        if bd.variable(variable).is_some() {
            debug!(brick = origin, variable = %variable, "reusing declared damage variable");
        } else {
            bd.declare(
                VariableCategory::StateVariable,
                VariableDescription::new(SupportedType::Real, variable.as_str())
                    .with_entry_name("Damage")
                    .with_description("isotropic damage"),
            )?;
        }
        for (name, value) in self.attributes() {
            bd.set_attribute(name, value)?;
        }
        Ok(())
    }
}
