//! Material properties given as constants or formulas.

use bb_tensor::{ScalarExpr, parse_formula};
use serde::{Deserialize, Serialize};

use crate::data::Data;
use crate::error::{BehaviourError, BehaviourResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaterialProperty {
    Constant(f64),
    Formula(String),
}

impl MaterialProperty {
    /// Interpret an option value; `option` names the option in errors.
    pub fn from_data(option: &str, value: &Data) -> BehaviourResult<Self> {
        match value {
            Data::Real(v) if v.is_finite() => Ok(MaterialProperty::Constant(*v)),
            Data::Int(i) => Ok(MaterialProperty::Constant(*i as f64)),
            Data::String(s) => Ok(MaterialProperty::Formula(s.clone())),
            other => Err(BehaviourError::invalid_option(
                option,
                format!("expected a number or a formula, got {other}"),
            )),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, MaterialProperty::Constant(_))
    }

    /// Unresolved expression of the property.
    pub fn expression(&self, option: &str) -> BehaviourResult<ScalarExpr> {
        match self {
            MaterialProperty::Constant(v) => Ok(ScalarExpr::Const(*v)),
            MaterialProperty::Formula(src) => parse_formula(src)
                .map_err(|e| BehaviourError::invalid_option(option, format!("invalid formula: {e}"))),
        }
    }
}
