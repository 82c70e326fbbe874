//! Error types for stress potential bricks.

use bb_behaviour::BehaviourError;
use bb_core::BbError;
use bb_tensor::ExprError;
use thiserror::Error;

pub type BrickResult<T> = Result<T, BrickError>;

#[derive(Error, Debug)]
pub enum BrickError {
    /// Invalid, missing or inconsistent option.
    #[error("Configuration error for option '{option}': {reason}")]
    Configuration { option: String, reason: String },

    /// Operation called out of sequence.
    #[error("State error: {what}")]
    State { what: String },

    #[error("Behaviour error: {0}")]
    Behaviour(BehaviourError),

    #[error("Expression error: {0}")]
    Expr(#[from] ExprError),

    #[error("Numeric error: {0}")]
    Numeric(#[from] BbError),
}

impl BrickError {
    pub fn configuration(option: impl Into<String>, reason: impl Into<String>) -> Self {
        BrickError::Configuration {
            option: option.into(),
            reason: reason.into(),
        }
    }

    pub fn state(what: impl Into<String>) -> Self {
        BrickError::State { what: what.into() }
    }

    /// Option named by a configuration error.
    pub fn option(&self) -> Option<&str> {
        match self {
            BrickError::Configuration { option, .. } => Some(option),
            _ => None,
        }
    }

    pub fn is_state(&self) -> bool {
        matches!(self, BrickError::State { .. })
    }
}

impl From<BehaviourError> for BrickError {
    fn from(e: BehaviourError) -> Self {
        match e {
            BehaviourError::InvalidOption { option, reason } => {
                BrickError::Configuration { option, reason }
            }
            BehaviourError::UnresolvedSymbol { option, name } => BrickError::Configuration {
                option,
                reason: format!("unknown identifier '{name}'"),
            },
            other => BrickError::Behaviour(other),
        }
    }
}
