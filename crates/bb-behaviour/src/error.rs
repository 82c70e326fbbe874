//! Error types for behaviour descriptions.

use bb_tensor::ExprError;
use thiserror::Error;

pub type BehaviourResult<T> = Result<T, BehaviourError>;

#[derive(Error, Debug)]
pub enum BehaviourError {
    #[error("Variable '{name}' is already declared")]
    DuplicateVariable { name: String },

    #[error("Local data structure already holds '{name}'")]
    DuplicateLocalVariable { name: String },

    #[error("Attribute '{name}' already set to {existing}, cannot set it to {requested}")]
    AttributeConflict {
        name: String,
        existing: String,
        requested: String,
    },

    #[error("Unknown variable '{name}'")]
    UnknownVariable { name: String },

    #[error("Option '{option}': unknown identifier '{name}'")]
    UnresolvedSymbol { option: String, name: String },

    #[error("Option '{option}': {reason}")]
    InvalidOption { option: String, reason: String },

    #[error("'{owner}' already contributed to the Jacobian block ({equation}, {variable})")]
    DuplicateJacobianContribution {
        owner: String,
        equation: String,
        variable: String,
    },

    #[error("Invalid behaviour source: {what}")]
    InvalidSource { what: String },

    #[error("Expression error: {0}")]
    Expr(#[from] ExprError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BehaviourError {
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        BehaviourError::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }
}
