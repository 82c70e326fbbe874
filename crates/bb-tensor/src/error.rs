//! Error types for expression handling.

use bb_core::BbError;
use thiserror::Error;

/// Errors raised while building, differentiating or evaluating expressions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("Unbound symbol: {name}")]
    UnboundSymbol { name: String },

    #[error("Type mismatch for {name}: expected {expected}, found {found}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Unsupported derivative: {what}")]
    UnsupportedDerivative { what: &'static str },

    #[error("Formula parse error at offset {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("Statement can not be evaluated: {code}")]
    NotEvaluable { code: String },

    #[error("Numeric error: {0}")]
    Numeric(#[from] BbError),
}

pub type ExprResult<T> = Result<T, ExprError>;
