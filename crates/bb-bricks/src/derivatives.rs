//! Derivatives of the stress with respect to integration variables.

use std::fmt;

use bb_behaviour::TypeFlag;
use bb_tensor::Expr;

/// `∂σ/∂Δvariable` as contributed to the implicit Jacobian.
#[derive(Clone, Debug, PartialEq)]
pub struct StressDerivativeEntry {
    pub variable: String,
    pub expression: Expr,
    /// Type of the differentiated variable.
    pub type_flag: TypeFlag,
}

impl StressDerivativeEntry {
    pub fn new(
        variable: impl Into<String>,
        expression: impl Into<Expr>,
        type_flag: TypeFlag,
    ) -> Self {
        Self {
            variable: variable.into(),
            expression: expression.into(),
            type_flag,
        }
    }

    /// Tensor rank of the derivative.
    pub fn rank(&self) -> usize {
        2 + self.type_flag.rank()
    }
}

impl fmt::Display for StressDerivativeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dsig_dd{} = {}", self.variable, self.expression)
    }
}
