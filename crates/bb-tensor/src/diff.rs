//! Symbolic differentiation.
//!
//! Derivatives are taken with respect to a named scalar or symmetric-tensor
//! symbol. The result ranks follow the usual rules:
//!
//! | expression | w.r.t. scalar | w.r.t. stensor |
//! |---|---|---|
//! | scalar | scalar | stensor (gradient) |
//! | stensor | stensor | stensor4 |
//! | stensor4 | stensor4 | unsupported |
//!
//! Fourth-order tensors are assumed not to depend on tensor symbols; an
//! expression violating this is rejected rather than silently truncated.

use crate::error::{ExprError, ExprResult};
use crate::expr::{Func, ScalarExpr, Stensor4Expr, StensorExpr};

fn func_derivative(f: Func, a: &ScalarExpr) -> ScalarExpr {
    match f {
        Func::Exp => ScalarExpr::call(Func::Exp, a.clone()),
        Func::Log => ScalarExpr::div(ScalarExpr::one(), a.clone()),
        Func::Sqrt => ScalarExpr::div(
            ScalarExpr::one(),
            ScalarExpr::Const(2.0) * ScalarExpr::call(Func::Sqrt, a.clone()),
        ),
    }
}

impl ScalarExpr {
    /// `∂self/∂x` for a scalar symbol `x`.
    pub fn d_scalar(&self, x: &str) -> ExprResult<ScalarExpr> {
        Ok(match self {
            ScalarExpr::Const(_) => ScalarExpr::zero(),
            ScalarExpr::Symbol(s) => {
                if s.name == x {
                    ScalarExpr::one()
                } else {
                    ScalarExpr::zero()
                }
            }
            ScalarExpr::Neg(a) => -a.d_scalar(x)?,
            ScalarExpr::Add(a, b) => a.d_scalar(x)? + b.d_scalar(x)?,
            ScalarExpr::Sub(a, b) => a.d_scalar(x)? - b.d_scalar(x)?,
            ScalarExpr::Mul(a, b) => {
                a.d_scalar(x)? * b.as_ref().clone() + a.as_ref().clone() * b.d_scalar(x)?
            }
            ScalarExpr::Div(a, b) => {
                let (a, b) = (a.as_ref(), b.as_ref());
                ScalarExpr::div(a.d_scalar(x)?, b.clone())
                    - ScalarExpr::div(a.clone() * b.d_scalar(x)?, b.clone() * b.clone())
            }
            ScalarExpr::Pow(a, b) => {
                let (a, b) = (a.as_ref(), b.as_ref());
                let da = a.d_scalar(x)?;
                let db = b.d_scalar(x)?;
                let power_rule = b.clone()
                    * ScalarExpr::pow(a.clone(), b.clone() - ScalarExpr::one())
                    * da;
                if db.is_zero() {
                    power_rule
                } else {
                    power_rule
                        + ScalarExpr::pow(a.clone(), b.clone())
                            * ScalarExpr::call(Func::Log, a.clone())
                            * db
                }
            }
            ScalarExpr::Min(a, b) => {
                if a.d_scalar(x)?.is_zero() && b.d_scalar(x)?.is_zero() {
                    ScalarExpr::zero()
                } else {
                    return Err(ExprError::UnsupportedDerivative {
                        what: "min of expressions depending on the variable",
                    });
                }
            }
            ScalarExpr::Call(f, a) => func_derivative(*f, a) * a.d_scalar(x)?,
            ScalarExpr::Trace(e) => ScalarExpr::trace(e.d_scalar(x)?),
            ScalarExpr::Contract(a, b) => {
                ScalarExpr::contract(a.d_scalar(x)?, b.as_ref().clone())
                    + ScalarExpr::contract(a.as_ref().clone(), b.d_scalar(x)?)
            }
        })
    }

    /// Gradient `∂self/∂v` for a symmetric tensor symbol `v`.
    pub fn d_stensor(&self, v: &str) -> ExprResult<StensorExpr> {
        Ok(match self {
            ScalarExpr::Const(_) | ScalarExpr::Symbol(_) => StensorExpr::Zero,
            ScalarExpr::Neg(a) => -a.d_stensor(v)?,
            ScalarExpr::Add(a, b) => a.d_stensor(v)? + b.d_stensor(v)?,
            ScalarExpr::Sub(a, b) => a.d_stensor(v)? - b.d_stensor(v)?,
            ScalarExpr::Mul(a, b) => {
                b.as_ref().clone() * a.d_stensor(v)? + a.as_ref().clone() * b.d_stensor(v)?
            }
            ScalarExpr::Div(a, b) => {
                let (a, b) = (a.as_ref(), b.as_ref());
                ScalarExpr::div(ScalarExpr::one(), b.clone()) * a.d_stensor(v)?
                    - ScalarExpr::div(a.clone(), b.clone() * b.clone()) * b.d_stensor(v)?
            }
            ScalarExpr::Pow(a, b) => {
                let (a, b) = (a.as_ref(), b.as_ref());
                let power_rule = (b.clone()
                    * ScalarExpr::pow(a.clone(), b.clone() - ScalarExpr::one()))
                    * a.d_stensor(v)?;
                let gb = b.d_stensor(v)?;
                if gb.is_zero() {
                    power_rule
                } else {
                    power_rule
                        + (ScalarExpr::pow(a.clone(), b.clone())
                            * ScalarExpr::call(Func::Log, a.clone()))
                            * gb
                }
            }
            ScalarExpr::Min(a, b) => {
                if a.d_stensor(v)?.is_zero() && b.d_stensor(v)?.is_zero() {
                    StensorExpr::Zero
                } else {
                    return Err(ExprError::UnsupportedDerivative {
                        what: "min of expressions depending on the variable",
                    });
                }
            }
            ScalarExpr::Call(f, a) => func_derivative(*f, a) * a.d_stensor(v)?,
            ScalarExpr::Trace(e) => {
                Stensor4Expr::transpose(e.d_stensor(v)?) * StensorExpr::Identity
            }
            ScalarExpr::Contract(a, b) => {
                Stensor4Expr::transpose(a.d_stensor(v)?) * b.as_ref().clone()
                    + Stensor4Expr::transpose(b.d_stensor(v)?) * a.as_ref().clone()
            }
        })
    }
}

impl StensorExpr {
    /// `∂self/∂x` for a scalar symbol `x`.
    pub fn d_scalar(&self, x: &str) -> ExprResult<StensorExpr> {
        Ok(match self {
            StensorExpr::Zero | StensorExpr::Identity | StensorExpr::Symbol(_) => {
                StensorExpr::Zero
            }
            StensorExpr::Neg(a) => -a.d_scalar(x)?,
            StensorExpr::Add(a, b) => a.d_scalar(x)? + b.d_scalar(x)?,
            StensorExpr::Sub(a, b) => a.d_scalar(x)? - b.d_scalar(x)?,
            StensorExpr::Scale(s, e) => {
                s.d_scalar(x)? * e.as_ref().clone() + s.as_ref().clone() * e.d_scalar(x)?
            }
            StensorExpr::Apply(c, e) => {
                c.d_scalar(x)? * e.as_ref().clone() + c.as_ref().clone() * e.d_scalar(x)?
            }
        })
    }

    /// `∂self/∂v` for a symmetric tensor symbol `v`.
    pub fn d_stensor(&self, v: &str) -> ExprResult<Stensor4Expr> {
        Ok(match self {
            StensorExpr::Zero | StensorExpr::Identity => Stensor4Expr::Zero,
            StensorExpr::Symbol(s) => {
                if s.name == v {
                    Stensor4Expr::Id
                } else {
                    Stensor4Expr::Zero
                }
            }
            StensorExpr::Neg(a) => -a.d_stensor(v)?,
            StensorExpr::Add(a, b) => a.d_stensor(v)? + b.d_stensor(v)?,
            StensorExpr::Sub(a, b) => a.d_stensor(v)? - b.d_stensor(v)?,
            StensorExpr::Scale(s, e) => {
                s.as_ref().clone() * e.d_stensor(v)?
                    + Stensor4Expr::outer(e.as_ref().clone(), s.d_stensor(v)?)
            }
            StensorExpr::Apply(c, e) => {
                if c.depends_on(v) {
                    return Err(ExprError::UnsupportedDerivative {
                        what: "fourth-order tensor depending on the differentiation variable",
                    });
                }
                c.as_ref().clone() * e.d_stensor(v)?
            }
        })
    }
}

impl Stensor4Expr {
    /// `∂self/∂x` for a scalar symbol `x`.
    pub fn d_scalar(&self, x: &str) -> ExprResult<Stensor4Expr> {
        Ok(match self {
            Stensor4Expr::Zero | Stensor4Expr::Id | Stensor4Expr::IxI | Stensor4Expr::Symbol(_) => {
                Stensor4Expr::Zero
            }
            Stensor4Expr::Neg(a) => -a.d_scalar(x)?,
            Stensor4Expr::Add(a, b) => a.d_scalar(x)? + b.d_scalar(x)?,
            Stensor4Expr::Sub(a, b) => a.d_scalar(x)? - b.d_scalar(x)?,
            Stensor4Expr::Scale(s, a) => {
                s.d_scalar(x)? * a.as_ref().clone() + s.as_ref().clone() * a.d_scalar(x)?
            }
            Stensor4Expr::Product(a, b) => {
                a.d_scalar(x)? * b.as_ref().clone() + a.as_ref().clone() * b.d_scalar(x)?
            }
            Stensor4Expr::Outer(a, b) => {
                Stensor4Expr::outer(a.d_scalar(x)?, b.as_ref().clone())
                    + Stensor4Expr::outer(a.as_ref().clone(), b.d_scalar(x)?)
            }
            Stensor4Expr::Transpose(a) => Stensor4Expr::transpose(a.d_scalar(x)?),
        })
    }
}
