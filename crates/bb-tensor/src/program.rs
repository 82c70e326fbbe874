//! Statements of generated code blocks.
//!
//! A block is a list of [`Statement`]s. Each statement renders to one line of
//! target code and, unless it is [`Statement::Raw`], can be executed against
//! an [`Env`] so generated blocks are checked numerically in tests.

use std::fmt;

use crate::error::{ExprError, ExprResult};
use crate::eval::{Env, Value};
use crate::expr::{Expr, Symbol};
use bb_core::ensure_finite;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignOp {
    Set,
    AddAssign,
    SubAssign,
}

impl AssignOp {
    pub fn token(self) -> &'static str {
        match self {
            AssignOp::Set => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    /// `const auto name = value;`
    Let { name: String, value: Expr },
    /// `target op value;`
    Assign {
        target: Symbol,
        op: AssignOp,
        value: Expr,
    },
    /// Verbatim line that cannot be evaluated (e.g. a call into the solver).
    Raw(String),
}

impl Statement {
    pub fn define(name: impl Into<String>, value: impl Into<Expr>) -> Self {
        Statement::Let {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn set(target: Symbol, value: impl Into<Expr>) -> Self {
        Statement::Assign {
            target,
            op: AssignOp::Set,
            value: value.into(),
        }
    }

    pub fn add_assign(target: Symbol, value: impl Into<Expr>) -> Self {
        Statement::Assign {
            target,
            op: AssignOp::AddAssign,
            value: value.into(),
        }
    }

    pub fn sub_assign(target: Symbol, value: impl Into<Expr>) -> Self {
        Statement::Assign {
            target,
            op: AssignOp::SubAssign,
            value: value.into(),
        }
    }

    pub fn raw(line: impl Into<String>) -> Self {
        Statement::Raw(line.into())
    }

    /// Name written by this statement, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            Statement::Let { name, .. } => Some(name.as_str()),
            Statement::Assign { target, .. } => Some(target.name.as_str()),
            Statement::Raw(_) => None,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { name, value } => write!(f, "const auto {name} = {value};"),
            Statement::Assign { target, op, value } => {
                write!(f, "{target} {} {value};", op.token())
            }
            Statement::Raw(line) => write!(f, "{line}"),
        }
    }
}

fn check_finite(v: &Value) -> ExprResult<()> {
    for c in v.components() {
        ensure_finite(c, "statement result")?;
    }
    Ok(())
}

fn combine(name: &str, old: &Value, op: AssignOp, rhs: Value) -> ExprResult<Value> {
    let sign = if op == AssignOp::SubAssign { -1.0 } else { 1.0 };
    Ok(match (old, rhs) {
        (Value::Scalar(a), Value::Scalar(b)) => Value::Scalar(a + sign * b),
        (Value::Stensor(a), Value::Stensor(b)) => Value::Stensor(a + sign * b),
        (Value::Stensor4(a), Value::Stensor4(b)) => Value::Stensor4(a + sign * b),
        (old, rhs) => {
            return Err(ExprError::TypeMismatch {
                name: name.to_string(),
                expected: old.kind(),
                found: rhs.kind(),
            });
        }
    })
}

/// Run `statements` in order, updating `env`.
///
/// Compound assignments require the target to be bound already with a value
/// of the same kind.
pub fn execute(statements: &[Statement], env: &mut Env) -> ExprResult<()> {
    for statement in statements {
        match statement {
            Statement::Let { name, value } => {
                let v = value.eval(env)?;
                check_finite(&v)?;
                env.set(name.clone(), v);
            }
            Statement::Assign { target, op, value } => {
                let rhs = value.eval(env)?;
                let v = match op {
                    AssignOp::Set => rhs,
                    AssignOp::AddAssign | AssignOp::SubAssign => {
                        let old = env.get(&target.name).ok_or_else(|| ExprError::UnboundSymbol {
                            name: target.name.clone(),
                        })?;
                        combine(&target.name, old, *op, rhs)?
                    }
                };
                check_finite(&v)?;
                env.set(target.name.clone(), v);
            }
            Statement::Raw(line) => {
                return Err(ExprError::NotEvaluable { code: line.clone() });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{ScalarExpr, Stensor4Expr, StensorExpr};
    use crate::mandel::{from_components, isotropic_stiffness};

    #[test]
    fn statements_render_one_line_each() {
        let s = Statement::define("lambda", ScalarExpr::member("young") * ScalarExpr::member("nu"));
        assert_eq!(s.to_string(), "const auto lambda = this->young * this->nu;");
        let s = Statement::add_assign(
            Symbol::member("dfeel_ddeel"),
            Stensor4Expr::member("D"),
        );
        assert_eq!(s.to_string(), "this->dfeel_ddeel += this->D;");
        assert_eq!(Statement::raw("feel -= deto;").to_string(), "feel -= deto;");
    }

    #[test]
    fn execute_runs_in_order() {
        let mut env = Env::new();
        env.set_scalar("d", 0.5)
            .set_stensor("eel", from_components([1e-3, 0.0, 0.0, 0.0, 0.0, 0.0]))
            .set_stensor4("D", isotropic_stiffness(100.0, 50.0));
        let block = vec![
            Statement::define("f", ScalarExpr::one() - ScalarExpr::member("d")),
            Statement::set(
                Symbol::member("sig"),
                ScalarExpr::local("f") * (Stensor4Expr::member("D") * StensorExpr::member("eel")),
            ),
            Statement::sub_assign(
                Symbol::member("sig"),
                ScalarExpr::local("f") * (Stensor4Expr::member("D") * StensorExpr::member("eel")),
            ),
        ];
        execute(&block, &mut env).unwrap();
        assert_eq!(env.get("f"), Some(&Value::Scalar(0.5)));
        let sig = env.get("sig").unwrap().as_stensor().copied().unwrap();
        assert!(sig.iter().all(|c| c.abs() < 1e-15));
    }

    #[test]
    fn compound_assignment_needs_bound_target() {
        let mut env = Env::new();
        let block = vec![Statement::add_assign(Symbol::member("x"), ScalarExpr::one())];
        assert!(matches!(
            execute(&block, &mut env),
            Err(ExprError::UnboundSymbol { .. })
        ));

        env.set_stensor("x", from_components([0.0; 6]));
        assert!(matches!(
            execute(&block, &mut env),
            Err(ExprError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn raw_lines_are_not_evaluable() {
        let mut env = Env::new();
        let err = execute(&[Statement::raw("solve();")], &mut env).unwrap_err();
        assert_eq!(err, ExprError::NotEvaluable { code: "solve();".into() });
    }

    #[test]
    fn non_finite_results_are_rejected() {
        let mut env = Env::new();
        env.set_scalar("z", 0.0);
        let block = vec![Statement::define(
            "inv",
            ScalarExpr::div(ScalarExpr::one(), ScalarExpr::member("z")),
        )];
        assert!(matches!(execute(&block, &mut env), Err(ExprError::Numeric(_))));
    }
}
