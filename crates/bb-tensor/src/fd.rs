//! Central finite differences of tensor expressions.
//!
//! Used to cross-check symbolic derivatives and to evaluate the numerical
//! Jacobian blocks of the implicit scheme.

use crate::error::{ExprError, ExprResult};
use crate::eval::{Env, Value};
use crate::expr::StensorExpr;
use crate::mandel::{Stensor, Stensor4};
use bb_core::{Real, ensure_finite, ensure_positive};

fn step(epsilon: Real, x: Real) -> Real {
    epsilon * x.abs().max(1.0)
}

fn current(env: &Env, name: &str) -> ExprResult<Value> {
    env.get(name).cloned().ok_or_else(|| ExprError::UnboundSymbol {
        name: name.to_string(),
    })
}

/// `∂e/∂x` for a scalar symbol `x`, by central differences.
pub fn d_scalar(e: &StensorExpr, env: &Env, x: &str, epsilon: Real) -> ExprResult<Stensor> {
    ensure_positive(epsilon, "finite difference step")?;
    let x0 = match current(env, x)? {
        Value::Scalar(v) => v,
        other => {
            return Err(ExprError::TypeMismatch {
                name: x.to_string(),
                expected: "scalar",
                found: other.kind(),
            });
        }
    };
    let dx = step(epsilon, x0);
    let mut work = env.clone();

    work.set_scalar(x, x0 + dx);
    let plus = e.eval(&work)?;
    work.set_scalar(x, x0 - dx);
    let minus = e.eval(&work)?;

    let df = (plus - minus) / (2.0 * dx);
    for v in df.iter() {
        ensure_finite(*v, "finite difference")?;
    }
    Ok(df)
}

/// `∂e/∂v` for a symmetric tensor symbol `v`, one column per Mandel component.
pub fn d_stensor(e: &StensorExpr, env: &Env, v: &str, epsilon: Real) -> ExprResult<Stensor4> {
    ensure_positive(epsilon, "finite difference step")?;
    let v0 = match current(env, v)? {
        Value::Stensor(s) => s,
        other => {
            return Err(ExprError::TypeMismatch {
                name: v.to_string(),
                expected: "stensor",
                found: other.kind(),
            });
        }
    };
    let mut work = env.clone();
    let mut jac = Stensor4::zeros();

    for j in 0..6 {
        let dx = step(epsilon, v0[j]);

        let mut v_plus = v0;
        v_plus[j] += dx;
        work.set_stensor(v, v_plus);
        let plus = e.eval(&work)?;

        let mut v_minus = v0;
        v_minus[j] -= dx;
        work.set_stensor(v, v_minus);
        let minus = e.eval(&work)?;

        let df = (plus - minus) / (2.0 * dx);
        for i in 0..6 {
            jac[(i, j)] = ensure_finite(df[i], "finite difference")?;
        }
    }

    Ok(jac)
}
