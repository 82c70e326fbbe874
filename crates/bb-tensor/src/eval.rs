//! Numerical evaluation of expressions.

use std::collections::BTreeMap;

use bb_core::Real;

use crate::error::{ExprError, ExprResult};
use crate::expr::{Expr, ScalarExpr, Stensor4Expr, StensorExpr, Symbol};
use crate::mandel::{self, Stensor, Stensor4};

/// Value bound to a symbol.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Scalar(Real),
    Stensor(Stensor),
    Stensor4(Stensor4),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "scalar",
            Value::Stensor(_) => "stensor",
            Value::Stensor4(_) => "stensor4",
        }
    }

    pub fn as_scalar(&self) -> Option<Real> {
        match self {
            Value::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_stensor(&self) -> Option<&Stensor> {
        match self {
            Value::Stensor(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_stensor4(&self) -> Option<&Stensor4> {
        match self {
            Value::Stensor4(v) => Some(v),
            _ => None,
        }
    }

    /// All components, row-major for fourth-order tensors.
    pub fn components(&self) -> Vec<Real> {
        match self {
            Value::Scalar(v) => vec![*v],
            Value::Stensor(v) => v.iter().copied().collect(),
            Value::Stensor4(v) => v.transpose().iter().copied().collect(),
        }
    }
}

/// Symbol table used to evaluate expressions and statements.
///
/// Symbols are looked up by name; the scope only matters for rendering.
#[derive(Clone, Debug, Default)]
pub struct Env {
    values: BTreeMap<String, Value>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn set_scalar(&mut self, name: impl Into<String>, v: Real) -> &mut Self {
        self.set(name, Value::Scalar(v))
    }

    pub fn set_stensor(&mut self, name: impl Into<String>, v: Stensor) -> &mut Self {
        self.set(name, Value::Stensor(v))
    }

    pub fn set_stensor4(&mut self, name: impl Into<String>, v: Stensor4) -> &mut Self {
        self.set(name, Value::Stensor4(v))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    fn lookup(&self, symbol: &Symbol) -> ExprResult<&Value> {
        self.values
            .get(&symbol.name)
            .ok_or_else(|| ExprError::UnboundSymbol {
                name: symbol.name.clone(),
            })
    }

    fn mismatch(symbol: &Symbol, expected: &'static str, found: &Value) -> ExprError {
        ExprError::TypeMismatch {
            name: symbol.name.clone(),
            expected,
            found: found.kind(),
        }
    }

    pub fn scalar(&self, symbol: &Symbol) -> ExprResult<Real> {
        let v = self.lookup(symbol)?;
        v.as_scalar()
            .ok_or_else(|| Self::mismatch(symbol, "scalar", v))
    }

    pub fn stensor(&self, symbol: &Symbol) -> ExprResult<Stensor> {
        let v = self.lookup(symbol)?;
        v.as_stensor()
            .copied()
            .ok_or_else(|| Self::mismatch(symbol, "stensor", v))
    }

    pub fn stensor4(&self, symbol: &Symbol) -> ExprResult<Stensor4> {
        let v = self.lookup(symbol)?;
        v.as_stensor4()
            .copied()
            .ok_or_else(|| Self::mismatch(symbol, "stensor4", v))
    }
}

impl ScalarExpr {
    pub fn eval(&self, env: &Env) -> ExprResult<Real> {
        Ok(match self {
            ScalarExpr::Const(v) => *v,
            ScalarExpr::Symbol(s) => env.scalar(s)?,
            ScalarExpr::Neg(a) => -a.eval(env)?,
            ScalarExpr::Add(a, b) => a.eval(env)? + b.eval(env)?,
            ScalarExpr::Sub(a, b) => a.eval(env)? - b.eval(env)?,
            ScalarExpr::Mul(a, b) => a.eval(env)? * b.eval(env)?,
            ScalarExpr::Div(a, b) => a.eval(env)? / b.eval(env)?,
            ScalarExpr::Pow(a, b) => a.eval(env)?.powf(b.eval(env)?),
            ScalarExpr::Min(a, b) => a.eval(env)?.min(b.eval(env)?),
            ScalarExpr::Call(f, a) => f.apply(a.eval(env)?),
            ScalarExpr::Trace(e) => mandel::trace(&e.eval(env)?),
            ScalarExpr::Contract(a, b) => a.eval(env)?.dot(&b.eval(env)?),
        })
    }
}

impl StensorExpr {
    pub fn eval(&self, env: &Env) -> ExprResult<Stensor> {
        Ok(match self {
            StensorExpr::Zero => Stensor::zeros(),
            StensorExpr::Identity => mandel::identity(),
            StensorExpr::Symbol(s) => env.stensor(s)?,
            StensorExpr::Neg(a) => -a.eval(env)?,
            StensorExpr::Add(a, b) => a.eval(env)? + b.eval(env)?,
            StensorExpr::Sub(a, b) => a.eval(env)? - b.eval(env)?,
            StensorExpr::Scale(s, e) => s.eval(env)? * e.eval(env)?,
            StensorExpr::Apply(c, e) => c.eval(env)? * e.eval(env)?,
        })
    }
}

impl Stensor4Expr {
    pub fn eval(&self, env: &Env) -> ExprResult<Stensor4> {
        Ok(match self {
            Stensor4Expr::Zero => Stensor4::zeros(),
            Stensor4Expr::Id => mandel::id4(),
            Stensor4Expr::IxI => mandel::ixi(),
            Stensor4Expr::Symbol(s) => env.stensor4(s)?,
            Stensor4Expr::Neg(a) => -a.eval(env)?,
            Stensor4Expr::Add(a, b) => a.eval(env)? + b.eval(env)?,
            Stensor4Expr::Sub(a, b) => a.eval(env)? - b.eval(env)?,
            Stensor4Expr::Scale(s, a) => s.eval(env)? * a.eval(env)?,
            Stensor4Expr::Product(a, b) => a.eval(env)? * b.eval(env)?,
            Stensor4Expr::Outer(a, b) => a.eval(env)? * b.eval(env)?.transpose(),
            Stensor4Expr::Transpose(a) => a.eval(env)?.transpose(),
        })
    }
}

impl Expr {
    pub fn eval(&self, env: &Env) -> ExprResult<Value> {
        Ok(match self {
            Expr::Scalar(e) => Value::Scalar(e.eval(env)?),
            Expr::Stensor(e) => Value::Stensor(e.eval(env)?),
            Expr::Stensor4(e) => Value::Stensor4(e.eval(env)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mandel::{from_components, isotropic_stiffness};

    #[test]
    fn damaged_stress_evaluates() {
        let mut env = Env::new();
        let eel = from_components([1e-3, 0.0, 0.0, 0.0, 0.0, 0.0]);
        env.set_scalar("d", 0.25)
            .set_stensor("eel", eel)
            .set_stensor4("D", isotropic_stiffness(100e9, 50e9));

        let sig = (ScalarExpr::one() - ScalarExpr::member("d"))
            * (Stensor4Expr::member("D") * StensorExpr::member("eel"));
        let s = sig.eval(&env).unwrap();
        assert!((s[0] - 0.75 * 200e9 * 1e-3).abs() < 1e-3);
        assert!((s[1] - 0.75 * 100e9 * 1e-3).abs() < 1e-3);
    }

    #[test]
    fn unbound_symbol_is_reported() {
        let env = Env::new();
        let err = ScalarExpr::member("lambda").eval(&env).unwrap_err();
        assert_eq!(
            err,
            ExprError::UnboundSymbol {
                name: "lambda".into()
            }
        );
    }

    #[test]
    fn type_mismatch_is_reported() {
        let mut env = Env::new();
        env.set_scalar("eel", 1.0);
        let err = StensorExpr::member("eel").eval(&env).unwrap_err();
        assert!(matches!(err, ExprError::TypeMismatch { .. }));
    }

    #[test]
    fn contraction_of_identity_is_trace() {
        let mut env = Env::new();
        env.set_stensor("e", from_components([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
        let c = ScalarExpr::Contract(
            Box::new(StensorExpr::Identity),
            Box::new(StensorExpr::member("e")),
        );
        assert!((c.eval(&env).unwrap() - 6.0).abs() < 1e-14);
    }
}
