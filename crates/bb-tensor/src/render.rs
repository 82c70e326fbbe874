//! Rendering of expressions to the target syntax of the generated code.
//!
//! Parentheses are only emitted where precedence requires them.

use std::fmt;

use crate::expr::{Expr, ScalarExpr, Scope, Stensor4Expr, StensorExpr, Symbol};

const ADDITIVE: u8 = 1;
const MULTIPLICATIVE: u8 = 2;
const UNARY: u8 = 3;
const ATOM: u8 = 4;

fn child<T: fmt::Display>(f: &mut fmt::Formatter<'_>, e: &T, prec: u8, min: u8) -> fmt::Result {
    if prec < min {
        write!(f, "({e})")
    } else {
        write!(f, "{e}")
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            Scope::Member => write!(f, "this->{}", self.name),
            Scope::Local => write!(f, "{}", self.name),
        }
    }
}

fn fmt_real(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        write!(f, "{}", v as i64)
    } else {
        write!(f, "{v:?}")
    }
}

impl ScalarExpr {
    fn precedence(&self) -> u8 {
        match self {
            ScalarExpr::Const(v) if *v < 0.0 => UNARY,
            ScalarExpr::Add(..) | ScalarExpr::Sub(..) => ADDITIVE,
            ScalarExpr::Mul(..) | ScalarExpr::Div(..) => MULTIPLICATIVE,
            ScalarExpr::Neg(_) => UNARY,
            _ => ATOM,
        }
    }
}

impl fmt::Display for ScalarExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarExpr::Const(v) => fmt_real(f, *v),
            ScalarExpr::Symbol(s) => write!(f, "{s}"),
            ScalarExpr::Neg(a) => {
                write!(f, "-")?;
                child(f, a.as_ref(), a.precedence(), ATOM)
            }
            ScalarExpr::Add(a, b) => {
                child(f, a.as_ref(), a.precedence(), ADDITIVE)?;
                write!(f, " + ")?;
                child(f, b.as_ref(), b.precedence(), MULTIPLICATIVE)
            }
            ScalarExpr::Sub(a, b) => {
                child(f, a.as_ref(), a.precedence(), ADDITIVE)?;
                write!(f, " - ")?;
                child(f, b.as_ref(), b.precedence(), MULTIPLICATIVE)
            }
            ScalarExpr::Mul(a, b) => {
                child(f, a.as_ref(), a.precedence(), MULTIPLICATIVE)?;
                write!(f, " * ")?;
                child(f, b.as_ref(), b.precedence(), UNARY)
            }
            ScalarExpr::Div(a, b) => {
                child(f, a.as_ref(), a.precedence(), MULTIPLICATIVE)?;
                write!(f, " / ")?;
                child(f, b.as_ref(), b.precedence(), UNARY)
            }
            ScalarExpr::Pow(a, b) => write!(f, "pow({a}, {b})"),
            ScalarExpr::Min(a, b) => write!(f, "std::min({a}, {b})"),
            ScalarExpr::Call(func, a) => write!(f, "{}({a})", func.name()),
            ScalarExpr::Trace(e) => write!(f, "trace({e})"),
            ScalarExpr::Contract(a, b) => {
                write!(f, "(")?;
                child(f, a.as_ref(), a.precedence(), ATOM)?;
                write!(f, " | ")?;
                child(f, b.as_ref(), b.precedence(), ATOM)?;
                write!(f, ")")
            }
        }
    }
}

impl StensorExpr {
    fn precedence(&self) -> u8 {
        match self {
            StensorExpr::Add(..) | StensorExpr::Sub(..) => ADDITIVE,
            StensorExpr::Scale(..) | StensorExpr::Apply(..) => MULTIPLICATIVE,
            StensorExpr::Neg(_) => UNARY,
            _ => ATOM,
        }
    }
}

impl fmt::Display for StensorExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StensorExpr::Zero => write!(f, "Stensor(real(0))"),
            StensorExpr::Identity => write!(f, "Stensor::Id()"),
            StensorExpr::Symbol(s) => write!(f, "{s}"),
            StensorExpr::Neg(a) => {
                write!(f, "-")?;
                child(f, a.as_ref(), a.precedence(), ATOM)
            }
            StensorExpr::Add(a, b) => {
                child(f, a.as_ref(), a.precedence(), ADDITIVE)?;
                write!(f, " + ")?;
                child(f, b.as_ref(), b.precedence(), MULTIPLICATIVE)
            }
            StensorExpr::Sub(a, b) => {
                child(f, a.as_ref(), a.precedence(), ADDITIVE)?;
                write!(f, " - ")?;
                child(f, b.as_ref(), b.precedence(), MULTIPLICATIVE)
            }
            StensorExpr::Scale(s, e) => {
                child(f, s.as_ref(), s.precedence(), MULTIPLICATIVE)?;
                write!(f, " * ")?;
                child(f, e.as_ref(), e.precedence(), UNARY)
            }
            StensorExpr::Apply(c, e) => {
                child(f, c.as_ref(), c.precedence(), MULTIPLICATIVE)?;
                write!(f, " * ")?;
                child(f, e.as_ref(), e.precedence(), UNARY)
            }
        }
    }
}

impl Stensor4Expr {
    fn precedence(&self) -> u8 {
        match self {
            Stensor4Expr::Add(..) | Stensor4Expr::Sub(..) => ADDITIVE,
            Stensor4Expr::Scale(..) | Stensor4Expr::Product(..) => MULTIPLICATIVE,
            Stensor4Expr::Neg(_) => UNARY,
            _ => ATOM,
        }
    }
}

impl fmt::Display for Stensor4Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stensor4Expr::Zero => write!(f, "Stensor4(real(0))"),
            Stensor4Expr::Id => write!(f, "Stensor4::Id()"),
            Stensor4Expr::IxI => write!(f, "Stensor4::IxI()"),
            Stensor4Expr::Symbol(s) => write!(f, "{s}"),
            Stensor4Expr::Neg(a) => {
                write!(f, "-")?;
                child(f, a.as_ref(), a.precedence(), ATOM)
            }
            Stensor4Expr::Add(a, b) => {
                child(f, a.as_ref(), a.precedence(), ADDITIVE)?;
                write!(f, " + ")?;
                child(f, b.as_ref(), b.precedence(), MULTIPLICATIVE)
            }
            Stensor4Expr::Sub(a, b) => {
                child(f, a.as_ref(), a.precedence(), ADDITIVE)?;
                write!(f, " - ")?;
                child(f, b.as_ref(), b.precedence(), MULTIPLICATIVE)
            }
            Stensor4Expr::Scale(s, a) => {
                child(f, s.as_ref(), s.precedence(), MULTIPLICATIVE)?;
                write!(f, " * ")?;
                child(f, a.as_ref(), a.precedence(), UNARY)
            }
            Stensor4Expr::Product(a, b) => {
                child(f, a.as_ref(), a.precedence(), MULTIPLICATIVE)?;
                write!(f, " * ")?;
                child(f, b.as_ref(), b.precedence(), UNARY)
            }
            // `^` binds loosely in the target language, keep the dyadic product wrapped
            Stensor4Expr::Outer(a, b) => write!(f, "(({a}) ^ ({b}))"),
            Stensor4Expr::Transpose(a) => write!(f, "transpose({a})"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Scalar(e) => write!(f, "{e}"),
            Expr::Stensor(e) => write!(f, "{e}"),
            Expr::Stensor4(e) => write!(f, "{e}"),
        }
    }
}
