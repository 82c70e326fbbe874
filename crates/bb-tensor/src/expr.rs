//! Expression trees and their simplifying constructors.
//!
//! Constructors such as [`ScalarExpr::mul`] or [`StensorExpr::scale`] fold
//! constants and zeros as the tree is built, so derivative expressions stay
//! readable once rendered.

use std::collections::BTreeSet;
use std::ops::{Add, Mul, Neg, Sub};

use bb_core::Real;

/// Where a symbol lives in the generated code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// Member of the generated behaviour class, rendered as `this->name`.
    Member,
    /// Local variable of the generated function.
    Local,
}

/// A named variable referenced by an expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    pub name: String,
    pub scope: Scope,
}

impl Symbol {
    pub fn member(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: Scope::Member,
        }
    }

    pub fn local(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: Scope::Local,
        }
    }
}

/// Scalar functions available in formulas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Func {
    Exp,
    Log,
    Sqrt,
}

impl Func {
    pub fn name(self) -> &'static str {
        match self {
            Func::Exp => "exp",
            Func::Log => "log",
            Func::Sqrt => "sqrt",
        }
    }

    pub fn apply(self, x: Real) -> Real {
        match self {
            Func::Exp => x.exp(),
            Func::Log => x.ln(),
            Func::Sqrt => x.sqrt(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ScalarExpr {
    Const(Real),
    Symbol(Symbol),
    Neg(Box<ScalarExpr>),
    Add(Box<ScalarExpr>, Box<ScalarExpr>),
    Sub(Box<ScalarExpr>, Box<ScalarExpr>),
    Mul(Box<ScalarExpr>, Box<ScalarExpr>),
    Div(Box<ScalarExpr>, Box<ScalarExpr>),
    Pow(Box<ScalarExpr>, Box<ScalarExpr>),
    Min(Box<ScalarExpr>, Box<ScalarExpr>),
    Call(Func, Box<ScalarExpr>),
    Trace(Box<StensorExpr>),
    /// Double contraction `a : b` of two symmetric tensors.
    Contract(Box<StensorExpr>, Box<StensorExpr>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum StensorExpr {
    Zero,
    Identity,
    Symbol(Symbol),
    Neg(Box<StensorExpr>),
    Add(Box<StensorExpr>, Box<StensorExpr>),
    Sub(Box<StensorExpr>, Box<StensorExpr>),
    Scale(Box<ScalarExpr>, Box<StensorExpr>),
    /// `C : e`
    Apply(Box<Stensor4Expr>, Box<StensorExpr>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stensor4Expr {
    Zero,
    /// Identity on symmetric tensors.
    Id,
    /// `I ⊗ I`
    IxI,
    Symbol(Symbol),
    Neg(Box<Stensor4Expr>),
    Add(Box<Stensor4Expr>, Box<Stensor4Expr>),
    Sub(Box<Stensor4Expr>, Box<Stensor4Expr>),
    Scale(Box<ScalarExpr>, Box<Stensor4Expr>),
    Product(Box<Stensor4Expr>, Box<Stensor4Expr>),
    /// `a ⊗ b`
    Outer(Box<StensorExpr>, Box<StensorExpr>),
    Transpose(Box<Stensor4Expr>),
}

/// An expression of any supported rank.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Scalar(ScalarExpr),
    Stensor(StensorExpr),
    Stensor4(Stensor4Expr),
}

impl Expr {
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Scalar(_) => "scalar",
            Expr::Stensor(_) => "stensor",
            Expr::Stensor4(_) => "stensor4",
        }
    }

    pub fn symbols(&self) -> BTreeSet<String> {
        match self {
            Expr::Scalar(e) => e.symbols(),
            Expr::Stensor(e) => e.symbols(),
            Expr::Stensor4(e) => e.symbols(),
        }
    }
}

impl From<ScalarExpr> for Expr {
    fn from(e: ScalarExpr) -> Self {
        Expr::Scalar(e)
    }
}

impl From<StensorExpr> for Expr {
    fn from(e: StensorExpr) -> Self {
        Expr::Stensor(e)
    }
}

impl From<Stensor4Expr> for Expr {
    fn from(e: Stensor4Expr) -> Self {
        Expr::Stensor4(e)
    }
}

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

impl ScalarExpr {
    pub fn constant(v: Real) -> Self {
        ScalarExpr::Const(v)
    }

    pub fn member(name: impl Into<String>) -> Self {
        ScalarExpr::Symbol(Symbol::member(name))
    }

    pub fn local(name: impl Into<String>) -> Self {
        ScalarExpr::Symbol(Symbol::local(name))
    }

    pub fn zero() -> Self {
        ScalarExpr::Const(0.0)
    }

    pub fn one() -> Self {
        ScalarExpr::Const(1.0)
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, ScalarExpr::Const(v) if *v == 0.0)
    }

    pub fn is_one(&self) -> bool {
        matches!(self, ScalarExpr::Const(v) if *v == 1.0)
    }

    fn as_const(&self) -> Option<Real> {
        match self {
            ScalarExpr::Const(v) => Some(*v),
            _ => None,
        }
    }

    pub fn add(a: ScalarExpr, b: ScalarExpr) -> Self {
        match (a.as_const(), b.as_const()) {
            (Some(x), Some(y)) => ScalarExpr::Const(x + y),
            (Some(x), _) if x == 0.0 => b,
            (_, Some(y)) if y == 0.0 => a,
            _ => ScalarExpr::Add(Box::new(a), Box::new(b)),
        }
    }

    pub fn sub(a: ScalarExpr, b: ScalarExpr) -> Self {
        match (a.as_const(), b.as_const()) {
            (Some(x), Some(y)) => ScalarExpr::Const(x - y),
            (Some(x), _) if x == 0.0 => ScalarExpr::neg(b),
            (_, Some(y)) if y == 0.0 => a,
            _ => ScalarExpr::Sub(Box::new(a), Box::new(b)),
        }
    }

    pub fn mul(a: ScalarExpr, b: ScalarExpr) -> Self {
        match (a.as_const(), b.as_const()) {
            (Some(x), Some(y)) => ScalarExpr::Const(x * y),
            (Some(x), _) | (_, Some(x)) if x == 0.0 => ScalarExpr::zero(),
            (Some(x), _) if x == 1.0 => b,
            (_, Some(y)) if y == 1.0 => a,
            _ => ScalarExpr::Mul(Box::new(a), Box::new(b)),
        }
    }

    pub fn div(a: ScalarExpr, b: ScalarExpr) -> Self {
        match (a.as_const(), b.as_const()) {
            (Some(x), Some(y)) if y != 0.0 => ScalarExpr::Const(x / y),
            (Some(x), _) if x == 0.0 => ScalarExpr::zero(),
            (_, Some(y)) if y == 1.0 => a,
            _ => ScalarExpr::Div(Box::new(a), Box::new(b)),
        }
    }

    pub fn neg(a: ScalarExpr) -> Self {
        match a {
            ScalarExpr::Const(v) => ScalarExpr::Const(-v),
            ScalarExpr::Neg(inner) => *inner,
            other => ScalarExpr::Neg(Box::new(other)),
        }
    }

    pub fn pow(a: ScalarExpr, b: ScalarExpr) -> Self {
        match (a.as_const(), b.as_const()) {
            (Some(x), Some(y)) => ScalarExpr::Const(x.powf(y)),
            (_, Some(y)) if y == 1.0 => a,
            (_, Some(y)) if y == 0.0 => ScalarExpr::one(),
            _ => ScalarExpr::Pow(Box::new(a), Box::new(b)),
        }
    }

    pub fn min(a: ScalarExpr, b: ScalarExpr) -> Self {
        match (a.as_const(), b.as_const()) {
            (Some(x), Some(y)) => ScalarExpr::Const(x.min(y)),
            _ => ScalarExpr::Min(Box::new(a), Box::new(b)),
        }
    }

    pub fn call(f: Func, a: ScalarExpr) -> Self {
        match a.as_const() {
            Some(x) => ScalarExpr::Const(f.apply(x)),
            None => ScalarExpr::Call(f, Box::new(a)),
        }
    }

    pub fn trace(e: StensorExpr) -> Self {
        match e {
            StensorExpr::Zero => ScalarExpr::zero(),
            StensorExpr::Identity => ScalarExpr::Const(3.0),
            StensorExpr::Scale(s, inner) => ScalarExpr::mul(*s, ScalarExpr::trace(*inner)),
            other => ScalarExpr::Trace(Box::new(other)),
        }
    }

    pub fn contract(a: StensorExpr, b: StensorExpr) -> Self {
        match (a, b) {
            (StensorExpr::Zero, _) | (_, StensorExpr::Zero) => ScalarExpr::zero(),
            (StensorExpr::Identity, e) | (e, StensorExpr::Identity) => ScalarExpr::trace(e),
            (StensorExpr::Scale(s, a), b) | (b, StensorExpr::Scale(s, a)) => {
                ScalarExpr::mul(*s, ScalarExpr::contract(*a, b))
            }
            (a, b) => ScalarExpr::Contract(Box::new(a), Box::new(b)),
        }
    }

    pub(crate) fn collect_symbols(&self, out: &mut BTreeSet<String>) {
        match self {
            ScalarExpr::Const(_) => {}
            ScalarExpr::Symbol(s) => {
                out.insert(s.name.clone());
            }
            ScalarExpr::Neg(a) | ScalarExpr::Call(_, a) => a.collect_symbols(out),
            ScalarExpr::Add(a, b)
            | ScalarExpr::Sub(a, b)
            | ScalarExpr::Mul(a, b)
            | ScalarExpr::Div(a, b)
            | ScalarExpr::Pow(a, b)
            | ScalarExpr::Min(a, b) => {
                a.collect_symbols(out);
                b.collect_symbols(out);
            }
            ScalarExpr::Trace(e) => e.collect_symbols(out),
            ScalarExpr::Contract(a, b) => {
                a.collect_symbols(out);
                b.collect_symbols(out);
            }
        }
    }

    /// Names of every symbol referenced, in lexicographic order.
    pub fn symbols(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    pub fn depends_on(&self, name: &str) -> bool {
        self.symbols().contains(name)
    }

    /// Replace every scalar symbol called `name` by `by`.
    pub fn substitute_scalar(&self, name: &str, by: &ScalarExpr) -> ScalarExpr {
        let sub = |e: &ScalarExpr| e.substitute_scalar(name, by);
        match self {
            ScalarExpr::Const(_) => self.clone(),
            ScalarExpr::Symbol(s) if s.name == name => by.clone(),
            ScalarExpr::Symbol(_) => self.clone(),
            ScalarExpr::Neg(a) => ScalarExpr::neg(sub(a)),
            ScalarExpr::Add(a, b) => ScalarExpr::add(sub(a), sub(b)),
            ScalarExpr::Sub(a, b) => ScalarExpr::sub(sub(a), sub(b)),
            ScalarExpr::Mul(a, b) => ScalarExpr::mul(sub(a), sub(b)),
            ScalarExpr::Div(a, b) => ScalarExpr::div(sub(a), sub(b)),
            ScalarExpr::Pow(a, b) => ScalarExpr::pow(sub(a), sub(b)),
            ScalarExpr::Min(a, b) => ScalarExpr::min(sub(a), sub(b)),
            ScalarExpr::Call(f, a) => ScalarExpr::call(*f, sub(a)),
            ScalarExpr::Trace(e) => ScalarExpr::trace(e.substitute_scalar(name, by)),
            ScalarExpr::Contract(a, b) => ScalarExpr::contract(
                a.substitute_scalar(name, by),
                b.substitute_scalar(name, by),
            ),
        }
    }

    /// Replace every symmetric tensor symbol called `name` by `by`.
    pub fn substitute_stensor(&self, name: &str, by: &StensorExpr) -> ScalarExpr {
        let sub = |e: &ScalarExpr| e.substitute_stensor(name, by);
        match self {
            ScalarExpr::Const(_) | ScalarExpr::Symbol(_) => self.clone(),
            ScalarExpr::Neg(a) => ScalarExpr::neg(sub(a)),
            ScalarExpr::Add(a, b) => ScalarExpr::add(sub(a), sub(b)),
            ScalarExpr::Sub(a, b) => ScalarExpr::sub(sub(a), sub(b)),
            ScalarExpr::Mul(a, b) => ScalarExpr::mul(sub(a), sub(b)),
            ScalarExpr::Div(a, b) => ScalarExpr::div(sub(a), sub(b)),
            ScalarExpr::Pow(a, b) => ScalarExpr::pow(sub(a), sub(b)),
            ScalarExpr::Min(a, b) => ScalarExpr::min(sub(a), sub(b)),
            ScalarExpr::Call(f, a) => ScalarExpr::call(*f, sub(a)),
            ScalarExpr::Trace(e) => ScalarExpr::trace(e.substitute_stensor(name, by)),
            ScalarExpr::Contract(a, b) => ScalarExpr::contract(
                a.substitute_stensor(name, by),
                b.substitute_stensor(name, by),
            ),
        }
    }
}

impl From<Real> for ScalarExpr {
    fn from(v: Real) -> Self {
        ScalarExpr::Const(v)
    }
}

impl Add for ScalarExpr {
    type Output = ScalarExpr;
    fn add(self, rhs: ScalarExpr) -> ScalarExpr {
        ScalarExpr::add(self, rhs)
    }
}

impl Sub for ScalarExpr {
    type Output = ScalarExpr;
    fn sub(self, rhs: ScalarExpr) -> ScalarExpr {
        ScalarExpr::sub(self, rhs)
    }
}

impl Mul for ScalarExpr {
    type Output = ScalarExpr;
    fn mul(self, rhs: ScalarExpr) -> ScalarExpr {
        ScalarExpr::mul(self, rhs)
    }
}

impl Neg for ScalarExpr {
    type Output = ScalarExpr;
    fn neg(self) -> ScalarExpr {
        ScalarExpr::neg(self)
    }
}

// ---------------------------------------------------------------------------
// Symmetric second-order tensors
// ---------------------------------------------------------------------------

impl StensorExpr {
    pub fn member(name: impl Into<String>) -> Self {
        StensorExpr::Symbol(Symbol::member(name))
    }

    pub fn local(name: impl Into<String>) -> Self {
        StensorExpr::Symbol(Symbol::local(name))
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, StensorExpr::Zero)
    }

    pub fn add(a: StensorExpr, b: StensorExpr) -> Self {
        match (a, b) {
            (StensorExpr::Zero, e) | (e, StensorExpr::Zero) => e,
            (a, b) => StensorExpr::Add(Box::new(a), Box::new(b)),
        }
    }

    pub fn sub(a: StensorExpr, b: StensorExpr) -> Self {
        match (a, b) {
            (a, StensorExpr::Zero) => a,
            (StensorExpr::Zero, b) => StensorExpr::neg(b),
            (a, b) => StensorExpr::Sub(Box::new(a), Box::new(b)),
        }
    }

    pub fn neg(a: StensorExpr) -> Self {
        match a {
            StensorExpr::Zero => StensorExpr::Zero,
            StensorExpr::Neg(inner) => *inner,
            other => StensorExpr::Neg(Box::new(other)),
        }
    }

    pub fn scale(s: ScalarExpr, e: StensorExpr) -> Self {
        if s.is_zero() || e.is_zero() {
            return StensorExpr::Zero;
        }
        if s.is_one() {
            return e;
        }
        match e {
            StensorExpr::Scale(s2, inner) => StensorExpr::Scale(Box::new(s * *s2), inner),
            e => StensorExpr::Scale(Box::new(s), Box::new(e)),
        }
    }

    pub fn apply(c: Stensor4Expr, e: StensorExpr) -> Self {
        match (c, e) {
            (Stensor4Expr::Zero, _) | (_, StensorExpr::Zero) => StensorExpr::Zero,
            (Stensor4Expr::Id, e) => e,
            (Stensor4Expr::IxI, e) => StensorExpr::scale(ScalarExpr::trace(e), StensorExpr::Identity),
            (Stensor4Expr::Scale(s, c), e) => StensorExpr::scale(*s, StensorExpr::apply(*c, e)),
            (c, StensorExpr::Scale(s, e)) => StensorExpr::scale(*s, StensorExpr::apply(c, *e)),
            (Stensor4Expr::Outer(a, b), e) => {
                StensorExpr::scale(ScalarExpr::contract(*b, e), *a)
            }
            (c, e) => StensorExpr::Apply(Box::new(c), Box::new(e)),
        }
    }

    pub(crate) fn collect_symbols(&self, out: &mut BTreeSet<String>) {
        match self {
            StensorExpr::Zero | StensorExpr::Identity => {}
            StensorExpr::Symbol(s) => {
                out.insert(s.name.clone());
            }
            StensorExpr::Neg(a) => a.collect_symbols(out),
            StensorExpr::Add(a, b) | StensorExpr::Sub(a, b) => {
                a.collect_symbols(out);
                b.collect_symbols(out);
            }
            StensorExpr::Scale(s, e) => {
                s.collect_symbols(out);
                e.collect_symbols(out);
            }
            StensorExpr::Apply(c, e) => {
                c.collect_symbols(out);
                e.collect_symbols(out);
            }
        }
    }

    pub fn symbols(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    pub fn depends_on(&self, name: &str) -> bool {
        self.symbols().contains(name)
    }

    pub fn substitute_scalar(&self, name: &str, by: &ScalarExpr) -> StensorExpr {
        let sub = |e: &StensorExpr| e.substitute_scalar(name, by);
        match self {
            StensorExpr::Zero | StensorExpr::Identity | StensorExpr::Symbol(_) => self.clone(),
            StensorExpr::Neg(a) => StensorExpr::neg(sub(a)),
            StensorExpr::Add(a, b) => StensorExpr::add(sub(a), sub(b)),
            StensorExpr::Sub(a, b) => StensorExpr::sub(sub(a), sub(b)),
            StensorExpr::Scale(s, e) => {
                StensorExpr::scale(s.substitute_scalar(name, by), sub(e))
            }
            StensorExpr::Apply(c, e) => {
                StensorExpr::apply(c.substitute_scalar(name, by), sub(e))
            }
        }
    }

    pub fn substitute_stensor(&self, name: &str, by: &StensorExpr) -> StensorExpr {
        let sub = |e: &StensorExpr| e.substitute_stensor(name, by);
        match self {
            StensorExpr::Symbol(s) if s.name == name => by.clone(),
            StensorExpr::Zero | StensorExpr::Identity | StensorExpr::Symbol(_) => self.clone(),
            StensorExpr::Neg(a) => StensorExpr::neg(sub(a)),
            StensorExpr::Add(a, b) => StensorExpr::add(sub(a), sub(b)),
            StensorExpr::Sub(a, b) => StensorExpr::sub(sub(a), sub(b)),
            StensorExpr::Scale(s, e) => {
                StensorExpr::scale(s.substitute_stensor(name, by), sub(e))
            }
            StensorExpr::Apply(c, e) => {
                StensorExpr::apply(c.substitute_stensor(name, by), sub(e))
            }
        }
    }
}

impl Add for StensorExpr {
    type Output = StensorExpr;
    fn add(self, rhs: StensorExpr) -> StensorExpr {
        StensorExpr::add(self, rhs)
    }
}

impl Sub for StensorExpr {
    type Output = StensorExpr;
    fn sub(self, rhs: StensorExpr) -> StensorExpr {
        StensorExpr::sub(self, rhs)
    }
}

impl Neg for StensorExpr {
    type Output = StensorExpr;
    fn neg(self) -> StensorExpr {
        StensorExpr::neg(self)
    }
}

impl Mul<StensorExpr> for ScalarExpr {
    type Output = StensorExpr;
    fn mul(self, rhs: StensorExpr) -> StensorExpr {
        StensorExpr::scale(self, rhs)
    }
}

impl Mul<StensorExpr> for Stensor4Expr {
    type Output = StensorExpr;
    fn mul(self, rhs: StensorExpr) -> StensorExpr {
        StensorExpr::apply(self, rhs)
    }
}

// ---------------------------------------------------------------------------
// Fourth-order tensors
// ---------------------------------------------------------------------------

impl Stensor4Expr {
    pub fn member(name: impl Into<String>) -> Self {
        Stensor4Expr::Symbol(Symbol::member(name))
    }

    pub fn local(name: impl Into<String>) -> Self {
        Stensor4Expr::Symbol(Symbol::local(name))
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Stensor4Expr::Zero)
    }

    /// `lambda I⊗I + 2 mu Id`
    pub fn isotropic(lambda: ScalarExpr, mu: ScalarExpr) -> Self {
        Stensor4Expr::add(
            Stensor4Expr::scale(lambda, Stensor4Expr::IxI),
            Stensor4Expr::scale(ScalarExpr::Const(2.0) * mu, Stensor4Expr::Id),
        )
    }

    pub fn add(a: Stensor4Expr, b: Stensor4Expr) -> Self {
        match (a, b) {
            (Stensor4Expr::Zero, e) | (e, Stensor4Expr::Zero) => e,
            (a, b) => Stensor4Expr::Add(Box::new(a), Box::new(b)),
        }
    }

    pub fn sub(a: Stensor4Expr, b: Stensor4Expr) -> Self {
        match (a, b) {
            (a, Stensor4Expr::Zero) => a,
            (Stensor4Expr::Zero, b) => Stensor4Expr::neg(b),
            (a, b) => Stensor4Expr::Sub(Box::new(a), Box::new(b)),
        }
    }

    pub fn neg(a: Stensor4Expr) -> Self {
        match a {
            Stensor4Expr::Zero => Stensor4Expr::Zero,
            Stensor4Expr::Neg(inner) => *inner,
            other => Stensor4Expr::Neg(Box::new(other)),
        }
    }

    pub fn scale(s: ScalarExpr, a: Stensor4Expr) -> Self {
        if s.is_zero() || a.is_zero() {
            return Stensor4Expr::Zero;
        }
        if s.is_one() {
            return a;
        }
        match a {
            Stensor4Expr::Scale(s2, inner) => Stensor4Expr::Scale(Box::new(s * *s2), inner),
            a => Stensor4Expr::Scale(Box::new(s), Box::new(a)),
        }
    }

    pub fn product(a: Stensor4Expr, b: Stensor4Expr) -> Self {
        match (a, b) {
            (Stensor4Expr::Zero, _) | (_, Stensor4Expr::Zero) => Stensor4Expr::Zero,
            (Stensor4Expr::Id, e) | (e, Stensor4Expr::Id) => e,
            (Stensor4Expr::Scale(s, a), b) => Stensor4Expr::scale(*s, Stensor4Expr::product(*a, b)),
            (a, Stensor4Expr::Scale(s, b)) => Stensor4Expr::scale(*s, Stensor4Expr::product(a, *b)),
            (a, b) => Stensor4Expr::Product(Box::new(a), Box::new(b)),
        }
    }

    pub fn outer(a: StensorExpr, b: StensorExpr) -> Self {
        match (a, b) {
            (StensorExpr::Zero, _) | (_, StensorExpr::Zero) => Stensor4Expr::Zero,
            (StensorExpr::Scale(s, a), b) => Stensor4Expr::scale(*s, Stensor4Expr::outer(*a, b)),
            (a, StensorExpr::Scale(s, b)) => Stensor4Expr::scale(*s, Stensor4Expr::outer(a, *b)),
            (StensorExpr::Identity, StensorExpr::Identity) => Stensor4Expr::IxI,
            (a, b) => Stensor4Expr::Outer(Box::new(a), Box::new(b)),
        }
    }

    pub fn transpose(a: Stensor4Expr) -> Self {
        match a {
            Stensor4Expr::Zero | Stensor4Expr::Id | Stensor4Expr::IxI => a,
            Stensor4Expr::Transpose(inner) => *inner,
            Stensor4Expr::Neg(inner) => Stensor4Expr::neg(Stensor4Expr::transpose(*inner)),
            Stensor4Expr::Scale(s, inner) => {
                Stensor4Expr::scale(*s, Stensor4Expr::transpose(*inner))
            }
            Stensor4Expr::Add(a, b) => {
                Stensor4Expr::add(Stensor4Expr::transpose(*a), Stensor4Expr::transpose(*b))
            }
            Stensor4Expr::Sub(a, b) => {
                Stensor4Expr::sub(Stensor4Expr::transpose(*a), Stensor4Expr::transpose(*b))
            }
            Stensor4Expr::Outer(a, b) => Stensor4Expr::outer(*b, *a),
            other => Stensor4Expr::Transpose(Box::new(other)),
        }
    }

    pub(crate) fn collect_symbols(&self, out: &mut BTreeSet<String>) {
        match self {
            Stensor4Expr::Zero | Stensor4Expr::Id | Stensor4Expr::IxI => {}
            Stensor4Expr::Symbol(s) => {
                out.insert(s.name.clone());
            }
            Stensor4Expr::Neg(a) | Stensor4Expr::Transpose(a) => a.collect_symbols(out),
            Stensor4Expr::Add(a, b) | Stensor4Expr::Sub(a, b) | Stensor4Expr::Product(a, b) => {
                a.collect_symbols(out);
                b.collect_symbols(out);
            }
            Stensor4Expr::Scale(s, a) => {
                s.collect_symbols(out);
                a.collect_symbols(out);
            }
            Stensor4Expr::Outer(a, b) => {
                a.collect_symbols(out);
                b.collect_symbols(out);
            }
        }
    }

    pub fn symbols(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    pub fn depends_on(&self, name: &str) -> bool {
        self.symbols().contains(name)
    }

    pub fn substitute_scalar(&self, name: &str, by: &ScalarExpr) -> Stensor4Expr {
        let sub = |e: &Stensor4Expr| e.substitute_scalar(name, by);
        match self {
            Stensor4Expr::Zero | Stensor4Expr::Id | Stensor4Expr::IxI | Stensor4Expr::Symbol(_) => {
                self.clone()
            }
            Stensor4Expr::Neg(a) => Stensor4Expr::neg(sub(a)),
            Stensor4Expr::Transpose(a) => Stensor4Expr::transpose(sub(a)),
            Stensor4Expr::Add(a, b) => Stensor4Expr::add(sub(a), sub(b)),
            Stensor4Expr::Sub(a, b) => Stensor4Expr::sub(sub(a), sub(b)),
            Stensor4Expr::Product(a, b) => Stensor4Expr::product(sub(a), sub(b)),
            Stensor4Expr::Scale(s, a) => {
                Stensor4Expr::scale(s.substitute_scalar(name, by), sub(a))
            }
            Stensor4Expr::Outer(a, b) => Stensor4Expr::outer(
                a.substitute_scalar(name, by),
                b.substitute_scalar(name, by),
            ),
        }
    }

    pub fn substitute_stensor(&self, name: &str, by: &StensorExpr) -> Stensor4Expr {
        let sub = |e: &Stensor4Expr| e.substitute_stensor(name, by);
        match self {
            Stensor4Expr::Zero | Stensor4Expr::Id | Stensor4Expr::IxI | Stensor4Expr::Symbol(_) => {
                self.clone()
            }
            Stensor4Expr::Neg(a) => Stensor4Expr::neg(sub(a)),
            Stensor4Expr::Transpose(a) => Stensor4Expr::transpose(sub(a)),
            Stensor4Expr::Add(a, b) => Stensor4Expr::add(sub(a), sub(b)),
            Stensor4Expr::Sub(a, b) => Stensor4Expr::sub(sub(a), sub(b)),
            Stensor4Expr::Product(a, b) => Stensor4Expr::product(sub(a), sub(b)),
            Stensor4Expr::Scale(s, a) => {
                Stensor4Expr::scale(s.substitute_stensor(name, by), sub(a))
            }
            Stensor4Expr::Outer(a, b) => Stensor4Expr::outer(
                a.substitute_stensor(name, by),
                b.substitute_stensor(name, by),
            ),
        }
    }
}

impl Add for Stensor4Expr {
    type Output = Stensor4Expr;
    fn add(self, rhs: Stensor4Expr) -> Stensor4Expr {
        Stensor4Expr::add(self, rhs)
    }
}

impl Sub for Stensor4Expr {
    type Output = Stensor4Expr;
    fn sub(self, rhs: Stensor4Expr) -> Stensor4Expr {
        Stensor4Expr::sub(self, rhs)
    }
}

impl Neg for Stensor4Expr {
    type Output = Stensor4Expr;
    fn neg(self) -> Stensor4Expr {
        Stensor4Expr::neg(self)
    }
}

impl Mul<Stensor4Expr> for ScalarExpr {
    type Output = Stensor4Expr;
    fn mul(self, rhs: Stensor4Expr) -> Stensor4Expr {
        Stensor4Expr::scale(self, rhs)
    }
}

impl Mul for Stensor4Expr {
    type Output = Stensor4Expr;
    fn mul(self, rhs: Stensor4Expr) -> Stensor4Expr {
        Stensor4Expr::product(self, rhs)
    }
}
