//! bb-tensor: symbolic tensor expressions for generated behaviour code.
//!
//! Expressions come in three kinds matching the ranks a small-strain stress
//! potential manipulates:
//! - [`ScalarExpr`] (material coefficients, damage, traces)
//! - [`StensorExpr`] (symmetric second-order tensors: strains, stresses)
//! - [`Stensor4Expr`] (fourth-order tensors: stiffness, tangent operators)
//!
//! Each kind renders to target syntax through `Display`, can be
//! differentiated symbolically (see [`diff`]) and evaluated numerically in
//! Mandel notation (see [`eval`] and [`mandel`]).

pub mod diff;
pub mod error;
pub mod eval;
pub mod expr;
pub mod fd;
pub mod formula;
pub mod mandel;
pub mod program;
mod render;

pub use error::{ExprError, ExprResult};
pub use eval::{Env, Value};
pub use expr::{Expr, Func, ScalarExpr, Scope, Stensor4Expr, StensorExpr, Symbol};
pub use formula::parse_formula;
pub use program::{AssignOp, Statement, execute};
