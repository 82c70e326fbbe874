//! Jacobian blocks of implicit equations depending on the stress.
//!
//! A residual `f<x>` that depends on the stress gets, for each variable `v`
//! the stress depends on, `df<x>_dd<v> += (∂f<x>/∂σ) * (∂σ/∂Δv)`. The second
//! factor comes from the stress derivative entries, either symbolically or
//! by central differences in the generated code.

use bb_behaviour::{BehaviourDescription, TypeFlag};
use bb_core::{Real, ensure_positive};
use bb_tensor::{ScalarExpr, StensorExpr};

use crate::derivatives::StressDerivativeEntry;
use crate::error::{BrickError, BrickResult};
use crate::evaluator::increment;

const EPSILON: &str = "nd_epsilon";
const DERIVATIVE: &str = "nd_dsig";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum JacobianMode {
    Analytical,
    /// Central differences with step `epsilon` on the increment.
    Numerical { epsilon: Real },
}

/// Code of the Jacobian block `(equation, variable)`; empty when the stress
/// does not depend on `variable`.
pub fn equation_derivative(
    bd: &BehaviourDescription,
    entries: &[StressDerivativeEntry],
    stress: &StensorExpr,
    equation: &str,
    variable: &str,
    placeholder: &str,
    mode: JacobianMode,
) -> BrickResult<String> {
    let residual = bd.integration_variable_for_residual(equation).ok_or_else(|| {
        BrickError::configuration(equation, "no integration variable has this residual")
    })?;
    let Some(entry) = entries.iter().find(|e| e.variable == variable) else {
        return Ok(String::new());
    };

    let dv = increment(variable);
    let block = format!("d{equation}_d{dv}");
    let op = if residual.type_.is_scalar() && entry.type_flag == TypeFlag::Scalar {
        "|"
    } else {
        "*"
    };

    match mode {
        JacobianMode::Analytical => Ok(format!(
            "{block} += ({placeholder}) {op} ({});",
            entry.expression
        )),
        JacobianMode::Numerical { epsilon } => {
            let epsilon = ensure_positive(epsilon, "finite difference step")
                .map_err(|e| BrickError::configuration("epsilon", e.to_string()))?;
            let mut lines = vec![
                "{".to_string(),
                format!("  const real {EPSILON} = {epsilon:?};"),
            ];
            if entry.type_flag == TypeFlag::Scalar {
                let eps = ScalarExpr::local(EPSILON);
                let x = ScalarExpr::member(dv.as_str());
                let plus = stress.substitute_scalar(&dv, &(x.clone() + eps.clone()));
                let minus = stress.substitute_scalar(&dv, &(x - eps));
                lines.push(format!("  const auto sig_p = {plus};"));
                lines.push(format!("  const auto sig_m = {minus};"));
                lines.push(format!(
                    "  const auto {DERIVATIVE} = (sig_p - sig_m) / (2 * {EPSILON});"
                ));
            } else {
                let (p, m) = (format!("{dv}_p"), format!("{dv}_m"));
                let plus = stress.substitute_stensor(&dv, &StensorExpr::local(p.as_str()));
                let minus = stress.substitute_stensor(&dv, &StensorExpr::local(m.as_str()));
                lines.extend([
                    format!("  StiffnessTensor {DERIVATIVE};"),
                    "  for (unsigned short i = 0; i != StensorSize; ++i) {".to_string(),
                    format!("    auto {p} = this->{dv};"),
                    format!("    auto {m} = this->{dv};"),
                    format!("    {p}[i] += {EPSILON};"),
                    format!("    {m}[i] -= {EPSILON};"),
                    format!("    const auto sig_p = {plus};"),
                    format!("    const auto sig_m = {minus};"),
                    "    for (unsigned short j = 0; j != StensorSize; ++j) {".to_string(),
                    format!("      {DERIVATIVE}(j, i) = (sig_p(j) - sig_m(j)) / (2 * {EPSILON});"),
                    "    }".to_string(),
                    "  }".to_string(),
                ]);
            }
            lines.push(format!("  {block} += ({placeholder}) {op} ({DERIVATIVE});"));
            lines.push("}".to_string());
            Ok(lines.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bb_behaviour::{IntegrationScheme, SupportedType, VariableCategory, VariableDescription};
    use bb_tensor::Stensor4Expr;

    fn bd() -> BehaviourDescription {
        let mut bd = BehaviourDescription::new("B", IntegrationScheme::Implicit);
        for (t, n) in [(SupportedType::StrainStensor, "eel"), (SupportedType::Real, "p")] {
            bd.declare(VariableCategory::StateVariable, VariableDescription::new(t, n))
                .unwrap();
        }
        bd
    }

    fn stress() -> StensorExpr {
        (ScalarExpr::one() - ScalarExpr::member("d"))
            * (Stensor4Expr::member("D") * StensorExpr::member("deel"))
    }

    fn entries() -> Vec<StressDerivativeEntry> {
        vec![
            StressDerivativeEntry::new("eel", Stensor4Expr::member("D"), TypeFlag::Stensor),
            StressDerivativeEntry::new("d", StensorExpr::member("sig"), TypeFlag::Scalar),
        ]
    }

    #[test]
    fn analytical_blocks() {
        let analytical = JacobianMode::Analytical;
        let (bd, entries, stress) = (bd(), entries(), stress());
        let code = equation_derivative(&bd, &entries, &stress, "feel", "eel", "dfeel_dsig", analytical)
            .unwrap();
        assert_eq!(code, "dfeel_ddeel += (dfeel_dsig) * (this->D);");

        let code = equation_derivative(&bd, &entries, &stress, "fp", "d", "dfp_dsig", analytical)
            .unwrap();
        assert_eq!(code, "dfp_ddd += (dfp_dsig) | (this->sig);");
    }

    #[test]
    fn unknown_target_is_empty_and_unknown_residual_fails() {
        let analytical = JacobianMode::Analytical;
        let code = equation_derivative(&bd(), &entries(), &stress(), "feel", "p", "x", analytical)
            .unwrap();
        assert!(code.is_empty());

        let err = equation_derivative(&bd(), &entries(), &stress(), "fq", "eel", "x", analytical)
            .unwrap_err();
        assert_eq!(err.option(), Some("fq"));
    }

    #[test]
    fn numerical_blocks_perturb_the_increment() {
        let mode = JacobianMode::Numerical { epsilon: 1e-8 };
        let code =
            equation_derivative(&bd(), &entries(), &stress(), "feel", "eel", "J", mode).unwrap();
        assert!(code.starts_with("{\n  const real nd_epsilon = 1e-8;"));
        assert!(code.contains("deel_p[i] += nd_epsilon;"));
        assert!(code.contains("this->D * deel_p"));
        assert!(code.ends_with("  dfeel_ddeel += (J) * (nd_dsig);\n}"));

        let code =
            equation_derivative(&bd(), &entries(), &stress(), "feel", "d", "J", mode).unwrap();
        assert!(code.contains("const auto nd_dsig = (sig_p - sig_m) / (2 * nd_epsilon);"));

        let err = equation_derivative(
            &bd(),
            &entries(),
            &stress(),
            "feel",
            "eel",
            "J",
            JacobianMode::Numerical { epsilon: 0.0 },
        )
        .unwrap_err();
        assert_eq!(err.option(), Some("epsilon"));
    }
}
