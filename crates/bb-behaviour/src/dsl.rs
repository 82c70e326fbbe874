//! Evaluation context of the DSL driving a compilation.

use bb_tensor::ScalarExpr;
use tracing::warn;

use crate::description::{BehaviourDescription, IntegrationScheme};
use crate::error::{BehaviourError, BehaviourResult};
use crate::material_property::MaterialProperty;
use crate::variable::VariableCategory;

/// Read-mostly services the DSL offers to bricks: symbol resolution and
/// diagnostics.
pub trait BehaviourDsl {
    fn name(&self) -> &str;

    fn integration_scheme(&self) -> IntegrationScheme;

    /// Category of the variable `identifier` refers to, if declared.
    fn resolve(&self, bd: &BehaviourDescription, identifier: &str) -> Option<VariableCategory> {
        bd.variable(identifier).map(|(c, _)| c)
    }

    /// Report a non-fatal diagnostic.
    fn warning(&self, message: &str) {
        warn!(dsl = self.name(), "{message}");
    }

    /// Expression of a material property option with every identifier
    /// resolved to a declared scalar variable.
    fn resolve_material_property(
        &self,
        bd: &BehaviourDescription,
        option: &str,
        property: &MaterialProperty,
    ) -> BehaviourResult<ScalarExpr> {
        let expr = property.expression(option)?;
        for name in expr.symbols() {
            if self.resolve(bd, &name).is_none() {
                return Err(BehaviourError::UnresolvedSymbol {
                    option: option.to_string(),
                    name,
                });
            }
            if let Some((_, v)) = bd.variable(&name)
                && !v.type_.is_scalar()
            {
                return Err(BehaviourError::invalid_option(
                    option,
                    format!("'{name}' is a {} and cannot appear in a scalar formula", v.type_),
                ));
            }
        }
        Ok(expr)
    }
}

/// The stock DSL contexts.
#[derive(Clone, Debug)]
pub struct StandardDsl {
    name: String,
    scheme: IntegrationScheme,
}

impl StandardDsl {
    pub fn new(name: impl Into<String>, scheme: IntegrationScheme) -> Self {
        Self {
            name: name.into(),
            scheme,
        }
    }

    pub fn implicit() -> Self {
        Self::new("Implicit", IntegrationScheme::Implicit)
    }

    pub fn runge_kutta() -> Self {
        Self::new("RungeKutta", IntegrationScheme::Explicit)
    }

    /// DSL matching the scheme of `bd`.
    pub fn for_behaviour(bd: &BehaviourDescription) -> Self {
        match bd.integration_scheme() {
            IntegrationScheme::Implicit => Self::implicit(),
            IntegrationScheme::Explicit => Self::runge_kutta(),
            IntegrationScheme::Specific => Self::new("Default", IntegrationScheme::Specific),
        }
    }
}

impl BehaviourDsl for StandardDsl {
    fn name(&self) -> &str {
        &self.name
    }

    fn integration_scheme(&self) -> IntegrationScheme {
        self.scheme
    }
}
