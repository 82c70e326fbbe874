//! The behaviour description shared by the bricks of one compilation.
//!
//! The description is append-only: bricks declare variables, set attributes
//! and append code blocks, but never remove or overwrite what another party
//! recorded.

use std::collections::BTreeMap;
use std::fmt;

use bb_tensor::ScalarExpr;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::code_block::{CodeBlock, CodeBlockKind};
use crate::error::{BehaviourError, BehaviourResult};
use crate::types::SupportedType;
use crate::variable::{VariableCategory, VariableDescription};

/// Name of the temperature, always declared as an external state variable.
pub const TEMPERATURE: &str = "T";
/// Name of the implicit weighting parameter.
pub const THETA: &str = "theta";
/// Entry names that identify elastic material properties declared by the behaviour.
pub const YOUNG_MODULUS_ENTRY: &str = "YoungModulus";
pub const POISSON_RATIO_ENTRY: &str = "PoissonRatio";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegrationScheme {
    #[default]
    Implicit,
    Explicit,
    Specific,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModellingHypothesis {
    Tridimensional,
    PlaneStrain,
    GeneralisedPlaneStrain,
    PlaneStress,
    Axisymmetrical,
    AxisymmetricalGeneralisedPlaneStrain,
    AxisymmetricalGeneralisedPlaneStress,
}

impl ModellingHypothesis {
    pub fn is_plane_stress(self) -> bool {
        matches!(
            self,
            ModellingHypothesis::PlaneStress
                | ModellingHypothesis::AxisymmetricalGeneralisedPlaneStress
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElasticSymmetry {
    #[default]
    Isotropic,
    Orthotropic,
}

/// Typed value of a description attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum Attribute {
    Bool(bool),
    Real(f64),
    String(String),
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Bool(b) => write!(f, "{b}"),
            Attribute::Real(v) => write!(f, "{v}"),
            Attribute::String(s) => write!(f, "'{s}'"),
        }
    }
}

impl From<bool> for Attribute {
    fn from(b: bool) -> Self {
        Attribute::Bool(b)
    }
}

impl From<f64> for Attribute {
    fn from(v: f64) -> Self {
        Attribute::Real(v)
    }
}

impl From<&str> for Attribute {
    fn from(s: &str) -> Self {
        Attribute::String(s.to_string())
    }
}

impl From<String> for Attribute {
    fn from(s: String) -> Self {
        Attribute::String(s)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct JacobianContribution {
    pub owner: String,
    pub code: String,
}

#[derive(Clone, Debug)]
pub struct BehaviourDescription {
    name: String,
    scheme: IntegrationScheme,
    hypotheses: Vec<ModellingHypothesis>,
    symmetry: ElasticSymmetry,
    variables: Vec<(VariableCategory, VariableDescription)>,
    attributes: BTreeMap<String, Attribute>,
    code_blocks: BTreeMap<CodeBlockKind, Vec<CodeBlock>>,
    jacobian: BTreeMap<(String, String), Vec<JacobianContribution>>,
}

impl BehaviourDescription {
    /// Fresh description declaring the temperature and, for implicit
    /// schemes, the `theta` parameter.
    pub fn new(name: impl Into<String>, scheme: IntegrationScheme) -> Self {
        let mut variables = vec![(
            VariableCategory::ExternalStateVariable,
            VariableDescription::new(SupportedType::Temperature, TEMPERATURE)
                .with_entry_name("Temperature"),
        )];
        if scheme == IntegrationScheme::Implicit {
            variables.push((
                VariableCategory::Parameter,
                VariableDescription::new(SupportedType::Real, THETA)
                    .with_description("implicit weighting of the time step"),
            ));
        }
        Self {
            name: name.into(),
            scheme,
            hypotheses: vec![ModellingHypothesis::Tridimensional],
            symmetry: ElasticSymmetry::default(),
            variables,
            attributes: BTreeMap::new(),
            code_blocks: BTreeMap::new(),
            jacobian: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn integration_scheme(&self) -> IntegrationScheme {
        self.scheme
    }

    pub fn hypotheses(&self) -> &[ModellingHypothesis] {
        &self.hypotheses
    }

    pub fn set_hypotheses(&mut self, hypotheses: Vec<ModellingHypothesis>) {
        self.hypotheses = hypotheses;
    }

    pub fn has_plane_stress_hypothesis(&self) -> bool {
        self.hypotheses.iter().any(|h| h.is_plane_stress())
    }

    pub fn elastic_symmetry(&self) -> ElasticSymmetry {
        self.symmetry
    }

    pub fn set_elastic_symmetry(&mut self, symmetry: ElasticSymmetry) {
        self.symmetry = symmetry;
    }

    // -- variables ---------------------------------------------------------

    pub fn declare(
        &mut self,
        category: VariableCategory,
        variable: VariableDescription,
    ) -> BehaviourResult<()> {
        if self.has_variable(&variable.name) {
            return Err(BehaviourError::DuplicateVariable {
                name: variable.name,
            });
        }
        debug!(
            behaviour = %self.name,
            ?category,
            name = %variable.name,
            type_ = %variable.type_,
            "declared variable"
        );
        self.variables.push((category, variable));
        Ok(())
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.iter().any(|(_, v)| v.name == name)
    }

    pub fn variable(&self, name: &str) -> Option<(VariableCategory, &VariableDescription)> {
        self.variables
            .iter()
            .find(|(_, v)| v.name == name)
            .map(|(c, v)| (*c, v))
    }

    /// Variables of `category` in declaration order.
    pub fn variables(
        &self,
        category: VariableCategory,
    ) -> impl Iterator<Item = &VariableDescription> {
        self.variables
            .iter()
            .filter(move |(c, _)| *c == category)
            .map(|(_, v)| v)
    }

    pub fn state_variables(&self) -> impl Iterator<Item = &VariableDescription> {
        self.variables(VariableCategory::StateVariable)
    }

    /// Integration variable whose residual is `equation` (`f<name>`).
    pub fn integration_variable_for_residual(
        &self,
        equation: &str,
    ) -> Option<&VariableDescription> {
        let name = equation.strip_prefix('f')?;
        self.state_variables().find(|v| v.name == name)
    }

    /// Material properties tagged as Young modulus and Poisson ratio, when
    /// the behaviour declared both.
    pub fn elastic_material_properties(&self) -> Option<(&str, &str)> {
        let find = |entry: &str| {
            self.variables(VariableCategory::MaterialProperty)
                .find(|v| v.entry_name.as_deref() == Some(entry))
                .map(|v| v.name.as_str())
        };
        Some((find(YOUNG_MODULUS_ENTRY)?, find(POISSON_RATIO_ENTRY)?))
    }

    /// Whether `expr` references a quantity that changes during the step.
    pub fn is_field_dependent(&self, expr: &ScalarExpr) -> bool {
        expr.symbols().iter().any(|name| {
            self.variable(name)
                .is_some_and(|(c, _)| c.evolves_during_step())
        })
    }

    /// State variables referenced by `expr`, in declaration order.
    pub fn state_dependencies(&self, expr: &ScalarExpr) -> Vec<String> {
        let symbols = expr.symbols();
        self.state_variables()
            .filter(|v| symbols.contains(&v.name))
            .map(|v| v.name.clone())
            .collect()
    }

    // -- attributes --------------------------------------------------------

    /// Record an attribute; setting it again to the same value is allowed.
    pub fn set_attribute(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Attribute>,
    ) -> BehaviourResult<()> {
        let name = name.into();
        let value = value.into();
        match self.attributes.get(&name) {
            Some(existing) if *existing != value => Err(BehaviourError::AttributeConflict {
                name,
                existing: existing.to_string(),
                requested: value.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.attributes.insert(name, value);
                Ok(())
            }
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Boolean attribute, false when unset.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.attributes.get(name), Some(Attribute::Bool(true)))
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    // -- code --------------------------------------------------------------

    pub fn append_code_block(&mut self, kind: CodeBlockKind, block: CodeBlock) {
        debug!(
            behaviour = %self.name,
            block = kind.name(),
            origin = %block.origin,
            statements = block.statements.len(),
            "appended code block"
        );
        self.code_blocks.entry(kind).or_default().push(block);
    }

    pub fn code_blocks(&self, kind: CodeBlockKind) -> &[CodeBlock] {
        self.code_blocks.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Record the code of `owner` for the Jacobian block `(equation, variable)`.
    ///
    /// Contributions of different owners to the same block are summed; an
    /// owner contributing twice to the same block is rejected. Empty code is
    /// ignored.
    pub fn add_jacobian_contribution(
        &mut self,
        owner: &str,
        equation: &str,
        variable: &str,
        code: impl Into<String>,
    ) -> BehaviourResult<()> {
        let code = code.into();
        let entry = self
            .jacobian
            .entry((equation.to_string(), variable.to_string()))
            .or_default();
        if entry.iter().any(|c| c.owner == owner) {
            return Err(BehaviourError::DuplicateJacobianContribution {
                owner: owner.to_string(),
                equation: equation.to_string(),
                variable: variable.to_string(),
            });
        }
        if code.is_empty() {
            return Ok(());
        }
        entry.push(JacobianContribution {
            owner: owner.to_string(),
            code,
        });
        Ok(())
    }

    /// Concatenated code of every contribution to `(equation, variable)`.
    pub fn jacobian_contribution(&self, equation: &str, variable: &str) -> String {
        self.jacobian
            .get(&(equation.to_string(), variable.to_string()))
            .map(|cs| cs.iter().map(|c| c.code.as_str()).collect::<Vec<_>>().join("\n"))
            .unwrap_or_default()
    }

    /// Full listing of the generated code, block by block.
    pub fn render_code(&self) -> String {
        let mut out = String::new();
        for kind in CodeBlockKind::ALL {
            for block in self.code_blocks(kind) {
                out.push_str(&format!("@{} {{ // {}\n", kind.name(), block.origin));
                for line in block.to_string().lines() {
                    out.push_str("  ");
                    out.push_str(line);
                    out.push('\n');
                }
                out.push_str("}\n");
            }
        }
        for ((equation, variable), contributions) in &self.jacobian {
            for c in contributions {
                out.push_str(&format!("@Jacobian({equation}, {variable}) {{ // {}\n", c.owner));
                for line in c.code.lines() {
                    out.push_str("  ");
                    out.push_str(line);
                    out.push('\n');
                }
                out.push_str("}\n");
            }
        }
        out
    }
}
