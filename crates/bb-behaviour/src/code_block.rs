//! Generated code blocks, one list per lifecycle phase.

use std::fmt;

use bb_tensor::{Env, ExprResult, Statement, execute};

/// Lifecycle phase a code block is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CodeBlockKind {
    InitializeLocalVariables,
    ComputeElasticPrediction,
    ComputeStress,
    ComputeFinalStress,
    PredictionOperator,
    TangentOperator,
    Integrator,
    UpdateAuxiliaryStateVariables,
}

impl CodeBlockKind {
    pub const ALL: [CodeBlockKind; 8] = [
        CodeBlockKind::InitializeLocalVariables,
        CodeBlockKind::ComputeElasticPrediction,
        CodeBlockKind::ComputeStress,
        CodeBlockKind::ComputeFinalStress,
        CodeBlockKind::PredictionOperator,
        CodeBlockKind::TangentOperator,
        CodeBlockKind::Integrator,
        CodeBlockKind::UpdateAuxiliaryStateVariables,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CodeBlockKind::InitializeLocalVariables => "InitializeLocalVariables",
            CodeBlockKind::ComputeElasticPrediction => "ComputeElasticPrediction",
            CodeBlockKind::ComputeStress => "ComputeStress",
            CodeBlockKind::ComputeFinalStress => "ComputeFinalStress",
            CodeBlockKind::PredictionOperator => "PredictionOperator",
            CodeBlockKind::TangentOperator => "TangentOperator",
            CodeBlockKind::Integrator => "Integrator",
            CodeBlockKind::UpdateAuxiliaryStateVariables => "UpdateAuxiliaryStateVariables",
        }
    }
}

/// Ordered statements contributed by one brick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CodeBlock {
    /// Name of the contributing brick.
    pub origin: String,
    pub statements: Vec<Statement>,
}

impl CodeBlock {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            statements: Vec::new(),
        }
    }

    pub fn push(&mut self, statement: Statement) -> &mut Self {
        self.statements.push(statement);
        self
    }

    pub fn with(mut self, statement: Statement) -> Self {
        self.statements.push(statement);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// True when no statement is opaque text.
    pub fn is_evaluable(&self) -> bool {
        self.statements.iter().all(|s| !matches!(s, Statement::Raw(_)))
    }

    pub fn execute(&self, env: &mut Env) -> ExprResult<()> {
        execute(&self.statements, env)
    }
}

impl fmt::Display for CodeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{statement}")?;
        }
        Ok(())
    }
}
