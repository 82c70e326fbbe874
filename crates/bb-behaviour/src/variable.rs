//! Variable declarations.

use serde::{Deserialize, Serialize};

use crate::types::SupportedType;

/// Role of a declared variable in the generated behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VariableCategory {
    MaterialProperty,
    Parameter,
    /// Integration variables of the local implicit system.
    StateVariable,
    AuxiliaryStateVariable,
    ExternalStateVariable,
    LocalVariable,
}

impl VariableCategory {
    /// Whether values of this category change during a time step.
    pub fn evolves_during_step(self) -> bool {
        matches!(
            self,
            VariableCategory::StateVariable | VariableCategory::ExternalStateVariable
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableDescription {
    #[serde(rename = "type")]
    pub type_: SupportedType,
    pub name: String,
    #[serde(default = "default_array_size")]
    pub array_size: usize,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Glossary or entry name exposed to calling solvers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_name: Option<String>,
}

fn default_array_size() -> usize {
    1
}

impl VariableDescription {
    pub fn new(type_: SupportedType, name: impl Into<String>) -> Self {
        Self {
            type_,
            name: name.into(),
            array_size: 1,
            description: String::new(),
            entry_name: None,
        }
    }

    pub fn with_entry_name(mut self, entry: impl Into<String>) -> Self {
        self.entry_name = Some(entry.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Name of the increment of this variable in the implicit scheme.
    pub fn increment_name(&self) -> String {
        format!("d{}", self.name)
    }

    /// Name of the residual associated with this variable.
    pub fn residual_name(&self) -> String {
        format!("f{}", self.name)
    }

    /// Entry name if any, declared name otherwise.
    pub fn external_name(&self) -> &str {
        self.entry_name.as_deref().unwrap_or(&self.name)
    }
}
