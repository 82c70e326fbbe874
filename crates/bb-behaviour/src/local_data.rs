//! Scratch variables living for one local integration step.

use crate::error::{BehaviourError, BehaviourResult};
use crate::types::SupportedType;

#[derive(Clone, Debug, PartialEq)]
pub struct LocalVariable {
    pub type_: SupportedType,
    pub name: String,
}

/// Append-only table of scratch variables.
#[derive(Clone, Debug, Default)]
pub struct LocalDataStructure {
    entries: Vec<LocalVariable>,
}

impl LocalDataStructure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, type_: SupportedType, name: impl Into<String>) -> BehaviourResult<()> {
        let name = name.into();
        if self.contains(&name) {
            return Err(BehaviourError::DuplicateLocalVariable { name });
        }
        self.entries.push(LocalVariable { type_, name });
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&LocalVariable> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocalVariable> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
