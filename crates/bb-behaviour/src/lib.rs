//! bb-behaviour: the behaviour description bricks contribute to.
//!
//! Contains:
//! - types (supported variable types, type flags, dimensions)
//! - variable / description (declarations, attributes, code blocks, Jacobian contributions)
//! - data / options (option literals and option schemas)
//! - material_property (constants and formulas)
//! - code_block / local_data (generated code and scratch variables)
//! - dsl (symbol resolution and diagnostics)
//! - source (YAML/JSON behaviour sources)

pub mod code_block;
pub mod data;
pub mod description;
pub mod dsl;
pub mod error;
pub mod local_data;
pub mod material_property;
pub mod options;
pub mod source;
pub mod types;
pub mod variable;

pub use code_block::{CodeBlock, CodeBlockKind};
pub use data::{Data, DataMap};
pub use description::{
    Attribute, BehaviourDescription, ElasticSymmetry, IntegrationScheme, JacobianContribution,
    ModellingHypothesis, TEMPERATURE, THETA,
};
pub use dsl::{BehaviourDsl, StandardDsl};
pub use error::{BehaviourError, BehaviourResult};
pub use local_data::{LocalDataStructure, LocalVariable};
pub use material_property::MaterialProperty;
pub use options::{OptionDescription, OptionType, validate_data_map, value_or_default};
pub use source::{BehaviourSource, StressPotentialSource};
pub use types::{Dimension, SupportedType, TypeFlag};
pub use variable::{VariableCategory, VariableDescription};
