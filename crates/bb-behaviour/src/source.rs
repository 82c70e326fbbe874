//! Behaviour source files (YAML or JSON).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::DataMap;
use crate::description::{
    BehaviourDescription, ElasticSymmetry, IntegrationScheme, ModellingHypothesis,
};
use crate::error::{BehaviourError, BehaviourResult};
use crate::variable::{VariableCategory, VariableDescription};

/// Declarative input of one behaviour compilation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BehaviourSource {
    pub name: String,
    #[serde(default)]
    pub scheme: IntegrationScheme,
    #[serde(default = "default_hypotheses")]
    pub hypotheses: Vec<ModellingHypothesis>,
    #[serde(default)]
    pub symmetry: ElasticSymmetry,
    #[serde(default)]
    pub material_properties: Vec<VariableDescription>,
    #[serde(default)]
    pub parameters: Vec<VariableDescription>,
    #[serde(default)]
    pub state_variables: Vec<VariableDescription>,
    #[serde(default)]
    pub auxiliary_state_variables: Vec<VariableDescription>,
    #[serde(default)]
    pub external_state_variables: Vec<VariableDescription>,
    pub stress_potential: StressPotentialSource,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StressPotentialSource {
    pub name: String,
    #[serde(default)]
    pub options: DataMap,
}

fn default_hypotheses() -> Vec<ModellingHypothesis> {
    vec![ModellingHypothesis::Tridimensional]
}

impl BehaviourSource {
    pub fn from_yaml_str(content: &str) -> BehaviourResult<Self> {
        let source: BehaviourSource = serde_yaml::from_str(content)?;
        source.validate()?;
        Ok(source)
    }

    pub fn from_json_str(content: &str) -> BehaviourResult<Self> {
        let source: BehaviourSource = serde_json::from_str(content)?;
        source.validate()?;
        Ok(source)
    }

    fn validate(&self) -> BehaviourResult<()> {
        if self.name.trim().is_empty() {
            return Err(BehaviourError::InvalidSource {
                what: "behaviour name is empty".to_string(),
            });
        }
        if self.hypotheses.is_empty() {
            return Err(BehaviourError::InvalidSource {
                what: "at least one modelling hypothesis is required".to_string(),
            });
        }
        Ok(())
    }

    /// Description holding every declaration of the source.
    pub fn to_description(&self) -> BehaviourResult<BehaviourDescription> {
        let mut bd = BehaviourDescription::new(&self.name, self.scheme);
        bd.set_hypotheses(self.hypotheses.clone());
        bd.set_elastic_symmetry(self.symmetry);
        let groups = [
            (VariableCategory::MaterialProperty, &self.material_properties),
            (VariableCategory::Parameter, &self.parameters),
            (VariableCategory::StateVariable, &self.state_variables),
            (VariableCategory::AuxiliaryStateVariable, &self.auxiliary_state_variables),
            (VariableCategory::ExternalStateVariable, &self.external_state_variables),
        ];
        for (category, variables) in groups {
            for v in variables {
                bd.declare(category, v.clone())?;
            }
        }
        Ok(bd)
    }
}

pub fn load_yaml(path: &Path) -> BehaviourResult<BehaviourSource> {
    let content = std::fs::read_to_string(path)?;
    BehaviourSource::from_yaml_str(&content)
}

pub fn load_json(path: &Path) -> BehaviourResult<BehaviourSource> {
    let content = std::fs::read_to_string(path)?;
    BehaviourSource::from_json_str(&content)
}

/// Load a source, picking the format from the file extension.
pub fn load(path: &Path) -> BehaviourResult<BehaviourSource> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        _ => load_yaml(path),
    }
}
