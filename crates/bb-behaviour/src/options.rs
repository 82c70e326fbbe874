//! Option schemas of bricks and validation of supplied option maps.

use serde::Serialize;

use crate::data::{Data, DataMap};
use crate::error::{BehaviourError, BehaviourResult};

/// Expected shape of an option value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "allowed")]
pub enum OptionType {
    Boolean,
    Real,
    String,
    Enumeration(Vec<String>),
    /// A constant or a formula.
    MaterialProperty,
}

impl OptionType {
    pub fn describe(&self) -> String {
        match self {
            OptionType::Boolean => "a boolean".to_string(),
            OptionType::Real => "a real number".to_string(),
            OptionType::String => "a string".to_string(),
            OptionType::Enumeration(allowed) => format!("one of {}", allowed.join(", ")),
            OptionType::MaterialProperty => "a number or a formula".to_string(),
        }
    }

    fn accepts(&self, value: &Data) -> bool {
        match (self, value) {
            (OptionType::Boolean, Data::Bool(_)) => true,
            (OptionType::Real, Data::Real(v)) => v.is_finite(),
            (OptionType::Real, Data::Int(_)) => true,
            (OptionType::String, Data::String(_)) => true,
            (OptionType::Enumeration(allowed), Data::String(s)) => allowed.iter().any(|a| a == s),
            (OptionType::MaterialProperty, Data::Real(v)) => v.is_finite(),
            (OptionType::MaterialProperty, Data::Int(_) | Data::String(_)) => true,
            _ => false,
        }
    }
}

/// Description of one configurable parameter of a brick.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptionDescription {
    pub name: String,
    pub description: String,
    pub value_type: OptionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Data>,
    /// Options that may not be given together with this one.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<String>,
    /// Options that must be given whenever this one is.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
}

impl OptionDescription {
    pub fn new(name: &str, description: &str, value_type: OptionType) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            value_type,
            default: None,
            conflicts: Vec::new(),
            requires: Vec::new(),
        }
    }

    pub fn with_default(mut self, default: impl Into<Data>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn conflicting_with(mut self, names: &[&str]) -> Self {
        self.conflicts.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn requiring(mut self, names: &[&str]) -> Self {
        self.requires.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn validate(&self, value: &Data) -> BehaviourResult<()> {
        if self.value_type.accepts(value) {
            Ok(())
        } else {
            Err(BehaviourError::invalid_option(
                &self.name,
                format!("expected {}, got {value}", self.value_type.describe()),
            ))
        }
    }
}

/// Check every supplied entry against `schema`: unknown keys, value types,
/// conflicting and missing companion options.
pub fn validate_data_map(schema: &[OptionDescription], data: &DataMap) -> BehaviourResult<()> {
    for (key, value) in data {
        let option = schema
            .iter()
            .find(|o| &o.name == key)
            .ok_or_else(|| BehaviourError::invalid_option(key, "unknown option"))?;
        option.validate(value)?;

        if let Some(other) = option.conflicts.iter().find(|c| data.contains_key(*c)) {
            return Err(BehaviourError::invalid_option(
                key,
                format!("conflicts with option '{other}'"),
            ));
        }
        if let Some(missing) = option.requires.iter().find(|r| !data.contains_key(*r)) {
            return Err(BehaviourError::invalid_option(
                key,
                format!("requires option '{missing}'"),
            ));
        }
    }
    Ok(())
}

/// Look up `name` in `data`, falling back on the schema default.
pub fn value_or_default<'a>(
    schema: &'a [OptionDescription],
    data: &'a DataMap,
    name: &str,
) -> Option<&'a Data> {
    data.get(name).or_else(|| {
        schema
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.default.as_ref())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Vec<OptionDescription> {
        vec![
            OptionDescription::new(
                "storage",
                "storage of the stiffness",
                OptionType::Enumeration(vec!["constant".into(), "field_dependent".into()]),
            )
            .with_default("field_dependent"),
            OptionDescription::new("alpha", "expansion", OptionType::MaterialProperty),
            OptionDescription::new("tref", "reference temperature", OptionType::Real)
                .with_default(293.15)
                .requiring(&["alpha"]),
            OptionDescription::new("fast", "fast path", OptionType::Boolean)
                .conflicting_with(&["alpha"]),
        ]
    }

    fn map(entries: &[(&str, Data)]) -> DataMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn rejected_option(result: BehaviourResult<()>) -> String {
        match result {
            Err(BehaviourError::InvalidOption { option, .. }) => option,
            other => panic!("expected an invalid option, got {other:?}"),
        }
    }

    #[test]
    fn accepts_valid_maps() {
        let s = schema();
        validate_data_map(&s, &DataMap::new()).unwrap();
        validate_data_map(
            &s,
            &map(&[
                ("storage", "constant".into()),
                ("alpha", "1e-5 * T".into()),
                ("tref", Data::Int(300)),
            ]),
        )
        .unwrap();
    }

    #[test]
    fn rejects_unknown_and_mistyped() {
        let s = schema();
        assert_eq!(rejected_option(validate_data_map(&s, &map(&[("bogus", true.into())]))), "bogus");
        assert_eq!(
            rejected_option(validate_data_map(&s, &map(&[("storage", "bogus".into())]))),
            "storage"
        );
        assert_eq!(
            rejected_option(validate_data_map(&s, &map(&[("fast", 1.0.into())]))),
            "fast"
        );
        assert_eq!(
            rejected_option(validate_data_map(
                &s,
                &map(&[("alpha", f64::NAN.into())])
            )),
            "alpha"
        );
    }

    #[test]
    fn companions_are_checked() {
        let s = schema();
        assert_eq!(
            rejected_option(validate_data_map(&s, &map(&[("tref", 300.0.into())]))),
            "tref"
        );
        assert_eq!(
            rejected_option(validate_data_map(
                &s,
                &map(&[("fast", true.into()), ("alpha", 1e-5.into())])
            )),
            "fast"
        );
    }

    #[test]
    fn defaults_fill_gaps() {
        let s = schema();
        let data = DataMap::new();
        assert_eq!(
            value_or_default(&s, &data, "storage"),
            Some(&Data::String("field_dependent".into()))
        );
        assert_eq!(value_or_default(&s, &data, "alpha"), None);
    }

    #[test]
    fn schema_serializes() {
        let json = serde_json::to_value(&schema()[0]).unwrap();
        assert_eq!(json["value_type"]["kind"], "Enumeration");
        assert_eq!(json["default"], "field_dependent");
    }
}
