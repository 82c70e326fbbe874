//! Option schemas of the stress potentials and typed access to option maps.

use bb_behaviour::{
    Data, DataMap, MaterialProperty, OptionDescription, OptionType, validate_data_map,
    value_or_default,
};
use bb_core::constants::REFERENCE_TEMPERATURE_K;

use crate::error::{BrickError, BrickResult};

pub const YOUNG_MODULUS: &str = "young_modulus";
pub const POISSON_RATIO: &str = "poisson_ratio";
pub const STIFFNESS_TENSOR_STORAGE: &str = "stiffness_tensor_storage";
pub const THERMAL_EXPANSION: &str = "thermal_expansion";
pub const THERMAL_EXPANSION_REFERENCE_TEMPERATURE: &str = "thermal_expansion_reference_temperature";
pub const PLANE_STRESS_SUPPORT: &str = "plane_stress_support";
pub const GENERIC_TANGENT_OPERATOR: &str = "generic_tangent_operator";
pub const GENERIC_PREDICTION_OPERATOR: &str = "generic_prediction_operator";
pub const DAMAGE_VARIABLE: &str = "damage_variable";
pub const DAMAGE_UPPER_BOUND: &str = "damage_upper_bound";

pub const DEFAULT_DAMAGE_VARIABLE: &str = "d";
pub const DEFAULT_DAMAGE_UPPER_BOUND: f64 = 0.99;

/// Whether the stiffness is known once or re-evaluated every step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StiffnessStorage {
    Constant,
    FieldDependent,
}

impl StiffnessStorage {
    pub const ALL: [StiffnessStorage; 2] =
        [StiffnessStorage::Constant, StiffnessStorage::FieldDependent];

    pub fn name(self) -> &'static str {
        match self {
            StiffnessStorage::Constant => "constant",
            StiffnessStorage::FieldDependent => "field_dependent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.name() == s)
    }
}

/// Options of the Hooke part, shared by every variant.
pub fn hooke_options(already_configured: bool) -> Vec<OptionDescription> {
    let mut options = Vec::new();
    if !already_configured {
        options.push(OptionDescription::new(
            YOUNG_MODULUS,
            "Young modulus",
            OptionType::MaterialProperty,
        ));
        options.push(OptionDescription::new(
            POISSON_RATIO,
            "Poisson ratio",
            OptionType::MaterialProperty,
        ));
    }
    options.extend([
        OptionDescription::new(
            STIFFNESS_TENSOR_STORAGE,
            "whether the stiffness is a known constant or is re-evaluated each step",
            OptionType::Enumeration(
                StiffnessStorage::ALL.iter().map(|s| s.name().to_string()).collect(),
            ),
        )
        .with_default(StiffnessStorage::FieldDependent.name()),
        OptionDescription::new(
            THERMAL_EXPANSION,
            "mean linear thermal expansion coefficient",
            OptionType::MaterialProperty,
        ),
        OptionDescription::new(
            THERMAL_EXPANSION_REFERENCE_TEMPERATURE,
            "reference temperature of the thermal expansion",
            OptionType::Real,
        )
        .with_default(REFERENCE_TEMPERATURE_K)
        .requiring(&[THERMAL_EXPANSION]),
        OptionDescription::new(
            PLANE_STRESS_SUPPORT,
            "add plane stress support through an axial strain integration variable",
            OptionType::Boolean,
        )
        .with_default(false),
        OptionDescription::new(
            GENERIC_TANGENT_OPERATOR,
            "expose the tangent operator through the generic operator interface",
            OptionType::Boolean,
        )
        .with_default(true),
        OptionDescription::new(
            GENERIC_PREDICTION_OPERATOR,
            "expose the prediction operator through the generic operator interface",
            OptionType::Boolean,
        )
        .with_default(true),
    ]);
    options
}

/// Options added by the isotropic damage variant.
pub fn damage_options() -> Vec<OptionDescription> {
    vec![
        OptionDescription::new(
            DAMAGE_VARIABLE,
            "name of the damage state variable",
            OptionType::String,
        )
        .with_default(DEFAULT_DAMAGE_VARIABLE),
        OptionDescription::new(
            DAMAGE_UPPER_BOUND,
            "maximum damage used by the degradation factor of predictions",
            OptionType::Real,
        )
        .with_default(DEFAULT_DAMAGE_UPPER_BOUND),
    ]
}

/// Validated, typed view of an option map.
#[derive(Clone, Copy, Debug)]
pub struct OptionReader<'a> {
    schema: &'a [OptionDescription],
    data: &'a DataMap,
}

impl<'a> OptionReader<'a> {
    /// Validate `data` against `schema` (unknown keys, types, conflicts).
    pub fn new(schema: &'a [OptionDescription], data: &'a DataMap) -> BrickResult<Self> {
        validate_data_map(schema, data)?;
        Ok(Self { schema, data })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    fn value(&self, name: &str) -> BrickResult<&'a Data> {
        value_or_default(self.schema, self.data, name)
            .ok_or_else(|| BrickError::configuration(name, "missing required option"))
    }

    pub fn boolean(&self, name: &str) -> BrickResult<bool> {
        let v = self.value(name)?;
        v.as_bool()
            .ok_or_else(|| BrickError::configuration(name, format!("expected a boolean, got {v}")))
    }

    pub fn real(&self, name: &str) -> BrickResult<f64> {
        let v = self.value(name)?;
        v.as_real().ok_or_else(|| {
            BrickError::configuration(name, format!("expected a real number, got {v}"))
        })
    }

    pub fn string(&self, name: &str) -> BrickResult<&'a str> {
        let v = self.value(name)?;
        v.as_str()
            .ok_or_else(|| BrickError::configuration(name, format!("expected a string, got {v}")))
    }

    /// The material property given for `name`, if any.
    pub fn material_property(&self, name: &str) -> BrickResult<Option<MaterialProperty>> {
        self.data
            .get(name)
            .map(|v| MaterialProperty::from_data(name, v))
            .transpose()
            .map_err(BrickError::from)
    }

    pub fn storage(&self) -> BrickResult<StiffnessStorage> {
        let s = self.string(STIFFNESS_TENSOR_STORAGE)?;
        StiffnessStorage::parse(s).ok_or_else(|| {
            BrickError::configuration(
                STIFFNESS_TENSOR_STORAGE,
                format!("expected one of constant, field_dependent, got '{s}'"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(entries: &[(&str, Data)]) -> DataMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn elastic_options_are_omitted_when_configured() {
        let names = |opts: Vec<OptionDescription>| -> Vec<String> {
            opts.into_iter().map(|o| o.name).collect()
        };
        assert!(names(hooke_options(false)).contains(&YOUNG_MODULUS.to_string()));
        let configured = names(hooke_options(true));
        assert!(!configured.contains(&YOUNG_MODULUS.to_string()));
        assert!(!configured.contains(&POISSON_RATIO.to_string()));
        assert!(configured.contains(&STIFFNESS_TENSOR_STORAGE.to_string()));
    }

    #[test]
    fn defaults_are_read_back() {
        let schema = [hooke_options(false), damage_options()].concat();
        let d = DataMap::new();
        let r = OptionReader::new(&schema, &d).unwrap();
        assert_eq!(r.storage().unwrap(), StiffnessStorage::FieldDependent);
        assert!(r.boolean(GENERIC_TANGENT_OPERATOR).unwrap());
        assert!(!r.boolean(PLANE_STRESS_SUPPORT).unwrap());
        assert_eq!(r.string(DAMAGE_VARIABLE).unwrap(), "d");
        assert_eq!(r.real(DAMAGE_UPPER_BOUND).unwrap(), 0.99);
        assert!(r.material_property(YOUNG_MODULUS).unwrap().is_none());
        assert!(r.material_property(THERMAL_EXPANSION).unwrap().is_none());
    }

    #[test]
    fn bogus_storage_names_the_option() {
        let schema = hooke_options(false);
        let d = data(&[(STIFFNESS_TENSOR_STORAGE, Data::from("bogus"))]);
        let err = OptionReader::new(&schema, &d).unwrap_err();
        assert_eq!(err.option(), Some(STIFFNESS_TENSOR_STORAGE));
    }

    #[test]
    fn reference_temperature_requires_expansion() {
        let schema = hooke_options(false);
        let d = data(&[(THERMAL_EXPANSION_REFERENCE_TEMPERATURE, Data::Real(300.0))]);
        let err = OptionReader::new(&schema, &d).unwrap_err();
        assert_eq!(err.option(), Some(THERMAL_EXPANSION_REFERENCE_TEMPERATURE));
    }

    #[test]
    fn damage_options_are_unknown_to_hooke() {
        let schema = hooke_options(false);
        let d = data(&[(DAMAGE_VARIABLE, Data::from("w"))]);
        let err = OptionReader::new(&schema, &d).unwrap_err();
        assert_eq!(err.option(), Some(DAMAGE_VARIABLE));
        assert!(err.to_string().contains("unknown option"));
    }
}
