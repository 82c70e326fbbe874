//! Supported variable types and their tensorial metadata.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BehaviourError;

/// Tensorial nature of an integration variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeFlag {
    Scalar,
    TVector,
    Stensor,
    Tensor,
}

impl TypeFlag {
    pub fn rank(self) -> usize {
        match self {
            TypeFlag::Scalar => 0,
            TypeFlag::TVector => 1,
            TypeFlag::Stensor | TypeFlag::Tensor => 2,
        }
    }

    pub fn is_symmetric(self) -> bool {
        matches!(self, TypeFlag::Stensor)
    }
}

/// Physical dimension of a supported type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Dimensionless,
    Stress,
    Strain,
    Temperature,
    Stiffness,
}

impl Dimension {
    /// SI symbol of the unit.
    pub fn symbol(self) -> &'static str {
        match self {
            Dimension::Dimensionless | Dimension::Strain => "1",
            Dimension::Stress | Dimension::Stiffness => "Pa",
            Dimension::Temperature => "K",
        }
    }
}

/// Types a behaviour can declare variables with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupportedType {
    #[serde(rename = "real")]
    Real,
    #[serde(rename = "stress")]
    Stress,
    #[serde(rename = "strain")]
    Strain,
    #[serde(rename = "temperature")]
    Temperature,
    StrainStensor,
    StressStensor,
    StiffnessTensor,
}

impl SupportedType {
    pub const ALL: [SupportedType; 7] = [
        SupportedType::Real,
        SupportedType::Stress,
        SupportedType::Strain,
        SupportedType::Temperature,
        SupportedType::StrainStensor,
        SupportedType::StressStensor,
        SupportedType::StiffnessTensor,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SupportedType::Real => "real",
            SupportedType::Stress => "stress",
            SupportedType::Strain => "strain",
            SupportedType::Temperature => "temperature",
            SupportedType::StrainStensor => "StrainStensor",
            SupportedType::StressStensor => "StressStensor",
            SupportedType::StiffnessTensor => "StiffnessTensor",
        }
    }

    /// Flag of the type, `None` for fourth-order tensors which cannot be
    /// integration variables.
    pub fn flag(self) -> Option<TypeFlag> {
        match self {
            SupportedType::Real
            | SupportedType::Stress
            | SupportedType::Strain
            | SupportedType::Temperature => Some(TypeFlag::Scalar),
            SupportedType::StrainStensor | SupportedType::StressStensor => Some(TypeFlag::Stensor),
            SupportedType::StiffnessTensor => None,
        }
    }

    pub fn rank(self) -> usize {
        self.flag().map(TypeFlag::rank).unwrap_or(4)
    }

    pub fn is_scalar(self) -> bool {
        self.flag() == Some(TypeFlag::Scalar)
    }

    pub fn dimension(self) -> Dimension {
        match self {
            SupportedType::Real => Dimension::Dimensionless,
            SupportedType::Stress | SupportedType::StressStensor => Dimension::Stress,
            SupportedType::Strain | SupportedType::StrainStensor => Dimension::Strain,
            SupportedType::Temperature => Dimension::Temperature,
            SupportedType::StiffnessTensor => Dimension::Stiffness,
        }
    }
}

impl fmt::Display for SupportedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SupportedType {
    type Err = BehaviourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SupportedType::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| BehaviourError::InvalidSource {
                what: format!("unsupported type '{s}'"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_and_symmetry() {
        assert_eq!(TypeFlag::Scalar.rank(), 0);
        assert_eq!(TypeFlag::TVector.rank(), 1);
        assert_eq!(TypeFlag::Stensor.rank(), 2);
        assert!(TypeFlag::Stensor.is_symmetric());
        assert!(!TypeFlag::Tensor.is_symmetric());
        assert_eq!(SupportedType::StiffnessTensor.rank(), 4);
        assert_eq!(SupportedType::StrainStensor.rank(), 2);
    }

    #[test]
    fn dimensions() {
        assert_eq!(SupportedType::StressStensor.dimension(), Dimension::Stress);
        assert_eq!(SupportedType::Temperature.dimension().symbol(), "K");
        assert_eq!(SupportedType::StiffnessTensor.dimension().symbol(), "Pa");
    }

    #[test]
    fn names_round_trip() {
        for t in SupportedType::ALL {
            assert_eq!(t.name().parse::<SupportedType>().unwrap(), t);
        }
        assert!("tensor3".parse::<SupportedType>().is_err());
    }
}
