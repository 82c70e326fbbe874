// bb-core/src/units.rs

use uom::si::f64::{
    Pressure as UomPressure, Ratio as UomRatio,
    ThermodynamicTemperature as UomThermodynamicTemperature,
};

// Public canonical unit types (SI, f64)
pub type Stress = UomPressure;
pub type Ratio = UomRatio;
pub type Temperature = UomThermodynamicTemperature;

#[inline]
pub fn pa(v: f64) -> Stress {
    use uom::si::pressure::pascal;
    Stress::new::<pascal>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

/// Lamé coefficients of an isotropic material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lame {
    pub lambda: Stress,
    pub mu: Stress,
}

impl Lame {
    /// `lambda = E nu / ((1 + nu)(1 - 2 nu))`, `mu = E / (2 (1 + nu))`.
    pub fn from_young_poisson(young: Stress, nu: Ratio) -> Self {
        let e = young.value;
        let nu = nu.value;
        Self {
            lambda: pa(e * nu / ((1.0 + nu) * (1.0 - 2.0 * nu))),
            mu: pa(e / (2.0 * (1.0 + nu))),
        }
    }
}

pub mod constants {
    use super::*;

    /// Default reference temperature of thermal expansion coefficients.
    pub const REFERENCE_TEMPERATURE_K: f64 = 293.15;

    #[inline]
    pub fn reference_temperature() -> Temperature {
        k(REFERENCE_TEMPERATURE_K)
    }
}
