//! Stress potentials by name.

use crate::error::{BrickError, BrickResult};
use crate::hooke::{self, HookeStressPotential};
use crate::isotropic_damage::{self, IsotropicDamageHookeStressPotential};
use crate::potential::StressPotential;

pub const STRESS_POTENTIALS: [&str; 2] = [hooke::NAME, isotropic_damage::NAME];

pub fn create_stress_potential(name: &str) -> BrickResult<Box<dyn StressPotential>> {
    match name {
        hooke::NAME => Ok(Box::new(HookeStressPotential::new())),
        isotropic_damage::NAME => Ok(Box::new(IsotropicDamageHookeStressPotential::new())),
        other => Err(BrickError::configuration(
            "stress_potential",
            format!(
                "unknown stress potential '{other}', expected one of {}",
                STRESS_POTENTIALS.join(", ")
            ),
        )),
    }
}
