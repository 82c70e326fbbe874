//! Symmetric tensors in Mandel notation.
//!
//! Components are stored as `[xx, yy, zz, √2 xy, √2 xz, √2 yz]`, so the
//! double contraction of two symmetric tensors is the plain dot product and
//! fourth-order tensors act as 6x6 matrices.

use bb_core::Real;
use nalgebra::{SMatrix, SVector};

pub type Stensor = SVector<Real, 6>;
pub type Stensor4 = SMatrix<Real, 6, 6>;

/// Second-order identity.
pub fn identity() -> Stensor {
    Stensor::new(1.0, 1.0, 1.0, 0.0, 0.0, 0.0)
}

/// Fourth-order identity on symmetric tensors.
pub fn id4() -> Stensor4 {
    Stensor4::identity()
}

pub fn ixi() -> Stensor4 {
    let i = identity();
    i * i.transpose()
}

pub fn trace(e: &Stensor) -> Real {
    e[0] + e[1] + e[2]
}

/// Build a tensor from its tensorial components `[xx, yy, zz, xy, xz, yz]`.
pub fn from_components(c: [Real; 6]) -> Stensor {
    let s2 = std::f64::consts::SQRT_2;
    Stensor::new(c[0], c[1], c[2], s2 * c[3], s2 * c[4], s2 * c[5])
}

/// Isotropic Hooke tensor `lambda I⊗I + 2 mu Id`.
pub fn isotropic_stiffness(lambda: Real, mu: Real) -> Stensor4 {
    lambda * ixi() + 2.0 * mu * id4()
}
