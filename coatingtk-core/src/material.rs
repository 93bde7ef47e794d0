//! Material contract
//!
//! The core never stores dispersion coefficients itself. It only needs a
//! refractive index at a wavelength and, for mechanical-noise analyses, the
//! elastic properties and loss angle of a material.

use crate::CoatingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Elastic and loss properties used by thermal-noise analyses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MechanicalProperties {
    /// Young's modulus (Pa)
    pub youngs_modulus: f64,
    /// Poisson ratio (dimensionless)
    pub poisson_ratio: f64,
    /// Mechanical loss angle (dimensionless)
    pub loss_angle: f64,
}

impl MechanicalProperties {
    pub fn new(youngs_modulus: f64, poisson_ratio: f64, loss_angle: f64) -> Self {
        Self { youngs_modulus, poisson_ratio, loss_angle }
    }

    /// Loss factor seen by a Gaussian beam of radius `beam_size_m`.
    ///
    /// For a half-infinite substrate the loss factor does not depend on
    /// the beam size and reduces to the bulk loss angle.
    pub fn phi(&self, _beam_size_m: f64) -> f64 {
        self.loss_angle
    }
}

/// A material with a dispersion model
pub trait Material: Send + Sync + fmt::Debug {
    /// Name used to look the material up
    fn name(&self) -> &str;

    /// Real refractive index at `wavelength_nm`
    fn n(&self, wavelength_nm: f64) -> f64;

    /// Mechanical properties, if the material defines them
    fn mechanical(&self) -> Option<&MechanicalProperties> {
        None
    }
}

/// Resolves names (or bare numeric indices) to materials
pub trait MaterialLookup {
    /// Fails with `MATERIAL_NOT_DEFINED` when the name cannot be resolved
    fn get_material(&self, name: &str) -> Result<Arc<dyn Material>, CoatingError>;
}
