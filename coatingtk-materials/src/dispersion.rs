//! Dispersion models
//!
//! The three-term Sellmeier equation
//!
//! $n^2(\lambda) = 1 + \sum_{i=1}^{3} \frac{B_i \lambda^2}{\lambda^2 - C_i}$
//!
//! with $\lambda$ in µm and $C_i$ in µm². A constant index is the special
//! case $B = (n^2 - 1, 0, 0)$, $C = 0$.

use coatingtk_core::{Material, MechanicalProperties};
use serde::{Deserialize, Serialize};

/// Wavelength-to-index model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum Dispersion {
    Constant { n: f64 },
    Sellmeier { b: [f64; 3], c: [f64; 3] },
}

impl Dispersion {
    /// Real refractive index at `wavelength_nm`
    pub fn n(&self, wavelength_nm: f64) -> f64 {
        match self {
            Dispersion::Constant { n } => *n,
            Dispersion::Sellmeier { b, c } => {
                let l2 = (wavelength_nm / 1000.0).powi(2);
                let n2 = 1.0
                    + b.iter()
                        .zip(c.iter())
                        .map(|(bi, ci)| bi * l2 / (l2 - ci))
                        .sum::<f64>();
                n2.sqrt()
            }
        }
    }

    /// Collapse a coefficient-free Sellmeier model to a constant index
    pub fn simplify(self) -> Self {
        match self {
            Dispersion::Sellmeier { b, c } if b[1] == 0.0 && b[2] == 0.0 && c == [0.0; 3] => {
                Dispersion::Constant { n: (b[0] + 1.0).sqrt() }
            }
            other => other,
        }
    }
}

/// A named material backed by a dispersion model
#[derive(Debug, Clone, PartialEq)]
pub struct DispersiveMaterial {
    pub name: String,
    pub dispersion: Dispersion,
    pub mechanical: Option<MechanicalProperties>,
    pub notes: String,
}

impl DispersiveMaterial {
    pub fn new(name: impl Into<String>, dispersion: Dispersion) -> Self {
        Self {
            name: name.into(),
            dispersion,
            mechanical: None,
            notes: String::new(),
        }
    }

    /// Dimensionless constant-index material
    pub fn constant(name: impl Into<String>, n: f64) -> Self {
        Self::new(name, Dispersion::Constant { n })
    }

    pub fn sellmeier(name: impl Into<String>, b: [f64; 3], c: [f64; 3]) -> Self {
        Self::new(name, Dispersion::Sellmeier { b, c })
    }

    pub fn with_mechanical(mut self, mechanical: MechanicalProperties) -> Self {
        self.mechanical = Some(mechanical);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

impl Material for DispersiveMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn n(&self, wavelength_nm: f64) -> f64 {
        self.dispersion.n(wavelength_nm)
    }

    fn mechanical(&self) -> Option<&MechanicalProperties> {
        self.mechanical.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_index_ignores_wavelength() {
        let m = DispersiveMaterial::constant("glass", 1.44);
        assert_eq!(m.n(1.0), 1.44);
        assert_eq!(m.n(1064.0), 1.44);
        assert!(m.mechanical().is_none());
    }

    #[test]
    fn test_sellmeier_fused_silica() {
        // Malitson (1965)
        let d = Dispersion::Sellmeier {
            b: [0.6961663, 0.4079426, 0.8974794],
            c: [0.0684043_f64.powi(2), 0.1162414_f64.powi(2), 9.896161_f64.powi(2)],
        };
        assert!((d.n(1064.0) - 1.4496).abs() < 1e-3, "n(1064) = {}", d.n(1064.0));
        assert!((d.n(632.8) - 1.4570).abs() < 1e-3, "n(632.8) = {}", d.n(632.8));
        assert!(d.n(500.0) > d.n(1064.0));
    }

    #[test]
    fn test_sellmeier_as_constant() {
        let d = Dispersion::Sellmeier { b: [1.44 * 1.44 - 1.0, 0.0, 0.0], c: [0.0; 3] };
        assert!((d.n(800.0) - 1.44).abs() < 1e-12);
        match d.simplify() {
            Dispersion::Constant { n } => assert!((n - 1.44).abs() < 1e-12),
            other => panic!("expected constant, got {:?}", other),
        }
    }
}
