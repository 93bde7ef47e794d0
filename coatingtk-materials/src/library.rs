//! Material library
//!
//! Named materials plus numeric pseudo-materials: any name that parses as a
//! positive number resolves to a constant-index material with that index.

use crate::dispersion::{Dispersion, DispersiveMaterial};
use coatingtk_core::{CoatingError, Material, MaterialLookup, MechanicalProperties};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors from loading material definitions
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Invalid material file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Material '{0}' defines neither n nor Sellmeier coefficients")]
    NoDispersion(String),

    #[error("Material '{name}' has invalid refractive index {n}")]
    InvalidIndex { name: String, n: f64 },

    #[error("Material '{name}' has invalid {field} {value}, expected {expected}")]
    InvalidMechanical { name: String, field: &'static str, value: f64, expected: &'static str },
}

impl From<LibraryError> for CoatingError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::Json(e) => CoatingError::parse_error(e.to_string()),
            LibraryError::NoDispersion(name) => {
                CoatingError::invalid_value(&name, "", "either \"n\" or \"B\"/\"C\" coefficients")
            }
            LibraryError::InvalidIndex { name, n } => {
                CoatingError::invalid_value(&name, &n.to_string(), "a refractive index > 0")
            }
            LibraryError::InvalidMechanical { name, field, value, expected } => {
                CoatingError::invalid_value(&format!("{}.{}", name, field), &value.to_string(), expected)
            }
        }
    }
}

/// On-disk shape of a single material, as the material editor stores it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<f64>,
    #[serde(rename = "B", default, skip_serializing_if = "Option::is_none")]
    pub b: Option<[f64; 3]>,
    #[serde(rename = "C", default, skip_serializing_if = "Option::is_none")]
    pub c: Option<[f64; 3]>,
    /// Young's modulus (Pa); zero or absent means no mechanical data
    #[serde(rename = "Y", default, skip_serializing_if = "Option::is_none")]
    pub youngs_modulus: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sigma: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phi: Option<f64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl MaterialDef {
    pub fn into_material(self, name: &str) -> Result<DispersiveMaterial, LibraryError> {
        let dispersion = match (self.n, self.b) {
            (Some(n), _) => {
                if !(n > 0.0 && n.is_finite()) {
                    return Err(LibraryError::InvalidIndex { name: name.to_string(), n });
                }
                Dispersion::Constant { n }
            }
            (None, Some(b)) => Dispersion::Sellmeier { b, c: self.c.unwrap_or([0.0; 3]) }.simplify(),
            (None, None) => return Err(LibraryError::NoDispersion(name.to_string())),
        };

        let mut material = DispersiveMaterial::new(name, dispersion).with_notes(self.notes);
        if let Some(y) = self.youngs_modulus.filter(|y| *y > 0.0) {
            let sigma = self.sigma.unwrap_or(0.0);
            let phi = self.phi.unwrap_or(0.0);
            if !y.is_finite() {
                return Err(invalid_mechanical(name, "Y", y, "a finite modulus"));
            }
            if !(sigma > -1.0 && sigma < 1.0) {
                return Err(invalid_mechanical(name, "sigma", sigma, "a Poisson ratio in (-1, 1)"));
            }
            if !(phi >= 0.0 && phi.is_finite()) {
                return Err(invalid_mechanical(name, "phi", phi, "a loss angle >= 0"));
            }
            material = material.with_mechanical(MechanicalProperties::new(y, sigma, phi));
        }
        Ok(material)
    }
}

fn invalid_mechanical(name: &str, field: &'static str, value: f64, expected: &'static str) -> LibraryError {
    LibraryError::InvalidMechanical { name: name.to_string(), field, value, expected }
}

/// Registry of named materials
#[derive(Debug, Default)]
pub struct MaterialLibrary {
    materials: HashMap<String, Arc<DispersiveMaterial>>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library with fused silica and tantala pre-registered
    pub fn with_builtin() -> Self {
        let mut library = Self::new();
        for material in builtin_materials() {
            library.materials.insert(material.name.clone(), Arc::new(material));
        }
        library
    }

    /// Fails with `MATERIAL_ALREADY_DEFINED` if the name is taken
    pub fn register(&mut self, mut material: DispersiveMaterial) -> Result<(), CoatingError> {
        material.name = self.check_name(&material.name)?;
        debug!(material = %material.name, "registering material");
        self.materials.insert(material.name.clone(), Arc::new(material));
        Ok(())
    }

    /// Trimmed name, free in this library
    fn check_name(&self, name: &str) -> Result<String, CoatingError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoatingError::invalid_value("material.name", "", "a non-empty name"));
        }
        if self.materials.contains_key(name) {
            return Err(CoatingError::material_already_defined(name));
        }
        Ok(name.to_string())
    }

    pub fn unregister(&mut self, name: &str) -> Option<Arc<DispersiveMaterial>> {
        self.materials.remove(name.trim())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.materials.contains_key(name.trim())
    }

    /// Registered names, sorted
    pub fn list_materials(&self) -> Vec<String> {
        let mut names: Vec<String> = self.materials.keys().cloned().collect();
        names.sort();
        names
    }

    /// Register every material of a JSON document `{ name: { .. } }`.
    ///
    /// All or nothing: the library is untouched unless every entry is valid.
    pub fn load_json(&mut self, json: &str) -> Result<usize, CoatingError> {
        let defs: BTreeMap<String, MaterialDef> =
            serde_json::from_str(json).map_err(LibraryError::from)?;

        let mut loaded: Vec<DispersiveMaterial> = Vec::with_capacity(defs.len());
        for (name, def) in defs {
            let name = self.check_name(&name)?;
            if loaded.iter().any(|m| m.name == name) {
                return Err(CoatingError::material_already_defined(&name));
            }
            loaded.push(def.into_material(&name)?);
        }

        let count = loaded.len();
        for material in loaded {
            self.materials.insert(material.name.clone(), Arc::new(material));
        }
        info!(count, "loaded material definitions");
        Ok(count)
    }
}

impl MaterialLookup for MaterialLibrary {
    fn get_material(&self, name: &str) -> Result<Arc<dyn Material>, CoatingError> {
        let name = name.trim();
        if let Some(material) = self.materials.get(name) {
            return Ok(material.clone() as Arc<dyn Material>);
        }
        match name.parse::<f64>() {
            Ok(n) if n > 0.0 && n.is_finite() => {
                Ok(Arc::new(DispersiveMaterial::constant(name, n)) as Arc<dyn Material>)
            }
            _ => Err(CoatingError::material_not_defined(name)),
        }
    }
}

fn builtin_materials() -> Vec<DispersiveMaterial> {
    vec![
        // Malitson (1965), fused silica
        DispersiveMaterial::sellmeier(
            "SiO2",
            [0.6961663, 0.4079426, 0.8974794],
            [0.0684043_f64.powi(2), 0.1162414_f64.powi(2), 9.896161_f64.powi(2)],
        )
        .with_mechanical(MechanicalProperties::new(7.2e10, 0.17, 1e-7))
        .with_notes("Fused silica"),
        DispersiveMaterial::constant("Ta2O5", 2.09)
            .with_mechanical(MechanicalProperties::new(1.4e11, 0.23, 2.4e-4))
            .with_notes("Ion-beam sputtered tantala, index at 1064 nm"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use coatingtk_core::codes;

    #[test]
    fn test_material_library() {
        let mut ml = MaterialLibrary::new();
        ml.register(DispersiveMaterial::constant("TestMaterial", 1.44)).unwrap();
        assert!(ml.list_materials().contains(&"TestMaterial".to_string()));
        assert_eq!(ml.get_material("TestMaterial").unwrap().n(1.0), 1.44);
        assert_eq!(ml.get_material("3.0").unwrap().n(1.0), 3.0);

        let err = ml.get_material("UndefinedMaterial").unwrap_err();
        assert_eq!(err.code, codes::MATERIAL_NOT_DEFINED);

        let err = ml.register(DispersiveMaterial::constant("TestMaterial", 2.0)).unwrap_err();
        assert_eq!(err.code, codes::MATERIAL_ALREADY_DEFINED);
    }

    #[test]
    fn test_numeric_names_must_be_positive() {
        let ml = MaterialLibrary::new();
        assert!(ml.get_material("0").is_err());
        assert!(ml.get_material("-1.5").is_err());
        assert!(ml.get_material("inf").is_err());
        assert!(ml.get_material("").is_err());
    }

    #[test]
    fn test_unregister() {
        let mut ml = MaterialLibrary::with_builtin();
        assert!(ml.contains("Ta2O5"));
        assert!(ml.unregister("Ta2O5").is_some());
        assert!(ml.get_material("Ta2O5").is_err());
        assert!(ml.unregister("Ta2O5").is_none());
    }

    #[test]
    fn test_builtin_mechanical() {
        let ml = MaterialLibrary::with_builtin();
        let sio2 = ml.get_material("SiO2").unwrap();
        let mech = sio2.mechanical().unwrap();
        assert_eq!(mech.youngs_modulus, 7.2e10);
        assert_eq!(mech.poisson_ratio, 0.17);
        assert_eq!(ml.list_materials(), vec!["SiO2".to_string(), "Ta2O5".to_string()]);
    }

    #[test]
    fn test_load_json() {
        let mut ml = MaterialLibrary::new();
        let count = ml
            .load_json(r#"{
                "AlGaAs": {"n": 3.48, "Y": 1.0e11, "sigma": 0.32, "phi": 4.5e-5},
                "Silica": {"B": [0.6961663, 0.4079426, 0.8974794], "C": [0.00467914826, 0.0135120631, 97.9340025]},
                "Flat": {"B": [1.0736, 0.0, 0.0], "C": [0.0, 0.0, 0.0], "notes": "plain"}
            }"#)
            .unwrap();
        assert_eq!(count, 3);
        let algaas = ml.get_material("AlGaAs").unwrap();
        assert_eq!(algaas.n(1064.0), 3.48);
        assert_eq!(algaas.mechanical().unwrap().loss_angle, 4.5e-5);
        assert!(ml.get_material("Silica").unwrap().mechanical().is_none());
        assert!((ml.get_material("Flat").unwrap().n(500.0) - 1.44).abs() < 1e-3);
    }

    #[test]
    fn test_load_json_errors() {
        let mut ml = MaterialLibrary::new();
        let err = ml.load_json(r#"{"Empty": {"notes": "nothing"}}"#).unwrap_err();
        assert_eq!(err.code, codes::INVALID_VALUE);
        let err = ml.load_json("not json").unwrap_err();
        assert_eq!(err.code, codes::PARSE_ERROR);
    }

    #[test]
    fn test_load_json_is_all_or_nothing() {
        let mut ml = MaterialLibrary::new();
        let err = ml
            .load_json(r#"{"Alpha": {"n": 1.5}, "Beta": {"notes": "no dispersion"}}"#)
            .unwrap_err();
        assert_eq!(err.code, codes::INVALID_VALUE);
        assert!(ml.list_materials().is_empty());

        let mut ml = MaterialLibrary::with_builtin();
        let err = ml.load_json(r#"{"Alpha": {"n": 1.5}, "SiO2": {"n": 1.45}}"#).unwrap_err();
        assert_eq!(err.code, codes::MATERIAL_ALREADY_DEFINED);
        assert_eq!(ml.list_materials(), vec!["SiO2".to_string(), "Ta2O5".to_string()]);

        // Two keys that collide once trimmed
        let err = ml.load_json(r#"{"Gamma": {"n": 1.5}, " Gamma": {"n": 1.6}}"#).unwrap_err();
        assert_eq!(err.code, codes::MATERIAL_ALREADY_DEFINED);
        assert!(!ml.contains("Gamma"));
    }

    #[test]
    fn test_mechanical_properties_validated() {
        for json in [
            r#"{"Bad": {"n": 1.45, "Y": 7.2e10, "sigma": 1.5, "phi": 1e-7}}"#,
            r#"{"Bad": {"n": 1.45, "Y": 7.2e10, "sigma": -1.0, "phi": 1e-7}}"#,
            r#"{"Bad": {"n": 1.45, "Y": 7.2e10, "sigma": 0.17, "phi": -1e-7}}"#,
        ] {
            let mut ml = MaterialLibrary::new();
            let err = ml.load_json(json).unwrap_err();
            assert_eq!(err.code, codes::INVALID_VALUE, "{}", json);
            assert!(!ml.contains("Bad"));
        }

        let def = MaterialDef { n: Some(1.45), youngs_modulus: Some(7.2e10), ..MaterialDef::default() };
        let mech = def.into_material("Plain").unwrap();
        assert_eq!(mech.mechanical().unwrap().poisson_ratio, 0.0);
    }

    #[test]
    fn test_register_trims_name() {
        let mut ml = MaterialLibrary::new();
        ml.register(DispersiveMaterial::constant("  Padded ", 1.7)).unwrap();
        assert_eq!(ml.list_materials(), vec!["Padded".to_string()]);
        assert_eq!(ml.get_material("Padded").unwrap().name(), "Padded");
        let err = ml.register(DispersiveMaterial::constant("Padded", 1.8)).unwrap_err();
        assert_eq!(err.code, codes::MATERIAL_ALREADY_DEFINED);
    }
}
