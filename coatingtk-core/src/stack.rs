//! Coating stack
//!
//! Layers are ordered in deposition order, from the substrate towards the
//! superstrate. The configuration keeps layers as `[material, thickness]`
//! pairs; [`CoatingStack::from_config`] resolves every material reference
//! before any analysis runs.

use crate::{CoatingError, ConfigStore, ConfigValue, Material, MaterialLookup};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const KEY_LAYERS: &str = "coating.layers";
pub const KEY_SUPERSTRATE: &str = "coating.superstrate";
pub const KEY_SUBSTRATE: &str = "coating.substrate";
pub const KEY_LAMBDA0: &str = "coating.lambda0";
pub const KEY_AOI: &str = "coating.AOI";

/// A layer as stored in the configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub material: String,
    /// Physical thickness (nm)
    pub thickness: f64,
}

impl LayerSpec {
    pub fn new(material: impl Into<String>, thickness: f64) -> Self {
        Self { material: material.into(), thickness }
    }

    /// Read `coating.layers`; a missing key is an empty stack
    pub fn list_from_config(config: &ConfigStore) -> Result<Vec<LayerSpec>, CoatingError> {
        let Some(value) = config.get(KEY_LAYERS) else {
            return Ok(Vec::new());
        };
        let rows = value
            .as_list()
            .ok_or_else(|| CoatingError::type_error(KEY_LAYERS, "List", value.type_name()))?;
        rows.iter()
            .enumerate()
            .map(|(i, row)| Self::from_row(i, row))
            .collect()
    }

    fn from_row(index: usize, row: &ConfigValue) -> Result<LayerSpec, CoatingError> {
        let key = format!("{}[{}]", KEY_LAYERS, index);
        match row.as_list() {
            Some([material, thickness]) => {
                let material = material
                    .as_material_name()
                    .ok_or_else(|| CoatingError::type_error(&key, "Text", material.type_name()))?;
                let thickness = thickness.require_f64(&key)?;
                Ok(LayerSpec { material, thickness })
            }
            _ => Err(CoatingError::type_error(&key, "[material, thickness]", row.type_name())),
        }
    }

    /// Config representation of a whole layer list
    pub fn list_to_value(layers: &[LayerSpec]) -> ConfigValue {
        ConfigValue::List(
            layers
                .iter()
                .map(|l| {
                    ConfigValue::List(vec![
                        ConfigValue::Text(l.material.clone()),
                        ConfigValue::Number(l.thickness),
                    ])
                })
                .collect(),
        )
    }
}

/// A layer with its material resolved
#[derive(Debug, Clone)]
pub struct Layer {
    pub material: Arc<dyn Material>,
    /// Physical thickness (nm)
    pub thickness: f64,
}

/// A fully resolved multilayer coating
#[derive(Debug, Clone)]
pub struct CoatingStack {
    pub superstrate: Arc<dyn Material>,
    pub substrate: Arc<dyn Material>,
    pub layers: Vec<Layer>,
    /// Design wavelength (nm)
    pub lambda0: f64,
    /// Angle of incidence (degrees)
    pub angle_of_incidence: f64,
}

impl CoatingStack {
    /// Build the stack from the configuration, resolving every material.
    ///
    /// Fails with `MATERIAL_NOT_DEFINED` if any material is unknown and with
    /// `INVALID_VALUE` if the design wavelength or angle are out of range.
    pub fn from_config(
        config: &ConfigStore,
        materials: &dyn MaterialLookup,
    ) -> Result<Self, CoatingError> {
        let superstrate = materials.get_material(&material_name(config, KEY_SUPERSTRATE)?)?;
        let substrate = materials.get_material(&material_name(config, KEY_SUBSTRATE)?)?;

        let lambda0 = number(config, KEY_LAMBDA0)?;
        if !(lambda0 > 0.0 && lambda0.is_finite()) {
            return Err(CoatingError::invalid_value(KEY_LAMBDA0, &lambda0.to_string(), "a wavelength > 0 nm"));
        }
        let angle_of_incidence = match config.get(KEY_AOI) {
            Some(v) => v.require_f64(KEY_AOI)?,
            None => 0.0,
        };
        if !(0.0..=90.0).contains(&angle_of_incidence) {
            return Err(CoatingError::invalid_value(
                KEY_AOI,
                &angle_of_incidence.to_string(),
                "an angle between 0 and 90 degrees",
            ));
        }

        let layers = LayerSpec::list_from_config(config)?
            .into_iter()
            .map(|spec| {
                Ok(Layer {
                    material: materials.get_material(&spec.material)?,
                    thickness: spec.thickness,
                })
            })
            .collect::<Result<Vec<_>, CoatingError>>()?;

        Ok(Self { superstrate, substrate, layers, lambda0, angle_of_incidence })
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Sum of all physical layer thicknesses (nm)
    pub fn total_thickness(&self) -> f64 {
        self.layers.iter().map(|l| l.thickness).sum()
    }

    /// Refractive index at a depth measured from the substrate interface.
    ///
    /// Negative depths lie in the substrate, depths beyond the top layer in
    /// the superstrate.
    pub fn index_at_depth(&self, depth_nm: f64, wavelength_nm: f64) -> f64 {
        if depth_nm < 0.0 {
            return self.substrate.n(wavelength_nm);
        }
        let mut top = 0.0;
        for layer in &self.layers {
            top += layer.thickness;
            if depth_nm < top {
                return layer.material.n(wavelength_nm);
            }
        }
        self.superstrate.n(wavelength_nm)
    }
}

fn material_name(config: &ConfigStore, key: &str) -> Result<String, CoatingError> {
    let value = config.get(key).ok_or_else(|| CoatingError::unknown_key(key))?;
    value
        .as_material_name()
        .ok_or_else(|| CoatingError::type_error(key, "Text", value.type_name()))
}

fn number(config: &ConfigStore, key: &str) -> Result<f64, CoatingError> {
    config
        .get(key)
        .ok_or_else(|| CoatingError::unknown_key(key))?
        .require_f64(key)
}
