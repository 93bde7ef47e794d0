//! Editing and evaluation session
//!
//! Owns the plugin registry, the material library and the configuration
//! store. Every stack or option edit goes through the store, so the
//! `modified` flag follows the store's change notifications.

use crate::notation::{self, Resolution};
use crate::render::DataExporter;
use crate::wizard;
use coatingtk_core::stack::{KEY_AOI, KEY_LAMBDA0, KEY_LAYERS, KEY_SUBSTRATE, KEY_SUPERSTRATE};
use coatingtk_core::{CoatingError, CoatingStack, ConfigStore, ConfigValue, Figure, LayerSpec, MaterialLookup};
use coatingtk_materials::{DispersiveMaterial, MaterialLibrary};
use coatingtk_plugin::helpers::{parse_float, parse_positive_float};
use coatingtk_plugin::{AnalysisContext, PanelState, PluginMeta, PluginRegistry};
use serde::Serialize;
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, info};

pub const KEY_PLOT_TYPE: &str = "plot.plottype";

/// Result of editing a thickness cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum ThicknessEdit {
    /// The layer now has this physical thickness (nm)
    Stored(f64),
    /// Notation against an undefined material; the stack was not touched
    Pending(String),
}

pub struct CoatingSession {
    registry: PluginRegistry,
    materials: MaterialLibrary,
    config: ConfigStore,
    modified: Rc<Cell<bool>>,
}

impl CoatingSession {
    pub fn new(registry: PluginRegistry, materials: MaterialLibrary, mut config: ConfigStore) -> Self {
        let modified = Rc::new(Cell::new(false));
        let flag = modified.clone();
        config.set_callback(move || flag.set(true));
        Self { registry, materials, config, modified }
    }

    /// Standard plots, built-in materials and default settings
    pub fn with_standard() -> Result<Self, CoatingError> {
        Ok(Self::new(
            coatingtk_plots::standard_registry()?,
            MaterialLibrary::with_builtin(),
            ConfigStore::with_defaults(),
        ))
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Overlay a JSON settings document; loading does not count as a change
    pub fn load_config(&mut self, json: &str) -> Result<(), CoatingError> {
        self.config.merge_json(json)
    }

    pub fn is_modified(&self) -> bool {
        self.modified.get()
    }

    pub fn mark_saved(&self) {
        self.modified.set(false);
    }

    // ========== Plots ==========

    pub fn plots(&self) -> Vec<PluginMeta> {
        self.registry.list()
    }

    /// Id stored in `plot.plottype`
    pub fn current_plot(&self) -> Result<String, CoatingError> {
        let value = self
            .config
            .get(KEY_PLOT_TYPE)
            .ok_or_else(|| CoatingError::unknown_key(KEY_PLOT_TYPE))?;
        Ok(value.require_text(KEY_PLOT_TYPE)?.to_string())
    }

    /// Make `id` the current plot and return its initialised option panel
    pub fn select_plot(&mut self, id: &str) -> Result<PanelState, CoatingError> {
        let state = self.option_panel(id)?;
        self.config.set(KEY_PLOT_TYPE, id);
        Ok(state)
    }

    pub fn option_panel(&self, id: &str) -> Result<PanelState, CoatingError> {
        let panel = self.registry.get(id)?.option_panel()?;
        Ok(panel.initialise(&self.config))
    }

    /// Route raw widget input to the facet owning `key`
    pub fn edit_option(&mut self, id: &str, key: &str, raw: &str) -> Result<ConfigValue, CoatingError> {
        let panel = self.registry.get(id)?.option_panel()?;
        self.config.batch(|config| panel.edit(config, key, raw))
    }

    // ========== Stack ==========

    pub fn layers(&self) -> Result<Vec<LayerSpec>, CoatingError> {
        LayerSpec::list_from_config(&self.config)
    }

    /// Insert before `row`; `row == len` appends
    pub fn insert_layer(&mut self, row: usize, layer: LayerSpec) -> Result<(), CoatingError> {
        let mut layers = self.layers()?;
        if row > layers.len() {
            return Err(row_error(row, layers.len() + 1));
        }
        if !(layer.thickness >= 0.0 && layer.thickness.is_finite()) {
            return Err(CoatingError::invalid_thickness(&layer.thickness.to_string()));
        }
        layers.insert(row, layer);
        self.store_layers(&layers);
        Ok(())
    }

    pub fn remove_layer(&mut self, row: usize) -> Result<LayerSpec, CoatingError> {
        let mut layers = self.layers()?;
        if row >= layers.len() {
            return Err(row_error(row, layers.len()));
        }
        let removed = layers.remove(row);
        self.store_layers(&layers);
        Ok(removed)
    }

    pub fn clear_stack(&mut self) {
        self.store_layers(&[]);
    }

    /// Any name is accepted; unknown materials surface on evaluation
    pub fn set_layer_material(&mut self, row: usize, name: &str) -> Result<(), CoatingError> {
        let mut layers = self.layers()?;
        let len = layers.len();
        let layer = layers.get_mut(row).ok_or_else(|| row_error(row, len))?;
        layer.material = name.trim().to_string();
        self.store_layers(&layers);
        Ok(())
    }

    /// Resolve thickness text against the layer's material at λ0
    pub fn set_layer_thickness(&mut self, row: usize, text: &str) -> Result<ThicknessEdit, CoatingError> {
        let mut layers = self.layers()?;
        let len = layers.len();
        let layer = layers.get_mut(row).ok_or_else(|| row_error(row, len))?;
        let lambda0 = self.lambda0()?;

        match notation::resolve(text, &layer.material, lambda0, &self.materials)? {
            Resolution::Resolved(thickness) => {
                debug!(row, text, thickness, "layer thickness resolved");
                layer.thickness = thickness;
                self.store_layers(&layers);
                Ok(ThicknessEdit::Stored(thickness))
            }
            Resolution::Unchanged(text) => Ok(ThicknessEdit::Pending(text)),
        }
    }

    pub fn set_superstrate(&mut self, name: &str) -> Result<(), CoatingError> {
        self.set_bounding_material(KEY_SUPERSTRATE, name)
    }

    pub fn set_substrate(&mut self, name: &str) -> Result<(), CoatingError> {
        self.set_bounding_material(KEY_SUBSTRATE, name)
    }

    pub fn set_lambda0(&mut self, raw: &str) -> Result<f64, CoatingError> {
        let lambda0 = parse_positive_float(KEY_LAMBDA0, raw)?;
        self.config.set(KEY_LAMBDA0, lambda0);
        Ok(lambda0)
    }

    pub fn set_aoi(&mut self, raw: &str) -> Result<f64, CoatingError> {
        let aoi = parse_float(KEY_AOI, raw)?;
        if !(0.0..=90.0).contains(&aoi) {
            return Err(CoatingError::invalid_value(KEY_AOI, raw, "an angle between 0 and 90 degrees"));
        }
        self.config.set(KEY_AOI, aoi);
        Ok(aoi)
    }

    // ========== Wizard ==========

    /// Append `count` quarter-wave pairs designed for the current λ0
    pub fn add_bilayers(
        &mut self,
        count: usize,
        first: &str,
        second: &str,
        half_wave_cap: bool,
    ) -> Result<usize, CoatingError> {
        let lambda0 = self.lambda0()?;
        let first = self.materials.get_material(first)?;
        let second = self.materials.get_material(second)?;
        let added = wizard::bilayers(count, first.as_ref(), second.as_ref(), lambda0, half_wave_cap)?;

        let mut layers = self.layers()?;
        let n = added.len();
        layers.extend(added);
        self.config.batch(|config| config.set(KEY_LAYERS, LayerSpec::list_to_value(&layers)));
        info!(bilayers = count, layers = n, "stack wizard added layers");
        Ok(n)
    }

    /// Scale every layer thickness by `1 + percent / 100`
    pub fn shift_stack(&mut self, percent: f64) -> Result<(), CoatingError> {
        let mut layers = self.layers()?;
        wizard::shift(&mut layers, percent)?;
        self.config.batch(|config| config.set(KEY_LAYERS, LayerSpec::list_to_value(&layers)));
        Ok(())
    }

    // ========== Materials ==========

    pub fn materials(&self) -> Vec<String> {
        self.materials.list_materials()
    }

    pub fn register_material(&mut self, material: DispersiveMaterial) -> Result<(), CoatingError> {
        self.materials.register(material)
    }

    pub fn unregister_material(&mut self, name: &str) -> Result<(), CoatingError> {
        self.materials
            .unregister(name)
            .map(|_| ())
            .ok_or_else(|| CoatingError::material_not_defined(name))
    }

    /// Register every material of a JSON library document
    pub fn load_materials(&mut self, json: &str) -> Result<usize, CoatingError> {
        self.materials.load_json(json)
    }

    // ========== Evaluation ==========

    /// Resolve the current stack, every material included
    pub fn build_coating(&self) -> Result<CoatingStack, CoatingError> {
        CoatingStack::from_config(&self.config, &self.materials)
    }

    /// Evaluate the plot named in `plot.plottype`
    pub fn evaluate(&self) -> Result<Figure, CoatingError> {
        let id = self.current_plot()?;
        self.evaluate_plot(&id)
    }

    pub fn evaluate_plot(&self, id: &str) -> Result<Figure, CoatingError> {
        let plugin = self.registry.get(id)?;
        let stack = self.build_coating()?;
        let panel = plugin.option_panel()?;
        let ctx = AnalysisContext::new(&self.config, &panel);
        let series = plugin.compute(&stack, &ctx)?;
        info!(plot = id, points = series.len(), layers = stack.layers.len(), "analysis evaluated");
        plugin.render(series, &ctx)
    }

    /// ASCII table of a rendered figure
    pub fn export_data(&self, figure: &Figure) -> Result<String, CoatingError> {
        DataExporter::new().export(figure)
    }

    /// Stack formula of the current coating; unknown materials fail with
    /// `MATERIAL_NOT_DEFINED`
    pub fn export_formula(&self) -> Result<String, CoatingError> {
        let stack = self.build_coating()?;
        Ok(DataExporter::new().export_formula(&stack))
    }

    fn lambda0(&self) -> Result<f64, CoatingError> {
        self.config
            .get(KEY_LAMBDA0)
            .ok_or_else(|| CoatingError::unknown_key(KEY_LAMBDA0))?
            .require_f64(KEY_LAMBDA0)
    }

    fn store_layers(&mut self, layers: &[LayerSpec]) {
        self.config.set(KEY_LAYERS, LayerSpec::list_to_value(layers));
    }

    fn set_bounding_material(&mut self, key: &str, name: &str) -> Result<(), CoatingError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoatingError::invalid_value(key, name, "a material name or refractive index"));
        }
        self.config.set(key, name);
        Ok(())
    }
}

fn row_error(row: usize, rows: usize) -> CoatingError {
    CoatingError::invalid_value(KEY_LAYERS, &row.to_string(), &format!("a row index below {}", rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coatingtk_core::{codes, MechanicalProperties, Scale};

    fn session() -> CoatingSession {
        CoatingSession::with_standard().unwrap()
    }

    #[test]
    fn test_plots_listed_in_order() {
        let ids: Vec<_> = session().plots().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["brownian_noise", "index_profile"]);
    }

    #[test]
    fn test_select_plot() {
        let mut s = session();
        let state = s.select_plot("index_profile").unwrap();
        assert_eq!(state.plugin, "index_profile");
        assert_eq!(s.current_plot().unwrap(), "index_profile");
        assert!(s.is_modified());

        let err = s.select_plot("reflectivity").unwrap_err();
        assert_eq!(err.code, codes::UNKNOWN_PLUGIN_ID);
        assert_eq!(s.current_plot().unwrap(), "index_profile");
    }

    #[test]
    fn test_edit_option_routes_and_notifies_once() {
        let mut s = session();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        s.config.set_callback(move || c.set(c.get() + 1));

        s.edit_option("brownian_noise", "analysis.temperature", "293").unwrap();
        assert_eq!(count.get(), 1);
        assert_eq!(s.config().get("analysis.temperature"), Some(&ConfigValue::Number(293.0)));

        // yaxis keys belong to no facet of this plot
        let err = s.edit_option("brownian_noise", "yaxis.scale", "lin").unwrap_err();
        assert_eq!(err.code, codes::UNKNOWN_KEY);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_layer_editing() {
        let mut s = session();
        s.insert_layer(0, LayerSpec::new("Ta2O5", 100.0)).unwrap();
        s.insert_layer(1, LayerSpec::new("SiO2", 200.0)).unwrap();
        s.insert_layer(0, LayerSpec::new("2.0", 50.0)).unwrap();
        let names: Vec<_> = s.layers().unwrap().into_iter().map(|l| l.material).collect();
        assert_eq!(names, vec!["2.0", "Ta2O5", "SiO2"]);

        assert_eq!(s.remove_layer(0).unwrap().material, "2.0");
        assert!(s.remove_layer(5).is_err());
        assert!(s.insert_layer(9, LayerSpec::new("SiO2", 1.0)).is_err());

        s.set_layer_material(1, " Ta2O5 ").unwrap();
        assert_eq!(s.layers().unwrap()[1].material, "Ta2O5");

        s.clear_stack();
        assert!(s.layers().unwrap().is_empty());
    }

    #[test]
    fn test_thickness_notation() {
        let mut s = session();
        s.insert_layer(0, LayerSpec::new("2.0", 0.0)).unwrap();
        s.insert_layer(1, LayerSpec::new("Unobtainium", 10.0)).unwrap();

        assert_eq!(s.set_layer_thickness(0, "L/4").unwrap(), ThicknessEdit::Stored(133.0));
        assert_eq!(s.layers().unwrap()[0].thickness, 133.0);

        s.mark_saved();
        let edit = s.set_layer_thickness(1, "*1").unwrap();
        assert_eq!(edit, ThicknessEdit::Pending("*1".to_string()));
        assert_eq!(s.layers().unwrap()[1].thickness, 10.0);
        assert!(!s.is_modified());

        assert_eq!(s.set_layer_thickness(1, "42.5").unwrap(), ThicknessEdit::Stored(42.5));
        let err = s.set_layer_thickness(0, "thick").unwrap_err();
        assert_eq!(err.code, codes::INVALID_THICKNESS);
        assert_eq!(s.layers().unwrap()[0].thickness, 133.0);
    }

    #[test]
    fn test_undefined_material_surfaces_on_evaluate() {
        let mut s = session();
        s.insert_layer(0, LayerSpec::new("Unobtainium", 10.0)).unwrap();
        let layers_before = s.layers().unwrap();
        let err = s.evaluate().unwrap_err();
        assert_eq!(err.code, codes::MATERIAL_NOT_DEFINED);
        assert_eq!(s.layers().unwrap(), layers_before);
    }

    #[test]
    fn test_lambda0_and_aoi() {
        let mut s = session();
        assert_eq!(s.set_lambda0("532").unwrap(), 532.0);
        assert_eq!(s.set_lambda0("-1").unwrap_err().code, codes::INVALID_VALUE);
        assert_eq!(s.set_aoi("45").unwrap(), 45.0);
        assert!(s.set_aoi("91").is_err());
        assert_eq!(s.config().get(KEY_AOI), Some(&ConfigValue::Number(45.0)));
        assert!(s.set_substrate("  ").is_err());
        s.set_substrate("1.45").unwrap();
        assert_eq!(s.config().get(KEY_SUBSTRATE), Some(&ConfigValue::from("1.45")));
    }

    #[test]
    fn test_wizard_single_notification() {
        let mut s = session();
        s.set_lambda0("1000").unwrap();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        s.config.set_callback(move || c.set(c.get() + 1));

        assert_eq!(s.add_bilayers(3, "2.0", "1.6", true).unwrap(), 7);
        assert_eq!(count.get(), 1);
        let layers = s.layers().unwrap();
        assert_eq!(layers[0], LayerSpec::new("2.0", 125.0));
        assert_eq!(layers[6], LayerSpec::new("2.0", 250.0));

        s.shift_stack(-20.0).unwrap();
        assert_eq!(count.get(), 2);
        assert!((s.layers().unwrap()[0].thickness - 100.0).abs() < 1e-9);

        assert_eq!(s.add_bilayers(1, "Nope", "1.6", false).unwrap_err().code, codes::MATERIAL_NOT_DEFINED);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_materials() {
        let mut s = session();
        s.register_material(
            DispersiveMaterial::constant("Custom", 1.7).with_mechanical(MechanicalProperties::new(5e10, 0.2, 1e-6)),
        )
        .unwrap();
        assert!(s.materials().contains(&"Custom".to_string()));
        let err = s.register_material(DispersiveMaterial::constant("Custom", 1.8)).unwrap_err();
        assert_eq!(err.code, codes::MATERIAL_ALREADY_DEFINED);
        s.unregister_material("Custom").unwrap();
        assert_eq!(s.unregister_material("Custom").unwrap_err().code, codes::MATERIAL_NOT_DEFINED);
        assert!(!s.is_modified());
    }

    #[test]
    fn test_evaluate_and_export() {
        let mut s = session();
        s.edit_option("brownian_noise", "xaxis.steps", "10").unwrap();
        let figure = s.evaluate().unwrap();
        assert_eq!(figure.series[0].len(), 10);
        assert_eq!(figure.x_scale, Scale::Log);

        let text = s.export_data(&figure).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "# Frequency (Hz)\tBrownian Noise");
    }

    #[test]
    fn test_export_formula() {
        let mut s = session();
        s.set_lambda0("1000").unwrap();
        s.add_bilayers(1, "2.0", "1.6", false).unwrap();
        let text = s.export_formula().unwrap();
        assert!(text.contains("# formula: SiO2 | 0.25*2.0 0.25*1.6 | 1.0"), "{}", text);
        assert_eq!(text.lines().count(), 5);

        s.set_layer_material(0, "Unobtainium").unwrap();
        s.mark_saved();
        let err = s.export_formula().unwrap_err();
        assert_eq!(err.code, codes::MATERIAL_NOT_DEFINED);
        assert!(!s.is_modified());
    }

    #[test]
    fn test_load_config_is_not_a_change() {
        let mut s = session();
        s.load_config(r#"{"coating": {"lambda0": 633.0}}"#).unwrap();
        assert!(!s.is_modified());
        assert_eq!(s.lambda0().unwrap(), 633.0);
    }
}
