//! Plugin traits

use crate::{AnalysisContext, ConfigView, OptionPanel};
use coatingtk_core::{CoatingError, CoatingStack, ConfigValue, Figure, Series};
use serde::Serialize;
use std::sync::Arc;

/// Metadata for an analysis plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginMeta {
    /// Unique identifier, also stored in `plot.plottype`
    pub id: &'static str,
    /// Human-readable name for selection lists
    pub description: &'static str,
}

/// Metadata for a configuration facet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetMeta {
    pub name: &'static str,
    /// Config paths this facet owns; it reads and writes nothing else
    pub keys: &'static [&'static str],
}

/// Current value of one option field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldState {
    pub key: &'static str,
    pub value: ConfigValue,
}

/// Initial widget state produced by a facet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetState {
    pub facet: &'static str,
    pub fields: Vec<FieldState>,
}

impl FacetState {
    pub fn new(facet: &'static str) -> Self {
        Self { facet, fields: Vec::new() }
    }

    pub fn with_field(mut self, key: &'static str, value: impl Into<ConfigValue>) -> Self {
        self.fields.push(FieldState { key, value: value.into() });
        self
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }
}

/// An independently composable slice of an option panel
pub trait ConfigFacet: Send + Sync {
    fn meta(&self) -> FacetMeta;

    /// Widget state from the current configuration
    fn initialise(&self, config: &ConfigView<'_>) -> FacetState;

    /// Parse raw user input for one of this facet's keys
    fn on_user_edit(&self, key: &str, raw: &str) -> Result<ConfigValue, CoatingError>;

    /// Adjust a rendered figure from this facet's settings
    fn decorate(&self, _figure: &mut Figure, _config: &ConfigView<'_>) {}
}

/// A named computation over a coating stack
pub trait AnalysisPlugin: Send + Sync {
    fn meta(&self) -> PluginMeta;

    /// Standard facets, in panel order
    fn facets(&self) -> Vec<Arc<dyn ConfigFacet>> {
        Vec::new()
    }

    /// Plugin-specific facet, initialised after all standard facets
    fn options(&self) -> Option<Arc<dyn ConfigFacet>> {
        None
    }

    /// Compose the option surface of this plugin
    fn option_panel(&self) -> Result<OptionPanel, CoatingError> {
        OptionPanel::compose(self.meta().id, self.facets(), self.options())
    }

    /// Evaluate the plugin; must not mutate the stack or the configuration
    fn compute(&self, stack: &CoatingStack, ctx: &AnalysisContext<'_>) -> Result<Series, CoatingError>;

    /// Turn a computed series into a figure
    fn render(&self, series: Series, ctx: &AnalysisContext<'_>) -> Result<Figure, CoatingError> {
        let mut figure = Figure::new(series);
        ctx.decorate(&mut figure);
        Ok(figure)
    }
}
