//! coatingtk Plugin System
//!
//! This crate provides the plugin infrastructure for coatingtk:
//! - `AnalysisPlugin`: a named computation over a coating stack
//! - `ConfigFacet`: a reusable slice of an option panel owning a set of keys
//! - `OptionPanel`: ordered facets plus a plugin-specific tail
//! - `PluginRegistry`: id-unique registry in registration order

mod context;
pub mod helpers;
mod panel;
mod registry;
mod traits;

pub use context::{AnalysisContext, ConfigView};
pub use panel::{OptionPanel, PanelState};
pub use registry::PluginRegistry;
pub use traits::{AnalysisPlugin, ConfigFacet, FacetMeta, FacetState, FieldState, PluginMeta};

/// Prelude for plugin implementations
pub mod prelude {
    pub use crate::helpers::*;
    pub use crate::{
        AnalysisContext, AnalysisPlugin, ConfigFacet, ConfigView, FacetMeta, FacetState,
        OptionPanel, PluginMeta, PluginRegistry,
    };
    pub use coatingtk_core::prelude::*;
}
