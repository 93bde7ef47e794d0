//! coatingtk - Multilayer Optical Coating Toolkit
//!
//! A [`CoatingSession`] holds the layer stack, the material library and the
//! registered analyses. Layer thicknesses may be typed in wavelength-relative
//! notation (see [`notation`]); analyses are evaluated on demand into
//! rendering-agnostic figures.
//!
//! ```no_run
//! use coatingtk::{CoatingSession, LayerSpec};
//!
//! let mut session = CoatingSession::with_standard()?;
//! session.insert_layer(0, LayerSpec::new("Ta2O5", 0.0))?;
//! session.set_layer_thickness(0, "L/4")?;
//! let figure = session.evaluate()?;
//! println!("{}", session.export_data(&figure)?);
//! # Ok::<(), coatingtk::CoatingError>(())
//! ```

pub mod notation;
mod render;
mod session;
pub mod wizard;

pub use notation::{Notation, Resolution};
pub use render::{DataExporter, NumberFormat};
pub use session::{CoatingSession, ThicknessEdit, KEY_PLOT_TYPE};

pub use coatingtk_core::stack;
pub use coatingtk_core::{CoatingError, ConfigStore, ConfigValue, Figure, LayerSpec, Scale, Series, Severity};
pub use coatingtk_materials::{DispersiveMaterial, MaterialDef, MaterialLibrary};
pub use coatingtk_plugin::{PanelState, PluginMeta, PluginRegistry};
