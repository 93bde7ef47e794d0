//! coatingtk Core - Fundamental types
//!
//! This crate provides the core types used throughout coatingtk:
//! - `CoatingError`: Structured errors for the presentation layer
//! - `ConfigValue` / `ConfigStore`: Dotted-path configuration with change notification
//! - `Material` / `MaterialLookup`: The dispersion and mechanical contract
//! - `CoatingStack`: Resolved multilayer stack
//! - `Series` / `Figure`: Rendering-agnostic analysis output

mod config;
mod error;
mod material;
pub mod stack;
mod series;
mod value;

pub use config::{ConfigError, ConfigStore};
pub use error::{CoatingError, Severity, codes};
pub use material::{Material, MaterialLookup, MechanicalProperties};
pub use series::{Figure, Scale, Series};
pub use stack::{CoatingStack, Layer, LayerSpec};
pub use value::ConfigValue;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        CoatingError, CoatingStack, ConfigStore, ConfigValue, Figure, Material,
        MaterialLookup, MechanicalProperties, Scale, Series, Severity,
    };
    pub use crate::error::codes;
}
