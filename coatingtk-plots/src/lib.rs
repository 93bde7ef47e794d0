//! coatingtk Standard Plots
//!
//! Analysis plugins shipped with coatingtk, the five standard option facets
//! and the shared sampling policy.
//!
//! | Plugin | Description |
//! |--------|-------------|
//! | `brownian_noise` | Substrate Brownian displacement noise vs. frequency |
//! | `index_profile` | Refractive index vs. depth through the stack |

pub mod brownian;
pub mod facets;
pub mod profile;
pub mod sampling;

pub use brownian::{BrownianNoise, BrownianOptions};
pub use facets::{standard_facets, Axis, AxisLimits, AxisScale, AxisSteps};
pub use profile::IndexProfile;
pub use sampling::{AxisRange, Grid, SamplingPolicy};

use coatingtk_core::CoatingError;
use coatingtk_plugin::PluginRegistry;

/// Load the standard plots into a registry
pub fn load_standard_plots(registry: PluginRegistry) -> Result<PluginRegistry, CoatingError> {
    registry
        .with_plugin(BrownianNoise)?
        .with_plugin(IndexProfile)
}

/// Registry with every standard plot
pub fn standard_registry() -> Result<PluginRegistry, CoatingError> {
    load_standard_plots(PluginRegistry::new())
}
