//! Substrate Brownian displacement noise
//!
//! $S(f) = \frac{2 k_B T}{\sqrt{\pi^3} f w Y} (1 - \sigma^2) \phi(w)$
//!
//! with $Y$, $\sigma$ and $\phi$ taken from the substrate. The plotted
//! quantity is the amplitude spectral density $\sqrt{S(f)}$ in m/√Hz.

use crate::facets::{AxisLimits, AxisSteps};
use crate::sampling::SamplingPolicy;
use coatingtk_core::{CoatingError, CoatingStack, ConfigValue, Figure, Series};
use coatingtk_plugin::helpers::parse_positive_float;
use coatingtk_plugin::{
    AnalysisContext, AnalysisPlugin, ConfigFacet, ConfigView, FacetMeta, FacetState, PluginMeta,
};
use std::f64::consts::PI;
use std::sync::Arc;
use tracing::debug;

pub const ID: &str = "brownian_noise";

pub const KEY_TEMPERATURE: &str = "analysis.temperature";
/// Beam radius in µm
pub const KEY_BEAM_SIZE: &str = "analysis.beam_size";

/// Boltzmann constant (J/K)
pub const BOLTZMANN: f64 = 1.3806503e-23;

/// Frequency domain (Hz) in auto mode
pub const AUTO_DOMAIN: [f64; 2] = [1.0, 1e4];

const OPTION_KEYS: &[&str] = &[KEY_TEMPERATURE, KEY_BEAM_SIZE];

/// Temperature and beam size fields
#[derive(Debug, Clone, Copy, Default)]
pub struct BrownianOptions;

impl ConfigFacet for BrownianOptions {
    fn meta(&self) -> FacetMeta {
        FacetMeta { name: "brownian_options", keys: OPTION_KEYS }
    }

    fn initialise(&self, config: &ConfigView<'_>) -> FacetState {
        FacetState::new("brownian_options")
            .with_field(KEY_TEMPERATURE, config.value_or(KEY_TEMPERATURE, ConfigValue::Null))
            .with_field(KEY_BEAM_SIZE, config.value_or(KEY_BEAM_SIZE, ConfigValue::Null))
    }

    fn on_user_edit(&self, key: &str, raw: &str) -> Result<ConfigValue, CoatingError> {
        if !OPTION_KEYS.iter().any(|k| *k == key) {
            return Err(CoatingError::unknown_key(key));
        }
        Ok(ConfigValue::Number(parse_positive_float(key, raw)?))
    }
}

/// Amplitude spectral density of substrate Brownian noise
pub fn brownian_noise(
    frequencies: &[f64],
    temperature: f64,
    beam_size_m: f64,
    youngs_modulus: f64,
    poisson_ratio: f64,
    phi: f64,
) -> Vec<f64> {
    let prefactor = 2.0 * BOLTZMANN * temperature / (PI.powi(3).sqrt() * beam_size_m * youngs_modulus)
        * (1.0 - poisson_ratio * poisson_ratio)
        * phi;
    frequencies.iter().map(|f| (prefactor / f).sqrt()).collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BrownianNoise;

impl AnalysisPlugin for BrownianNoise {
    fn meta(&self) -> PluginMeta {
        PluginMeta { id: ID, description: "Brownian Noise" }
    }

    fn facets(&self) -> Vec<Arc<dyn ConfigFacet>> {
        vec![Arc::new(AxisSteps) as Arc<dyn ConfigFacet>, Arc::new(AxisLimits::x()) as Arc<dyn ConfigFacet>]
    }

    fn options(&self) -> Option<Arc<dyn ConfigFacet>> {
        Some(Arc::new(BrownianOptions))
    }

    fn compute(&self, stack: &CoatingStack, ctx: &AnalysisContext<'_>) -> Result<Series, CoatingError> {
        let config = ctx.config();
        let temperature = positive(&config, KEY_TEMPERATURE)?;
        let beam_size = positive(&config, KEY_BEAM_SIZE)? * 1e-6;

        let substrate = &stack.substrate;
        let mechanical = substrate
            .mechanical()
            .ok_or_else(|| CoatingError::missing_mechanical(substrate.name()))?;
        if !(mechanical.youngs_modulus > 0.0) {
            return Err(CoatingError::missing_mechanical(substrate.name()));
        }

        let grid = SamplingPolicy::from_config(&config)?.log_grid(AUTO_DOMAIN)?;
        debug!(steps = grid.points.len(), temperature, beam_size, "computing Brownian noise");

        let y = brownian_noise(
            &grid.points,
            temperature,
            beam_size,
            mechanical.youngs_modulus,
            mechanical.poisson_ratio,
            mechanical.phi(beam_size),
        );
        if let Some(bad) = y.iter().find(|v| !(v.is_finite() && **v >= 0.0)) {
            return Err(CoatingError::invalid_value(
                substrate.name(),
                &bad.to_string(),
                "mechanical properties with -1 < sigma < 1 and phi >= 0",
            ));
        }
        Ok(Series::new(grid.points, y)
            .with_labels("Frequency (Hz)", "Displacement noise (m/√Hz)")
            .with_legend("Brownian Noise"))
    }

    fn render(&self, series: Series, ctx: &AnalysisContext<'_>) -> Result<Figure, CoatingError> {
        let limits = SamplingPolicy::from_config(&ctx.config())?.limits(AUTO_DOMAIN);
        let mut figure = Figure::new(series).loglog().with_grid().with_x_limits(limits);
        ctx.decorate(&mut figure);
        Ok(figure)
    }
}

fn positive(config: &ConfigView<'_>, key: &str) -> Result<f64, CoatingError> {
    let value = config.get_f64(key)?;
    if !(value > 0.0 && value.is_finite()) {
        return Err(CoatingError::invalid_value(key, &value.to_string(), "a number > 0"));
    }
    Ok(value)
}
