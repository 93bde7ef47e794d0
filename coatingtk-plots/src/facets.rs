//! Standard option facets
//!
//! Axis scale toggles, auto/user limits and the x sample count. Each facet
//! owns a fixed set of config paths and never reads anything else.

use coatingtk_core::{CoatingError, ConfigValue, Figure, Scale};
use coatingtk_plugin::helpers::{parse_choice, parse_count, parse_float, parse_scale};
use coatingtk_plugin::{ConfigFacet, ConfigView, FacetMeta, FacetState};
use std::sync::Arc;

pub const XAXIS_SCALE: &str = "xaxis.scale";
pub const XAXIS_LIMITS: &str = "xaxis.limits";
pub const XAXIS_MIN: &str = "xaxis.min";
pub const XAXIS_MAX: &str = "xaxis.max";
pub const XAXIS_STEPS: &str = "xaxis.steps";
pub const YAXIS_SCALE: &str = "yaxis.scale";
pub const YAXIS_LIMITS: &str = "yaxis.limits";
pub const YAXIS_MIN: &str = "yaxis.min";
pub const YAXIS_MAX: &str = "yaxis.max";

pub const LIMITS_AUTO: &str = "auto";
pub const LIMITS_USER: &str = "user";
const LIMIT_MODES: &[&str] = &[LIMITS_AUTO, LIMITS_USER];

pub const DEFAULT_STEPS: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    fn scale_keys(self) -> &'static [&'static str] {
        match self {
            Axis::X => &[XAXIS_SCALE],
            Axis::Y => &[YAXIS_SCALE],
        }
    }

    fn limit_keys(self) -> &'static [&'static str] {
        match self {
            Axis::X => &[XAXIS_LIMITS, XAXIS_MIN, XAXIS_MAX],
            Axis::Y => &[YAXIS_LIMITS, YAXIS_MIN, YAXIS_MAX],
        }
    }
}

/// Linear/log toggle for one axis
#[derive(Debug, Clone, Copy)]
pub struct AxisScale {
    axis: Axis,
}

impl AxisScale {
    pub fn x() -> Self {
        Self { axis: Axis::X }
    }

    pub fn y() -> Self {
        Self { axis: Axis::Y }
    }

    fn key(&self) -> &'static str {
        self.axis.scale_keys()[0]
    }

    /// Anything other than `lin` is treated as log
    fn current(&self, config: &ConfigView<'_>) -> Scale {
        match config.get_opt(self.key()) {
            Ok(Some(v)) if v.as_text().and_then(Scale::parse) == Some(Scale::Lin) => Scale::Lin,
            _ => Scale::Log,
        }
    }
}

impl ConfigFacet for AxisScale {
    fn meta(&self) -> FacetMeta {
        let name = match self.axis {
            Axis::X => "x_axis_scale",
            Axis::Y => "y_axis_scale",
        };
        FacetMeta { name, keys: self.axis.scale_keys() }
    }

    fn initialise(&self, config: &ConfigView<'_>) -> FacetState {
        FacetState::new(self.meta().name).with_field(self.key(), self.current(config).as_str())
    }

    fn on_user_edit(&self, key: &str, raw: &str) -> Result<ConfigValue, CoatingError> {
        if key != self.key() {
            return Err(CoatingError::unknown_key(key));
        }
        Ok(ConfigValue::from(parse_scale(key, raw)?.as_str()))
    }

    fn decorate(&self, figure: &mut Figure, config: &ConfigView<'_>) {
        let scale = self.current(config);
        match self.axis {
            Axis::X => figure.x_scale = scale,
            Axis::Y => figure.y_scale = scale,
        }
    }
}

/// Auto/user limits for one axis
#[derive(Debug, Clone, Copy)]
pub struct AxisLimits {
    axis: Axis,
}

impl AxisLimits {
    pub fn x() -> Self {
        Self { axis: Axis::X }
    }

    pub fn y() -> Self {
        Self { axis: Axis::Y }
    }

    fn keys(&self) -> (&'static str, &'static str, &'static str) {
        let keys = self.axis.limit_keys();
        (keys[0], keys[1], keys[2])
    }

    /// User limits, or `None` in auto mode. Anything but `auto` means user.
    pub fn user_limits(&self, config: &ConfigView<'_>) -> Result<Option<[f64; 2]>, CoatingError> {
        let (mode, min, max) = self.keys();
        let auto = matches!(config.get_opt(mode)?, Some(v) if v.as_text() == Some(LIMITS_AUTO));
        if auto {
            return Ok(None);
        }
        Ok(Some([config.get_f64(min)?, config.get_f64(max)?]))
    }
}

impl ConfigFacet for AxisLimits {
    fn meta(&self) -> FacetMeta {
        let name = match self.axis {
            Axis::X => "x_axis_limits",
            Axis::Y => "y_axis_limits",
        };
        FacetMeta { name, keys: self.axis.limit_keys() }
    }

    fn initialise(&self, config: &ConfigView<'_>) -> FacetState {
        let (mode, min, max) = self.keys();
        let mode_value = match config.get_opt(mode) {
            Ok(Some(v)) if v.as_text() == Some(LIMITS_AUTO) => LIMITS_AUTO,
            _ => LIMITS_USER,
        };
        FacetState::new(self.meta().name)
            .with_field(mode, mode_value)
            .with_field(min, config.value_or(min, ConfigValue::Null))
            .with_field(max, config.value_or(max, ConfigValue::Null))
    }

    fn on_user_edit(&self, key: &str, raw: &str) -> Result<ConfigValue, CoatingError> {
        let (mode, min, max) = self.keys();
        if key == mode {
            Ok(ConfigValue::from(parse_choice(key, raw, LIMIT_MODES)?))
        } else if key == min || key == max {
            Ok(ConfigValue::Number(parse_float(key, raw)?))
        } else {
            Err(CoatingError::unknown_key(key))
        }
    }

    fn decorate(&self, figure: &mut Figure, config: &ConfigView<'_>) {
        // Inconsistent user limits are reported by compute, not here
        if let Ok(Some([lo, hi])) = self.user_limits(config) {
            if lo < hi {
                match self.axis {
                    Axis::X => figure.x_limits = Some([lo, hi]),
                    Axis::Y => figure.y_limits = Some([lo, hi]),
                }
            }
        }
    }
}

/// Number of x samples
#[derive(Debug, Clone, Copy, Default)]
pub struct AxisSteps;

impl ConfigFacet for AxisSteps {
    fn meta(&self) -> FacetMeta {
        FacetMeta { name: "x_axis_steps", keys: &[XAXIS_STEPS] }
    }

    fn initialise(&self, config: &ConfigView<'_>) -> FacetState {
        FacetState::new("x_axis_steps").with_field(XAXIS_STEPS, config.value_or(XAXIS_STEPS, DEFAULT_STEPS))
    }

    fn on_user_edit(&self, key: &str, raw: &str) -> Result<ConfigValue, CoatingError> {
        if key != XAXIS_STEPS {
            return Err(CoatingError::unknown_key(key));
        }
        Ok(ConfigValue::Int(parse_count(key, raw)?))
    }
}

/// All five standard facets, in the order a full panel shows them
pub fn standard_facets() -> Vec<Arc<dyn ConfigFacet>> {
    vec![
        Arc::new(AxisScale::x()) as Arc<dyn ConfigFacet>,
        Arc::new(AxisScale::y()) as Arc<dyn ConfigFacet>,
        Arc::new(AxisLimits::x()) as Arc<dyn ConfigFacet>,
        Arc::new(AxisLimits::y()) as Arc<dyn ConfigFacet>,
        Arc::new(AxisSteps) as Arc<dyn ConfigFacet>,
    ]
}
