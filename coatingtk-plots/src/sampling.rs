//! Sampling grids for analysis plugins
//!
//! Log grids run over whole decades: in user mode the bounds are
//! `floor(log10(min))` and `ceil(log10(max))`, in auto mode the exact
//! log10 of the plugin's default domain.

use crate::facets::{AxisLimits, DEFAULT_STEPS, XAXIS_STEPS};
use coatingtk_core::CoatingError;
use coatingtk_plugin::ConfigView;

/// Upper bound on grid size
pub const MAX_STEPS: i64 = 100_000;

/// Where the sampled range comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisRange {
    /// Plugin-defined default domain
    Auto,
    User { min: f64, max: f64 },
}

/// A sampled grid and the axis limits it was built for
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub points: Vec<f64>,
    /// Limits to show on the axis
    pub limits: [f64; 2],
    /// log10 bounds of a log grid
    pub log_bounds: Option<[f64; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingPolicy {
    pub range: AxisRange,
    pub steps: i64,
}

impl SamplingPolicy {
    pub fn auto(steps: i64) -> Self {
        Self { range: AxisRange::Auto, steps }
    }

    pub fn user(min: f64, max: f64, steps: i64) -> Self {
        Self { range: AxisRange::User { min, max }, steps }
    }

    /// Read the x range and step count. The view must declare the x limits
    /// and x steps keys.
    pub fn from_config(config: &ConfigView<'_>) -> Result<Self, CoatingError> {
        let steps = match config.get_opt(XAXIS_STEPS)? {
            Some(v) => v.require_int(XAXIS_STEPS)?,
            None => DEFAULT_STEPS,
        };
        let range = match AxisLimits::x().user_limits(config)? {
            Some([min, max]) => AxisRange::User { min, max },
            None => AxisRange::Auto,
        };
        Ok(Self { range, steps })
    }

    /// Limits the grid is meant to cover
    pub fn limits(&self, auto_domain: [f64; 2]) -> [f64; 2] {
        match self.range {
            AxisRange::Auto => auto_domain,
            AxisRange::User { min, max } => [min, max],
        }
    }

    /// Log-uniform grid over whole decades
    pub fn log_grid(&self, auto_domain: [f64; 2]) -> Result<Grid, CoatingError> {
        self.check_steps()?;
        let [lo, hi] = match self.range {
            AxisRange::Auto => [auto_domain[0].log10(), auto_domain[1].log10()],
            AxisRange::User { min, max } => {
                if !(min > 0.0 && max > min && max.is_finite()) {
                    return Err(CoatingError::invalid_range(min, max));
                }
                [min.log10().floor(), max.log10().ceil()]
            }
        };
        if !(lo.is_finite() && hi.is_finite() && hi > lo) {
            return Err(CoatingError::invalid_range(auto_domain[0], auto_domain[1]));
        }
        Ok(Grid {
            points: logspace(lo, hi, self.steps as usize),
            limits: self.limits(auto_domain),
            log_bounds: Some([lo, hi]),
        })
    }

    /// Uniform grid over the limits
    pub fn linear_grid(&self, auto_domain: [f64; 2]) -> Result<Grid, CoatingError> {
        self.check_steps()?;
        let [min, max] = self.limits(auto_domain);
        if !(min.is_finite() && max.is_finite() && max > min) {
            return Err(CoatingError::invalid_range(min, max));
        }
        Ok(Grid {
            points: linspace(min, max, self.steps as usize),
            limits: [min, max],
            log_bounds: None,
        })
    }

    fn check_steps(&self) -> Result<(), CoatingError> {
        if self.steps < 2 || self.steps > MAX_STEPS {
            return Err(CoatingError::invalid_steps(self.steps));
        }
        Ok(())
    }
}

/// `count` points from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    if count < 2 {
        return vec![start; count];
    }
    let divisor = (count - 1) as f64;
    let mut points: Vec<f64> = (0..count)
        .map(|i| start + (end - start) * (i as f64 / divisor))
        .collect();
    points[count - 1] = end;
    points
}

/// `count` points from `10^lo` to `10^hi` inclusive, log-uniform
pub fn logspace(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    linspace(lo, hi, count).into_iter().map(|e| 10f64.powf(e)).collect()
}
