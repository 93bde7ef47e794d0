//! Refractive index profile through the stack

use crate::facets::{AxisLimits, AxisScale, AxisSteps};
use crate::sampling::SamplingPolicy;
use coatingtk_core::{CoatingError, CoatingStack, Figure, Series};
use coatingtk_plugin::{AnalysisContext, AnalysisPlugin, ConfigFacet, PluginMeta};
use std::sync::Arc;

pub const ID: &str = "index_profile";

#[derive(Debug, Clone, Copy, Default)]
pub struct IndexProfile;

impl IndexProfile {
    /// Depth range in auto mode: the whole stack, or one design wavelength
    /// when there are no layers
    fn auto_domain(stack: &CoatingStack) -> [f64; 2] {
        let total = stack.total_thickness();
        if total > 0.0 {
            [0.0, total]
        } else {
            [0.0, stack.lambda0]
        }
    }
}

impl AnalysisPlugin for IndexProfile {
    fn meta(&self) -> PluginMeta {
        PluginMeta { id: ID, description: "Refractive Index Profile" }
    }

    fn facets(&self) -> Vec<Arc<dyn ConfigFacet>> {
        vec![
            Arc::new(AxisSteps) as Arc<dyn ConfigFacet>,
            Arc::new(AxisLimits::x()) as Arc<dyn ConfigFacet>,
            Arc::new(AxisScale::y()) as Arc<dyn ConfigFacet>,
            Arc::new(AxisLimits::y()) as Arc<dyn ConfigFacet>,
        ]
    }

    fn compute(&self, stack: &CoatingStack, ctx: &AnalysisContext<'_>) -> Result<Series, CoatingError> {
        let grid = SamplingPolicy::from_config(&ctx.config())?.linear_grid(Self::auto_domain(stack))?;
        let y = grid
            .points
            .iter()
            .map(|&depth| stack.index_at_depth(depth, stack.lambda0))
            .collect();
        Ok(Series::new(grid.points, y)
            .with_labels("Depth (nm)", "Refractive index")
            .with_legend(format!("n at {} nm", stack.lambda0)))
    }

    fn render(&self, series: Series, ctx: &AnalysisContext<'_>) -> Result<Figure, CoatingError> {
        let limits = match (series.x.first(), series.x.last()) {
            (Some(&lo), Some(&hi)) if hi > lo => Some([lo, hi]),
            _ => None,
        };
        let mut figure = Figure::new(series).with_grid();
        figure.x_limits = limits;
        ctx.decorate(&mut figure);
        Ok(figure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coatingtk_core::{codes, ConfigStore, ConfigValue, Scale};
    use coatingtk_materials::MaterialLibrary;

    fn evaluate(store: &ConfigStore) -> Result<Figure, CoatingError> {
        let ml = MaterialLibrary::with_builtin();
        let stack = CoatingStack::from_config(store, &ml)?;
        let panel = IndexProfile.option_panel()?;
        let ctx = AnalysisContext::new(store, &panel);
        let series = IndexProfile.compute(&stack, &ctx)?;
        IndexProfile.render(series, &ctx)
    }

    fn layers(rows: &[(&str, f64)]) -> ConfigValue {
        ConfigValue::List(
            rows.iter()
                .map(|(m, t)| ConfigValue::List(vec![ConfigValue::from(*m), ConfigValue::Number(*t)]))
                .collect(),
        )
    }

    #[test]
    fn test_profile_follows_layers() {
        let mut store = ConfigStore::with_defaults();
        store.set("coating.substrate", "1.5");
        store.set("coating.layers", layers(&[("Ta2O5", 100.0), ("2.5", 100.0)]));
        store.set("xaxis.steps", 5_i64);
        store.set("yaxis.scale", "lin");

        let figure = evaluate(&store).unwrap();
        let series = &figure.series[0];
        assert_eq!(series.x, vec![0.0, 50.0, 100.0, 150.0, 200.0]);
        // the top point sits on the superstrate interface
        assert_eq!(series.y, vec![2.09, 2.09, 2.5, 2.5, 1.0]);
        assert_eq!(figure.x_limits, Some([0.0, 200.0]));
        assert_eq!(figure.y_scale, Scale::Lin);
    }

    #[test]
    fn test_empty_stack_spans_one_wavelength() {
        let mut store = ConfigStore::with_defaults();
        store.set("xaxis.steps", 3_i64);
        store.set("xaxis.limits", "user");
        store.set("xaxis.min", -100.0);
        store.set("xaxis.max", 100.0);
        let figure = evaluate(&store).unwrap();
        assert_eq!(figure.series[0].x, vec![-100.0, 0.0, 100.0]);
        assert!((figure.series[0].y[0] - 1.4496).abs() < 1e-3);
        assert_eq!(figure.series[0].y[1], 1.0);

        store.set("xaxis.limits", "auto");
        let figure = evaluate(&store).unwrap();
        assert_eq!(figure.series[0].x, vec![0.0, 532.0, 1064.0]);
    }

    #[test]
    fn test_invalid_range() {
        let mut store = ConfigStore::with_defaults();
        store.set("xaxis.limits", "user");
        store.set("xaxis.min", 10.0);
        store.set("xaxis.max", 10.0);
        assert_eq!(evaluate(&store).unwrap_err().code, codes::INVALID_RANGE);
    }
}
