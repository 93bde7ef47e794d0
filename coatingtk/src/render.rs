//! Plot data and stack formula export
//!
//! Writes a figure as an ASCII table: a `#` header with the x label and one
//! legend entry per series, then one tab-separated row per x value. A stack
//! formula lists the layers in deposition order with their optical
//! thickness in units of λ0.

use coatingtk_core::{CoatingError, CoatingStack, Figure, Series};

/// Display format for numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    /// Shortest text that reads back to the same value
    Shortest,
    /// Scientific notation with this many decimals
    Scientific(usize),
}

impl Default for NumberFormat {
    fn default() -> Self {
        NumberFormat::Scientific(8)
    }
}

/// Figure-to-text exporter
#[derive(Debug, Clone, Default)]
pub struct DataExporter {
    format: NumberFormat,
}

impl DataExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: NumberFormat) -> Self {
        self.format = format;
        self
    }

    /// Fails with `EMPTY_PLOT` when there is nothing to export. Series are
    /// assumed to share the x values of the first one.
    pub fn export(&self, figure: &Figure) -> Result<String, CoatingError> {
        let Some(first) = figure.series.first().filter(|_| !figure.is_empty()) else {
            return Err(CoatingError::empty_plot());
        };

        let mut header = vec![figure.x_label().to_string()];
        header.extend(figure.series.iter().map(legend));
        let mut output = format!("# {}\n", header.join("\t"));

        for (i, x) in first.x.iter().enumerate() {
            let mut row = vec![self.render_number(*x)];
            for series in &figure.series {
                row.push(series.y.get(i).map_or_else(|| "nan".to_string(), |y| self.render_number(*y)));
            }
            output.push_str(&row.join("\t"));
            output.push('\n');
        }
        Ok(output)
    }

    /// Layers from the substrate up, each with physical thickness (nm) and
    /// optical thickness `t · n(λ0) / λ0`
    pub fn export_formula(&self, stack: &CoatingStack) -> String {
        let lambda0 = stack.lambda0;
        let fractions: Vec<f64> = stack
            .layers
            .iter()
            .map(|layer| layer.thickness * layer.material.n(lambda0) / lambda0)
            .collect();

        let mut formula = vec![stack.substrate.name().to_string(), "|".to_string()];
        for (layer, fraction) in stack.layers.iter().zip(&fractions) {
            formula.push(format!("{}*{}", short_fraction(*fraction), layer.material.name()));
        }
        formula.push("|".to_string());
        formula.push(stack.superstrate.name().to_string());

        let mut output = format!("# lambda0 = {} nm\n", lambda0);
        output.push_str(&format!("# formula: {}\n", formula.join(" ")));
        output.push_str("# layer\tmaterial\tthickness (nm)\toptical thickness (lambda0)\n");
        for (i, (layer, fraction)) in stack.layers.iter().zip(&fractions).enumerate() {
            output.push_str(&format!(
                "{}\t{}\t{}\t{}\n",
                i + 1,
                layer.material.name(),
                self.render_number(layer.thickness),
                self.render_number(*fraction),
            ));
        }
        output
    }

    fn render_number(&self, value: f64) -> String {
        match self.format {
            NumberFormat::Shortest => value.to_string(),
            NumberFormat::Scientific(digits) => format!("{:.*e}", digits, value),
        }
    }
}

/// Four decimals, trailing zeros dropped
fn short_fraction(value: f64) -> String {
    let text = format!("{:.4}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn legend(series: &Series) -> String {
    if series.legend.is_empty() {
        series.y_label.clone()
    } else {
        series.legend.clone()
    }
}
