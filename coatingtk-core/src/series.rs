//! Rendering-agnostic analysis output

use serde::{Deserialize, Serialize};

/// One computed curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub x_label: String,
    pub y_label: String,
    pub legend: String,
}

impl Series {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            x,
            y,
            x_label: String::new(),
            y_label: String::new(),
            legend: String::new(),
        }
    }

    pub fn with_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn with_legend(mut self, legend: impl Into<String>) -> Self {
        self.legend = legend.into();
        self
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Axis scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    #[default]
    Lin,
    Log,
}

impl Scale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scale::Lin => "lin",
            Scale::Log => "log",
        }
    }

    pub fn parse(s: &str) -> Option<Scale> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lin" => Some(Scale::Lin),
            "log" => Some(Scale::Log),
            _ => None,
        }
    }
}

/// Everything an external renderer needs to draw one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub series: Vec<Series>,
    pub x_scale: Scale,
    pub y_scale: Scale,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_limits: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_limits: Option<[f64; 2]>,
    pub grid: bool,
}

impl Figure {
    pub fn new(series: Series) -> Self {
        Self {
            series: vec![series],
            x_scale: Scale::Lin,
            y_scale: Scale::Lin,
            x_limits: None,
            y_limits: None,
            grid: false,
        }
    }

    pub fn loglog(mut self) -> Self {
        self.x_scale = Scale::Log;
        self.y_scale = Scale::Log;
        self
    }

    pub fn with_grid(mut self) -> Self {
        self.grid = true;
        self
    }

    pub fn with_x_limits(mut self, limits: [f64; 2]) -> Self {
        self.x_limits = Some(limits);
        self
    }

    /// Label of the x axis, taken from the first series
    pub fn x_label(&self) -> &str {
        self.series.first().map(|s| s.x_label.as_str()).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(Series::is_empty)
    }
}
