//! Configuration values
//!
//! Values are stored untagged so a configuration file reads as plain JSON.

use crate::CoatingError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single value in the configuration store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Number(f64),
    Text(String),
    List(Vec<ConfigValue>),
    Null,
}

impl ConfigValue {
    // ========== Safe Accessors (never panic) ==========

    /// Numeric value, integers widen to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Number(n) => Some(*n),
            ConfigValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            ConfigValue::Number(n) if n.fract() == 0.0 && n.is_finite() => Some(*n as i64),
            _ => None,
        }
    }

    /// Non-negative integer, e.g. a row index
    pub fn as_usize(&self) -> Option<usize> {
        self.as_int().and_then(|i| usize::try_from(i).ok())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    /// Material references may be stored as a name or as a bare refractive index
    pub fn as_material_name(&self) -> Option<String> {
        match self {
            ConfigValue::Text(s) => Some(s.trim().to_string()),
            ConfigValue::Number(_) | ConfigValue::Int(_) => Some(self.to_string()),
            _ => None,
        }
    }

    /// Type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Bool(_) => "Bool",
            ConfigValue::Int(_) => "Int",
            ConfigValue::Number(_) => "Number",
            ConfigValue::Text(_) => "Text",
            ConfigValue::List(_) => "List",
            ConfigValue::Null => "Null",
        }
    }

    // ========== Checked Conversions ==========

    pub fn require_f64(&self, key: &str) -> Result<f64, CoatingError> {
        self.as_f64()
            .ok_or_else(|| CoatingError::type_error(key, "Number", self.type_name()))
    }

    pub fn require_int(&self, key: &str) -> Result<i64, CoatingError> {
        self.as_int()
            .ok_or_else(|| CoatingError::type_error(key, "Int", self.type_name()))
    }

    pub fn require_text(&self, key: &str) -> Result<&str, CoatingError> {
        self.as_text()
            .ok_or_else(|| CoatingError::type_error(key, "Text", self.type_name()))
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(b) => write!(f, "{}", b),
            ConfigValue::Int(i) => write!(f, "{}", i),
            ConfigValue::Number(n) => write!(f, "{}", n),
            ConfigValue::Text(s) => write!(f, "{}", s),
            ConfigValue::List(l) => {
                write!(f, "[")?;
                for (i, v) in l.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            ConfigValue::Null => write!(f, "null"),
        }
    }
}

impl From<f64> for ConfigValue {
    fn from(n: f64) -> Self {
        ConfigValue::Number(n)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Int(i)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::Text(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::Text(s)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(l: Vec<ConfigValue>) -> Self {
        ConfigValue::List(l)
    }
}
