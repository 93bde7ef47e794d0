//! Configuration store
//!
//! A flat map of dotted paths (`"xaxis.steps"`) to values, with a single
//! global change callback. Several writes that belong to one user action are
//! grouped with [`ConfigStore::batch`], which fires exactly one notification
//! when the outermost batch completes.

use crate::{CoatingError, ConfigValue};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Errors from loading configuration documents
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration root must be an object")]
    NotAnObject,
}

type ChangeCallback = Box<dyn FnMut()>;

/// Shared, single-writer configuration store
#[derive(Default)]
pub struct ConfigStore {
    values: BTreeMap<String, ConfigValue>,
    callback: Option<ChangeCallback>,
    batch_depth: usize,
    pending: bool,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with every key the standard plots and the stack read
    pub fn with_defaults() -> Self {
        let mut store = Self::new();
        for (key, value) in default_entries() {
            store.values.insert(key.to_string(), value);
        }
        store
    }

    /// Build a store from a JSON document, nested objects become dotted paths
    pub fn from_json(json: &str) -> Result<Self, CoatingError> {
        let mut store = Self::new();
        store.merge_json(json)?;
        Ok(store)
    }

    /// Overlay a JSON document on the current values without notifying
    pub fn merge_json(&mut self, json: &str) -> Result<(), CoatingError> {
        let root: JsonValue = serde_json::from_str(json).map_err(ConfigError::from)?;
        let JsonValue::Object(map) = root else {
            return Err(ConfigError::NotAnObject.into());
        };
        let mut flat = Vec::new();
        flatten("", &map, &mut flat)?;
        debug!(keys = flat.len(), "merging configuration document");
        self.values.extend(flat);
        Ok(())
    }

    /// Re-nest the dotted paths into a JSON document
    pub fn to_json(&self) -> JsonValue {
        let mut root = Map::new();
        for (key, value) in &self.values {
            let parts: Vec<&str> = key.split('.').collect();
            let json = serde_json::to_value(value).unwrap_or(JsonValue::Null);
            insert_path(&mut root, &parts, json);
        }
        JsonValue::Object(root)
    }

    pub fn get(&self, path: &str) -> Option<&ConfigValue> {
        self.values.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.values.contains_key(path)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Write a value; notifies now, or once at the end of the enclosing batch
    pub fn set(&mut self, path: &str, value: impl Into<ConfigValue>) {
        self.values.insert(path.to_string(), value.into());
        self.pending = true;
        if self.batch_depth == 0 {
            self.notify();
        }
    }

    /// Install the single global change callback, replacing any previous one
    pub fn set_callback(&mut self, callback: impl FnMut() + 'static) {
        self.callback = Some(Box::new(callback));
    }

    /// Run several writes as one logical change
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.batch_depth += 1;
        let result = f(self);
        self.batch_depth -= 1;
        if self.batch_depth == 0 && self.pending {
            self.notify();
        }
        result
    }

    fn notify(&mut self) {
        self.pending = false;
        if let Some(callback) = self.callback.as_mut() {
            callback();
        }
    }
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore")
            .field("values", &self.values)
            .field("has_callback", &self.callback.is_some())
            .field("batch_depth", &self.batch_depth)
            .finish()
    }
}

fn flatten(
    prefix: &str,
    map: &Map<String, JsonValue>,
    out: &mut Vec<(String, ConfigValue)>,
) -> Result<(), CoatingError> {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            JsonValue::Object(inner) => flatten(&path, inner, out)?,
            other => {
                let value: ConfigValue = serde_json::from_value(other.clone())
                    .map_err(|e| CoatingError::parse_error(format!("{}: {}", path, e)))?;
                out.push((path, value));
            }
        }
    }
    Ok(())
}

fn insert_path(node: &mut Map<String, JsonValue>, parts: &[&str], value: JsonValue) {
    match parts {
        [] => {}
        [leaf] => {
            node.insert(leaf.to_string(), value);
        }
        [head, rest @ ..] => {
            let child = node
                .entry(head.to_string())
                .or_insert_with(|| JsonValue::Object(Map::new()));
            if !child.is_object() {
                *child = JsonValue::Object(Map::new());
            }
            if let JsonValue::Object(inner) = child {
                insert_path(inner, rest, value);
            }
        }
    }
}

fn default_entries() -> Vec<(&'static str, ConfigValue)> {
    vec![
        ("coating.superstrate", "1.0".into()),
        ("coating.substrate", "SiO2".into()),
        ("coating.lambda0", 1064.0.into()),
        ("coating.AOI", 0.0.into()),
        ("coating.layers", ConfigValue::List(Vec::new())),
        ("plot.plottype", "brownian_noise".into()),
        ("xaxis.scale", "log".into()),
        ("xaxis.limits", "auto".into()),
        ("xaxis.min", 1.0.into()),
        ("xaxis.max", 1e4.into()),
        ("xaxis.steps", 100i64.into()),
        ("yaxis.scale", "log".into()),
        ("yaxis.limits", "auto".into()),
        ("yaxis.min", 1e-20.into()),
        ("yaxis.max", 1e-17.into()),
        ("analysis.temperature", 290.0.into()),
        ("analysis.beam_size", 200.0.into()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_store() -> (ConfigStore, Rc<Cell<usize>>) {
        let mut store = ConfigStore::with_defaults();
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        store.set_callback(move || seen.set(seen.get() + 1));
        (store, count)
    }

    #[test]
    fn test_defaults_present() {
        let store = ConfigStore::with_defaults();
        assert_eq!(store.get("xaxis.limits").and_then(|v| v.as_text()), Some("auto"));
        assert_eq!(store.get("xaxis.steps").and_then(|v| v.as_int()), Some(100));
        assert_eq!(store.get("coating.lambda0").and_then(|v| v.as_f64()), Some(1064.0));
    }

    #[test]
    fn test_set_notifies_once() {
        let (mut store, count) = counting_store();
        store.set("xaxis.min", 5.0);
        assert_eq!(count.get(), 1);
        store.set("xaxis.max", 50.0);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_batch_notifies_once() {
        let (mut store, count) = counting_store();
        store.batch(|s| {
            s.set("xaxis.limits", "user");
            s.set("xaxis.min", 10.0);
            s.batch(|inner| inner.set("xaxis.max", 100.0));
        });
        assert_eq!(count.get(), 1);
        assert_eq!(store.get("xaxis.max").and_then(|v| v.as_f64()), Some(100.0));
    }

    #[test]
    fn test_empty_batch_is_silent() {
        let (mut store, count) = counting_store();
        let value = store.batch(|_| 42);
        assert_eq!(value, 42);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_merge_json_flattens() {
        let mut store = ConfigStore::with_defaults();
        store
            .merge_json(r#"{"coating": {"substrate": "Ta2O5", "layers": [["SiO2", 183.5]]}, "xaxis": {"steps": 50}}"#)
            .unwrap();
        assert_eq!(store.get("coating.substrate").and_then(|v| v.as_text()), Some("Ta2O5"));
        assert_eq!(store.get("xaxis.steps").and_then(|v| v.as_int()), Some(50));
        let layers = store.get("coating.layers").and_then(|v| v.as_list()).unwrap();
        assert_eq!(layers.len(), 1);
    }

    #[test]
    fn test_merge_json_rejects_non_object() {
        let mut store = ConfigStore::new();
        let err = store.merge_json("[1, 2]").unwrap_err();
        assert_eq!(err.code, crate::codes::PARSE_ERROR);
        assert!(store.merge_json("{not json").is_err());
    }

    #[test]
    fn test_to_json_nests() {
        let store = ConfigStore::with_defaults();
        let json = store.to_json();
        assert_eq!(json["xaxis"]["limits"], "auto");
        assert_eq!(json["coating"]["lambda0"], 1064.0);
        let back = ConfigStore::from_json(&json.to_string()).unwrap();
        assert_eq!(back.get("yaxis.scale").and_then(|v| v.as_text()), Some("log"));
    }
}
