//! Restricted configuration access for facets and plugins

use crate::OptionPanel;
use coatingtk_core::{CoatingError, ConfigStore, ConfigValue, Figure};

/// Read-only window onto the configuration, limited to declared keys
#[derive(Debug, Clone, Copy)]
pub struct ConfigView<'a> {
    store: &'a ConfigStore,
    keys: &'a [&'static str],
}

impl<'a> ConfigView<'a> {
    pub fn new(store: &'a ConfigStore, keys: &'a [&'static str]) -> Self {
        Self { store, keys }
    }

    pub fn keys(&self) -> &[&'static str] {
        self.keys
    }

    pub fn allows(&self, key: &str) -> bool {
        self.keys.iter().any(|k| *k == key)
    }

    /// `UNKNOWN_KEY` outside the declared keys; `None` if declared but unset
    pub fn get_opt(&self, key: &str) -> Result<Option<&'a ConfigValue>, CoatingError> {
        if !self.allows(key) {
            return Err(CoatingError::unknown_key(key));
        }
        Ok(self.store.get(key).filter(|v| !v.is_null()))
    }

    pub fn get(&self, key: &str) -> Result<&'a ConfigValue, CoatingError> {
        self.get_opt(key)?
            .ok_or_else(|| CoatingError::unknown_key(key).with_suggestion("The key is declared but has no value"))
    }

    pub fn get_f64(&self, key: &str) -> Result<f64, CoatingError> {
        self.get(key)?.require_f64(key)
    }

    pub fn get_int(&self, key: &str) -> Result<i64, CoatingError> {
        self.get(key)?.require_int(key)
    }

    pub fn get_text(&self, key: &str) -> Result<&'a str, CoatingError> {
        self.get(key)?.require_text(key)
    }

    /// Value for widget initialisation, `fallback` when unset or unreadable
    pub fn value_or(&self, key: &str, fallback: impl Into<ConfigValue>) -> ConfigValue {
        match self.get_opt(key) {
            Ok(Some(v)) => v.clone(),
            _ => fallback.into(),
        }
    }
}

/// Evaluation context handed to `compute` and `render`
pub struct AnalysisContext<'a> {
    store: &'a ConfigStore,
    panel: &'a OptionPanel,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(store: &'a ConfigStore, panel: &'a OptionPanel) -> Self {
        Self { store, panel }
    }

    /// View over every key the plugin's panel declares
    pub fn config(&self) -> ConfigView<'a> {
        ConfigView::new(self.store, self.panel.keys())
    }

    pub fn panel(&self) -> &'a OptionPanel {
        self.panel
    }

    /// Let every facet of the panel adjust the figure
    pub fn decorate(&self, figure: &mut Figure) {
        self.panel.decorate(figure, self.store);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coatingtk_core::codes;

    const KEYS: &[&str] = &["xaxis.min", "xaxis.max"];

    #[test]
    fn test_view_rejects_undeclared_keys() {
        let store = ConfigStore::with_defaults();
        let view = ConfigView::new(&store, KEYS);
        assert_eq!(view.get_f64("xaxis.min").unwrap(), 1.0);
        let err = view.get("xaxis.steps").unwrap_err();
        assert_eq!(err.code, codes::UNKNOWN_KEY);
        assert!(store.contains("xaxis.steps"));
    }

    #[test]
    fn test_view_declared_but_unset() {
        let store = ConfigStore::new();
        let view = ConfigView::new(&store, KEYS);
        assert_eq!(view.get_opt("xaxis.max").unwrap(), None);
        assert!(view.get("xaxis.max").is_err());
        assert_eq!(view.value_or("xaxis.max", 5.0), ConfigValue::Number(5.0));
    }

    #[test]
    fn test_view_type_error() {
        let mut store = ConfigStore::new();
        store.set("xaxis.min", "low");
        let view = ConfigView::new(&store, KEYS);
        assert_eq!(view.get_f64("xaxis.min").unwrap_err().code, codes::TYPE_ERROR);
        assert_eq!(view.get_text("xaxis.min").unwrap(), "low");
    }
}
