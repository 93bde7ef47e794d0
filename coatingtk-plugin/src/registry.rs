//! Plugin Registry

use crate::{AnalysisPlugin, PluginMeta};
use coatingtk_core::CoatingError;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Central plugin registry, in registration order
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn AnalysisPlugin>>,
    index: HashMap<&'static str, usize>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with `DUPLICATE_PLUGIN_ID` if the id is taken
    pub fn register<P: AnalysisPlugin + 'static>(&mut self, plugin: P) -> Result<(), CoatingError> {
        self.register_arc(Arc::new(plugin))
    }

    pub fn register_arc(&mut self, plugin: Arc<dyn AnalysisPlugin>) -> Result<(), CoatingError> {
        let id = plugin.meta().id;
        if self.index.contains_key(id) {
            return Err(CoatingError::duplicate_plugin_id(id));
        }
        debug!(plugin = id, "registering analysis plugin");
        self.index.insert(id, self.plugins.len());
        self.plugins.push(plugin);
        Ok(())
    }

    pub fn with_plugin<P: AnalysisPlugin + 'static>(mut self, plugin: P) -> Result<Self, CoatingError> {
        self.register(plugin)?;
        Ok(self)
    }

    /// Fails with `UNKNOWN_PLUGIN_ID`, suggesting similar ids
    pub fn get(&self, id: &str) -> Result<Arc<dyn AnalysisPlugin>, CoatingError> {
        match self.index.get(id) {
            Some(&i) => Ok(self.plugins[i].clone()),
            None => {
                let mut err = CoatingError::unknown_plugin_id(id);
                let similar = self.find_similar(id);
                if !similar.is_empty() {
                    err = err.with_suggestion(format!("Similar: {}", similar.join(", ")));
                }
                Err(err)
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Metadata of every plugin, in registration order
    pub fn list(&self) -> Vec<PluginMeta> {
        self.plugins.iter().map(|p| p.meta()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    fn find_similar(&self, id: &str) -> Vec<&'static str> {
        let query = id.to_lowercase();
        let mut matches: Vec<(&'static str, usize)> = self
            .plugins
            .iter()
            .map(|p| p.meta().id)
            .filter_map(|candidate| {
                let score = similarity_score(&query, candidate);
                (score > 0).then_some((candidate, score))
            })
            .collect();
        matches.sort_by(|a, b| b.1.cmp(&a.1));
        matches.into_iter().take(3).map(|(id, _)| id).collect()
    }
}

/// Prefix and substring matches dominate; shared characters break ties
fn similarity_score(query: &str, candidate: &str) -> usize {
    if query.is_empty() {
        return 0;
    }
    let mut score = if candidate.starts_with(query) {
        100
    } else if candidate.contains(query) {
        50
    } else if query.contains(candidate) {
        30
    } else {
        0
    };

    let query_chars: HashSet<char> = query.chars().collect();
    let candidate_chars: HashSet<char> = candidate.chars().collect();
    let common = query_chars.intersection(&candidate_chars).count();
    // Require real overlap before anything counts
    if score == 0 && common * 2 < candidate_chars.len() {
        return 0;
    }
    score += common * 2;
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnalysisContext;
    use coatingtk_core::{codes, CoatingStack, Series};

    struct Dummy(&'static str);

    impl AnalysisPlugin for Dummy {
        fn meta(&self) -> PluginMeta {
            PluginMeta { id: self.0, description: "Dummy" }
        }

        fn compute(&self, _stack: &CoatingStack, _ctx: &AnalysisContext<'_>) -> Result<Series, CoatingError> {
            Ok(Series::new(vec![], vec![]))
        }
    }

    #[test]
    fn test_registration_order() {
        let registry = PluginRegistry::new()
            .with_plugin(Dummy("zeta"))
            .unwrap()
            .with_plugin(Dummy("alpha"))
            .unwrap();
        let ids: Vec<_> = registry.list().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["zeta", "alpha"]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("alpha").unwrap().meta().id, "alpha");
    }

    #[test]
    fn test_duplicate_id() {
        let mut registry = PluginRegistry::new();
        registry.register(Dummy("brownian_noise")).unwrap();
        let err = registry.register(Dummy("brownian_noise")).unwrap_err();
        assert_eq!(err.code, codes::DUPLICATE_PLUGIN_ID);
        assert!(err.is_fatal());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_id_suggests() {
        let registry = PluginRegistry::new().with_plugin(Dummy("brownian_noise")).unwrap();
        let err = registry.get("brownian").err().unwrap();
        assert_eq!(err.code, codes::UNKNOWN_PLUGIN_ID);
        assert!(err.suggestion.unwrap().contains("brownian_noise"));

        let err = registry.get("xyz").err().unwrap();
        assert!(!err.suggestion.unwrap().contains("Similar"));
    }
}
