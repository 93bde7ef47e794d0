//! Option panels composed from facets

use crate::{ConfigFacet, ConfigView, FacetMeta, FacetState};
use coatingtk_core::{CoatingError, ConfigStore, ConfigValue, Figure};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Initial state of a whole panel, one entry per facet in panel order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelState {
    pub plugin: &'static str,
    pub facets: Vec<FacetState>,
}

impl PanelState {
    /// Current value of a field, searching every facet
    pub fn value(&self, key: &str) -> Option<&ConfigValue> {
        self.facets.iter().find_map(|f| f.get(key))
    }
}

/// Ordered facets plus an optional plugin-specific tail.
///
/// Every key is owned by exactly one facet.
pub struct OptionPanel {
    plugin_id: &'static str,
    facets: Vec<Arc<dyn ConfigFacet>>,
    has_tail: bool,
    keys: Vec<&'static str>,
    owners: HashMap<&'static str, usize>,
}

impl OptionPanel {
    /// Fails with `DUPLICATE_KEY` if two facets claim the same key
    pub fn compose(
        plugin_id: &'static str,
        facets: Vec<Arc<dyn ConfigFacet>>,
        tail: Option<Arc<dyn ConfigFacet>>,
    ) -> Result<Self, CoatingError> {
        let has_tail = tail.is_some();
        let facets: Vec<Arc<dyn ConfigFacet>> = facets.into_iter().chain(tail).collect();

        let mut keys = Vec::new();
        let mut owners = HashMap::new();
        for (i, facet) in facets.iter().enumerate() {
            for &key in facet.meta().keys {
                if owners.insert(key, i).is_some() {
                    return Err(CoatingError::duplicate_key(key));
                }
                keys.push(key);
            }
        }

        debug!(plugin = plugin_id, facets = facets.len(), keys = keys.len(), "composed option panel");
        Ok(Self { plugin_id, facets, has_tail, keys, owners })
    }

    pub fn plugin_id(&self) -> &'static str {
        self.plugin_id
    }

    /// Every key of every facet, in panel order
    pub fn keys(&self) -> &[&'static str] {
        &self.keys
    }

    pub fn facets(&self) -> Vec<FacetMeta> {
        self.facets.iter().map(|f| f.meta()).collect()
    }

    pub fn tail(&self) -> Option<FacetMeta> {
        if self.has_tail {
            self.facets.last().map(|f| f.meta())
        } else {
            None
        }
    }

    pub fn owns(&self, key: &str) -> bool {
        self.owners.contains_key(key)
    }

    /// Initialise each facet once, top to bottom, tail last
    pub fn initialise(&self, store: &ConfigStore) -> PanelState {
        let facets = self
            .facets
            .iter()
            .map(|facet| {
                let meta = facet.meta();
                facet.initialise(&ConfigView::new(store, meta.keys))
            })
            .collect();
        PanelState { plugin: self.plugin_id, facets }
    }

    /// Route raw input to the owning facet and store the parsed value
    pub fn edit(&self, store: &mut ConfigStore, key: &str, raw: &str) -> Result<ConfigValue, CoatingError> {
        let owner = self
            .owners
            .get(key)
            .map(|&i| &self.facets[i])
            .ok_or_else(|| CoatingError::unknown_key(key))?;
        let value = owner.on_user_edit(key, raw)?;
        debug!(plugin = self.plugin_id, key, value = %value, "option edited");
        store.set(key, value.clone());
        Ok(value)
    }

    pub fn decorate(&self, figure: &mut Figure, store: &ConfigStore) {
        for facet in &self.facets {
            let meta = facet.meta();
            facet.decorate(figure, &ConfigView::new(store, meta.keys));
        }
    }
}

impl fmt::Debug for OptionPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionPanel")
            .field("plugin_id", &self.plugin_id)
            .field("facets", &self.facets().iter().map(|m| m.name).collect::<Vec<_>>())
            .field("keys", &self.keys)
            .finish()
    }
}
