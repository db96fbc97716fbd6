//! Name resolution against both sources of truth
//!
//! The registry answers "does environment X exist, and in what state"
//! by combining config metadata with a live engine lookup. It never
//! repairs drift; it only reports it.

use crate::{Environment, Result};
use burrow_config::ConfigStore;
use burrow_engine::{ContainerEngine, ContainerRecord};
use std::collections::{BTreeSet, HashMap};

/// Read-only view over the config store and the engine.
pub struct EnvironmentRegistry<'a> {
    store: &'a ConfigStore,
    engine: &'a dyn ContainerEngine,
}

impl<'a> EnvironmentRegistry<'a> {
    pub fn new(store: &'a ConfigStore, engine: &'a dyn ContainerEngine) -> Self {
        Self { store, engine }
    }

    /// Merged view for one name. Queries the engine live on every call.
    pub async fn resolve(&self, name: &str) -> Result<Environment> {
        let metadata = self.store.environment(name)?;
        let container = self.engine.find(name).await?;
        Ok(Environment::new(name.to_string(), metadata, container))
    }

    /// Every environment either side knows about, sorted by name.
    pub async fn list(&self) -> Result<Vec<Environment>> {
        let configured = self.store.environments()?;
        let containers = self.engine.list(true).await?;

        let mut names: BTreeSet<String> = configured.keys().cloned().collect();
        for record in &containers {
            names.insert(record.name.clone());
        }

        let mut by_name: HashMap<String, ContainerRecord> = containers
            .into_iter()
            .map(|record| (record.name.clone(), record))
            .collect();

        Ok(names
            .into_iter()
            .map(|name| {
                let metadata = configured.get(&name).cloned();
                let container = by_name.remove(&name);
                Environment::new(name, metadata, container)
            })
            .collect())
    }
}
