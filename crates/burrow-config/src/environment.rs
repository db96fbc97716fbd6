//! Persisted environment metadata
//!
//! Every created environment gets an `[env.<name>]` table recording the
//! image and host mount it was created with. Environments are machine
//! scoped, so writes always land in the user document; reads still go
//! through the merged view.

use crate::store::ENV_SECTION;
use crate::{ConfigError, ConfigStore, Result, Scope};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Metadata persisted for a named environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Image the container was created from.
    pub image: String,
    /// Host path mounted into the container.
    pub mount_path: PathBuf,
    /// When the environment was first created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

impl ConfigStore {
    /// Metadata for one environment, or None when it is not registered.
    pub fn environment(&self, name: &str) -> Result<Option<EnvironmentConfig>> {
        let value = match self.get(ENV_SECTION, name) {
            Some(value) => value.clone(),
            None => return Ok(None),
        };
        value
            .try_into()
            .map(Some)
            .map_err(|e| ConfigError::Invalid(format!("environment '{}': {}", name, e)))
    }

    /// All registered environments by name.
    pub fn environments(&self) -> Result<BTreeMap<String, EnvironmentConfig>> {
        let mut all = BTreeMap::new();
        for name in self.section(ENV_SECTION).keys() {
            if let Some(env) = self.environment(name)? {
                all.insert(name.clone(), env);
            }
        }
        Ok(all)
    }

    pub fn set_environment(&mut self, name: &str, env: &EnvironmentConfig) -> Result<()> {
        let value =
            toml::Value::try_from(env).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.set(Scope::User, ENV_SECTION, name, value)
    }

    pub fn remove_environment(&mut self, name: &str) -> bool {
        self.remove(Scope::User, ENV_SECTION, name).is_some()
    }
}
