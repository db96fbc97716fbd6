//! The merged environment view
//!
//! An environment can be known to the config store, to the engine, or
//! both. `Environment` carries what each side reported; lifecycle state
//! and any drift fall out of the combination.

use burrow_config::EnvironmentConfig;
use burrow_engine::{ContainerRecord, EngineStatus};
use serde::Serialize;
use std::path::Path;

/// Lifecycle state of an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvState {
    Absent,
    Created,
    Running,
    Stopped,
}

impl std::fmt::Display for EnvState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Created => write!(f, "created"),
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

impl From<EngineStatus> for EnvState {
    fn from(status: EngineStatus) -> Self {
        match status {
            EngineStatus::Created => Self::Created,
            EngineStatus::Running | EngineStatus::Paused | EngineStatus::Restarting => {
                Self::Running
            }
            EngineStatus::Exited
            | EngineStatus::Dead
            | EngineStatus::Removing
            | EngineStatus::Unknown => Self::Stopped,
        }
    }
}

/// Disagreement between persisted metadata and live engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Drift {
    /// Metadata exists but the engine has no container.
    ContainerMissing,
    /// The engine has a managed container with no metadata.
    Unregistered,
}

/// Merged view of one environment, assembled by the registry.
#[derive(Debug, Clone, Serialize)]
pub struct Environment {
    pub name: String,
    pub metadata: Option<EnvironmentConfig>,
    pub container: Option<ContainerRecord>,
}

impl Environment {
    pub fn new(
        name: String,
        metadata: Option<EnvironmentConfig>,
        container: Option<ContainerRecord>,
    ) -> Self {
        Self {
            name,
            metadata,
            container,
        }
    }

    /// Lifecycle state, derived from the live container.
    pub fn state(&self) -> EnvState {
        match &self.container {
            Some(container) => EnvState::from(container.status),
            None => EnvState::Absent,
        }
    }

    /// The disagreement between the two sides, if any.
    pub fn drift(&self) -> Option<Drift> {
        match (&self.metadata, &self.container) {
            (Some(_), None) => Some(Drift::ContainerMissing),
            (None, Some(_)) => Some(Drift::Unregistered),
            _ => None,
        }
    }

    /// True when neither side knows the name.
    pub fn is_absent(&self) -> bool {
        self.metadata.is_none() && self.container.is_none()
    }

    /// Image reference; metadata wins, the engine record fills in for
    /// unregistered containers.
    pub fn image(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .map(|m| m.image.as_str())
            .or_else(|| self.container.as_ref().map(|c| c.image.as_str()))
    }

    pub fn mount_path(&self) -> Option<&Path> {
        self.metadata.as_ref().map(|m| m.mount_path.as_path())
    }
}
