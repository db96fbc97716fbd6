//! Common types for container engines

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Label marking containers under burrow management.
pub const MANAGED_LABEL: &str = "burrow.managed";

/// Label carrying the environment name a container belongs to.
pub const ENV_LABEL: &str = "burrow.env";

/// Opaque handle to an engine-side container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerRef(pub String);

impl ContainerRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn short(&self) -> &str {
        if self.0.len() > 12 {
            &self.0[..12]
        } else {
            &self.0
        }
    }
}

impl std::fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ContainerRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Raw container state as the engine reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineStatus {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
    Unknown,
}

impl EngineStatus {
    /// Whether the container counts as up for lifecycle purposes.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running | Self::Paused | Self::Restarting)
    }
}

impl std::fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
            Self::Restarting => write!(f, "restarting"),
            Self::Removing => write!(f, "removing"),
            Self::Exited => write!(f, "exited"),
            Self::Dead => write!(f, "dead"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl From<&str> for EngineStatus {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "created" => Self::Created,
            "running" => Self::Running,
            "paused" => Self::Paused,
            "restarting" => Self::Restarting,
            "removing" => Self::Removing,
            "exited" => Self::Exited,
            "dead" => Self::Dead,
            _ => Self::Unknown,
        }
    }
}

/// Container summary as reported by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub id: ContainerRef,
    pub name: String,
    pub image: String,
    pub status: EngineStatus,
    pub created: i64,
    pub labels: HashMap<String, String>,
}

/// Everything needed to create a container.
#[derive(Debug, Clone, Default)]
pub struct CreateSpec {
    /// Engine-side container name.
    pub name: String,
    /// Image reference to create from.
    pub image: String,
    /// Hostname inside the container.
    pub hostname: Option<String>,
    /// Command override; None keeps the image default.
    pub command: Option<Vec<String>>,
    /// Bind mounts from the host.
    pub mounts: Vec<MountSpec>,
    /// Published TCP ports.
    pub ports: Vec<PortMapping>,
    /// Labels to apply.
    pub labels: HashMap<String, String>,
    /// Allocate a TTY.
    pub tty: bool,
    /// Keep stdin open.
    pub stdin_open: bool,
}

/// A bind mount from host into container.
#[derive(Debug, Clone)]
pub struct MountSpec {
    pub source: PathBuf,
    pub target: String,
    pub read_only: bool,
}

/// A published TCP port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortMapping {
    pub container_port: u16,
    pub host_port: u16,
}
