//! Container engine client for burrow
//!
//! An abstraction over the container runtime with the handful of
//! operations the environment lifecycle needs. The one implementation
//! talks to the Docker Engine API through bollard; anything speaking
//! that API (a Podman socket, for instance) works unchanged.

mod docker;
mod error;
mod types;

pub use docker::DockerEngine;
pub use error::*;
pub use types::*;

use async_trait::async_trait;

/// Trait over the container runtime operations burrow uses.
///
/// Every call goes to the live engine; implementations must not cache
/// container state between calls.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Check that the engine is reachable.
    async fn ping(&self) -> Result<()>;

    /// Look up a managed container by exact name.
    async fn find(&self, name: &str) -> Result<Option<ContainerRecord>>;

    /// Create a container, pulling the image on first use.
    async fn create(&self, spec: &CreateSpec) -> Result<ContainerRef>;

    /// Start a container. Already running counts as success.
    async fn start(&self, id: &ContainerRef) -> Result<()>;

    /// Stop a container. Already stopped counts as success.
    async fn stop(&self, id: &ContainerRef) -> Result<()>;

    /// Remove a container, killing it first if it is still up.
    async fn remove(&self, id: &ContainerRef) -> Result<()>;

    /// List managed containers. `all` includes stopped ones.
    async fn list(&self, all: bool) -> Result<Vec<ContainerRecord>>;
}

/// Default engine socket path for the platform.
pub fn default_socket() -> String {
    default_socket_impl()
}

#[cfg(windows)]
fn default_socket_impl() -> String {
    "//./pipe/docker_engine".to_string()
}

#[cfg(not(windows))]
fn default_socket_impl() -> String {
    "/var/run/docker.sock".to_string()
}

/// Connect to the engine, over `socket` when given, otherwise over the
/// platform default path.
pub async fn connect(socket: Option<&str>) -> Result<Box<dyn ContainerEngine>> {
    let socket = match socket {
        Some(path) => path.to_string(),
        None => default_socket(),
    };
    let engine = DockerEngine::new(&socket).await?;
    Ok(Box::new(engine))
}
