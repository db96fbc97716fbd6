//! Environment lifecycle manager

use crate::{CoreError, Environment, EnvironmentRegistry, Result};
use burrow_config::{ConfigStore, EnvironmentConfig, Scope};
use burrow_engine::{
    ContainerEngine, CreateSpec, MountSpec, PortMapping, ENV_LABEL, MANAGED_LABEL,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Where the project tree lands inside every environment.
pub const CONTAINER_SRC_PATH: &str = "/src";

/// Host engine socket, mounted when `with_docker` is set.
const DOCKER_SOCKET_PATH: &str = "/var/run/docker.sock";

/// Options for creating an environment.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Image override; falls back to `[image] default`.
    pub image: Option<String>,
    /// Host mount source; falls back to the project root.
    pub mount: Option<PathBuf>,
    /// Container command override; falls back to `[image] command`.
    pub command: Option<Vec<String>>,
    /// Mount the host engine socket into the environment.
    pub with_docker: bool,
    /// Start the environment right after creating it.
    pub start: bool,
}

/// Drives environments through the Absent/Created/Running/Stopped
/// state machine.
///
/// State is never cached: every operation re-queries the engine before
/// acting, because containers change hands outside the tool.
pub struct EnvironmentManager {
    store: ConfigStore,
    engine: Box<dyn ContainerEngine>,
}

impl EnvironmentManager {
    pub fn new(store: ConfigStore, engine: Box<dyn ContainerEngine>) -> Self {
        Self { store, engine }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn engine(&self) -> &dyn ContainerEngine {
        self.engine.as_ref()
    }

    pub fn registry(&self) -> EnvironmentRegistry<'_> {
        EnvironmentRegistry::new(&self.store, self.engine.as_ref())
    }

    /// Merged view for one name.
    pub async fn resolve(&self, name: &str) -> Result<Environment> {
        self.registry().resolve(name).await
    }

    /// Merged list of every known environment.
    pub async fn list(&self) -> Result<Vec<Environment>> {
        self.registry().list().await
    }

    /// Create `name`. Metadata is written only after the engine call
    /// succeeds, so a failed create leaves no record behind. Stale
    /// metadata from a lost container does not block; it is overwritten.
    pub async fn create(&mut self, name: &str, opts: &CreateOptions) -> Result<Environment> {
        if let Some(existing) = self.engine.find(name).await? {
            tracing::debug!("Create refused, container {} exists", existing.id.short());
            return Err(CoreError::AlreadyExists(name.to_string()));
        }

        let image = match opts.image.clone().or_else(|| self.store.default_image()) {
            Some(image) => image,
            None => {
                return Err(CoreError::Configuration(
                    "no image given and no [image] default configured".to_string(),
                ))
            }
        };

        let command = match &opts.command {
            Some(command) => Some(command.clone()),
            None => self.store.default_command()?,
        };

        let mount_path = match opts
            .mount
            .clone()
            .or_else(|| self.store.project_root().map(Path::to_path_buf))
        {
            Some(path) => path,
            None => {
                return Err(CoreError::Configuration(
                    "no mount path given and no project directory found".to_string(),
                ))
            }
        };

        let mut mounts = vec![MountSpec {
            source: mount_path.clone(),
            target: CONTAINER_SRC_PATH.to_string(),
            read_only: false,
        }];
        if opts.with_docker {
            mounts.push(MountSpec {
                source: PathBuf::from(DOCKER_SOCKET_PATH),
                target: DOCKER_SOCKET_PATH.to_string(),
                read_only: false,
            });
        }

        let ports = self
            .store
            .ports()?
            .into_iter()
            .map(|(container_port, host_port)| PortMapping {
                container_port,
                host_port,
            })
            .collect();

        let labels = HashMap::from([
            (MANAGED_LABEL.to_string(), "true".to_string()),
            (ENV_LABEL.to_string(), name.to_string()),
        ]);

        let spec = CreateSpec {
            name: name.to_string(),
            image: image.clone(),
            hostname: Some(name.to_string()),
            command,
            mounts,
            ports,
            labels,
            tty: true,
            stdin_open: true,
        };

        let id = self.engine.create(&spec).await?;
        tracing::info!("Created container {} for '{}'", id.short(), name);

        let metadata = EnvironmentConfig {
            image,
            mount_path,
            created: Some(chrono::Utc::now()),
        };
        self.store.set_environment(name, &metadata)?;
        self.store.save(Scope::User)?;

        if opts.start {
            self.start(name).await?;
        }

        self.resolve(name).await
    }

    /// Start `name`. Metadata without a live container is drift and an
    /// error; the tool never recreates a container behind the user's
    /// back.
    pub async fn start(&self, name: &str) -> Result<()> {
        let env = self.resolve(name).await?;
        if env.metadata.is_none() {
            return Err(CoreError::NotFound(name.to_string()));
        }
        let container = match &env.container {
            Some(container) => container,
            None => {
                return Err(CoreError::InconsistentState {
                    name: name.to_string(),
                    reason: "registered but the engine has no container; delete it and create \
                             again"
                        .to_string(),
                })
            }
        };

        self.engine.start(&container.id).await?;
        tracing::info!("Started '{}'", name);
        Ok(())
    }

    /// Stop `name`. Stopping an environment that is not running is a
    /// no-op, including when its container is gone entirely.
    pub async fn stop(&self, name: &str) -> Result<()> {
        let env = self.resolve(name).await?;
        if env.is_absent() {
            return Err(CoreError::NotFound(name.to_string()));
        }
        let container = match &env.container {
            Some(container) => container,
            None => {
                tracing::debug!("'{}' has no container, nothing to stop", name);
                return Ok(());
            }
        };
        if !container.status.is_running() {
            tracing::debug!("'{}' is not running", name);
            return Ok(());
        }

        self.engine.stop(&container.id).await?;
        tracing::info!("Stopped '{}'", name);
        Ok(())
    }

    /// Delete `name`: stop it when running, remove the container, drop
    /// the metadata. Metadata goes away even when the container is
    /// already gone.
    pub async fn delete(&mut self, name: &str) -> Result<()> {
        let env = self.resolve(name).await?;
        if env.is_absent() {
            return Err(CoreError::NotFound(name.to_string()));
        }

        if let Some(container) = &env.container {
            if container.status.is_running() {
                self.engine.stop(&container.id).await?;
                tracing::debug!("Stopped '{}' before removal", name);
            }
            self.engine.remove(&container.id).await?;
            tracing::info!("Removed container {} for '{}'", container.id.short(), name);
        }

        if self.store.remove_environment(name) {
            self.store.save(Scope::User)?;
        }
        Ok(())
    }
}
