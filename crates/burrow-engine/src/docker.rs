//! Docker engine implementation using bollard

use crate::{
    ContainerEngine, ContainerRecord, ContainerRef, CreateSpec, EngineError, EngineStatus, Result,
    MANAGED_LABEL,
};
use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, ListContainersOptions, RemoveContainerOptions,
    StartContainerOptions, StopContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::service::{ContainerSummary, HostConfig, Mount, MountTypeEnum, PortBinding};
use bollard::Docker;
use futures::StreamExt;
use std::collections::HashMap;

/// Grace period the engine gives a container before killing it on stop.
const STOP_TIMEOUT_SECS: i64 = 1;

/// Docker engine client using the bollard crate.
pub struct DockerEngine {
    client: Docker,
}

impl DockerEngine {
    /// Connect to the daemon and verify the connection with a ping.
    pub async fn new(socket_path: &str) -> Result<Self> {
        let client = if socket_path.starts_with("http://") || socket_path.starts_with("https://") {
            Docker::connect_with_http(socket_path, 120, bollard::API_DEFAULT_VERSION)
                .map_err(|e| EngineError::Connection(e.to_string()))?
        } else {
            let path = socket_path.trim_start_matches("unix://");
            Docker::connect_with_socket(path, 120, bollard::API_DEFAULT_VERSION)
                .map_err(|e| EngineError::Connection(e.to_string()))?
        };

        client
            .ping()
            .await
            .map_err(|e| EngineError::Connection(e.to_string()))?;

        Ok(Self { client })
    }

    /// Get the underlying Docker client.
    pub fn client(&self) -> &Docker {
        &self.client
    }

    async fn pull_image(&self, image: &str) -> Result<()> {
        tracing::info!("Pulling image '{}'", image);

        let options = CreateImageOptions {
            from_image: image,
            ..Default::default()
        };

        let mut stream = self.client.create_image(Some(options), None, None);

        while let Some(result) = stream.next().await {
            match result {
                Ok(info) => {
                    if let Some(error) = info.error {
                        return Err(EngineError::ImageNotFound(error));
                    }
                    if let Some(status) = info.status {
                        tracing::debug!("{}", status);
                    }
                }
                Err(e) => return Err(EngineError::ImageNotFound(e.to_string())),
            }
        }

        Ok(())
    }

    async fn try_create(&self, spec: &CreateSpec) -> Result<ContainerRef> {
        let options = Some(CreateContainerOptions {
            name: spec.name.as_str(),
            platform: None,
        });

        let mut port_bindings: HashMap<String, Option<Vec<PortBinding>>> = HashMap::new();
        let mut exposed_ports: HashMap<String, HashMap<(), ()>> = HashMap::new();

        for port in &spec.ports {
            let container_port = format!("{}/tcp", port.container_port);
            exposed_ports.insert(container_port.clone(), HashMap::new());

            let binding = PortBinding {
                host_ip: None,
                host_port: Some(port.host_port.to_string()),
            };
            port_bindings.insert(container_port, Some(vec![binding]));
        }

        let mounts: Vec<Mount> = spec
            .mounts
            .iter()
            .map(|m| Mount {
                target: Some(m.target.clone()),
                source: Some(m.source.to_string_lossy().into_owned()),
                typ: Some(MountTypeEnum::BIND),
                read_only: Some(m.read_only),
                ..Default::default()
            })
            .collect();

        let host_config = HostConfig {
            mounts: if mounts.is_empty() {
                None
            } else {
                Some(mounts)
            },
            port_bindings: if port_bindings.is_empty() {
                None
            } else {
                Some(port_bindings)
            },
            ..Default::default()
        };

        let config = Config {
            image: Some(spec.image.clone()),
            cmd: spec.command.clone(),
            hostname: spec.hostname.clone(),
            tty: Some(spec.tty),
            open_stdin: Some(spec.stdin_open),
            labels: if spec.labels.is_empty() {
                None
            } else {
                Some(spec.labels.clone())
            },
            exposed_ports: if exposed_ports.is_empty() {
                None
            } else {
                Some(exposed_ports)
            },
            host_config: Some(host_config),
            ..Default::default()
        };

        let response = self.client.create_container(options, config).await?;

        Ok(ContainerRef::new(response.id))
    }
}

fn to_record(c: ContainerSummary) -> ContainerRecord {
    ContainerRecord {
        id: ContainerRef::new(c.id.unwrap_or_default()),
        name: c
            .names
            .and_then(|n| n.first().cloned())
            .unwrap_or_default()
            .trim_start_matches('/')
            .to_string(),
        image: c.image.unwrap_or_default(),
        status: c
            .state
            .as_deref()
            .map(EngineStatus::from)
            .unwrap_or(EngineStatus::Unknown),
        created: c.created.unwrap_or(0),
        labels: c.labels.unwrap_or_default(),
    }
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn ping(&self) -> Result<()> {
        self.client
            .ping()
            .await
            .map_err(|e| EngineError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn find(&self, name: &str) -> Result<Option<ContainerRecord>> {
        let options = ListContainersOptions {
            all: true,
            filters: HashMap::from([
                ("label".to_string(), vec![format!("{}=true", MANAGED_LABEL)]),
                ("name".to_string(), vec![name.to_string()]),
            ]),
            ..Default::default()
        };

        let containers = self.client.list_containers(Some(options)).await?;

        // The engine's name filter matches substrings; keep exact hits only.
        Ok(containers
            .into_iter()
            .map(to_record)
            .find(|record| record.name == name))
    }

    async fn create(&self, spec: &CreateSpec) -> Result<ContainerRef> {
        match self.try_create(spec).await {
            Err(EngineError::NotFound(_)) => {
                self.pull_image(&spec.image).await?;
                self.try_create(spec).await
            }
            other => other,
        }
    }

    async fn start(&self, id: &ContainerRef) -> Result<()> {
        match self
            .client
            .start_container(&id.0, None::<StartContainerOptions<String>>)
            .await
        {
            Ok(()) => Ok(()),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 304, ..
            }) => {
                tracing::debug!("Container {} already running", id.short());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn stop(&self, id: &ContainerRef) -> Result<()> {
        let options = StopContainerOptions {
            t: STOP_TIMEOUT_SECS,
        };

        match self.client.stop_container(&id.0, Some(options)).await {
            Ok(()) => Ok(()),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 304, ..
            }) => {
                tracing::debug!("Container {} already stopped", id.short());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, id: &ContainerRef) -> Result<()> {
        let options = RemoveContainerOptions {
            force: true,
            ..Default::default()
        };
        self.client.remove_container(&id.0, Some(options)).await?;
        Ok(())
    }

    async fn list(&self, all: bool) -> Result<Vec<ContainerRecord>> {
        let options = ListContainersOptions {
            all,
            filters: HashMap::from([(
                "label".to_string(),
                vec![format!("{}=true", MANAGED_LABEL)],
            )]),
            ..Default::default()
        };

        let containers = self.client.list_containers(Some(options)).await?;

        Ok(containers.into_iter().map(to_record).collect())
    }
}
