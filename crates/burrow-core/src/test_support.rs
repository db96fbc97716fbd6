//! Test support utilities for burrow-core
//!
//! Provides a MockEngine for exercising the lifecycle without a real
//! container runtime. The mock keeps a stateful container map, so
//! create/start/stop/remove behave like a tiny in-memory daemon, and
//! records every call for assertions.

use async_trait::async_trait;
use burrow_engine::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Records which methods were called on the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Ping,
    Find { name: String },
    Create { name: String, image: String },
    Start { id: String },
    Stop { id: String },
    Remove { id: String },
    List { all: bool },
}

/// Configurable mock container engine.
///
/// All fields are shared handles; clone the ones a test needs before
/// boxing the mock into a manager.
pub struct MockEngine {
    pub calls: Arc<Mutex<Vec<MockCall>>>,
    /// Engine-side containers by name.
    pub containers: Arc<Mutex<HashMap<String, ContainerRecord>>>,
    /// Error injected into create calls.
    pub create_error: Arc<Mutex<Option<EngineError>>>,
    /// Error injected into start calls.
    pub start_error: Arc<Mutex<Option<EngineError>>>,
    /// Error injected into stop calls.
    pub stop_error: Arc<Mutex<Option<EngineError>>>,
    /// Error injected into remove calls.
    pub remove_error: Arc<Mutex<Option<EngineError>>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            containers: Arc::new(Mutex::new(HashMap::new())),
            create_error: Arc::new(Mutex::new(None)),
            start_error: Arc::new(Mutex::new(None)),
            stop_error: Arc::new(Mutex::new(None)),
            remove_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Seed a container as if it already existed engine-side.
    pub fn with_container(self, name: &str, status: EngineStatus) -> Self {
        self.containers
            .lock()
            .unwrap()
            .insert(name.to_string(), mock_record(name, status));
        self
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }

    /// Get all recorded calls.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Check if a specific call was made.
    pub fn was_called(&self, call: &MockCall) -> bool {
        self.calls.lock().unwrap().contains(call)
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a ContainerRecord the way the engine would report it.
pub fn mock_record(name: &str, status: EngineStatus) -> ContainerRecord {
    ContainerRecord {
        id: ContainerRef::new(format!("mock_{}", name)),
        name: name.to_string(),
        image: "mock_image:latest".to_string(),
        status,
        created: 0,
        labels: HashMap::from([
            (MANAGED_LABEL.to_string(), "true".to_string()),
            (ENV_LABEL.to_string(), name.to_string()),
        ]),
    }
}

/// Clone an EngineError (thiserror types don't implement Clone).
fn clone_engine_error(e: &EngineError) -> EngineError {
    match e {
        EngineError::Connection(s) => EngineError::Connection(s.clone()),
        EngineError::NotFound(s) => EngineError::NotFound(s.clone()),
        EngineError::Conflict(s) => EngineError::Conflict(s.clone()),
        EngineError::ImageNotFound(s) => EngineError::ImageNotFound(s.clone()),
        EngineError::Api { status, message } => EngineError::Api {
            status: *status,
            message: message.clone(),
        },
        EngineError::Runtime(s) => EngineError::Runtime(s.clone()),
        EngineError::Io(_) => EngineError::Runtime("IO error (cloned)".into()),
    }
}

fn injected(slot: &Arc<Mutex<Option<EngineError>>>) -> Option<EngineError> {
    slot.lock().unwrap().as_ref().map(clone_engine_error)
}

#[async_trait]
impl ContainerEngine for MockEngine {
    async fn ping(&self) -> Result<()> {
        self.record(MockCall::Ping);
        Ok(())
    }

    async fn find(&self, name: &str) -> Result<Option<ContainerRecord>> {
        self.record(MockCall::Find {
            name: name.to_string(),
        });
        Ok(self.containers.lock().unwrap().get(name).cloned())
    }

    async fn create(&self, spec: &CreateSpec) -> Result<ContainerRef> {
        self.record(MockCall::Create {
            name: spec.name.clone(),
            image: spec.image.clone(),
        });
        if let Some(e) = injected(&self.create_error) {
            return Err(e);
        }

        let mut containers = self.containers.lock().unwrap();
        if containers.contains_key(&spec.name) {
            return Err(EngineError::Conflict(spec.name.clone()));
        }

        let mut record = mock_record(&spec.name, EngineStatus::Created);
        record.image = spec.image.clone();
        record.labels = spec.labels.clone();
        let id = record.id.clone();
        containers.insert(spec.name.clone(), record);
        Ok(id)
    }

    async fn start(&self, id: &ContainerRef) -> Result<()> {
        self.record(MockCall::Start { id: id.0.clone() });
        if let Some(e) = injected(&self.start_error) {
            return Err(e);
        }

        let mut containers = self.containers.lock().unwrap();
        match containers.values_mut().find(|c| &c.id == id) {
            Some(container) => {
                container.status = EngineStatus::Running;
                Ok(())
            }
            None => Err(EngineError::NotFound(id.0.clone())),
        }
    }

    async fn stop(&self, id: &ContainerRef) -> Result<()> {
        self.record(MockCall::Stop { id: id.0.clone() });
        if let Some(e) = injected(&self.stop_error) {
            return Err(e);
        }

        let mut containers = self.containers.lock().unwrap();
        match containers.values_mut().find(|c| &c.id == id) {
            // Stopping a stopped container succeeds, like the real
            // engine's "not modified" reply.
            Some(container) => {
                container.status = EngineStatus::Exited;
                Ok(())
            }
            None => Err(EngineError::NotFound(id.0.clone())),
        }
    }

    async fn remove(&self, id: &ContainerRef) -> Result<()> {
        self.record(MockCall::Remove { id: id.0.clone() });
        if let Some(e) = injected(&self.remove_error) {
            return Err(e);
        }

        let mut containers = self.containers.lock().unwrap();
        let before = containers.len();
        containers.retain(|_, c| &c.id != id);
        if containers.len() == before {
            return Err(EngineError::NotFound(id.0.clone()));
        }
        Ok(())
    }

    async fn list(&self, all: bool) -> Result<Vec<ContainerRecord>> {
        self.record(MockCall::List { all });
        let containers = self.containers.lock().unwrap();
        let mut records: Vec<ContainerRecord> = containers
            .values()
            .filter(|c| all || c.status.is_running())
            .cloned()
            .collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }
}
