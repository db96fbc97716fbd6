//! End-to-end lifecycle tests for EnvironmentManager.
//!
//! These walk an environment through create/start/stop/delete against a
//! real container engine and verify the derived state after each phase.
//! Config lives in a tempdir so nothing touches the user's real files.
//!
//! Requires a reachable engine socket. Tests are `#[ignore]` and run
//! explicitly.

use burrow_config::ConfigStore;
use burrow_core::{CoreError, CreateOptions, EnvState, EnvironmentManager};
use burrow_engine::{connect, ContainerEngine};
use tempfile::TempDir;

const TEST_IMAGE: &str = "alpine:latest";

/// Connect to whatever engine the host exposes, or skip.
async fn get_test_engine() -> Option<Box<dyn ContainerEngine>> {
    match connect(None).await {
        Ok(engine) => {
            engine.ping().await.expect("engine answered connect but not ping");
            Some(engine)
        }
        Err(e) => {
            eprintln!("Skipping test: no container engine available: {}", e);
            None
        }
    }
}

/// Store with a default image and a command that keeps alpine alive.
fn test_store(dir: &TempDir) -> ConfigStore {
    let local_path = dir.path().join(".burrow.toml");
    std::fs::write(
        &local_path,
        format!(
            "[image]\ndefault = \"{}\"\ncommand = \"sleep infinity\"\n",
            TEST_IMAGE
        ),
    )
    .expect("write local config");
    ConfigStore::load_from(dir.path().join("config.toml"), Some(local_path)).expect("load store")
}

/// Per-test container name, unique enough to survive parallel runs and
/// leftovers from crashed ones.
fn unique_name(tag: &str) -> String {
    format!("burrow-e2e-{}-{}", tag, std::process::id())
}

/// Best-effort removal of a leftover environment.
async fn cleanup(manager: &mut EnvironmentManager, name: &str) {
    let _ = manager.delete(name).await;
}

#[tokio::test]
#[ignore] // Requires container engine
async fn test_e2e_full_lifecycle() {
    let engine = match get_test_engine().await {
        Some(engine) => engine,
        None => return,
    };
    let dir = TempDir::new().expect("temp dir");
    let mut manager = EnvironmentManager::new(test_store(&dir), engine);
    let name = unique_name("lifecycle");
    cleanup(&mut manager, &name).await;

    // Phase 1: create registers metadata and lands in Created.
    let create_opts = CreateOptions {
        mount: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let env = manager.create(&name, &create_opts).await.expect("create");
    assert_eq!(env.state(), EnvState::Created, "fresh environment state");
    assert_eq!(env.drift(), None, "fresh environment has no drift");
    assert_eq!(
        env.metadata.as_ref().map(|m| m.image.as_str()),
        Some(TEST_IMAGE)
    );

    // Phase 2: creating the same name again is refused.
    let err = manager
        .create(&name, &create_opts)
        .await
        .expect_err("duplicate create");
    assert!(matches!(err, CoreError::AlreadyExists(_)));

    // Phase 3: start, then observe Running from a fresh engine query.
    manager.start(&name).await.expect("start");
    let env = manager.resolve(&name).await.expect("resolve");
    assert_eq!(env.state(), EnvState::Running, "after start");

    // Phase 4: stop twice; the second call must be a no-op.
    manager.stop(&name).await.expect("stop");
    let env = manager.resolve(&name).await.expect("resolve");
    assert_eq!(env.state(), EnvState::Stopped, "after stop");
    manager.stop(&name).await.expect("second stop");

    // Phase 5: delete drops both container and metadata.
    manager.delete(&name).await.expect("delete");
    let env = manager.resolve(&name).await.expect("resolve");
    assert!(env.is_absent(), "after delete");
}

#[tokio::test]
#[ignore] // Requires container engine
async fn test_e2e_externally_removed_container_is_drift() {
    let engine = match get_test_engine().await {
        Some(engine) => engine,
        None => return,
    };
    let dir = TempDir::new().expect("temp dir");
    let mut manager = EnvironmentManager::new(test_store(&dir), engine);
    let name = unique_name("drift");
    cleanup(&mut manager, &name).await;

    let create_opts = CreateOptions {
        mount: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    manager.create(&name, &create_opts).await.expect("create");

    // Remove the container behind the manager's back.
    let record = manager
        .engine()
        .find(&name)
        .await
        .expect("find")
        .expect("container exists");
    manager.engine().remove(&record.id).await.expect("remove");

    // Start must refuse rather than silently recreate.
    let err = manager.start(&name).await.expect_err("start on drift");
    assert!(matches!(err, CoreError::InconsistentState { .. }));

    // Delete still clears the orphaned metadata.
    manager.delete(&name).await.expect("delete");
    let env = manager.resolve(&name).await.expect("resolve");
    assert!(env.is_absent(), "after delete");
}
