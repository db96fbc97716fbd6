//! Lifecycle commands: create, start, stop, delete

use anyhow::{bail, Result};
use burrow_core::{CreateOptions, EnvState, EnvironmentManager};
use dialoguer::Confirm;

use super::resolve_name;

/// Create an environment, optionally starting it right away.
pub async fn create(
    manager: &mut EnvironmentManager,
    name: Option<String>,
    opts: CreateOptions,
) -> Result<()> {
    let name = resolve_name(manager.store(), name)?;

    println!("Creating '{}'...", name);
    let env = manager.create(&name, &opts).await?;

    match env.state() {
        EnvState::Running => println!("Created and started '{}'", name),
        _ => {
            println!("Created '{}'", name);
            println!("\nRun 'burrow start {}' to start it.", name);
        }
    }

    Ok(())
}

/// Start an environment.
pub async fn start(manager: &EnvironmentManager, name: Option<String>) -> Result<()> {
    let name = resolve_name(manager.store(), name)?;

    let env = manager.resolve(&name).await?;
    if env.state() == EnvState::Running {
        println!("'{}' is already running", name);
        return Ok(());
    }

    println!("Starting '{}'...", name);
    manager.start(&name).await?;
    println!("Started '{}'", name);

    Ok(())
}

/// Stop an environment; a no-op when it is not running.
pub async fn stop(
    manager: &mut EnvironmentManager,
    name: Option<String>,
    delete: bool,
) -> Result<()> {
    let name = resolve_name(manager.store(), name)?;

    let env = manager.resolve(&name).await?;
    let was_running = env.state() == EnvState::Running;
    manager.stop(&name).await?;
    if was_running {
        println!("Stopped '{}'", name);
    } else {
        println!("'{}' was not running", name);
    }

    if delete {
        manager.delete(&name).await?;
        println!("Deleted '{}'", name);
    }

    Ok(())
}

/// Delete one or more environments; `all` sweeps every known one after
/// a confirmation.
pub async fn delete(
    manager: &mut EnvironmentManager,
    names: Vec<String>,
    all: bool,
    yes: bool,
) -> Result<()> {
    let targets: Vec<String> = if all {
        let envs = manager.list().await?;
        if envs.is_empty() {
            println!("Nothing to delete.");
            return Ok(());
        }
        envs.into_iter().map(|env| env.name).collect()
    } else if names.is_empty() {
        vec![resolve_name(manager.store(), None)?]
    } else {
        names
    };

    if all && !yes {
        if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
            bail!(
                "Refusing to delete {} environments without --yes",
                targets.len()
            );
        }
        let prompt = format!("This will delete: {}. Continue?", targets.join(", "));
        if !Confirm::new().with_prompt(prompt).default(false).interact()? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    for name in &targets {
        manager.delete(name).await?;
        println!("Deleted '{}'", name);
    }

    Ok(())
}
