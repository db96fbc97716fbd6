//! Management commands: list, config, alias

use anyhow::{anyhow, bail, Result};
use burrow_config::ConfigStore;
use burrow_core::{CommandSet, Drift, EnvState, EnvironmentManager};
use toml::Value;

use super::write_scope;

/// List environments from both the config store and the engine.
pub async fn list(manager: &EnvironmentManager, running: bool, json: bool) -> Result<()> {
    let mut envs = manager.list().await?;
    if running {
        envs.retain(|env| env.state() == EnvState::Running);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&envs)?);
        return Ok(());
    }

    if envs.is_empty() {
        println!("No environments found.");
        println!("\nUse 'burrow create' in a project directory to add one.");
        return Ok(());
    }

    // Column widths
    const NAME_WIDTH: usize = 26;
    const STATE_WIDTH: usize = 12;

    println!("  {:<NAME_WIDTH$} {:<STATE_WIDTH$} IMAGE", "NAME", "STATE");
    println!("{}", "-".repeat(64));

    for env in &envs {
        let symbol = match env.state() {
            EnvState::Running => "●",
            EnvState::Stopped => "○",
            EnvState::Created => "◔",
            EnvState::Absent => "◌",
        };
        let note = match env.drift() {
            Some(Drift::ContainerMissing) => "  (container missing)",
            Some(Drift::Unregistered) => "  (unregistered)",
            None => "",
        };

        // Pad manually to handle Unicode symbol display width
        let name_padding = NAME_WIDTH.saturating_sub(env.name.len());
        let state = format!("{}", env.state());
        let state_padding = STATE_WIDTH.saturating_sub(state.len());

        println!(
            "{} {}{} {}{} {}{}",
            symbol,
            env.name,
            " ".repeat(name_padding),
            state,
            " ".repeat(state_padding),
            env.image().unwrap_or("-"),
            note
        );
    }

    Ok(())
}

/// Print both config files.
pub fn config_show(store: &ConfigStore) -> Result<()> {
    print_config_file("User config", Some(store.user_path()));
    print_config_file("Project config", store.local_path());
    Ok(())
}

fn print_config_file(label: &str, path: Option<&std::path::Path>) {
    match path {
        Some(path) if path.exists() => {
            println!("# {}: {}", label, path.display());
            match std::fs::read_to_string(path) {
                Ok(content) if content.trim().is_empty() => println!("(empty)\n"),
                Ok(content) => println!("{}", content),
                Err(e) => println!("(unreadable: {})\n", e),
            }
        }
        Some(path) => println!("# {}: {} (not created yet)\n", label, path.display()),
        None => println!("# {}: (no project directory)\n", label),
    }
}

/// Print one value, or a whole section when the key names one.
pub fn config_get(store: &ConfigStore, key: &str) -> Result<()> {
    if let Some((section, leaf)) = key.rsplit_once('.') {
        if let Some(value) = store.get(section, leaf) {
            println!("{}", format_value(value));
            return Ok(());
        }
    }

    let entries = store.section(key);
    if entries.is_empty() {
        bail!("No config value under '{}'", key);
    }
    for (name, value) in entries {
        println!("{}.{} = {}", key, name, format_value(&value));
    }
    Ok(())
}

/// Set one value and save the chosen scope.
pub fn config_set(store: &mut ConfigStore, key: &str, raw: &str, user: bool) -> Result<()> {
    let (section, leaf) = split_key(key)?;
    let scope = write_scope(user);
    store.set(scope, section, leaf, parse_value(raw))?;
    store.save(scope)?;
    println!("{} = {}", key, raw);
    Ok(())
}

/// Remove one key, or a whole section, from the chosen scope.
pub fn config_rm(store: &mut ConfigStore, key: &str, user: bool) -> Result<()> {
    let scope = write_scope(user);
    let removed = match key.rsplit_once('.') {
        Some((section, leaf)) => store.remove(scope, section, leaf).is_some(),
        None => store.remove_section(scope, key),
    };
    if !removed {
        bail!("No config value under '{}' in that scope", key);
    }
    store.save(scope)?;
    println!("Removed {}", key);
    Ok(())
}

/// Show, list, or define aliases.
pub fn alias(
    store: &mut ConfigStore,
    name: Option<String>,
    expansion: Vec<String>,
    user: bool,
) -> Result<()> {
    let name = match name {
        None => {
            let aliases = store.aliases()?;
            if aliases.is_empty() {
                println!("No aliases defined.");
                println!("\nDefine one with 'burrow alias <name> <expansion...>'.");
                return Ok(());
            }
            for (name, tokens) in aliases {
                println!("{} = {}", name, shell_words::join(&tokens));
            }
            return Ok(());
        }
        Some(name) => name,
    };

    if expansion.is_empty() {
        match store.alias(&name)? {
            Some(tokens) => println!("{} = {}", name, shell_words::join(&tokens)),
            None => bail!("No alias named '{}'", name),
        }
        return Ok(());
    }

    if CommandSet::builtin().contains(&name) {
        bail!("'{}' is a builtin command and cannot be an alias", name);
    }

    let scope = write_scope(user);
    store.set_alias(scope, &name, &expansion)?;
    store.save(scope)?;
    println!("{} = {}", name, shell_words::join(&expansion));
    Ok(())
}

fn split_key(key: &str) -> Result<(&str, &str)> {
    key.rsplit_once('.')
        .ok_or_else(|| anyhow!("Key must look like section.key, e.g. image.default"))
}

/// Integers and booleans keep their type; everything else is a string.
fn parse_value(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Integer(n);
    }
    if let Ok(b) = raw.parse::<bool>() {
        return Value::Boolean(b);
    }
    Value::String(raw.to_string())
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
