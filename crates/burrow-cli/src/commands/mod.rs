//! CLI command implementations

mod lifecycle;
mod manage;

use anyhow::{anyhow, Result};
use burrow_config::{ConfigStore, Scope};

pub use lifecycle::*;
pub use manage::*;

/// Pick the environment name: the explicit argument, else the project
/// directory's basename.
fn resolve_name(store: &ConfigStore, name: Option<String>) -> Result<String> {
    match name {
        Some(name) => Ok(name),
        None => store.default_name().ok_or_else(|| {
            anyhow!("no environment name given and no project directory to take one from")
        }),
    }
}

/// Write scope for the --user flag; project-local is the default.
fn write_scope(user: bool) -> Scope {
    if user {
        Scope::User
    } else {
        Scope::Local
    }
}
