//! The layered key/value store
//!
//! `ConfigStore` holds two parsed TOML documents and answers reads from
//! the merge of both, project-local values shadowing user ones. Writes
//! go to exactly one document, named by [`Scope`], and reach disk only
//! on [`ConfigStore::save`].

use crate::project::{project_root, LOCAL_CONFIG_FILE};
use crate::{ConfigError, Result};
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

pub(crate) const ENV_SECTION: &str = "env";
pub(crate) const ALIAS_SECTION: &str = "alias";
pub(crate) const IMAGE_SECTION: &str = "image";
pub(crate) const PORTS_SECTION: &str = "ports";
pub(crate) const ENGINE_SECTION: &str = "engine";

/// Which config document a write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// `.burrow.toml` at the project root.
    Local,
    /// `~/.config/burrow/config.toml` (platform equivalent).
    User,
}

/// Layered configuration store.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    user_path: PathBuf,
    local_path: Option<PathBuf>,
    project_root: Option<PathBuf>,
    user: Table,
    local: Table,
}

impl ConfigStore {
    /// Load both documents relative to the current working directory.
    pub fn load() -> Result<Self> {
        let user_path = Self::user_config_path()?;
        let local_path = std::env::current_dir()
            .ok()
            .map(|cwd| project_root(&cwd).join(LOCAL_CONFIG_FILE));
        Self::load_from(user_path, local_path)
    }

    /// Load from explicit paths. A missing file is an empty document.
    pub fn load_from(user_path: PathBuf, local_path: Option<PathBuf>) -> Result<Self> {
        let user = read_table(&user_path)?;
        let local = match &local_path {
            Some(path) => read_table(path)?,
            None => Table::new(),
        };
        let project_root = local_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf);
        Ok(Self {
            user_path,
            local_path,
            project_root,
            user,
            local,
        })
    }

    /// Default path of the user config file.
    pub fn user_config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "burrow").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn user_path(&self) -> &Path {
        &self.user_path
    }

    pub fn local_path(&self) -> Option<&Path> {
        self.local_path.as_deref()
    }

    /// Project root the local document belongs to, when one was found.
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Default environment name: the project root's basename.
    pub fn default_name(&self) -> Option<String> {
        self.project_root
            .as_deref()
            .and_then(crate::project::default_env_name)
    }

    /// Merged lookup: local first, then user.
    pub fn get(&self, section: &str, key: &str) -> Option<&Value> {
        section_of(&self.local, section)
            .and_then(|t| t.get(key))
            .or_else(|| section_of(&self.user, section).and_then(|t| t.get(key)))
    }

    /// Merged lookup of a string value.
    pub fn get_str(&self, section: &str, key: &str) -> Option<String> {
        self.get(section, key)
            .and_then(|v| v.as_str().map(str::to_string))
    }

    /// Merged view of a whole section, local values shadowing user ones.
    pub fn section(&self, section: &str) -> BTreeMap<String, Value> {
        let mut merged = BTreeMap::new();
        if let Some(table) = section_of(&self.user, section) {
            for (key, value) in table {
                merged.insert(key.clone(), value.clone());
            }
        }
        if let Some(table) = section_of(&self.local, section) {
            for (key, value) in table {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }

    /// Set one key in one document. Fails if the section path crosses a
    /// non-table value.
    pub fn set(&mut self, scope: Scope, section: &str, key: &str, value: Value) -> Result<()> {
        let root = self.table_mut(scope);
        let table = section_table_mut(root, section)?;
        table.insert(key.to_string(), value);
        Ok(())
    }

    /// Remove one key from one document, returning the old value.
    pub fn remove(&mut self, scope: Scope, section: &str, key: &str) -> Option<Value> {
        let root = self.table_mut(scope);
        existing_section_mut(root, section)?.remove(key)
    }

    /// Remove a whole section from one document.
    pub fn remove_section(&mut self, scope: Scope, section: &str) -> bool {
        let root = self.table_mut(scope);
        let (parent, last) = match section.rsplit_once('.') {
            Some((parent, last)) => (Some(parent), last),
            None => (None, section),
        };
        let table = match parent {
            Some(path) => match existing_section_mut(root, path) {
                Some(table) => table,
                None => return false,
            },
            None => root,
        };
        table.remove(last).is_some()
    }

    /// Write one document back to disk atomically.
    pub fn save(&self, scope: Scope) -> Result<()> {
        let (path, table) = match scope {
            Scope::User => (Some(self.user_path.as_path()), &self.user),
            Scope::Local => (self.local_path.as_deref(), &self.local),
        };
        let path = path.ok_or_else(|| {
            ConfigError::Invalid(
                "no project-local config file here; use the user scope".to_string(),
            )
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let content =
            toml::to_string_pretty(table).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        atomic_write(path, content.as_bytes()).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn table_mut(&mut self, scope: Scope) -> &mut Table {
        match scope {
            Scope::Local => &mut self.local,
            Scope::User => &mut self.user,
        }
    }

    // ---- typed views ----

    /// `[image] default`: image used when `create` gets none.
    pub fn default_image(&self) -> Option<String> {
        self.get_str(IMAGE_SECTION, "default")
    }

    /// `[image] command`: container command used when `create` gets none.
    pub fn default_command(&self) -> Result<Option<Vec<String>>> {
        match self.get(IMAGE_SECTION, "command") {
            None => Ok(None),
            Some(value) => string_tokens(value, "[image] command").map(Some),
        }
    }

    /// `[engine] socket`: override for the engine socket path.
    pub fn engine_socket(&self) -> Option<String> {
        self.get_str(ENGINE_SECTION, "socket")
    }

    /// `[ports]`: container port to host port pairs. A missing or empty
    /// host value publishes on the container port number.
    pub fn ports(&self) -> Result<Vec<(u16, u16)>> {
        self.section(PORTS_SECTION)
            .into_iter()
            .map(|(container, host)| {
                let container: u16 = container.parse().map_err(|_| {
                    ConfigError::Invalid(format!("[ports]: invalid container port '{}'", container))
                })?;
                let host = match host {
                    Value::Integer(n) => u16::try_from(n).map_err(|_| {
                        ConfigError::Invalid(format!("[ports]: invalid host port '{}'", n))
                    })?,
                    Value::String(s) if s.is_empty() => container,
                    Value::String(s) => s.parse().map_err(|_| {
                        ConfigError::Invalid(format!("[ports]: invalid host port '{}'", s))
                    })?,
                    other => {
                        return Err(ConfigError::Invalid(format!(
                            "[ports]: invalid host port '{}'",
                            other
                        )))
                    }
                };
                Ok((container, host))
            })
            .collect()
    }

    /// `[alias] <name>`: expansion tokens, or None when undefined.
    ///
    /// Accepts an array of tokens or a single string that is shell-split.
    pub fn alias(&self, name: &str) -> Result<Option<Vec<String>>> {
        match self.get(ALIAS_SECTION, name) {
            None => Ok(None),
            Some(value) => string_tokens(value, &format!("alias '{}'", name)).map(Some),
        }
    }

    /// All defined aliases, merged across both documents.
    pub fn aliases(&self) -> Result<BTreeMap<String, Vec<String>>> {
        let mut all = BTreeMap::new();
        for name in self.section(ALIAS_SECTION).keys() {
            if let Some(tokens) = self.alias(name)? {
                all.insert(name.clone(), tokens);
            }
        }
        Ok(all)
    }

    pub fn set_alias(&mut self, scope: Scope, name: &str, expansion: &[String]) -> Result<()> {
        let value = Value::Array(
            expansion
                .iter()
                .map(|token| Value::String(token.clone()))
                .collect(),
        );
        self.set(scope, ALIAS_SECTION, name, value)
    }
}

fn read_table(path: &Path) -> Result<Table> {
    if !path.exists() {
        tracing::debug!("Config file not found at {:?}, starting empty", path);
        return Ok(Table::new());
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Walk a dotted section path through nested tables, read-only.
fn section_of<'a>(root: &'a Table, section: &str) -> Option<&'a Table> {
    let mut current = root;
    for part in section.split('.') {
        current = current.get(part)?.as_table()?;
    }
    Some(current)
}

fn existing_section_mut<'a>(root: &'a mut Table, section: &str) -> Option<&'a mut Table> {
    let mut current = root;
    for part in section.split('.') {
        current = current.get_mut(part)?.as_table_mut()?;
    }
    Some(current)
}

/// Walk a dotted section path, creating tables along the way.
fn section_table_mut<'a>(root: &'a mut Table, section: &str) -> Result<&'a mut Table> {
    let mut current = root;
    for part in section.split('.') {
        let entry = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Table(Table::new()));
        current = entry.as_table_mut().ok_or_else(|| {
            ConfigError::Invalid(format!("config key '{}' is not a table", part))
        })?;
    }
    Ok(current)
}

fn string_tokens(value: &Value, what: &str) -> Result<Vec<String>> {
    match value {
        Value::String(s) => {
            shell_words::split(s).map_err(|e| ConfigError::Invalid(format!("{}: {}", what, e)))
        }
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    ConfigError::Invalid(format!(
                        "{} must be a string or an array of strings",
                        what
                    ))
                })
            })
            .collect(),
        _ => Err(ConfigError::Invalid(format!(
            "{} must be a string or an array of strings",
            what
        ))),
    }
}

/// Write content to a file atomically using a temp-file-then-rename
/// pattern, so a crash mid-write leaves the old file intact.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(content)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(user: &str, local: &str) -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        let user_path = dir.path().join("config.toml");
        let local_path = dir.path().join(LOCAL_CONFIG_FILE);
        std::fs::write(&user_path, user).unwrap();
        std::fs::write(&local_path, local).unwrap();
        let store = ConfigStore::load_from(user_path, Some(local_path)).unwrap();
        (dir, store)
    }

    #[test]
    fn test_local_shadows_user() {
        let (_dir, store) = store_with(
            "[image]\ndefault = \"ubuntu:22.04\"\n",
            "[image]\ndefault = \"rust:1.79\"\n",
        );
        assert_eq!(store.default_image().as_deref(), Some("rust:1.79"));
    }

    #[test]
    fn test_user_fills_local_gaps() {
        let (_dir, store) = store_with("[image]\ndefault = \"ubuntu:22.04\"\n", "");
        assert_eq!(store.default_image().as_deref(), Some("ubuntu:22.04"));
        assert_eq!(store.get("image", "missing"), None);
    }

    #[test]
    fn test_missing_files_start_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store =
            ConfigStore::load_from(dir.path().join("nope.toml"), None).unwrap();
        assert_eq!(store.default_image(), None);
        assert!(store.section("alias").is_empty());
    }

    #[test]
    fn test_set_save_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let user_path = dir.path().join("config.toml");
        let mut store = ConfigStore::load_from(user_path.clone(), None).unwrap();

        store
            .set(Scope::User, "image", "default", Value::String("alpine:3".into()))
            .unwrap();
        store.save(Scope::User).unwrap();

        let reloaded = ConfigStore::load_from(user_path, None).unwrap();
        assert_eq!(reloaded.default_image().as_deref(), Some("alpine:3"));
    }

    #[test]
    fn test_save_local_without_project_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::load_from(dir.path().join("config.toml"), None).unwrap();
        assert!(matches!(
            store.save(Scope::Local),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_set_through_non_table_fails() {
        let (_dir, mut store) = store_with("", "[image]\ndefault = \"x\"\n");
        let err = store
            .set(Scope::Local, "image.default", "key", Value::Integer(1))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_remove_key_and_section() {
        let (_dir, mut store) = store_with("", "[alias]\nco = \"checkout\"\nst = \"status\"\n");
        assert!(store.remove(Scope::Local, "alias", "co").is_some());
        assert_eq!(store.alias("co").unwrap(), None);
        assert!(store.remove_section(Scope::Local, "alias"));
        assert_eq!(store.alias("st").unwrap(), None);
        assert!(!store.remove_section(Scope::Local, "alias"));
    }

    #[test]
    fn test_alias_string_form_is_shell_split() {
        let (_dir, store) = store_with("", "[alias]\ncane = \"create --start 'my env'\"\n");
        assert_eq!(
            store.alias("cane").unwrap(),
            Some(vec![
                "create".to_string(),
                "--start".to_string(),
                "my env".to_string()
            ])
        );
    }

    #[test]
    fn test_alias_array_form() {
        let (_dir, store) = store_with("[alias]\nco = [\"checkout\"]\n", "");
        assert_eq!(store.alias("co").unwrap(), Some(vec!["checkout".to_string()]));
    }

    #[test]
    fn test_alias_bad_type_is_invalid() {
        let (_dir, store) = store_with("", "[alias]\nco = 7\n");
        assert!(matches!(store.alias("co"), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_aliases_merged_across_scopes() {
        let (_dir, store) = store_with(
            "[alias]\nco = \"checkout\"\n",
            "[alias]\nst = \"status\"\nco = \"commit\"\n",
        );
        let all = store.aliases().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["co"], vec!["commit".to_string()]);
        assert_eq!(all["st"], vec!["status".to_string()]);
    }

    #[test]
    fn test_ports_forms() {
        let (_dir, store) = store_with("", "[ports]\n80 = 8080\n443 = \"\"\n5432 = \"15432\"\n");
        let mut ports = store.ports().unwrap();
        ports.sort();
        assert_eq!(ports, vec![(80, 8080), (443, 443), (5432, 15432)]);
    }

    #[test]
    fn test_ports_bad_key_is_invalid() {
        let (_dir, store) = store_with("", "[ports]\nweb = 8080\n");
        assert!(matches!(store.ports(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_default_command_string_form() {
        let (_dir, store) = store_with("[image]\ncommand = \"bash -l\"\n", "");
        assert_eq!(
            store.default_command().unwrap(),
            Some(vec!["bash".to_string(), "-l".to_string()])
        );
    }
}
