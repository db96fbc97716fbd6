//! The static command table
//!
//! Dispatch happens in two explicit stages: a lookup against this table
//! (exact name, then unique-prefix shorthand), and a fallback into the
//! alias resolver for anything the table does not settle. The table is
//! plain data so it can be enumerated and tested without a CLI parser.

use crate::{AliasResolver, Result};
use burrow_config::ConfigStore;

/// Canonical names of every built-in command.
pub const BUILTIN_COMMANDS: &[&str] = &[
    "alias", "config", "create", "delete", "help", "list", "start", "stop",
];

/// Outcome of looking a token up in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The token is a command name.
    Exact(&'static str),
    /// The token uniquely prefixes one command name.
    Prefix(&'static str),
    /// The token prefixes several command names.
    Ambiguous(Vec<&'static str>),
    /// Nothing matches.
    Miss,
}

/// A registration table of command names.
#[derive(Debug, Clone)]
pub struct CommandSet {
    names: Vec<&'static str>,
}

impl CommandSet {
    pub fn new(names: &[&'static str]) -> Self {
        let mut names = names.to_vec();
        names.sort_unstable();
        Self { names }
    }

    /// The production table.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_COMMANDS)
    }

    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn contains(&self, token: &str) -> bool {
        self.names.iter().any(|name| *name == token)
    }

    /// Exact name first, then prefix shorthand.
    pub fn resolve(&self, token: &str) -> Resolution {
        if let Some(exact) = self.names.iter().find(|name| **name == token) {
            return Resolution::Exact(exact);
        }

        let matches: Vec<&'static str> = self
            .names
            .iter()
            .copied()
            .filter(|name| name.starts_with(token))
            .collect();

        match matches.len() {
            0 => Resolution::Miss,
            1 => Resolution::Prefix(matches[0]),
            _ => Resolution::Ambiguous(matches),
        }
    }
}

/// Rewrite raw argv (without the program name) so its head is a
/// canonical command name, expanding aliases as needed.
///
/// An empty argv or a leading flag passes through untouched for the
/// argument parser to handle.
pub fn expand_invocation(
    commands: &CommandSet,
    store: &ConfigStore,
    argv: Vec<String>,
) -> Result<Vec<String>> {
    match argv.first() {
        None => Ok(argv),
        Some(head) if head.starts_with('-') => Ok(argv),
        Some(_) => AliasResolver::new(store).resolve(commands, argv),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_enumerable() {
        let commands = CommandSet::builtin();
        assert_eq!(commands.names().len(), BUILTIN_COMMANDS.len());
        for name in ["create", "start", "stop", "delete", "list", "config", "alias"] {
            assert!(commands.contains(name), "missing {}", name);
        }
    }

    #[test]
    fn test_exact_name() {
        assert_eq!(
            CommandSet::builtin().resolve("list"),
            Resolution::Exact("list")
        );
    }

    #[test]
    fn test_unique_prefix() {
        assert_eq!(
            CommandSet::builtin().resolve("cr"),
            Resolution::Prefix("create")
        );
        assert_eq!(
            CommandSet::builtin().resolve("sta"),
            Resolution::Prefix("start")
        );
    }

    #[test]
    fn test_ambiguous_prefix() {
        match CommandSet::builtin().resolve("st") {
            Resolution::Ambiguous(candidates) => {
                assert_eq!(candidates, vec!["start", "stop"])
            }
            other => panic!("expected ambiguous, got {:?}", other),
        }
    }

    #[test]
    fn test_miss() {
        assert_eq!(CommandSet::builtin().resolve("frobnicate"), Resolution::Miss);
    }

    #[test]
    fn test_expand_invocation_passes_flags_through() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::load_from(dir.path().join("config.toml"), None).unwrap();
        let commands = CommandSet::builtin();

        let empty: Vec<String> = Vec::new();
        assert_eq!(
            expand_invocation(&commands, &store, empty.clone()).unwrap(),
            empty
        );

        let flags = vec!["--verbose".to_string(), "list".to_string()];
        assert_eq!(
            expand_invocation(&commands, &store, flags.clone()).unwrap(),
            flags
        );
    }
}
