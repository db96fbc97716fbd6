//! Alias resolution
//!
//! Aliases expand a head token into a stored token sequence, splicing
//! the remaining arguments on behind the expansion. Expansion re-enters
//! command resolution, so aliases can reference aliases; a visited set
//! plus a depth bound keep definitions from looping forever.

use crate::{CommandSet, CoreError, Resolution, Result};
use burrow_config::ConfigStore;
use std::collections::HashSet;

/// Most alias hops one invocation may take.
pub const MAX_ALIAS_DEPTH: usize = 10;

/// Expands alias invocations against a command table.
pub struct AliasResolver<'a> {
    store: &'a ConfigStore,
}

impl<'a> AliasResolver<'a> {
    pub fn new(store: &'a ConfigStore) -> Self {
        Self { store }
    }

    /// Resolve `argv` until its head is a canonical command name.
    ///
    /// An exact command name wins outright. A defined alias wins over
    /// prefix shorthand, so users can shadow a shorthand they never
    /// asked for; the prefix (or the ambiguity error) only applies when
    /// no alias of that token exists.
    pub fn resolve(&self, commands: &CommandSet, mut argv: Vec<String>) -> Result<Vec<String>> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut chain: Vec<String> = Vec::new();

        loop {
            let head = match argv.first() {
                Some(head) => head.clone(),
                None => return Ok(argv),
            };

            let resolution = commands.resolve(&head);
            if let Resolution::Exact(name) = resolution {
                argv[0] = name.to_string();
                return Ok(argv);
            }

            let expansion = match self.store.alias(&head)? {
                Some(expansion) => expansion,
                None => {
                    return match resolution {
                        Resolution::Prefix(name) => {
                            argv[0] = name.to_string();
                            Ok(argv)
                        }
                        Resolution::Ambiguous(candidates) => Err(CoreError::AmbiguousCommand {
                            token: head,
                            candidates: candidates.join(", "),
                        }),
                        _ => Err(CoreError::UnknownCommand(head)),
                    }
                }
            };

            if expansion.is_empty() {
                return Err(CoreError::Configuration(format!(
                    "alias '{}' has an empty expansion",
                    head
                )));
            }

            chain.push(head.clone());
            if !visited.insert(head.clone()) {
                return Err(CoreError::AliasCycle(chain.join(" -> ")));
            }
            if chain.len() > MAX_ALIAS_DEPTH {
                return Err(CoreError::AliasDepthExceeded(MAX_ALIAS_DEPTH));
            }

            tracing::debug!("Alias '{}' expands to {:?}", head, expansion);
            let mut next = expansion;
            next.extend(argv.into_iter().skip(1));
            argv = next;
        }
    }
}
