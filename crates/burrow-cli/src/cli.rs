//! Argument definitions for the burrow binary
//!
//! Parsing happens after alias expansion has canonicalized the command
//! word, so every subcommand name here matches the command table in
//! burrow-core one to one. `test_command_table_matches_parser` keeps
//! the two from drifting apart.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "burrow")]
#[command(author, version, about = "Container environment manager", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Engine socket path override
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an environment
    Create {
        /// Environment name (defaults to the project directory name)
        name: Option<String>,

        /// Image to create from (defaults to image.default from config)
        #[arg(short, long)]
        image: Option<String>,

        /// Start the environment right after creating it
        #[arg(short, long)]
        start: bool,

        /// Mount the engine socket into the environment
        #[arg(long)]
        with_docker: bool,

        /// Command to run instead of the image default
        #[arg(trailing_var_arg = true)]
        cmd: Vec<String>,
    },

    /// Start an environment
    Start {
        /// Environment name (defaults to the project directory name)
        name: Option<String>,
    },

    /// Stop an environment
    Stop {
        /// Environment name (defaults to the project directory name)
        name: Option<String>,

        /// Delete the environment after stopping it
        #[arg(short, long)]
        delete: bool,
    },

    /// Delete environments
    Delete {
        /// Environment names (defaults to the project directory name)
        names: Vec<String>,

        /// Delete every known environment
        #[arg(short, long)]
        all: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List environments
    List {
        /// Only show running environments
        #[arg(short, long)]
        running: bool,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show or edit configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// Show or define command aliases
    Alias {
        /// Alias name (lists every alias when omitted)
        name: Option<String>,

        /// Words the alias expands to (shows the alias when omitted)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        expansion: Vec<String>,

        /// Store in the user config instead of the project config
        #[arg(short, long)]
        user: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value, or a whole section
    Get {
        /// Dotted key, like image.default, or a bare section name
        key: String,
    },

    /// Set a value
    Set {
        /// Dotted key, like image.default
        key: String,

        /// Value to store
        value: String,

        /// Write to the user config instead of the project config
        #[arg(short, long)]
        user: bool,
    },

    /// Remove a value or a whole section
    Rm {
        /// Dotted key, like image.default, or a bare section name
        key: String,

        /// Remove from the user config instead of the project config
        #[arg(short, long)]
        user: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_core::CommandSet;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_command_table_matches_parser() {
        let parser = Cli::command();
        let table = CommandSet::builtin();

        for subcommand in parser.get_subcommands() {
            assert!(
                table.contains(subcommand.get_name()),
                "parser knows '{}' but the command table does not",
                subcommand.get_name()
            );
        }
        for name in table.names() {
            // clap adds its help subcommand at parse time.
            if *name == "help" {
                continue;
            }
            assert!(
                parser.get_subcommands().any(|c| c.get_name() == *name),
                "command table lists '{}' but the parser does not",
                name
            );
        }
    }

    #[test]
    fn test_parse_create_with_trailing_command() {
        let cli = Cli::try_parse_from([
            "burrow", "create", "web", "--image", "rust:1.79", "sleep", "infinity",
        ])
        .unwrap();
        match cli.command {
            Commands::Create {
                name, image, cmd, ..
            } => {
                assert_eq!(name.as_deref(), Some("web"));
                assert_eq!(image.as_deref(), Some("rust:1.79"));
                assert_eq!(cmd, vec!["sleep".to_string(), "infinity".to_string()]);
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn test_parse_stop_with_delete() {
        let cli = Cli::try_parse_from(["burrow", "stop", "web", "-d"]).unwrap();
        match cli.command {
            Commands::Stop { name, delete } => {
                assert_eq!(name.as_deref(), Some("web"));
                assert!(delete);
            }
            _ => panic!("expected stop"),
        }
    }

    #[test]
    fn test_parse_alias_with_hyphenated_expansion() {
        let cli =
            Cli::try_parse_from(["burrow", "alias", "--user", "up", "create", "--start"]).unwrap();
        match cli.command {
            Commands::Alias {
                name,
                expansion,
                user,
            } => {
                assert_eq!(name.as_deref(), Some("up"));
                assert_eq!(expansion, vec!["create".to_string(), "--start".to_string()]);
                assert!(user);
            }
            _ => panic!("expected alias"),
        }
    }
}
