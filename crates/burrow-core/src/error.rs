//! Error types for burrow-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] burrow_config::ConfigError),

    #[error("Engine error: {0}")]
    Engine(#[from] burrow_engine::EngineError),

    #[error("Environment already exists: {0}")]
    AlreadyExists(String),

    #[error("Environment not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Environment '{name}' is in an inconsistent state: {reason}")]
    InconsistentState { name: String, reason: String },

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("'{token}' is ambiguous and matched multiple commands: {candidates}")]
    AmbiguousCommand { token: String, candidates: String },

    #[error("Alias cycle detected: {0}")]
    AliasCycle(String),

    #[error("Alias expansion exceeded {0} levels")]
    AliasDepthExceeded(usize),
}

pub type Result<T> = std::result::Result<T, CoreError>;
