//! Error types for container engines

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to connect to container engine: {0}")]
    Connection(String),

    #[error("Container not found: {0}")]
    NotFound(String),

    #[error("Name conflict: {0}")]
    Conflict(String),

    #[error("Image not found: {0}")]
    ImageNotFound(String),

    #[error("Engine API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Container engine error: {0}")]
    Runtime(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl From<bollard::errors::Error> for EngineError {
    fn from(e: bollard::errors::Error) -> Self {
        match e {
            bollard::errors::Error::DockerResponseServerError {
                status_code: 404,
                message,
            } => EngineError::NotFound(message),
            bollard::errors::Error::DockerResponseServerError {
                status_code: 409,
                message,
            } => EngineError::Conflict(message),
            bollard::errors::Error::DockerResponseServerError {
                status_code,
                message,
            } => EngineError::Api {
                status: status_code,
                message,
            },
            other => EngineError::Runtime(other.to_string()),
        }
    }
}
