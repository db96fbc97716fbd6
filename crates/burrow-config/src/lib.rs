//! Layered configuration for burrow
//!
//! Two TOML documents back every read: the user file
//! (`~/.config/burrow/config.toml`) and an optional project-local
//! `.burrow.toml` found by walking up from the working directory.
//! Reads merge the two with local values winning; writes target an
//! explicit [`Scope`].

mod environment;
mod error;
mod project;
mod store;

pub use environment::*;
pub use error::*;
pub use project::*;
pub use store::*;
