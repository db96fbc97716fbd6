//! Core logic for burrow environment lifecycle and alias resolution
//!
//! This crate provides:
//! - The environment lifecycle state machine (create, start, stop, delete)
//! - The merged config/engine registry that derives environment state
//! - Config-backed alias expansion with cycle and depth guards
//! - The static command table the CLI dispatches against

mod alias;
mod dispatch;
mod environment;
mod error;
mod manager;
mod registry;

pub use alias::*;
pub use dispatch::*;
pub use environment::*;
pub use error::*;
pub use manager::*;
pub use registry::*;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
