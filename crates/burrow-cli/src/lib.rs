//! CLI front end for burrow: argument definitions and command
//! implementations. The binary in `main.rs` wires these to the alias
//! expansion stage and an engine connection.

pub mod cli;
pub mod commands;
