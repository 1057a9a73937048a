//! # flowports
//!
//! Library half of the flowports binary: configuration, snapshot loading
//! and the CLI commands. `main.rs` only wires logging and exit codes.

pub mod cli;
pub mod config;
pub mod loader;
