//! # attrgraph
//!
//! This library exposes the CLI commands for testing and integration.
//!
//! The binary uses these through the `main.rs` entry point.

pub mod cli;

// Re-export attrgraph_core for convenience
pub use attrgraph_core;
