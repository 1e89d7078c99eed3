//! CLI module for the hot-reload watcher.
//!
//! Provides command-line parsing and the command implementations.

pub mod args;
pub mod commands;

pub use args::{Cli, ModeArg};
