//! Activity journal CLI library.
//!
//! This crate provides the CLI interface for the activity journal.

mod cli;
pub mod commands;
mod config;

pub use cli::{AddEntry, Cli, Commands, SettingsAction};
pub use config::Config;
