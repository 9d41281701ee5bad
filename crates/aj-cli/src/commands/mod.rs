//! CLI subcommand implementations.

pub mod add;
pub mod calories;
pub mod delete;
pub mod list;
pub mod settings;
pub mod status;
pub mod stopwatch;
