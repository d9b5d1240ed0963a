//! CLI module
//!
//! Command-line interface for running exports.
//!
//! # Commands
//!
//! - `export` - Write a table to a JSON array file
//! - `check` - Test connection to the database
//! - `tables` - List tables in the database

mod commands;
mod runner;

pub use commands::{Cli, Commands, ConnectionArgs, ExportArgs, KindArg};
pub use runner::Runner;
