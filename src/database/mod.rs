//! Database connector support via DuckDB
//!
//! This module provides database connectivity using DuckDB as the query engine.
//! DuckDB can attach MySQL, PostgreSQL, SQLite and DuckDB databases.

mod engine;
mod identifier;
mod reader;

pub use engine::{DatabaseEngine, SOURCE_CATALOG};
pub use identifier::{quote_ident, quote_literal, TableIdent};
pub use reader::TableReader;
