//! Output module
//!
//! Handles record shaping and JSON array file writing.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Zipping a `ColumnSchema` with a `Row` into an ordered `Record`
//! - Mapping source cells to JSON values under a `NullMode`
//! - Writing records incrementally as one top-level JSON array

mod record;
mod writer;

pub use record::{cell_to_json, Record};
pub use writer::JsonArrayWriter;

#[cfg(test)]
mod tests;
