//! Tabular source module
//!
//! The producing side of an export.
//!
//! # Overview
//!
//! The source module provides:
//! - `ColumnSchema` - Ordered column names of the active query
//! - `Cell` / `Row` / `Batch` - Values as they come off the source
//! - `RowSource` - Trait implemented by anything that yields batches
//! - `MemorySource` - A `RowSource` over rows held in memory

mod memory;
mod types;

pub use memory::MemorySource;
pub use types::{Batch, Cell, ColumnSchema, Row, RowSource};
