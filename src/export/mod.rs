//! Export module
//!
//! Wires a `RowSource` to a `JsonArrayWriter`.
//!
//! # Overview
//!
//! - `export_source` / `write_array` - The batched fetch, incremental
//!   serialize loop. Single-threaded; memory is bounded by one batch.
//! - `ExportOptions` - Batch capacity, null mode and cancellation
//! - `CancelToken` - Cooperative cancellation checked between batches
//! - `TableExporter` - Runs an `ExportConfig` end to end against a database

mod exporter;
mod pipeline;

pub use exporter::TableExporter;
pub use pipeline::{export_source, write_array, CancelToken, ExportOptions};
