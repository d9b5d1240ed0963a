//! # table-json-export
//!
//! Streams a single relational table into a JSON array file without holding
//! the result set in memory.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use table_json_export::{ExportConfig, TableExporter, Result};
//!
//! fn main() -> Result<()> {
//!     let config = ExportConfig::from_file("export.yaml")?;
//!     let summary = TableExporter::new().run(&config)?;
//!     println!("{summary}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   next_batch()   ┌──────────────┐  write_record()  ┌─────────────────┐
//! │ TableReader  │ ───────────────▶ │    Record    │ ───────────────▶ │ JsonArrayWriter │
//! │ (DuckDB Rows)│   Batch of Rows  │ (schema+row) │   one object     │  [ {..},{..} ]  │
//! └──────────────┘                  └──────────────┘                  └─────────────────┘
//!        ▲                                                                    │
//!        │ ATTACH ... (READ_ONLY)                                              ▼
//!   MySQL / PostgreSQL / SQLite / DuckDB                                  output.json
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: Document Error variant fields and Cell variants

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Common types and type aliases
pub mod types;

/// Export configuration
pub mod config;

/// Source data model and row sources
pub mod source;

/// Database access via DuckDB
pub mod database;

/// Record shaping and JSON array output
pub mod output;

/// Export pipeline and orchestration
pub mod export;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{ConnectionConfig, DatabaseKind, ExportConfig};
pub use error::{Error, ErrorStage, Result};
pub use export::{CancelToken, ExportOptions, TableExporter};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
