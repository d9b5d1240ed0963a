//! Common types used throughout table-json-export
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

// ============================================================================
// Null Handling
// ============================================================================

/// How absent values are rendered in the output
///
/// Applied uniformly to every absent value of one export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullMode {
    /// Absent values become JSON `null`
    #[default]
    Null,
    /// Absent values become the empty string `""`
    EmptyString,
}

impl NullMode {
    /// Build from the boolean "replace null" flag
    pub fn from_replace_flag(replace_null: bool) -> Self {
        if replace_null {
            NullMode::EmptyString
        } else {
            NullMode::Null
        }
    }

    /// JSON value used for an absent value in this mode
    pub fn absent_value(self) -> JsonValue {
        match self {
            NullMode::Null => JsonValue::Null,
            NullMode::EmptyString => JsonValue::String(String::new()),
        }
    }
}

// ============================================================================
// Export Outcome
// ============================================================================

/// Summary of a successful export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    /// Table that was exported
    pub table: String,
    /// Number of records written
    pub record_count: usize,
    /// File the records were written to
    pub output_path: PathBuf,
}

impl std::fmt::Display for ExportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Exported {} records from {} to {}",
            self.record_count,
            self.table,
            self.output_path.display()
        )
    }
}
