//! Source data model
//!
//! Column schema, cells, rows and batches, plus the `RowSource` trait the
//! export pipeline pulls from.

use crate::error::Result;
use std::num::NonZeroUsize;

// ============================================================================
// Column Schema
// ============================================================================

/// Ordered column names of one query
///
/// Fixed for the duration of an export. Every row produced for the query
/// has exactly `len()` cells.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnSchema {
    names: Vec<String>,
}

impl ColumnSchema {
    /// Create a schema from column names in query order
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Column names in order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the schema has no columns
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate column names in order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ColumnSchema {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// Cells, Rows, Batches
// ============================================================================

/// A single value read from the source
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Absent value (SQL NULL)
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    /// Exact decimal in plain notation, such as `-12.50`
    Decimal(String),
    Text(String),
    /// Raw bytes, rendered as base64 text
    Bytes(Vec<u8>),
    /// A value with no JSON mapping; carries a description of what it was
    Unsupported(String),
}

impl Cell {
    /// Whether this cell is an absent value
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Cell::Int(i)
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Self {
        Cell::Float(f)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Null, Into::into)
    }
}

/// One row, positionally aligned with the `ColumnSchema`
pub type Row = Vec<Cell>;

/// Rows fetched together
///
/// An empty batch is the terminal signal of a source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Batch {
    rows: Vec<Row>,
}

impl Batch {
    /// Create a batch from rows
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// The terminal, empty batch
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of rows in the batch
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether this is the terminal batch
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Borrow the rows
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

impl IntoIterator for Batch {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

// ============================================================================
// RowSource Trait
// ============================================================================

/// Producer of column names and row batches for one query
///
/// Calls advance the underlying read position and must be made sequentially
/// by a single caller.
pub trait RowSource {
    /// Ordered column names of the active query
    fn schema(&self) -> Result<ColumnSchema>;

    /// Up to `capacity` rows not yet returned
    ///
    /// Returns an empty batch exactly once when no rows remain. Faults in the
    /// underlying data source surface as `Error::Source`.
    fn next_batch(&mut self, capacity: NonZeroUsize) -> Result<Batch>;
}
