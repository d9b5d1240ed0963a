//! In-memory row source

use crate::error::{Error, Result};
use crate::source::types::{Batch, ColumnSchema, Row, RowSource};
use std::collections::VecDeque;
use std::num::NonZeroUsize;

/// `RowSource` over rows already held in memory
///
/// Useful for embedding callers that produce rows themselves, and as a
/// deterministic source in tests.
#[derive(Debug, Clone)]
pub struct MemorySource {
    schema: ColumnSchema,
    rows: VecDeque<Row>,
    exhausted: bool,
}

impl MemorySource {
    /// Create a source, checking every row against the schema width
    pub fn new(schema: ColumnSchema, rows: Vec<Row>) -> Result<Self> {
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != schema.len())
        {
            return Err(Error::data_source(format!(
                "Row {idx} has {} values but the schema has {} columns",
                row.len(),
                schema.len()
            )));
        }

        Ok(Self {
            schema,
            rows: rows.into(),
            exhausted: false,
        })
    }

    /// Rows not yet handed out
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl RowSource for MemorySource {
    fn schema(&self) -> Result<ColumnSchema> {
        Ok(self.schema.clone())
    }

    fn next_batch(&mut self, capacity: NonZeroUsize) -> Result<Batch> {
        if self.exhausted {
            return Err(Error::data_source("Source already exhausted"));
        }

        let take = capacity.get().min(self.rows.len());
        let batch = Batch::new(self.rows.drain(..take).collect());
        if batch.is_empty() {
            self.exhausted = true;
        }
        Ok(batch)
    }
}
