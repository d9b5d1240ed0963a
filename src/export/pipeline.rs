//! Batched fetch / incremental serialize pipeline

use crate::config::DEFAULT_BATCH_SIZE;
use crate::error::{Error, Result};
use crate::output::{JsonArrayWriter, Record};
use crate::source::{ColumnSchema, RowSource};
use crate::types::NullMode;
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag, checked before each batch request
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Settings for one pipeline run
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Maximum rows requested per batch
    pub batch_size: NonZeroUsize,
    /// How absent values are rendered
    pub null_mode: NullMode,
    /// Cancellation flag
    pub cancel: CancelToken,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            batch_size: NonZeroUsize::new(DEFAULT_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN),
            null_mode: NullMode::default(),
            cancel: CancelToken::default(),
        }
    }
}

impl ExportOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set batch size
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: NonZeroUsize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set null mode
    #[must_use]
    pub fn with_null_mode(mut self, null_mode: NullMode) -> Self {
        self.null_mode = null_mode;
        self
    }

    /// Set cancellation token
    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Export everything `source` yields into a JSON array file at `destination`
///
/// The schema is taken before the destination is opened; no batch is
/// requested unless the destination opened successfully. Returns the number
/// of records written.
pub fn export_source<S: RowSource + ?Sized>(
    source: &mut S,
    destination: &Path,
    options: &ExportOptions,
) -> Result<usize> {
    let schema = source.schema()?;
    let writer = JsonArrayWriter::open(destination)?;
    write_array(source, &schema, writer, options)
}

/// Stream `source` through `writer`, closing the writer on every path
///
/// On failure the array is still closed so the partial output stays valid
/// JSON; a close failure at that point is logged and the streaming error is
/// returned.
pub fn write_array<S: RowSource + ?Sized, W: Write>(
    source: &mut S,
    schema: &ColumnSchema,
    mut writer: JsonArrayWriter<W>,
    options: &ExportOptions,
) -> Result<usize> {
    match stream_batches(source, schema, &mut writer, options) {
        Ok(()) => writer.close(),
        Err(err) => {
            let path = writer.path().display().to_string();
            if let Err(close_err) = writer.close() {
                tracing::warn!("Failed to close {} after error: {}", path, close_err);
            }
            Err(err)
        }
    }
}

fn stream_batches<S: RowSource + ?Sized, W: Write>(
    source: &mut S,
    schema: &ColumnSchema,
    writer: &mut JsonArrayWriter<W>,
    options: &ExportOptions,
) -> Result<()> {
    loop {
        if options.cancel.is_cancelled() {
            tracing::info!(
                "Export cancelled after {} records",
                writer.records_written()
            );
            return Err(Error::Cancelled {
                records_written: writer.records_written(),
            });
        }

        let batch = source.next_batch(options.batch_size)?;
        if batch.is_empty() {
            return Ok(());
        }

        for row in batch {
            let record = Record::from_row(schema, row, options.null_mode)?;
            writer.write_record(&record)?;
        }
        tracing::debug!("{} records written", writer.records_written());
    }
}
