//! Database table exporter
//!
//! Runs one `ExportConfig`: connects once, streams the table into the
//! destination file, and releases the connection on every exit path.

use crate::config::ExportConfig;
use crate::database::{DatabaseEngine, TableIdent, TableReader};
use crate::error::Result;
use crate::export::pipeline::{export_source, CancelToken, ExportOptions};
use crate::types::ExportSummary;
use std::path::Path;
use std::time::Instant;

/// Exports database tables to JSON array files
#[derive(Debug, Clone, Default)]
pub struct TableExporter {
    cancel: CancelToken,
}

impl TableExporter {
    /// Create an exporter with its own cancellation token
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an exporter that observes `cancel`
    pub fn with_cancel_token(cancel: CancelToken) -> Self {
        Self { cancel }
    }

    /// Token that cancels exports run by this exporter
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run an export described by `config`
    pub fn run(&self, config: &ExportConfig) -> Result<ExportSummary> {
        config.validate()?;
        let table = config.table_ident()?;
        let output = config.output_path();
        let options = ExportOptions::new()
            .with_batch_size(config.batch_capacity()?)
            .with_null_mode(config.null_mode())
            .with_cancel_token(self.cancel.clone());

        let start = Instant::now();
        let engine = DatabaseEngine::connect(&config.connection)?;
        tracing::info!(
            "Exporting {} from {} to {}",
            table,
            engine.connection_info(),
            output.display()
        );

        let result = Self::export_table(&engine, &table, &output, &options);

        if let Err(e) = engine.close() {
            tracing::warn!("{}", e);
        }

        let record_count = result?;
        tracing::info!(
            "Exported {} records in {:.2}s",
            record_count,
            start.elapsed().as_secs_f64()
        );

        Ok(ExportSummary {
            table: table.to_string(),
            record_count,
            output_path: output,
        })
    }

    fn export_table(
        engine: &DatabaseEngine,
        table: &TableIdent,
        output: &Path,
        options: &ExportOptions,
    ) -> Result<usize> {
        let mut stmt = engine.prepare_scan(table)?;
        let mut reader = TableReader::new(&mut stmt)?;
        export_source(&mut reader, output, options)
    }
}
