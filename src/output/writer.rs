//! JSON array file writer
//!
//! Writes an unbounded stream of records as a single top-level JSON array,
//! one record at a time.

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const OPEN: &[u8] = b"[\n";
const SEPARATOR: &[u8] = b",\n";
const CLOSE: &[u8] = b"\n]";
const INDENT: &[u8] = b"    ";

/// Whether any record has been written yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayState {
    Empty,
    HasItems,
}

/// Incremental JSON array writer
///
/// `[` is written on open and `]` on close; records in between are separated
/// by `,` and pretty-printed with four-space indentation. Memory use does not
/// grow with the number of records.
pub struct JsonArrayWriter<W: Write> {
    /// Destination sink
    sink: W,
    /// Destination path (for error messages)
    path: PathBuf,
    /// Separator state
    state: ArrayState,
    /// Number of records written
    records_written: usize,
    /// Reused serialization buffer
    scratch: Vec<u8>,
}

impl JsonArrayWriter<BufWriter<File>> {
    /// Create (or truncate) the file at `path` and write the opening `[`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| Error::destination(path, format!("Failed to create file: {e}")))?;

        Self::from_writer(BufWriter::new(file), path)
    }
}

impl<W: Write> JsonArrayWriter<W> {
    /// Wrap an arbitrary sink and write the opening `[`
    ///
    /// `label` names the destination in error messages.
    pub fn from_writer(mut sink: W, label: impl AsRef<Path>) -> Result<Self> {
        let path = label.as_ref().to_path_buf();
        sink.write_all(OPEN)
            .map_err(|e| Error::destination(&path, format!("Failed to write: {e}")))?;

        Ok(Self {
            sink,
            path,
            state: ArrayState::Empty,
            records_written: 0,
            scratch: Vec::with_capacity(1024),
        })
    }

    /// Write one record as a JSON object
    ///
    /// The record is fully serialized before anything reaches the sink, so a
    /// serialization failure never leaves a partial object behind.
    pub fn write_record<T: Serialize + ?Sized>(&mut self, record: &T) -> Result<()> {
        self.scratch.clear();
        let mut serializer = serde_json::Serializer::with_formatter(
            &mut self.scratch,
            PrettyFormatter::with_indent(INDENT),
        );
        record
            .serialize(&mut serializer)
            .map_err(|e| Error::serialization(e.to_string()))?;

        if self.state == ArrayState::HasItems {
            self.write_raw(SEPARATOR)?;
        }
        self.sink
            .write_all(&self.scratch)
            .map_err(|e| Error::destination(&self.path, format!("Failed to write record: {e}")))?;

        self.state = ArrayState::HasItems;
        self.records_written += 1;
        Ok(())
    }

    /// Number of records written so far
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Destination path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the closing `]`, flush, and hand back the sink
    pub fn finish(mut self) -> Result<(usize, W)> {
        self.write_raw(CLOSE)?;
        self.sink
            .flush()
            .map_err(|e| Error::destination(&self.path, format!("Failed to flush: {e}")))?;
        Ok((self.records_written, self.sink))
    }

    /// Write the closing `]` and release the destination
    ///
    /// Returns the number of records written.
    pub fn close(self) -> Result<usize> {
        self.finish().map(|(count, _)| count)
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.sink
            .write_all(bytes)
            .map_err(|e| Error::destination(&self.path, format!("Failed to write: {e}")))
    }
}
