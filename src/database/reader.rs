//! Table reader over a streaming DuckDB result
//!
//! The scan runs with streaming execution: DuckDB hands out one Arrow chunk
//! at a time as the reader asks for rows, so neither side ever holds more
//! than the current chunk plus the batch being filled.

use crate::error::{Error, Result};
use crate::source::{Batch, Cell, ColumnSchema, Row, RowSource};
use duckdb::arrow::array::{Array, AsArray, StructArray};
use duckdb::arrow::datatypes::{
    DataType, Date32Type, Decimal128Type, Decimal256Type, Decimal32Type, Decimal64Type,
    Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, Time32MillisecondType,
    Time32SecondType, Time64MicrosecondType, Time64NanosecondType, TimeUnit,
    TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
    TimestampSecondType, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use duckdb::Statement;
use std::num::NonZeroUsize;

/// Days from 0001-01-01 (CE day 1) to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// `RowSource` over a DuckDB statement executed in streaming mode
///
/// The statement is executed once on construction; batches are then cut
/// from the chunks DuckDB produces without re-querying.
pub struct TableReader<'stmt> {
    /// Executed statement the chunks are pulled from
    statement: &'stmt Statement<'stmt>,
    /// Column names of the executed query
    schema: ColumnSchema,
    /// Chunk currently being handed out
    chunk: Option<StructArray>,
    /// Next unread row of `chunk`
    offset: usize,
    /// DuckDB reported the end of the result
    drained: bool,
    /// Set once the terminal empty batch has been returned
    exhausted: bool,
}

impl<'stmt> TableReader<'stmt> {
    /// Execute `statement` in streaming mode and capture its column names
    pub fn new(statement: &'stmt mut Statement<'_>) -> Result<Self> {
        let result_schema = statement
            .stream_arrow([])
            .map_err(|e| Error::data_source(format!("Query failed: {e}")))?
            .get_schema();
        let schema = result_schema
            .fields()
            .iter()
            .map(|field| field.name().as_str())
            .collect();

        let statement: &'stmt Statement<'_> = statement;

        Ok(Self {
            statement,
            schema,
            chunk: None,
            offset: 0,
            drained: false,
            exhausted: false,
        })
    }

    /// Make sure an unread row is available, fetching the next chunk if needed
    ///
    /// Returns false once the result is drained.
    fn fill_chunk(&mut self) -> Result<bool> {
        loop {
            if let Some(chunk) = &self.chunk {
                if self.offset < chunk.len() {
                    return Ok(true);
                }
            }
            if self.drained {
                return Ok(false);
            }

            match self
                .statement
                .step()
                .map_err(|e| Error::data_source(format!("Fetch failed: {e}")))?
            {
                Some(chunk) => {
                    self.chunk = Some(chunk);
                    self.offset = 0;
                }
                None => {
                    self.chunk = None;
                    self.drained = true;
                }
            }
        }
    }
}

impl RowSource for TableReader<'_> {
    fn schema(&self) -> Result<ColumnSchema> {
        Ok(self.schema.clone())
    }

    fn next_batch(&mut self, capacity: NonZeroUsize) -> Result<Batch> {
        if self.exhausted {
            return Err(Error::data_source("Query already exhausted"));
        }

        let mut fetched: Vec<Row> = Vec::with_capacity(capacity.get());

        while fetched.len() < capacity.get() && self.fill_chunk()? {
            let Some(chunk) = &self.chunk else {
                break;
            };
            let end = chunk.len().min(self.offset + capacity.get() - fetched.len());
            for row in self.offset..end {
                fetched.push(row_cells(chunk, row)?);
            }
            self.offset = end;
        }

        if fetched.is_empty() {
            self.exhausted = true;
        }
        tracing::debug!("Fetched batch of {} rows", fetched.len());
        Ok(Batch::new(fetched))
    }
}

/// Cells of one row of a result chunk, in column order
fn row_cells(chunk: &StructArray, row: usize) -> Result<Row> {
    chunk
        .columns()
        .iter()
        .map(|column| cell_at(column.as_ref(), row))
        .collect()
}

/// Convert one element of an Arrow array to a source cell
#[allow(clippy::too_many_lines)]
fn cell_at(array: &dyn Array, row: usize) -> Result<Cell> {
    if array.is_null(row) {
        return Ok(Cell::Null);
    }

    let cell = match array.data_type() {
        DataType::Null => Cell::Null,
        DataType::Boolean => Cell::Bool(downcast(array.as_boolean_opt(), array)?.value(row)),

        DataType::Int8 => Cell::Int(primitive::<Int8Type>(array)?.value(row).into()),
        DataType::Int16 => Cell::Int(primitive::<Int16Type>(array)?.value(row).into()),
        DataType::Int32 => Cell::Int(primitive::<Int32Type>(array)?.value(row).into()),
        DataType::Int64 => Cell::Int(primitive::<Int64Type>(array)?.value(row)),
        DataType::UInt8 => Cell::UInt(primitive::<UInt8Type>(array)?.value(row).into()),
        DataType::UInt16 => Cell::UInt(primitive::<UInt16Type>(array)?.value(row).into()),
        DataType::UInt32 => Cell::UInt(primitive::<UInt32Type>(array)?.value(row).into()),
        DataType::UInt64 => Cell::UInt(primitive::<UInt64Type>(array)?.value(row)),
        DataType::Float32 => Cell::Float(primitive::<Float32Type>(array)?.value(row).into()),
        DataType::Float64 => Cell::Float(primitive::<Float64Type>(array)?.value(row)),

        // HUGEINT arrives as DECIMAL(38, 0)
        DataType::Decimal32(_, _) => {
            Cell::Decimal(primitive::<Decimal32Type>(array)?.value_as_string(row))
        }
        DataType::Decimal64(_, _) => {
            Cell::Decimal(primitive::<Decimal64Type>(array)?.value_as_string(row))
        }
        DataType::Decimal128(_, _) => {
            Cell::Decimal(primitive::<Decimal128Type>(array)?.value_as_string(row))
        }
        DataType::Decimal256(_, _) => {
            Cell::Decimal(primitive::<Decimal256Type>(array)?.value_as_string(row))
        }

        DataType::Utf8 => {
            Cell::Text(downcast(array.as_string_opt::<i32>(), array)?.value(row).to_string())
        }
        DataType::LargeUtf8 => {
            Cell::Text(downcast(array.as_string_opt::<i64>(), array)?.value(row).to_string())
        }
        DataType::Utf8View => {
            Cell::Text(downcast(array.as_string_view_opt(), array)?.value(row).to_string())
        }
        DataType::Binary => {
            Cell::Bytes(downcast(array.as_binary_opt::<i32>(), array)?.value(row).to_vec())
        }
        DataType::LargeBinary => {
            Cell::Bytes(downcast(array.as_binary_opt::<i64>(), array)?.value(row).to_vec())
        }
        DataType::BinaryView => {
            Cell::Bytes(downcast(array.as_binary_view_opt(), array)?.value(row).to_vec())
        }
        DataType::FixedSizeBinary(_) => {
            Cell::Bytes(downcast(array.as_fixed_size_binary_opt(), array)?.value(row).to_vec())
        }

        DataType::Date32 => date_cell(primitive::<Date32Type>(array)?.value(row)),
        DataType::Timestamp(unit, _) => {
            let value = match unit {
                TimeUnit::Second => primitive::<TimestampSecondType>(array)?.value(row),
                TimeUnit::Millisecond => primitive::<TimestampMillisecondType>(array)?.value(row),
                TimeUnit::Microsecond => primitive::<TimestampMicrosecondType>(array)?.value(row),
                TimeUnit::Nanosecond => primitive::<TimestampNanosecondType>(array)?.value(row),
            };
            timestamp_cell(*unit, value)
        }
        DataType::Time32(unit) => {
            let value = match unit {
                TimeUnit::Second => primitive::<Time32SecondType>(array)?.value(row),
                _ => primitive::<Time32MillisecondType>(array)?.value(row),
            };
            time_cell(*unit, value.into())
        }
        DataType::Time64(unit) => {
            let value = match unit {
                TimeUnit::Nanosecond => primitive::<Time64NanosecondType>(array)?.value(row),
                _ => primitive::<Time64MicrosecondType>(array)?.value(row),
            };
            time_cell(*unit, value)
        }

        // ENUM columns
        DataType::Dictionary(_, _) => {
            let dictionary = downcast(array.as_any_dictionary_opt(), array)?;
            match dictionary_key(dictionary.keys(), row)? {
                Some(key) => cell_at(dictionary.values().as_ref(), key)?,
                None => Cell::Null,
            }
        }

        other => Cell::Unsupported(other.to_string()),
    };

    Ok(cell)
}

fn downcast<'a, T: ?Sized>(array: Option<&'a T>, source: &dyn Array) -> Result<&'a T> {
    array.ok_or_else(|| {
        Error::data_source(format!(
            "Unexpected array layout for {}",
            source.data_type()
        ))
    })
}

fn primitive<T: duckdb::arrow::datatypes::ArrowPrimitiveType>(
    array: &dyn Array,
) -> Result<&duckdb::arrow::array::PrimitiveArray<T>> {
    downcast(array.as_primitive_opt::<T>(), array)
}

/// Index into the dictionary values for `row`, `None` when the key is null
fn dictionary_key(keys: &dyn Array, row: usize) -> Result<Option<usize>> {
    if keys.is_null(row) {
        return Ok(None);
    }
    let key = match keys.data_type() {
        DataType::UInt8 => primitive::<UInt8Type>(keys)?.value(row).into(),
        DataType::UInt16 => primitive::<UInt16Type>(keys)?.value(row).into(),
        DataType::UInt32 => u64::from(primitive::<UInt32Type>(keys)?.value(row)),
        DataType::UInt64 => primitive::<UInt64Type>(keys)?.value(row),
        // Negative keys fall out of range below
        DataType::Int8 => signed_key(primitive::<Int8Type>(keys)?.value(row).into()),
        DataType::Int16 => signed_key(primitive::<Int16Type>(keys)?.value(row).into()),
        DataType::Int32 => signed_key(primitive::<Int32Type>(keys)?.value(row).into()),
        DataType::Int64 => signed_key(primitive::<Int64Type>(keys)?.value(row)),
        other => {
            return Err(Error::data_source(format!(
                "Unsupported dictionary key type {other}"
            )))
        }
    };
    usize::try_from(key)
        .map(Some)
        .map_err(|_| Error::data_source(format!("Dictionary key {key} out of range")))
}

fn signed_key(key: i64) -> u64 {
    u64::try_from(key).unwrap_or(u64::MAX)
}

fn date_cell(days: i32) -> Cell {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(chrono::NaiveDate::from_num_days_from_ce_opt)
        .map_or_else(
            || Cell::Unsupported(format!("date out of range: {days} days")),
            |date| Cell::Text(date.format("%Y-%m-%d").to_string()),
        )
}

fn timestamp_cell(unit: TimeUnit, value: i64) -> Cell {
    to_micros(unit, value)
        .and_then(chrono::DateTime::from_timestamp_micros)
        .map_or_else(
            || Cell::Unsupported(format!("timestamp out of range: {value} ({unit:?})")),
            |dt| Cell::Text(dt.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()),
        )
}

fn time_cell(unit: TimeUnit, value: i64) -> Cell {
    // Microseconds since midnight
    let Some(micros) = to_micros(unit, value).filter(|m| *m >= 0) else {
        return Cell::Unsupported(format!("time out of range: {value} ({unit:?})"));
    };
    let secs = micros / 1_000_000;
    Cell::Text(format!(
        "{:02}:{:02}:{:02}.{:06}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60,
        micros % 1_000_000
    ))
}

fn to_micros(unit: TimeUnit, value: i64) -> Option<i64> {
    match unit {
        TimeUnit::Second => value.checked_mul(1_000_000),
        TimeUnit::Millisecond => value.checked_mul(1_000),
        TimeUnit::Microsecond => Some(value),
        TimeUnit::Nanosecond => Some(value / 1_000),
    }
}
