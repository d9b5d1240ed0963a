//! Record shaping
//!
//! Turns a positional row into a name/value record whose key order is the
//! column order of the query.

use crate::error::{Error, Result};
use crate::source::{Cell, ColumnSchema, Row};
use crate::types::{JsonValue, NullMode};
use base64::Engine as _;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One row reshaped into an ordered name/value mapping
///
/// Keys borrow from the schema, so building a record per row does not
/// allocate column names.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<'a> {
    fields: Vec<(&'a str, JsonValue)>,
}

impl<'a> Record<'a> {
    /// Zip `schema` with `row`, mapping every cell under `null_mode`
    pub fn from_row(schema: &'a ColumnSchema, row: Row, null_mode: NullMode) -> Result<Self> {
        if row.len() != schema.len() {
            return Err(Error::data_source(format!(
                "Row has {} values but the schema has {} columns",
                row.len(),
                schema.len()
            )));
        }

        let fields = schema
            .iter()
            .zip(row)
            .map(|(name, cell)| {
                cell_to_json(cell, null_mode)
                    .map(|value| (name, value))
                    .map_err(|e| Error::serialization(format!("Column '{name}': {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { fields })
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Value of the named field
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.fields
            .iter()
            .find_map(|(key, value)| (*key == name).then_some(value))
    }

    /// Field names in output order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| *key)
    }
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Map a source cell to its JSON value
///
/// Absent values follow `null_mode`. Fails for non-finite floats and for
/// cells the source could not give a scalar form.
pub fn cell_to_json(cell: Cell, null_mode: NullMode) -> std::result::Result<JsonValue, String> {
    match cell {
        Cell::Null => Ok(null_mode.absent_value()),
        Cell::Bool(b) => Ok(JsonValue::Bool(b)),
        Cell::Int(i) => Ok(JsonValue::Number(i.into())),
        Cell::UInt(u) => Ok(JsonValue::Number(u.into())),
        Cell::Float(f) => serde_json::Number::from_f64(f)
            .map(JsonValue::Number)
            .ok_or_else(|| format!("{f} has no JSON representation")),
        Cell::Decimal(d) => d
            .parse::<serde_json::Number>()
            .map(JsonValue::Number)
            .map_err(|e| format!("invalid decimal '{d}': {e}")),
        Cell::Text(s) => Ok(JsonValue::String(s)),
        Cell::Bytes(b) => Ok(JsonValue::String(
            base64::engine::general_purpose::STANDARD.encode(b),
        )),
        Cell::Unsupported(description) => {
            Err(format!("no JSON mapping for value {description}"))
        }
    }
}
