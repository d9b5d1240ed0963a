//! Table identifiers
//!
//! Table names are user input that ends up inside SQL text, so they are
//! validated and always emitted double-quoted.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// One identifier part: 1-64 characters, no control characters, no dots
static IDENT_PART_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\x00-\x1F\x7F.]{1,64}$").unwrap());

/// A validated `name` or `schema.name` table reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableIdent {
    schema: Option<String>,
    name: String,
}

impl TableIdent {
    /// Parse and validate a table reference
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let parts: Vec<&str> = input.split('.').collect();

        let (schema, name) = match parts.as_slice() {
            [name] => (None, *name),
            [schema, name] => (Some(*schema), *name),
            _ => {
                return Err(Error::invalid_value(
                    "table",
                    format!("'{input}' must be 'table' or 'schema.table'"),
                ))
            }
        };

        for part in schema.iter().chain(std::iter::once(&name)) {
            if !IDENT_PART_REGEX.is_match(part) {
                return Err(Error::invalid_value(
                    "table",
                    format!("'{input}' is not a valid identifier"),
                ));
            }
        }

        Ok(Self {
            schema: schema.map(String::from),
            name: name.to_string(),
        })
    }

    /// Schema part, if qualified
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Table name part
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully quoted reference inside `catalog`, using `default_schema` when
    /// the identifier is unqualified
    pub fn qualified(&self, catalog: &str, default_schema: Option<&str>) -> String {
        let mut out = quote_ident(catalog);
        if let Some(schema) = self.schema.as_deref().or(default_schema) {
            out.push('.');
            out.push_str(&quote_ident(schema));
        }
        out.push('.');
        out.push_str(&quote_ident(&self.name));
        out
    }
}

impl std::fmt::Display for TableIdent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{schema}.{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Double-quote an identifier, doubling embedded quotes
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Single-quote a string literal, doubling embedded quotes
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
