//! Configuration types for table exports
//!
//! An export is described by an `ExportConfig`: where to connect, which
//! table to read, where to write, and how to render absent values. Configs
//! can be loaded from YAML or JSON files and are overlaid by CLI flags.

use crate::database::TableIdent;
use crate::error::{Error, Result};
use crate::types::NullMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Default number of rows fetched per batch
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Extension appended to output paths that have none
pub const DEFAULT_EXTENSION: &str = "json";

// ============================================================================
// Database Kind
// ============================================================================

/// Supported source databases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseKind {
    /// MySQL / MariaDB
    #[default]
    Mysql,
    /// PostgreSQL
    Postgres,
    /// SQLite file
    Sqlite,
    /// DuckDB file
    Duckdb,
}

impl DatabaseKind {
    /// Default TCP port, if the kind is a network database
    pub fn default_port(self) -> Option<u16> {
        match self {
            DatabaseKind::Mysql => Some(3306),
            DatabaseKind::Postgres => Some(5432),
            DatabaseKind::Sqlite | DatabaseKind::Duckdb => None,
        }
    }

    /// Whether host and user are needed to connect
    pub fn is_networked(self) -> bool {
        self.default_port().is_some()
    }
}

impl std::fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseKind::Mysql => write!(f, "mysql"),
            DatabaseKind::Postgres => write!(f, "postgres"),
            DatabaseKind::Sqlite => write!(f, "sqlite"),
            DatabaseKind::Duckdb => write!(f, "duckdb"),
        }
    }
}

// ============================================================================
// Connection Config
// ============================================================================

/// Database connection parameters
///
/// All values are passed through to the data source untouched.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ConnectionConfig {
    /// Database type
    pub kind: DatabaseKind,
    /// Server host (network databases)
    pub host: Option<String>,
    /// Server port, defaulted per kind
    pub port: Option<u16>,
    /// Database user (network databases)
    pub user: Option<String>,
    /// Password; may be empty
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Database name, or file path for sqlite/duckdb
    pub database: Option<String>,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("kind", &self.kind)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("database", &self.database)
            .finish()
    }
}

impl ConnectionConfig {
    /// Effective port for network databases
    pub fn effective_port(&self) -> Option<u16> {
        self.port.or(self.kind.default_port())
    }

    /// Check that the fields the kind needs are present
    pub fn validate(&self) -> Result<()> {
        if self.kind.is_networked() {
            require("connection.host", self.host.as_deref())?;
            require("connection.user", self.user.as_deref())?;
        }
        require("connection.database", self.database.as_deref())?;
        Ok(())
    }
}

fn require(field: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(Error::missing_field(field)),
    }
}

// ============================================================================
// Export Config
// ============================================================================

/// Complete description of one export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ExportConfig {
    /// Where to read from
    pub connection: ConnectionConfig,
    /// Table to export (`name` or `schema.name`)
    pub table: String,
    /// Destination file
    pub output: PathBuf,
    /// Render absent values as `""` instead of `null`
    pub replace_null: bool,
    /// Rows fetched per batch
    pub batch_size: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            table: String::new(),
            output: PathBuf::new(),
            replace_null: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl ExportConfig {
    /// Load a config file; `.json` files are parsed as JSON, anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Ok(serde_json::from_str(&content)?)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Parse a YAML config
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Check required fields and value ranges
    pub fn validate(&self) -> Result<()> {
        self.connection.validate()?;
        require("table", Some(self.table.as_str()))?;
        if self.output.as_os_str().is_empty() {
            return Err(Error::missing_field("output"));
        }
        self.batch_capacity()?;
        self.table_ident()?;
        Ok(())
    }

    /// Batch size as a non-zero capacity
    pub fn batch_capacity(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.batch_size)
            .ok_or_else(|| Error::invalid_value("batch_size", "must be a positive integer"))
    }

    /// Null rendering mode for this export
    pub fn null_mode(&self) -> NullMode {
        NullMode::from_replace_flag(self.replace_null)
    }

    /// Parsed and validated table identifier
    pub fn table_ident(&self) -> Result<TableIdent> {
        TableIdent::parse(&self.table)
    }

    /// Destination path with `.json` appended when it has no extension
    pub fn output_path(&self) -> PathBuf {
        if self.output.extension().is_some() {
            self.output.clone()
        } else {
            self.output.with_extension(DEFAULT_EXTENSION)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorStage;

    fn mysql_config() -> ExportConfig {
        ExportConfig {
            connection: ConnectionConfig {
                kind: DatabaseKind::Mysql,
                host: Some("localhost".to_string()),
                port: None,
                user: Some("root".to_string()),
                password: None,
                database: Some("tienda".to_string()),
            },
            table: "clientes".to_string(),
            output: PathBuf::from("/tmp/clientes.json"),
            ..ExportConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.batch_size, 1000);
        assert!(!config.replace_null);
        assert_eq!(config.connection.kind, DatabaseKind::Mysql);
        assert_eq!(config.null_mode(), NullMode::Null);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
connection:
  kind: postgres
  host: db.internal
  user: reporting
  password: s3cret
  database: analytics
table: public.orders
output: orders.json
replace_null: true
batch_size: 250
"#;
        let config = ExportConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.connection.kind, DatabaseKind::Postgres);
        assert_eq!(config.connection.effective_port(), Some(5432));
        assert_eq!(config.connection.password.as_deref(), Some("s3cret"));
        assert_eq!(config.table, "public.orders");
        assert_eq!(config.batch_size, 250);
        assert_eq!(config.null_mode(), NullMode::EmptyString);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        fs::write(
            &path,
            r#"{"connection": {"kind": "duckdb", "database": "local.duckdb"}, "table": "t", "output": "t.json"}"#,
        )
        .unwrap();

        let config = ExportConfig::from_file(&path).unwrap();
        assert_eq!(config.connection.kind, DatabaseKind::Duckdb);
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file() {
        let err = ExportConfig::from_file("/definitely/not/here.yaml").unwrap_err();
        assert_eq!(err.stage(), ErrorStage::Config);
    }

    #[test]
    fn test_password_is_optional() {
        let config = mysql_config();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_required_fields() {
        let mut config = mysql_config();
        config.connection.host = Some("  ".to_string());
        assert!(matches!(
            config.validate(),
            Err(Error::MissingConfigField { field }) if field == "connection.host"
        ));

        let mut config = mysql_config();
        config.table = String::new();
        assert!(matches!(
            config.validate(),
            Err(Error::MissingConfigField { field }) if field == "table"
        ));

        let mut config = mysql_config();
        config.output = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_databases_need_no_host() {
        let config = ExportConfig {
            connection: ConnectionConfig {
                kind: DatabaseKind::Sqlite,
                database: Some("data.db".to_string()),
                ..ConnectionConfig::default()
            },
            table: "t".to_string(),
            output: PathBuf::from("t.json"),
            ..ExportConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.connection.effective_port(), None);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut config = mysql_config();
        config.batch_size = 0;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfigValue { field, .. }) if field == "batch_size"
        ));
    }

    #[test]
    fn test_invalid_table_rejected() {
        let mut config = mysql_config();
        config.table = "a.b.c".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_output_path_extension() {
        let mut config = mysql_config();
        config.output = PathBuf::from("/tmp/clientes");
        assert_eq!(config.output_path(), PathBuf::from("/tmp/clientes.json"));

        config.output = PathBuf::from("/tmp/clientes.txt");
        assert_eq!(config.output_path(), PathBuf::from("/tmp/clientes.txt"));
    }

    #[test]
    fn test_debug_masks_password() {
        let mut config = mysql_config();
        config.connection.password = Some("hunter2".to_string());
        let debug = format!("{:?}", config.connection);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("****"));
    }
}
