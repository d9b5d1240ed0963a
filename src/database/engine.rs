//! DuckDB-based database query engine
//!
//! Provides unified access to MySQL, PostgreSQL, SQLite and DuckDB files via
//! DuckDB extensions. The source database is attached read-only under the
//! `source_db` catalog and queried from an in-memory DuckDB connection.

use crate::config::{ConnectionConfig, DatabaseKind};
use crate::database::identifier::{quote_literal, TableIdent};
use crate::error::{Error, Result};
use duckdb::{Connection, Statement};

/// Catalog name the source database is attached as
pub const SOURCE_CATALOG: &str = "source_db";

/// Database query engine using DuckDB
pub struct DatabaseEngine {
    /// DuckDB connection
    conn: Connection,
    /// Database type
    kind: DatabaseKind,
    /// Connection target with the password masked (for logging)
    connection_info: String,
}

impl DatabaseEngine {
    /// Open a DuckDB connection and attach the source database
    pub fn connect(connection: &ConnectionConfig) -> Result<Self> {
        // Create in-memory DuckDB connection
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::data_source(format!("Failed to create DuckDB connection: {e}")))?;

        let engine = Self {
            conn,
            kind: connection.kind,
            connection_info: Self::build_attach_target(connection, true),
        };

        tracing::debug!("Attaching {} source: {}", engine.kind, engine.connection_info);
        engine.attach_database(&Self::build_attach_target(connection, false))?;

        Ok(engine)
    }

    /// Build the ATTACH target for a connection
    ///
    /// Network databases use the key/value form understood by the DuckDB
    /// mysql and postgres extensions, with every value quoted; file databases
    /// use the path.
    fn build_attach_target(connection: &ConnectionConfig, mask_password: bool) -> String {
        let database = connection.database.clone().unwrap_or_default();

        let (user_key, password_key, database_key) = match connection.kind {
            DatabaseKind::Mysql => ("user", "password", "database"),
            DatabaseKind::Postgres => ("user", "password", "dbname"),
            DatabaseKind::Sqlite | DatabaseKind::Duckdb => return database,
        };

        let mut parts = Vec::new();
        if let Some(host) = &connection.host {
            parts.push(format!("host={}", quote_param(host)));
        }
        if let Some(port) = connection.effective_port() {
            parts.push(format!("port={port}"));
        }
        if let Some(user) = &connection.user {
            parts.push(format!("{user_key}={}", quote_param(user)));
        }
        match connection.password.as_deref() {
            Some(password) if !password.is_empty() => {
                let shown = if mask_password { "****" } else { password };
                parts.push(format!("{password_key}={}", quote_param(shown)));
            }
            _ => {}
        }
        parts.push(format!("{database_key}={}", quote_param(&database)));
        parts.join(" ")
    }

    /// Attach external database to DuckDB
    fn attach_database(&self, target: &str) -> Result<()> {
        let db_type = match self.kind {
            DatabaseKind::Mysql => Some("MYSQL"),
            DatabaseKind::Postgres => Some("POSTGRES"),
            DatabaseKind::Sqlite => Some("SQLITE"),
            DatabaseKind::Duckdb => None,
        };

        if let Some(db_type) = db_type {
            let extension = db_type.to_lowercase();
            self.conn
                .execute_batch(&format!("INSTALL {extension}; LOAD {extension};"))
                .map_err(|e| {
                    Error::data_source(format!(
                        "Failed to load {extension} extension (is DuckDB able to install it?): {e}"
                    ))
                })?;
        }

        let options = match db_type {
            Some(db_type) => format!("TYPE {db_type}, READ_ONLY"),
            None => "READ_ONLY".to_string(),
        };
        let attach_sql = format!(
            "ATTACH {} AS {SOURCE_CATALOG} ({options});",
            quote_literal(target)
        );

        self.conn.execute_batch(&attach_sql).map_err(|e| {
            Error::data_source(format!("Failed to connect to {}: {e}", self.connection_info))
        })?;

        Ok(())
    }

    /// Test database connection
    pub fn check_connection(&self) -> Result<()> {
        let query = match self.kind {
            DatabaseKind::Postgres => "SELECT 1 FROM source_db.pg_catalog.pg_tables LIMIT 1",
            DatabaseKind::Mysql => "SELECT 1 FROM source_db.information_schema.tables LIMIT 1",
            DatabaseKind::Sqlite => "SELECT 1 FROM source_db.sqlite_master LIMIT 1",
            DatabaseKind::Duckdb => {
                "SELECT 1 FROM information_schema.tables WHERE table_catalog = 'source_db' LIMIT 1"
            }
        };

        let mut stmt = self
            .conn
            .prepare(query)
            .map_err(|e| Error::data_source(format!("Connection check failed: {e}")))?;
        let mut rows = stmt
            .query([])
            .map_err(|e| Error::data_source(format!("Connection check failed: {e}")))?;
        rows.next()
            .map_err(|e| Error::data_source(format!("Connection check failed: {e}")))?;

        Ok(())
    }

    /// Get list of tables in the source database as `schema.table`
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let query = "SELECT table_schema || '.' || table_name AS full_name
                     FROM information_schema.tables
                     WHERE table_catalog = 'source_db'
                       AND table_schema NOT IN ('pg_catalog', 'information_schema')
                     ORDER BY table_schema, table_name";

        let mut stmt = self
            .conn
            .prepare(query)
            .map_err(|e| Error::data_source(format!("Failed to prepare query: {e}")))?;

        let tables = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e| Error::data_source(format!("Failed to query tables: {e}")))?
            .collect::<std::result::Result<Vec<String>, _>>()
            .map_err(|e| Error::data_source(format!("Failed to read table list: {e}")))?;

        Ok(tables)
    }

    /// SQL that reads every row of `table`
    pub fn scan_query(&self, table: &TableIdent) -> String {
        let default_schema = match self.kind {
            DatabaseKind::Postgres => Some("public"),
            _ => None,
        };
        format!(
            "SELECT * FROM {}",
            table.qualified(SOURCE_CATALOG, default_schema)
        )
    }

    /// Prepare the full-table scan for `table`
    pub fn prepare_scan(&self, table: &TableIdent) -> Result<Statement<'_>> {
        let query = self.scan_query(table);
        tracing::debug!("Executing query: {}", query);

        self.conn
            .prepare(&query)
            .map_err(|e| Error::data_source(format!("Failed to query table '{table}': {e}")))
    }

    /// Get database type
    pub fn kind(&self) -> DatabaseKind {
        self.kind
    }

    /// Get connection target (for logging - password masked)
    pub fn connection_info(&self) -> &str {
        &self.connection_info
    }

    /// Detach the source and close the DuckDB connection
    pub fn close(self) -> Result<()> {
        let info = self.connection_info;
        self.conn
            .close()
            .map_err(|(_, e)| Error::data_source(format!("Failed to close {info}: {e}")))?;
        tracing::debug!("Closed connection to {}", info);
        Ok(())
    }
}

/// Quote a key/value connection parameter, escaping `\` and `'`
fn quote_param(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}
