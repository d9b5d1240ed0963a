//! CLI commands and argument parsing

use crate::config::DatabaseKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Export a database table to a JSON array file
#[derive(Parser, Debug)]
#[command(name = "table-json-export")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Export configuration file (YAML or JSON); flags override its values
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export a table to a JSON file
    Export(ExportArgs),

    /// Test connection to the database
    Check {
        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// List tables available in the database
    Tables {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

/// Arguments of the `export` command
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Table to export (`table` or `schema.table`)
    #[arg(short, long)]
    pub table: Option<String>,

    /// Destination file (`.json` is appended when there is no extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write absent values as "" instead of null
    #[arg(long)]
    pub replace_null: bool,

    /// Rows fetched per batch
    #[arg(long)]
    pub batch_size: Option<usize>,
}

/// Database connection flags
#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    /// Database type
    #[arg(long, value_enum)]
    pub kind: Option<KindArg>,

    /// Database host
    #[arg(long)]
    pub host: Option<String>,

    /// Database port
    #[arg(long)]
    pub port: Option<u16>,

    /// Database user
    #[arg(short, long)]
    pub user: Option<String>,

    /// Database password
    #[arg(long, env = "TABLE_EXPORT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Database name (file path for sqlite/duckdb)
    #[arg(short, long)]
    pub database: Option<String>,
}

/// Database type flag values
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum KindArg {
    /// MySQL / MariaDB
    Mysql,
    /// PostgreSQL
    Postgres,
    /// SQLite file
    Sqlite,
    /// DuckDB file
    Duckdb,
}

impl From<KindArg> for DatabaseKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Mysql => DatabaseKind::Mysql,
            KindArg::Postgres => DatabaseKind::Postgres,
            KindArg::Sqlite => DatabaseKind::Sqlite,
            KindArg::Duckdb => DatabaseKind::Duckdb,
        }
    }
}
