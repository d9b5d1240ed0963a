//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, ConnectionArgs, ExportArgs};
use crate::config::{ConnectionConfig, ExportConfig};
use crate::database::DatabaseEngine;
use crate::error::{Error, Result};
use crate::export::TableExporter;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Export(args) => self.export(args).await,
            Commands::Check { connection } => self.check(connection).await,
            Commands::Tables { connection } => self.tables(connection).await,
        }
    }

    /// Load the config file, or an empty config when none was given
    fn load_config(&self) -> Result<ExportConfig> {
        match &self.cli.config {
            Some(path) => ExportConfig::from_file(path),
            None => Ok(ExportConfig::default()),
        }
    }

    /// Config file overlaid with export flags
    fn build_export_config(&self, args: &ExportArgs) -> Result<ExportConfig> {
        let mut config = self.load_config()?;
        apply_connection_args(&mut config.connection, &args.connection);

        if let Some(table) = &args.table {
            config.table.clone_from(table);
        }
        if let Some(output) = &args.output {
            config.output.clone_from(output);
        }
        if args.replace_null {
            config.replace_null = true;
        }
        if let Some(batch_size) = args.batch_size {
            config.batch_size = batch_size;
        }

        config.validate()?;
        Ok(config)
    }

    /// Config file connection overlaid with connection flags
    fn build_connection(&self, args: &ConnectionArgs) -> Result<ConnectionConfig> {
        let mut connection = self.load_config()?.connection;
        apply_connection_args(&mut connection, args);
        connection.validate()?;
        Ok(connection)
    }

    /// Export a table
    async fn export(&self, args: &ExportArgs) -> Result<()> {
        let config = self.build_export_config(args)?;
        let exporter = TableExporter::new();
        let token = exporter.cancel_token();

        let signal = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, stopping after the current batch");
                token.cancel();
            }
        });

        let result = run_blocking(move || exporter.run(&config)).await;
        signal.abort();

        let summary = result?;
        println!("{summary}");
        Ok(())
    }

    /// Check connection
    async fn check(&self, args: &ConnectionArgs) -> Result<()> {
        let connection = self.build_connection(args)?;

        let info = run_blocking(move || {
            let engine = DatabaseEngine::connect(&connection)?;
            let info = engine.connection_info().to_string();
            let checked = engine.check_connection();
            engine.close()?;
            checked.map(|()| info)
        })
        .await?;

        println!("Connection OK: {info}");
        Ok(())
    }

    /// List tables
    async fn tables(&self, args: &ConnectionArgs) -> Result<()> {
        let connection = self.build_connection(args)?;

        let tables = run_blocking(move || {
            let engine = DatabaseEngine::connect(&connection)?;
            let tables = engine.list_tables();
            engine.close()?;
            tables
        })
        .await?;

        for table in tables {
            println!("{table}");
        }
        Ok(())
    }
}

/// Overlay connection flags that were given onto `connection`
fn apply_connection_args(connection: &mut ConnectionConfig, args: &ConnectionArgs) {
    if let Some(kind) = args.kind {
        connection.kind = kind.into();
    }
    if args.host.is_some() {
        connection.host.clone_from(&args.host);
    }
    if args.port.is_some() {
        connection.port = args.port;
    }
    if args.user.is_some() {
        connection.user.clone_from(&args.user);
    }
    if args.password.is_some() {
        connection.password.clone_from(&args.password);
    }
    if args.database.is_some() {
        connection.database.clone_from(&args.database);
    }
}

/// Run synchronous database work off the async runtime
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Other(format!("Background task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::KindArg;
    use crate::config::DatabaseKind;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_parse_export_command() {
        let cli = Cli::try_parse_from([
            "table-json-export",
            "export",
            "--host",
            "localhost",
            "-u",
            "root",
            "-d",
            "tienda",
            "-t",
            "clientes",
            "-o",
            "clientes",
            "--replace-null",
            "--batch-size",
            "500",
        ])
        .unwrap();

        let Commands::Export(args) = &cli.command else {
            panic!("Expected export command");
        };
        assert_eq!(args.table.as_deref(), Some("clientes"));
        assert!(args.replace_null);

        let config = Runner::new(cli).export_config().unwrap();
        assert_eq!(config.connection.kind, DatabaseKind::Mysql);
        assert_eq!(config.batch_size, 500);
        assert!(config.replace_null);
        assert_eq!(config.output_path(), PathBuf::from("clientes.json"));
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.yaml");
        std::fs::write(
            &path,
            "connection:\n  kind: postgres\n  host: db\n  user: app\n  database: prod\ntable: orders\noutput: orders.json\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "table-json-export",
            "-C",
            path.to_str().unwrap(),
            "export",
            "--host",
            "replica",
            "-t",
            "archive.orders",
        ])
        .unwrap();

        let config = Runner::new(cli).export_config().unwrap();
        assert_eq!(config.connection.kind, DatabaseKind::Postgres);
        assert_eq!(config.connection.host.as_deref(), Some("replica"));
        assert_eq!(config.connection.user.as_deref(), Some("app"));
        assert_eq!(config.table, "archive.orders");
    }

    #[test]
    fn test_missing_required_flag() {
        let cli = Cli::try_parse_from(["table-json-export", "export", "-t", "clientes"]).unwrap();
        let err = Runner::new(cli).export_config().unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { .. }));
    }

    #[test]
    fn test_parse_kind_flag() {
        let cli = Cli::try_parse_from([
            "table-json-export",
            "tables",
            "--kind",
            "sqlite",
            "-d",
            "app.db",
        ])
        .unwrap();
        let Commands::Tables { connection } = &cli.command else {
            panic!("Expected tables command");
        };
        assert_eq!(connection.kind, Some(KindArg::Sqlite));
    }

    impl Runner {
        fn export_config(&self) -> Result<ExportConfig> {
            let Commands::Export(args) = &self.cli.command else {
                panic!("Expected export command");
            };
            self.build_export_config(args)
        }
    }
}
