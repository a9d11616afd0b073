use anyhow::{Context, Result};
use azure_tables::config::Config;
use azure_tables::plugin::{Plugin, Row};
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Rows buffered between the list retriever and stdout
const ROW_BUFFER: usize = 64;

/// Query Azure App Service resources as tables
#[derive(Parser, Debug)]
#[command(name = "azure-tables", version = azure_tables::VERSION, about, long_about = None)]
struct Args {
    /// Azure subscription to query
    #[arg(short, long, global = true)]
    subscription: Option<String>,

    /// Azure cloud (AzurePublicCloud, AzureUSGovernmentCloud, AzureChinaCloud)
    #[arg(long, global = true)]
    environment: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List available tables
    Tables,
    /// Show the columns of a table
    Columns { table: String },
    /// Print every row of a table as JSON lines
    List { table: String },
    /// Print a single row by name and resource group
    Get {
        table: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        resource_group: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_directive(self) -> Option<&'static str> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some("error"),
            LogLevel::Warn => Some("warn"),
            LogLevel::Info => Some("info"),
            LogLevel::Debug => Some("debug"),
            LogLevel::Trace => Some("trace"),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(directive) = level.to_directive() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("azure_tables={}", directive)))
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("azure-tables started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("azure-tables").join("azure-tables.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".azure-tables").join("azure-tables.log");
    }
    PathBuf::from("azure-tables.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let mut config = Config::load();
    if let Some(subscription) = args.subscription.clone() {
        config.subscription_id = Some(subscription);
    }
    if let Some(environment) = args.environment.clone() {
        config.environment = Some(environment);
    }

    let plugin = Plugin::new(config);

    match args.command {
        Command::Tables => {
            for name in plugin.table_names() {
                let table = plugin.table(name)?;
                println!("{:<36} {}", name, table.description());
            }
        }
        Command::Columns { table } => {
            let table = plugin.table(&table)?;
            for column in table.columns() {
                println!(
                    "{:<32} {:<7} {}",
                    column.name, column.column_type, column.description
                );
            }
        }
        Command::List { table } => {
            let count = list_rows(&plugin, &table).await?;
            tracing::info!("{}: {} rows", table, count);
        }
        Command::Get {
            table,
            name,
            resource_group,
        } => {
            let quals = HashMap::from([
                ("name".to_string(), name),
                ("resource_group".to_string(), resource_group),
            ]);
            match plugin
                .get(&table, &quals)
                .await
                .with_context(|| format!("Failed to get row from {}", table))?
            {
                Some(row) => print_row(&row)?,
                None => eprintln!("No matching row in {}", table),
            }
        }
    }

    Ok(())
}

/// Run the list retriever and print rows as they arrive
async fn list_rows(plugin: &Plugin, table: &str) -> Result<usize> {
    let (tx, mut rx) = mpsc::channel::<Row>(ROW_BUFFER);

    let producer = async {
        plugin
            .list(table, tx)
            .await
            .with_context(|| format!("Failed to list {}", table))
    };

    let consumer = async {
        let mut count = 0;
        while let Some(row) = rx.recv().await {
            print_row(&row)?;
            count += 1;
        }
        Ok::<usize, anyhow::Error>(count)
    };

    let ((), count) = futures::future::try_join(producer, consumer).await?;
    Ok(count)
}

fn print_row(row: &Row) -> Result<()> {
    println!("{}", serde_json::to_string(row)?);
    Ok(())
}
