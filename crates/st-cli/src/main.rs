use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use st_cli::commands::{call, record, settings, today, util};
use st_cli::{Cli, Commands, Config, NativeHost};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(st_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = st_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn open_host(config_path: Option<&Path>) -> Result<NativeHost> {
    let (db, config) = open_database(config_path)?;
    Ok(NativeHost::new(db, &config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support.
    // Logs go to stderr so stdout stays clean for channel replies.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config_path = cli.config.as_deref();
    let mut stdout = io::stdout().lock();

    match &cli.command {
        Some(Commands::Today { json, now }) => {
            let mut host = open_host(config_path)?;
            if let Some(now) = now {
                host = host.with_now(util::parse_datetime(now)?);
            }
            today::run(&mut stdout, &host, *json)?;
        }
        Some(Commands::Record(args)) => {
            let (mut db, _config) = open_database(config_path)?;
            record::run(&mut stdout, &mut db, args)?;
        }
        Some(Commands::Call { method, arguments }) => {
            let host = open_host(config_path)?;
            call::run(&mut stdout, &host, method, arguments.as_deref())?;
        }
        Some(Commands::Serve) => {
            let host = open_host(config_path)?;
            let replies = st_cli::serve(&host, io::stdin().lock(), &mut stdout)?;
            tracing::debug!(replies, "method channel closed");
        }
        Some(Commands::OpenSettings) => {
            let host = open_host(config_path)?;
            settings::run(&mut stdout, &host)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
