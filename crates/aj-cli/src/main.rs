use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use aj_cli::commands::{add, calories, delete, list, settings, status, stopwatch};
use aj_cli::{Cli, Commands, Config, SettingsAction};
use aj_core::{Journal, Stopwatch};
use aj_db::Database;
use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(Database, Config)> {
    let config = load_config(config_path)?;

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    Ok((db, config))
}

fn open_journal(config_path: Option<&Path>) -> Result<(Journal<Database>, Config)> {
    let (db, config) = open_database(config_path)?;
    let journal = Journal::new(db).context("failed to load journal")?;
    Ok((journal, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config_path = cli.config.as_deref();
    let mut stdout = std::io::stdout();

    match &cli.command {
        Some(Commands::Add { entry }) => {
            let (journal, _config) = open_journal(config_path)?;
            add::run(
                &mut stdout,
                &journal,
                entry,
                Local::now().date_naive(),
                Utc::now(),
            )?;
        }
        Some(Commands::List { json }) => {
            let (journal, _config) = open_journal(config_path)?;
            list::run(&mut stdout, &journal, *json)?;
        }
        Some(Commands::Delete { kind, id }) => {
            let (journal, _config) = open_journal(config_path)?;
            delete::run(&mut stdout, &journal, *kind, *id)?;
        }
        Some(Commands::Settings(SettingsAction::Weekend { mode })) => {
            let (journal, _config) = open_journal(config_path)?;
            settings::weekend(&mut stdout, &journal, *mode)?;
        }
        Some(Commands::Stopwatch { title }) => {
            let (journal, config) = open_journal(config_path)?;
            let title = title.clone().unwrap_or(config.stopwatch_title);
            let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
            runtime.block_on(async {
                let stopwatch = Stopwatch::with_title(Arc::new(journal), title);
                let input = tokio::io::BufReader::new(tokio::io::stdin());
                stopwatch::run(input, &mut stdout, &stopwatch).await
            })?;
        }
        Some(Commands::Calories { date }) => {
            let config = load_config(config_path)?;
            let date = date
                .clone()
                .unwrap_or_else(|| Local::now().date_naive().format("%Y-%m-%d").to_string());
            match aj_health::create_provider(config.calorie_provider, &config.provider_settings()) {
                Ok(provider) => {
                    let runtime =
                        tokio::runtime::Runtime::new().context("failed to start async runtime")?;
                    runtime.block_on(calories::run(&mut stdout, provider.as_ref(), &date))?;
                }
                Err(err) => {
                    writeln!(stdout, "Calories unavailable for {date}: {err}")?;
                }
            }
        }
        Some(Commands::Status) => {
            let (db, config) = open_database(config_path)?;
            status::run(&mut stdout, &db, &config.database_path)?;
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
