mod cli;
mod commands;
mod error;
mod logging;
mod render;
mod resolve;

use clap::Parser;

use reel_core::config::AppConfig;
use reel_core::library::Library;
use reel_core::storage::SqliteStore;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };
    if let Some(db) = cli.db.clone() {
        config.storage.db_path = Some(db);
    }

    let _guard = logging::init(&config, cli.verbose);

    match run(cli.command, &config, cli.config.as_deref()).await {
        Ok(output) if output.is_empty() => {}
        Ok(output) => println!("{output}"),
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

fn open_library(config: &AppConfig) -> Result<Library, CliError> {
    let path = config.ensure_db_path()?;
    tracing::debug!(path = %path.display(), "Opening library");
    let library = Library::open(SqliteStore::open(&path)?);
    if let Some(reason) = library.load_error() {
        eprintln!("warning: saved collection could not be read ({reason}); starting empty");
    }
    Ok(library)
}

async fn run(
    command: Command,
    config: &AppConfig,
    explicit_config: Option<&std::path::Path>,
) -> Result<String, CliError> {
    let open = || open_library(config);
    match command {
        Command::List(args) => commands::list(&open()?, &args),
        Command::Show { id } => commands::show(&open()?, &id),
        Command::Add(args) => commands::add(&mut open()?, args),
        Command::AddFrom(args) => commands::add_from(&mut open()?, config, args).await,
        Command::Edit(args) => commands::edit(&mut open()?, args),
        Command::Delete { id } => commands::delete(&mut open()?, &id),
        Command::Fav { id } => commands::favorite(&mut open()?, &id),
        Command::Season(args) => commands::season(&mut open()?, args),
        Command::Tag(cmd) => commands::tag(&mut open()?, cmd),
        Command::Stats { json } => commands::stats(&open()?, config, json),
        Command::Export(args) => commands::export(&open()?, args),
        Command::Import { file } => commands::import(&mut open()?, &file),
        Command::Lookup { query } => commands::lookup(config, &query).await,
        Command::Search => commands::search(config).await,
        Command::Config(cmd) => commands::config(config, explicit_config, cmd),
    }
}
