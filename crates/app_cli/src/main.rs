mod input;
mod menu;

use std::fs;
use std::io;
use std::path::Path;
use std::process::ExitCode;

use config::{AppConfig, ConfigStore};
use i18n::I18n;
use note_store::{NoteRepository, StoreConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::menu::{Menu, MenuSettings};

fn main() -> ExitCode {
    let mut config = match ConfigStore::from_default_location().and_then(|store| store.load_or_init())
    {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("failed to load config, using defaults: {err:#}");
            AppConfig::default()
        }
    };
    config.apply_env(|key| std::env::var(key).ok());

    let data_dir = config.resolve_data_dir();
    if let Err(err) = fs::create_dir_all(&data_dir) {
        eprintln!("failed to prepare data dir `{}`: {err}", data_dir.display());
        return ExitCode::FAILURE;
    }
    let _log_guard = init_local_logger(&data_dir.join("logs"));

    let store_config = StoreConfig::new(&data_dir, config.notes_file.clone());
    let repo = match NoteRepository::open(store_config) {
        Ok(repo) => repo,
        Err(err) => {
            error!("failed to open note repository: {err}");
            eprintln!("failed to open notes: {:#}", anyhow::Error::new(err));
            return ExitCode::FAILURE;
        }
    };
    info!(path = %repo.path().display(), notes = repo.len(), "note repository ready");

    let settings = MenuSettings {
        preview_length: config.preview_length,
        max_list_results: config.max_list_results,
    };
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut menu = Menu::new(
        repo,
        I18n::new(config.language),
        settings,
        stdin.lock(),
        stdout.lock(),
    );

    match menu.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("menu loop failed: {err:#}");
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_local_logger(log_dir: &Path) -> tracing_appender::non_blocking::WorkerGuard {
    if let Err(err) = fs::create_dir_all(log_dir) {
        eprintln!("failed to create log dir `{}`: {err}", log_dir.display());
    }
    let file_appender = tracing_appender::rolling::daily(log_dir, "notekeeper.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,notekeeper=debug,note_store=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .with_writer(writer)
        .init();

    guard
}
