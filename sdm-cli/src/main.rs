//! sdm - Student Data Management console
//!
//! Loads the students, subjects and grades relations from the data folder,
//! runs the interactive menus and writes everything back on exit. Ctrl+C
//! and SIGTERM take the same finalizing path as the Exit menu entry.

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use clap::Parser;
use sdm_common::config::{
    default_config_path, load_toml_config, resolve_data_folder, write_toml_config, TomlConfig,
    DATA_FOLDER_ENV,
};
use sdm_common::{time, RecordStore, Session};
use tokio::signal;
use tracing::{error, info, warn};

mod menu;
mod prompt;
mod validate;

use menu::Menu;
use prompt::Prompt;
use validate::Rules;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "sdm")]
#[command(about = "Student records, subjects and grades from the console", long_about = None)]
#[command(version)]
struct Args {
    /// Folder holding students.csv, subjects.csv and grades.csv
    #[arg(short, long, env = DATA_FOLDER_ENV)]
    data_folder: Option<PathBuf>,

    /// Path to config.toml (defaults to the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Students per page in the listing view
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    page_size: Option<u32>,

    /// Write the effective configuration to the config path and exit
    #[arg(long)]
    init_config: bool,
}

/// How the menu loop ended
enum Exit {
    Menu(Result<()>),
    Signal,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(default_config_path);
    let mut config = match &config_path {
        Some(path) => load_toml_config(path)?,
        None => TomlConfig::default(),
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    info!("Starting sdm v{}", env!("CARGO_PKG_VERSION"));

    if let Some(page_size) = args.page_size {
        config.page_size = page_size as usize;
    }

    if args.init_config {
        let path = config_path.context("No config directory available on this platform")?;
        write_toml_config(&config, &path)?;
        println!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    let data_folder = resolve_data_folder(args.data_folder.as_deref(), &config);
    info!("Data folder: {}", data_folder.display());

    let store = RecordStore::with_file_names(&data_folder, &config.files);
    let (session, report) = Session::open(store)
        .with_context(|| format!("Failed to load records from {}", data_folder.display()))?;
    if report.skipped_rows > 0 {
        warn!("{} malformed rows were skipped while loading", report.skipped_rows);
    }

    println!(
        "Student Data Management  {}",
        time::format_banner(&time::now())
    );

    let rules = Rules::new()?;
    let page_size = config.page_size;
    let session = Arc::new(Mutex::new(session));

    let menu_session = Arc::clone(&session);
    let menu_task = tokio::task::spawn_blocking(move || {
        let stdin = io::stdin();
        let prompt = Prompt::new(stdin.lock(), io::stdout());
        Menu::new(prompt, &menu_session, rules, page_size).run()
    });

    let exit = tokio::select! {
        joined = menu_task => Exit::Menu(joined.context("Menu task panicked").and_then(|r| r)),
        _ = shutdown_signal() => Exit::Signal,
    };

    let finalized = session
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .shutdown();
    if let Err(e) = &finalized {
        error!("Failed to save records on exit: {}", e);
    }

    match exit {
        Exit::Menu(result) => {
            result?;
            finalized?;
            info!("sdm stopped");
            Ok(())
        }
        Exit::Signal => {
            // The blocking stdin read cannot be cancelled, so leave directly
            info!("sdm stopped by signal");
            std::process::exit(if finalized.is_ok() { 0 } else { 1 });
        }
    }
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
