mod analytics;
mod config;
mod db;
mod import;
mod models;
mod run;
mod ui;

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Config;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = Config::load()?;
    let tui = args.len() == 1;
    init_logging(&config, tui)?;

    let mut db = db::Database::open(&config.db_path)?;

    if tui {
        run::as_tui(&config, &mut db)
    } else {
        run::as_cli(&args, &config, &mut db)
    }
}

/// stderr for the CLI; a log file in the data directory for the TUI, where
/// stderr would draw over the alternate screen.
fn init_logging(config: &Config, tui: bool) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_filter)
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    if tui {
        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!(
                "Failed to create data directory: {}",
                config.data_dir.display()
            )
        })?;
        let path = config.data_dir.join("findash.log");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        registry
            .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
            .try_init()
            .context("Failed to initialise logging")?;
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .context("Failed to initialise logging")?;
    }
    Ok(())
}
