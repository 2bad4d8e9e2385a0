#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_field_names
)]

use std::fs::{self, OpenOptions};
use std::str::FromStr;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod app;
mod cli;

use careline::Config;
use cli::commands::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Install default crypto provider for Rustls TLS (reqwest and the live socket).
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Warning: Failed to install default crypto provider: {e:?}");
    }

    let cli = Cli::parse();
    let config = Config::load_or_init()?;
    init_logging(&cli, &config)?;

    app::dispatch::dispatch(cli, config).await
}

/// Full-screen commands log to a file so output never lands on the terminal
/// being drawn; one-shot commands log to stderr.
fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::from_str(&config.observability.log_level).unwrap_or(Level::INFO)
    };
    let builder = FmtSubscriber::builder().with_max_level(level);

    if matches!(cli.command, Commands::Start | Commands::Chat { .. }) {
        let path = config.log_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        let subscriber = builder
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .context("setting default subscriber failed")?;
    } else {
        let subscriber = builder.with_writer(std::io::stderr).finish();
        tracing::subscriber::set_global_default(subscriber)
            .context("setting default subscriber failed")?;
    }
    Ok(())
}
