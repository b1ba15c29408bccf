//! Folio - command-line admin for the portfolio backend.
//!
//! Signs in against the portfolio API, keeps the session between runs and
//! manages projects and testimonials. Every command prints a JSON envelope
//! (`{"success": true, "data": ...}` or `{"success": false, "error": ...}`).

mod args;
mod commands;

use std::io;

use anyhow::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use folio_core::{Config, Folio, InvalidationReason};

use args::Command;

/// Set to `1` to also log to a daily file in the cache directory
const ENV_LOG_FILE: &str = "FOLIO_LOG_FILE";

/// Initialize the tracing subscriber for logging.
///
/// The returned guard flushes the log file on drop and must live until exit.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=folio_core=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "folio.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn log_dir() -> Option<std::path::PathBuf> {
    if std::env::var(ENV_LOG_FILE).ok().as_deref() != Some("1") {
        return None;
    }
    Config::default().session_dir().ok()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let log_guard = init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args::parse(&args)?;

    let mut config = Config::load()?.with_env_overrides();
    let folio = Folio::from_config(&config)?;
    // A rejected login is a 401 too; the envelope already says why
    if !matches!(command, Command::Login { .. } | Command::Register { .. }) {
        folio.session.on_invalidated(|event| {
            if event.reason == InvalidationReason::Unauthorized {
                eprintln!("Session expired. Please log in again (folio login).");
            }
        });
    }
    info!(api = %config.api_base_url(), "folio starting");

    let ok = commands::run(&folio, &mut config, command).await?;
    if !ok {
        drop(log_guard);
        std::process::exit(1);
    }
    Ok(())
}
