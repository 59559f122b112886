// Strangeloop panel - control panel for a shared looping pedal
//
// The pedal records loops locally and can share a session with other pedals
// through a session server. This tool is its control surface: it polls the
// pedal for session, members and loops, and drives session lifecycle and
// loop playback.
//
// Architecture:
// - Service (reqwest): typed client for the pedal's HTTP endpoints
// - Panel: polling reconciliation, session buttons, loop playback state
// - TUI (ratatui): renders the panel and routes keys to it
// - Demo (axum): in-process pedal for running without hardware
// - Event system: an mpsc channel carries poll ticks and request completions

mod cli;
mod config;
mod demo;
mod flash;
mod logging;
mod panel;
mod service;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use config::Config;
use demo::DemoPedal;
use flash::Flash;
use logging::LogBuffer;
use panel::{Panel, PANEL_EVENT_BUFFER};
use service::http::PedalClient;
use std::sync::Arc;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    // Handle CLI subcommands first (config, status); exit if one ran
    let cli = cli::Cli::parse();
    if cli::handle_cli(&cli).await? {
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let mut config = Config::from_env()?;
    config.demo_mode |= cli.demo;

    // TUI mode captures logs into the buffer; headless logs to stdout.
    // The guard flushes the file log and must outlive everything below.
    let log_buffer = LogBuffer::new();
    let _file_guard = logging::init(&config.logging, config.enable_tui, &log_buffer)?;

    let demo_server = if config.demo_mode {
        tracing::info!("Running in DEMO MODE - in-process pedal");
        Some(demo::spawn_with("127.0.0.1:0", DemoPedal::seeded()).await?)
    } else {
        None
    };
    let pedal_url = demo_server
        .as_ref()
        .map(|server| server.url())
        .unwrap_or_else(|| config.pedal_url.clone());

    let client = PedalClient::new(&pedal_url, config.request_timeout)
        .context("Failed to create pedal client")?;
    tracing::info!("Pedal at {}", pedal_url);

    if config.enable_tui {
        tracing::info!("Starting TUI");
        if let Err(e) = tui::run_tui(client, pedal_url, log_buffer, config).await {
            tracing::error!("TUI error: {:?}", e);
        }
    } else {
        tracing::info!("TUI disabled, running in headless mode");
        run_headless(client, &config).await?;
    }

    tracing::info!("Shutting down...");
    if let Some(server) = demo_server {
        server.shutdown().await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Run the panel without a screen until Ctrl+C
///
/// Reconciliation changes and flash messages surface through tracing.
async fn run_headless(client: PedalClient, config: &Config) -> Result<()> {
    let (tx, mut rx) = mpsc::channel(PANEL_EVENT_BUFFER);
    let mut panel = Panel::new(Arc::new(client), Flash::new(), tx);
    let _timer = panel.mount(config.poll_interval);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                result.context("Failed to listen for Ctrl+C")?;
                break;
            }
            Some(event) = rx.recv() => panel.handle(event),
        }
    }

    Ok(())
}
