// CLI module - command-line argument parsing and handlers
//
// With no subcommand the panel runs (TUI, or headless with SLPANEL_NO_TUI=1).
// Subcommands:
// - config --show: Display effective configuration
// - config --path: Show config file path
// - status: Fetch session, members and loops once and print them

use crate::config::{Config, VERSION};
use crate::demo::{self, DemoPedal};
use crate::service::http::PedalClient;
use crate::service::SessionService;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

/// Strangeloop panel - control panel for a shared looping pedal
#[derive(Parser)]
#[command(name = "slpanel")]
#[command(version = VERSION)]
#[command(about = "Control panel for a shared looping pedal", long_about = None)]
pub struct Cli {
    /// Run against an in-process demo pedal instead of real hardware
    #[arg(long, global = true)]
    pub demo: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Print the pedal's session, members and loops, then exit
    Status,
}

/// Handle CLI commands. Returns true if a command was handled (exit after).
pub async fn handle_cli(cli: &Cli) -> Result<bool> {
    match &cli.command {
        Some(Commands::Config { show, path }) => {
            if *path {
                handle_config_path()?;
            } else if *show {
                handle_config_show()?;
            } else {
                println!("Usage: slpanel config [--show|--path]");
                println!();
                println!("Options:");
                println!("  --show    Display effective configuration");
                println!("  --path    Show config file path");
            }
            Ok(true)
        }
        Some(Commands::Status) => {
            handle_status(cli.demo).await?;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn handle_config_path() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;
    println!("{}", path.display());
    Ok(())
}

fn handle_config_show() -> Result<()> {
    let config = Config::from_env()?;

    println!("# Effective configuration (env > file > defaults)");
    println!();
    println!("pedal_url = {:?}", config.pedal_url);
    println!("poll_ms = {}", config.poll_interval.as_millis());
    println!("request_timeout_ms = {}", config.request_timeout.as_millis());
    println!("flash_ms = {}", config.flash_duration.as_millis());
    println!("theme = {:?}", config.theme);
    println!("enable_tui = {}", config.enable_tui);
    println!("demo_mode = {}", config.demo_mode);
    println!();
    println!("[logging]");
    println!("level = {:?}", config.logging.level);
    println!("file_enabled = {}", config.logging.file_enabled);
    println!("file_dir = {:?}", config.logging.file_dir.display().to_string());
    println!("file_rotation = {:?}", config.logging.file_rotation.as_str());
    println!("file_prefix = {:?}", config.logging.file_prefix);

    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
    Ok(())
}

async fn handle_status(demo_flag: bool) -> Result<()> {
    let config = Config::from_env()?;

    let demo_server = if demo_flag || config.demo_mode {
        Some(demo::spawn_with("127.0.0.1:0", DemoPedal::seeded()).await?)
    } else {
        None
    };
    let url = demo_server
        .as_ref()
        .map(|server| server.url())
        .unwrap_or_else(|| config.pedal_url.clone());

    let client = PedalClient::new(&url, config.request_timeout)?;
    let (session, members, loops) = futures::future::join3(
        client.get_session(),
        client.get_members(),
        client.get_loops(),
    )
    .await;

    println!("pedal:   {}", client.base_url());
    match session {
        Ok(snapshot) => println!(
            "session: {} ({})",
            snapshot.session_id.as_deref().unwrap_or("none"),
            snapshot.role()
        ),
        Err(e) => println!("session: error: {}", e),
    }
    match members {
        Ok(members) if members.is_empty() => println!("members: none"),
        Ok(members) => println!("members: {}", members.join(", ")),
        Err(e) => println!("members: error: {}", e),
    }
    match loops {
        Ok(loops) if loops.is_empty() => println!("loops:   none"),
        Ok(loops) => {
            let loops: Vec<String> = loops.iter().map(u32::to_string).collect();
            println!("loops:   {}", loops.join(", "));
        }
        Err(e) => println!("loops:   error: {}", e),
    }

    if let Some(server) = demo_server {
        server.shutdown().await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["slpanel"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.demo);

        let cli = Cli::try_parse_from(["slpanel", "--demo"]).unwrap();
        assert!(cli.demo);

        let cli = Cli::try_parse_from(["slpanel", "status", "--demo"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Status)));
        assert!(cli.demo);

        let cli = Cli::try_parse_from(["slpanel", "config", "--path"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                path: true,
                show: false
            })
        ));
    }
}
