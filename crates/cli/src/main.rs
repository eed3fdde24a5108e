//! Navigator CLI: the main entry point.
//!
//! Commands:
//! - `serve`     Start the HTTP API server
//! - `ask`       Ask the agent one question
//! - `sessions`  List, show, or delete saved sessions
//! - `config`    Print the default configuration

use clap::{Parser, Subcommand};
use navigator_config::AppConfig;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "navigator",
    about = "Navigator — policy research assistant backed by a hosted agent",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Read configuration from this file instead of ~/.navigator/config.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask the agent a single question
    Ask {
        question: String,

        /// A document URL the question refers to
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Manage saved sessions
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Print the default configuration TOML
    Config,
}

#[derive(Subcommand)]
enum SessionAction {
    /// List saved sessions, newest first
    List,

    /// Print one session as JSON
    Show { id: i64 },

    /// Delete one session
    Delete { id: i64 },
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_with_overrides(path),
        None => AppConfig::load(),
    };
    let config = config.map_err(|e| format!("Failed to load config: {e}"))?;
    tracing::debug!(
        agent_id = %config.agent.agent_id,
        sessions_dir = %config.sessions.dir.display(),
        "Configuration loaded"
    );
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    match cli.command {
        Commands::Config => commands::config_cmd::show(),
        Commands::Serve { port } => {
            let config = load_config(cli.config.as_ref())?;
            commands::serve::run(config, port).await
        }
        Commands::Ask { question, url } => {
            let config = load_config(cli.config.as_ref())?;
            commands::ask::run(config, question, url).await
        }
        Commands::Sessions { action } => {
            let config = load_config(cli.config.as_ref())?;
            match action {
                SessionAction::List => commands::sessions::list(&config).await,
                SessionAction::Show { id } => commands::sessions::show(&config, id).await,
                SessionAction::Delete { id } => commands::sessions::delete(&config, id).await,
            }
        }
    }
}
