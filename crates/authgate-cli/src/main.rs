mod switch_db;

use std::path::PathBuf;

use anyhow::{Context, Result};
use authgate_config::{AppConfig, ConfigLoader};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::switch_db::SwitchOutcome;

#[derive(Parser)]
#[command(
    name = "authgate",
    version,
    about = "authgate - session-gated web app with a switchable database"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Project root containing .env and prisma/
    #[arg(long, default_value = ".", global = true, env = "AUTHGATE_PROJECT_DIR")]
    project_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Start {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },

    /// Switch the database provider (sqlite or postgresql)
    #[command(name = "switch-db")]
    SwitchDb {
        /// Target provider
        provider: Option<String>,
    },

    /// Show which database provider the environment resolves to
    DbStatus,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loader = ConfigLoader::with_dir(&cli.project_dir);
    let mut config = loader.load()?;

    let level = log_level(cli.log_level.as_deref(), &config, &cli.command);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            info!("starting authgate in {}", loader.project_dir().display());
            if let Some(host) = host {
                config.gateway.host = host;
            }
            if let Some(port) = port {
                config.gateway.port = port;
            }

            let state = authgate_gateway::bootstrap::build_state(&loader, config)
                .context("cannot start without a database configuration")?;
            authgate_gateway::GatewayServer::new(state).run().await?;
        }
        Commands::SwitchDb { provider } => {
            info!("switch-db requested in {}", loader.project_dir().display());
            match switch_db::run(&loader.paths(), provider.as_deref())? {
                SwitchOutcome::Switched(_) => {}
                SwitchOutcome::Usage => std::process::exit(1),
            }
        }
        Commands::DbStatus => {
            loader.load_env_file()?;
            let config = authgate_config::resolve(&loader.paths().schema_dir())?;
            println!("Database provider: {} ({})", config.provider, config.provider.label());
            println!("Locator:           {}", config.redacted_locator());
            if let Ok(path) = config.embedded_path() {
                let state = if path.exists() { "present" } else { "missing" };
                println!("Database file:     {} ({state})", path.display());
            }
        }
    }

    Ok(())
}

/// `--log-level` wins, then the config file, then the command's own default.
fn log_level<'a>(flag: Option<&'a str>, config: &'a AppConfig, command: &Commands) -> &'a str {
    // Step output of the one-shot commands is printed directly; keep the log quiet for them.
    let command_default = match command {
        Commands::Start { .. } => "info",
        _ => "warn",
    };
    flag.or(config.log_level.as_deref()).unwrap_or(command_default)
}
