use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

use reqhub_cli::Config;

#[derive(Parser)]
#[command(name = "reqhub")]
#[command(about = "Reqhub - requirement review meetings server")]
#[command(version)]
struct Cli {
    /// SQLite database file (overrides REQHUB_DATABASE_PATH)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address (overrides REQHUB_API_HOST)
        #[arg(long)]
        host: Option<String>,
        /// Port (overrides REQHUB_API_PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = handle_command(cli).await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn handle_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(path) = cli.database {
        config.database_path = path;
    }

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            reqhub_cli::run_server(config).await
        }
        Commands::Migrate => {
            let pool = reqhub_storage::init_pool(&config.storage_config()).await?;
            pool.close().await;
            info!("Database at {} is up to date", config.database_path.display());
            Ok(())
        }
    }
}
