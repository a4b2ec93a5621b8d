use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "itemscout")]
#[command(about = "Adaptive product listing extraction for heterogeneous storefronts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Probe every strategy per target and record which one works best
    Discover {
        /// Restrict discovery to a single target (by id)
        #[arg(long)]
        target: Option<String>,
    },
    /// Run a polite, resumable batch that reuses known strategies
    Scrape {
        /// Restrict the batch to a single target (by id)
        #[arg(long)]
        target: Option<String>,
    },
    /// Print the strategy mapping store as a status report
    Report,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = itemscout_core::load_app_config_from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Discover { target } => commands::run_discover(&config, target.as_deref()).await,
        Commands::Scrape { target } => commands::run_scrape(&config, target.as_deref()).await,
        Commands::Report => commands::run_report(&config),
    }
}
