use clap::{Parser, Subcommand};
use premium_core::{AppConfig, ConfigLoader};

mod commands;
mod files;

use commands::{GexArgs, ManageArgs, ScreenArgs};

#[derive(Parser)]
#[command(name = "premium-desk")]
#[command(about = "Short-premium options screening and position management", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, default_value = "config/Config.toml")]
    config: String,

    /// Config profile overlay (loads config/Config.{profile}.toml)
    #[arg(long, global = true, env = "PREMIUM_PROFILE")]
    profile: Option<String>,

    /// Force debug-level logging regardless of RUST_LOG
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one screening cycle over a list of symbols
    Screen(ScreenArgs),
    /// Print the dealer gamma profile for one symbol
    Gex(GexArgs),
    /// Monitor open positions and emit close directives
    Manage(ManageArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Screen(args) => commands::run_screen(args, &config).await?,
        Commands::Gex(args) => commands::run_gex(args, &config).await?,
        Commands::Manage(args) => commands::run_manage(args, &config).await?,
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let config = match &cli.profile {
        Some(profile) => ConfigLoader::load_with_profile(profile)?,
        None => ConfigLoader::load_from(&cli.config)?,
    };
    tracing::debug!(?config, "Configuration loaded");
    Ok(config)
}
