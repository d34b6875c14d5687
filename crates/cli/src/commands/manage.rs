//! `manage` command: position lifecycle monitoring over a JSON position book.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use premium_core::AppConfig;
use premium_options_manager::{close_manual, run, run_tick, DirectiveSink, PositionBook};
use tracing::info;

use crate::files::{DirectiveLog, JsonPositionBook};

#[derive(Args, Debug, Clone)]
pub struct ManageArgs {
    /// JSON file holding positions and their latest marks
    #[arg(long, default_value = "data/positions.json", env = "PREMIUM_POSITIONS")]
    pub positions: PathBuf,

    /// Append emitted close directives to this file as JSON lines
    #[arg(long)]
    pub directives: Option<PathBuf>,

    /// Run a single monitoring tick and exit
    #[arg(long, conflicts_with = "close")]
    pub once: bool,

    /// Manually close the position with this id and exit
    #[arg(long, value_name = "ID")]
    pub close: Option<i64>,

    /// Override the poll interval in seconds
    #[arg(long)]
    pub poll_secs: Option<u64>,
}

/// Runs the manage command.
///
/// # Errors
/// Returns an error if the position book cannot be read or written, or a manual close targets
/// a position that is already closed.
pub async fn run_manage(args: ManageArgs, config: &AppConfig) -> Result<()> {
    let mut manager_config = config.manager.clone();
    if let Some(secs) = args.poll_secs {
        manager_config.poll_interval_secs = secs;
    }

    let book = JsonPositionBook::new(&args.positions);
    let sink = DirectiveLog::new(args.directives);

    if let Some(id) = args.close {
        let mut position = book.find(id).await?;
        let directive = close_manual(&mut position)?;
        sink.submit(directive).await?;
        book.save(&position).await?;
        return Ok(());
    }

    if args.once {
        let directives = run_tick(&book, &sink, &manager_config).await?;
        info!(count = directives.len(), "Monitoring tick complete");
        return Ok(());
    }

    info!("Press Ctrl+C to stop");
    tokio::select! {
        result = run(book, sink, manager_config) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down position manager");
            Ok(())
        }
    }
}
