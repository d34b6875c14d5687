//! `screen` command: one screening cycle over file-backed chains.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;
use premium_core::AppConfig;
use premium_options_manager::{assess, RiskReport, ThetaStatus};
use premium_screener::{Leg, LegSide, Screener, StrategyTarget, SymbolOutcome, SymbolReport};
use tracing::warn;

use crate::files::{load_account, JsonDirSource};

#[derive(Args, Debug, Clone)]
pub struct ScreenArgs {
    /// Symbols to screen (e.g., SPY QQQ IWM)
    #[arg(required = true)]
    pub symbols: Vec<String>,

    /// Directory holding one <SYMBOL>.json chain document per symbol
    #[arg(long, default_value = "data", env = "PREMIUM_DATA_DIR")]
    pub data_dir: String,

    /// Print the full reports as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Account snapshot (balances and holdings) to risk-check before screening
    #[arg(long, env = "PREMIUM_ACCOUNT")]
    pub account: Option<PathBuf>,

    /// Screen even when the account risk check blocks
    #[arg(long, requires = "account")]
    pub force: bool,
}

/// Runs the screen command.
///
/// # Errors
/// Returns an error if the account snapshot cannot be read, the risk check blocks without
/// `--force`, or the JSON output cannot be written.
pub async fn run_screen(args: ScreenArgs, config: &AppConfig) -> Result<()> {
    if let Some(path) = &args.account {
        let account = load_account(path).await?;
        let risk = assess(&account, &config.risk);
        if !args.json {
            print_risk(&risk);
        }
        risk_gate(&risk, args.force)?;
    }

    let source = Arc::new(JsonDirSource::new(&args.data_dir));
    let screener = Screener::new(source, config.screener.clone(), config.gex.clone());

    let symbols: Vec<String> = args.symbols.iter().map(|s| s.to_uppercase()).collect();
    let reports = screener.screen(&symbols).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for report in &reports {
        print_report(report);
    }
    Ok(())
}

/// Blocks the cycle when buying power usage is over the limit, unless forced.
fn risk_gate(risk: &RiskReport, force: bool) -> Result<()> {
    if !risk.blocks_screening() {
        return Ok(());
    }
    if force {
        warn!(
            bp_usage_pct = %risk.bp_usage_pct.round_dp(2),
            "Proceeding despite risk block (--force)"
        );
        return Ok(());
    }
    bail!(
        "screening blocked: buying power usage {:.2}% exceeds {}% (use --force to override)",
        risk.bp_usage_pct,
        risk.max_bp_usage_pct
    )
}

fn print_risk(risk: &RiskReport) {
    println!("NLV: {:.2}", risk.nlv);
    println!(
        "BP usage: {:.2}% [{}]",
        risk.bp_usage_pct,
        if risk.bp_over_limit() { "OVER LIMIT" } else { "OK" }
    );
    let theta = match risk.theta_status {
        ThetaStatus::Ok => "OK".to_string(),
        ThetaStatus::Low { target } => format!("LOW, target > {target:.2}"),
        ThetaStatus::High { target } => format!("HIGH, target < {target:.2}"),
    };
    println!(
        "Delta: {:.2} | Theta: {:.2} [{theta}]",
        risk.portfolio_delta, risk.portfolio_theta
    );
    for warning in &risk.size_warnings {
        println!("  ! {warning}");
    }
    if let Some(excess) = risk.negative_day_trade_excess {
        println!("  ! day trade excess is negative: {excess:.2}");
    }
}

fn print_report(report: &SymbolReport) {
    println!();
    match &report.outcome {
        SymbolOutcome::Skipped { reason } => println!("{}: skipped ({reason})", report.symbol),
        SymbolOutcome::Failed { error } => println!("{}: failed ({error})", report.symbol),
        SymbolOutcome::Screened { targets, gex, skip } => {
            println!(
                "{}: {} target(s), regime {}, total GEX {:.1}M",
                report.symbol,
                targets.len(),
                gex.regime,
                gex.total_gex_millions()
            );
            if let Some(skip) = skip {
                println!("  skipped: {skip}");
            }
            for target in targets {
                print_target(target);
            }
        }
    }
}

fn print_target(target: &StrategyTarget) {
    let candidate = &target.candidate;
    let legs: Vec<String> = candidate.legs().into_iter().map(format_leg).collect();
    println!(
        "  {:<16} {}  credit {} / width {}  dte {}",
        candidate.strategy_type(),
        legs.join(" "),
        candidate.credit(),
        candidate.width(),
        candidate.dte()
    );
    for warning in target.warnings() {
        println!("    ! {warning}");
    }
}

fn format_leg(leg: &Leg) -> String {
    let sign = match leg.side {
        LegSide::Short => '-',
        LegSide::Long => '+',
    };
    format!("{sign}{}{}", leg.strike, leg.right)
}
