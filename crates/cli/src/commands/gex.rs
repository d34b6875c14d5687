//! `gex` command: dealer gamma profile for one symbol.

use anyhow::Result;
use clap::Args;
use premium_core::{normalize, AppConfig};
use premium_gex::GexSnapshot;
use premium_screener::MarketDataSource;
use rust_decimal::Decimal;

use crate::files::JsonDirSource;

#[derive(Args, Debug, Clone)]
pub struct GexArgs {
    /// Symbol to analyze
    pub symbol: String,

    /// Directory holding one <SYMBOL>.json chain document per symbol
    #[arg(long, default_value = "data", env = "PREMIUM_DATA_DIR")]
    pub data_dir: String,

    /// Override the maximum DTE of contracts included
    #[arg(long)]
    pub max_dte: Option<i64>,

    /// Print the snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

/// Runs the gex command.
///
/// # Errors
/// Returns an error if the chain file is missing, unreadable or malformed.
pub async fn run_gex(args: GexArgs, config: &AppConfig) -> Result<()> {
    let symbol = args.symbol.to_uppercase();
    let inputs = JsonDirSource::new(&args.data_dir).fetch(&symbol).await?;
    let chain = normalize(&inputs.chain, inputs.spot)?;

    let mut gex_config = config.gex.clone();
    if let Some(max_dte) = args.max_dte {
        gex_config.max_dte = max_dte;
    }
    let snapshot = premium_gex::analyze(&chain, &gex_config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_snapshot(&snapshot);
    }
    Ok(())
}

fn print_snapshot(gex: &GexSnapshot) {
    println!();
    println!("{} gamma profile (spot {}, DTE <= {})", gex.symbol, gex.spot, gex.max_dte);

    if let Some(error) = &gex.error {
        println!("  unavailable: {error}");
        return;
    }

    println!("  Total GEX:   {:.1}M", gex.total_gex_millions());
    println!("  Regime:      {}", gex.regime);
    if let Some(signal) = gex.signal {
        println!("  Signal:      {signal}");
    }
    print_level(gex, "Call wall:", gex.call_wall);
    print_level(gex, "Put wall:", gex.put_wall);
    print_level(gex, "Zero gamma:", gex.zero_gamma_level);

    if !gex.major_levels.is_empty() {
        let levels: Vec<String> = gex.major_levels.iter().map(ToString::to_string).collect();
        println!("  Major:       {}", levels.join(", "));
    }

    println!();
    println!("  {:>10} {:>14} {:>14} {:>14}", "strike", "call", "put", "net");
    for exposure in gex.strikes.values() {
        println!(
            "  {:>10} {:>14.0} {:>14.0} {:>14.0}",
            exposure.strike.to_string(),
            exposure.call_gex,
            exposure.put_gex,
            exposure.net_gex
        );
    }
}

fn print_level(gex: &GexSnapshot, label: &str, level: Option<Decimal>) {
    match level {
        Some(level) => {
            let distance = gex.distance_pct(level).unwrap_or_default();
            println!("  {label:<12} {level} ({distance:+.2}%)");
        }
        None => println!("  {label:<12} n/a"),
    }
}
