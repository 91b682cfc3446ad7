//! One-shot combined forecast for a single symbol.
//!
//! Usage: `signalcast [SYMBOL]` (defaults to `SYMBOL` from the environment).

use dotenvy::dotenv;
use signalcast::config::AppConfig;
use signalcast::core::runtime::ForecastRuntime;
use signalcast::logging;
use signalcast::models::{Narration, TimeframeReport};
use tracing::{error, info};

fn print_narration(label: &str, narration: &Narration) {
    match narration {
        Narration::Generated { text } => println!("{}:\n{}\n", label, text),
        Narration::Failed { error } => println!("{}: narration failed ({})\n", label, error),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = AppConfig::from_env();
    let symbol = std::env::args()
        .nth(1)
        .map(|s| s.to_uppercase())
        .unwrap_or_else(|| config.default_symbol.clone());

    let runtime = ForecastRuntime::from_config(config)?;
    runtime.start().await;
    info!(symbol = %symbol, "Requesting combined recommendation");

    let result = runtime.orchestrator.combined_recommendation(&symbol).await;
    runtime.shutdown().await;

    let combined = match result {
        Ok(combined) => combined,
        Err(e) => {
            error!(error = %e, "Combined recommendation failed");
            return Err(e.into());
        }
    };

    println!("{} forecast ({})\n", combined.symbol, combined.generated_at);
    for report in &combined.timeframes {
        match report {
            TimeframeReport::Available {
                timeframe,
                analysis,
                narration,
            } => {
                let d = &analysis.decision;
                println!(
                    "[{}] {:?} ({}) | {} {}% | buy {} / sell {}",
                    timeframe, d.signal, d.reason, d.direction, d.confidence, d.buy_votes, d.sell_votes
                );
                if let (Some(sl), Some(tp)) = (d.stop_loss, d.take_profit) {
                    println!(
                        "    stop-loss {:.2} | take-profit {:.2} | leverage {}x-{}x",
                        sl, tp, d.leverage.min, d.leverage.max
                    );
                }
                print_narration("    Comment", narration);
            }
            TimeframeReport::Unavailable { timeframe, reason } => {
                println!("[{}] unavailable: {}\n", timeframe, reason);
            }
        }
    }

    if let Some(overall) = &combined.overall {
        println!(
            "Overall: {} {}% ({}/{} timeframes, {:?})\n",
            overall.direction, overall.confidence, overall.agreeing, overall.considered, overall.rule
        );
    }
    if let Some(narration) = &combined.combined_narration {
        print_narration("Forecast", narration);
    }
    println!("{}", combined.disclaimer);

    Ok(())
}
