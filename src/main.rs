//! Coinscope - headless crypto analytics CLI
//!
//! Prints the structured artifacts (leaderboard, rolling indicators, spot
//! price, forecast) that a presentation layer would render.
//!
//! # Usage
//! ```sh
//! cargo run -- leaderboard --range 1y
//! cargo run -- analyze --symbol BTC-USD --range max
//! cargo run -- forecast --symbol BTC-USD
//! ```

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use coinscope::application::handlers::{
    AnalyticsService, ForecastRequest, LeaderboardRequest, SpotPriceRequest,
    TechnicalAnalysisRequest,
};
use coinscope::config::Config;
use coinscope::domain::analytics::forecast::ForecastResult;
use coinscope::domain::analytics::indicators::DISPLAY_SMA_WINDOWS;
use coinscope::domain::analytics::leaderboard::Leaderboard;
use coinscope::domain::market::range::RangeCode;
use coinscope::infrastructure::binance::BinanceMarketDataService;
use tracing::{info, Level};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Crypto market analytics and forecasting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the configured universe by percentage price change
    Leaderboard {
        /// Time range (1d, 5d, 1mo, 2mo, 3mo, 1y)
        #[arg(short, long, default_value = "1y")]
        range: String,
    },
    /// Rolling indicators for a single instrument
    Analyze {
        /// Instrument symbol
        #[arg(short, long, default_value = "BTC-USD")]
        symbol: String,

        /// Time range (1h, 4h, 1d, 5d, 1mo, 3mo, 1y, max)
        #[arg(short, long, default_value = "max")]
        range: String,
    },
    /// Train a model and print the near-future price estimates
    Forecast {
        /// Instrument symbol
        #[arg(short, long, default_value = "BTC-USD")]
        symbol: String,
    },
    /// Current spot price
    Spot {
        /// Instrument symbol
        #[arg(short, long, default_value = "BTC-USD")]
        symbol: String,
    },
    /// Leaderboard, analysis, spot price and forecast in one pass
    Dashboard {
        /// Instrument symbol for the single-coin panels
        #[arg(short, long, default_value = "BTC-USD")]
        symbol: String,

        /// Time range for the leaderboard and analysis panels
        #[arg(short, long, default_value = "1y")]
        range: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    info!(
        "Coinscope {} starting with {} instruments",
        env!("CARGO_PKG_VERSION"),
        config.symbols.len()
    );

    let feed = Arc::new(BinanceMarketDataService::new(
        config.binance_base_url.clone(),
    )?);
    let service = AnalyticsService::new(
        config.symbols.clone(),
        feed,
        config.forecast,
        config.timeouts(),
    );

    match cli.command {
        Commands::Leaderboard { range } => {
            let range: RangeCode = range.parse()?;
            let response = service.leaderboard(LeaderboardRequest { range }).await?;
            print_leaderboard(&response.leaderboard, range);
        }
        Commands::Analyze { symbol, range } => {
            let range: RangeCode = range.parse()?;
            let response = service
                .technical_analysis(TechnicalAnalysisRequest {
                    symbol: symbol.clone(),
                    range,
                })
                .await?;

            println!(
                "{} over {} ({} bars, bollinger window {})",
                symbol,
                range,
                response.series.len(),
                response.indicators.primary_window
            );
            let last = response.series.len().saturating_sub(1);
            for window in DISPLAY_SMA_WINDOWS {
                if let Some(sma) = response.indicators.sma(window) {
                    println!("  SMA{:<4} {:>14.4}", window, sma[last]);
                }
            }
            println!("  upper band {:>10.4}", response.indicators.upper_band[last]);
            println!("  lower band {:>10.4}", response.indicators.lower_band[last]);
        }
        Commands::Forecast { symbol } => {
            let result = service
                .forecast(ForecastRequest {
                    symbol: symbol.clone(),
                })
                .await?;
            print_forecast(&result);
        }
        Commands::Spot { symbol } => {
            let quote = service.spot_price(SpotPriceRequest { symbol }).await?;
            println!("Today's price for {} is {} USD", quote.symbol, quote.price);
        }
        Commands::Dashboard { symbol, range } => {
            let range: RangeCode = range.parse()?;
            let response = service.dashboard(range, &symbol).await;

            match response.leaderboard {
                Ok(lb) => print_leaderboard(&lb.leaderboard, range),
                Err(e) => eprintln!("leaderboard unavailable: {}", e),
            }
            match response.spot_price {
                Ok(quote) => {
                    println!("Today's price for {} is {} USD", quote.symbol, quote.price)
                }
                Err(e) => eprintln!("spot price unavailable: {}", e),
            }
            match response.technical_analysis {
                Ok(ta) => println!(
                    "{}: {} bars analyzed (bollinger window {})",
                    symbol,
                    ta.series.len(),
                    ta.indicators.primary_window
                ),
                Err(e) => eprintln!("technical analysis unavailable: {}", e),
            }
            match response.forecast {
                Ok(result) => print_forecast(&result),
                Err(e) => eprintln!("forecast unavailable: {}", e),
            }
        }
    }

    Ok(())
}

fn print_leaderboard(leaderboard: &Leaderboard, range: RangeCode) {
    println!("Leaderboard ({})", range);
    println!("{:<12} {:>10}", "Coin", "Change %");
    for entry in &leaderboard.entries {
        println!("{:<12} {:>10.2}", entry.symbol, entry.pct_change);
    }

    if leaderboard.len() >= 4 {
        let top: Vec<&str> = leaderboard.top(2).iter().map(|e| e.symbol.as_str()).collect();
        let bottom: Vec<&str> = leaderboard
            .bottom(2)
            .iter()
            .map(|e| e.symbol.as_str())
            .collect();
        println!("Top movers: {:?}, worst: {:?}", top, bottom);
    }
}

fn print_forecast(result: &ForecastResult) {
    println!(
        "Forecast for {} (window {}, {} evaluated steps)",
        result.symbol, result.window_size, result.testing_steps
    );
    println!(
        "  tomorrow:      {:.4} USD\n  day after:     {:.4} USD",
        result.predicted_tomorrow, result.predicted_day_after
    );
}
