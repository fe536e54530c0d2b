//! Metals CLI
//!
//! Command-line interface for the Metal Prices API.

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::time::MissedTickBehavior;

use metals_client::MetalsClient;
use metals_types::PriceQuote;

#[derive(Parser)]
#[command(name = "metals")]
#[command(author, version, about = "Metal Prices API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Metal Prices API
    #[arg(long, env = "METALS_API_URL", default_value = "http://localhost:5080")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the latest gold and silver prices
    Latest {
        /// Base currency (defaults to the server's configured currency)
        #[arg(long)]
        base: Option<String>,
        /// Print the raw JSON quote
        #[arg(long)]
        json: bool,
    },
    /// Poll the latest prices until interrupted
    Watch {
        #[arg(long)]
        base: Option<String>,
        /// Seconds between polls
        #[arg(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },
    /// Check API health
    Health,
}

fn render(quote: &PriceQuote) -> String {
    format!(
        "{}  gold {:.2} | silver {:.2}  ({})",
        quote.timestamp_utc.format("%Y-%m-%d %H:%M:%S UTC"),
        quote.gold_per_ounce,
        quote.silver_per_ounce,
        quote.unit
    )
}

async fn watch(client: &MetalsClient, base: Option<&str>, every: Duration) -> Result<()> {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                // A failed poll is reported and the loop keeps going
                match client.latest(base).await {
                    Ok(quote) => println!("{}", render(&quote)),
                    Err(e) => eprintln!("✗ {e}"),
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = MetalsClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Latest { base, json } => {
            let quote = client.latest(base.as_deref()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&quote)?);
            } else {
                println!("{}", render(&quote));
            }
        }

        Commands::Watch { base, interval } => {
            println!(
                "Polling {} every {}s (Ctrl+C to stop)",
                client.base_url(),
                interval
            );
            watch(&client, base.as_deref(), Duration::from_secs(interval)).await?;
        }
    }

    Ok(())
}
