//! End-to-end demo against a fake MetalpriceAPI.
//!
//! Run with: cargo run -p metals-app --example demo

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use axum::{Json, Router, extract::State, routing::get};
use tokio::net::TcpListener;

use metals_client::MetalsClient;
use metals_hex::{FetcherConfig, KeySource, PriceFetcher, inbound::HttpServer};
use metals_upstream::{InMemoryQuoteCache, MetalpriceTransport};

/// Fake upstream: gold drifts a little on every call.
async fn fake_latest(State(calls): State<Arc<AtomicU32>>) -> Json<serde_json::Value> {
    let n = calls.fetch_add(1, Ordering::SeqCst);
    let xau = 0.0005 - f64::from(n) * 0.000001;
    Json(serde_json::json!({
        "success": true,
        "timestamp": 1_704_067_200 + i64::from(n) * 60,
        "base": "USD",
        "rates": { "XAU": xau, "XAG": 0.04 },
    }))
}

async fn spawn(router: Router) -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            eprintln!("server error: {e}");
        }
    });
    Ok(format!("http://{addr}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_env_filter("info").init();

    let upstream_calls = Arc::new(AtomicU32::new(0));
    let upstream = spawn(
        Router::new()
            .route("/latest", get(fake_latest))
            .with_state(upstream_calls.clone()),
    )
    .await?;
    println!("🚀 Fake MetalpriceAPI on {upstream}");

    let config = FetcherConfig::new(
        "USD",
        1,
        vec![KeySource::Configured(Some("demo-key".into()))],
    )?;
    let transport = MetalpriceTransport::new(&upstream, Duration::from_secs(5))?;
    let fetcher = PriceFetcher::new(transport, InMemoryQuoteCache::new(), config);
    let base_url = spawn(HttpServer::new(fetcher).router()).await?;
    println!("🚀 Metal prices server on {base_url}");

    let client = MetalsClient::new(&base_url);

    // ─────────────────────────────────────────────────────────────────────────
    // Demo: fetch, hit the cache, then poll past the TTL
    // ─────────────────────────────────────────────────────────────────────────

    println!("✅ Server health: {}", client.health().await?);

    let quote = client.latest(None).await?;
    println!("{}", serde_json::to_string_pretty(&quote)?);

    let again = client.latest(Some("usd")).await?;
    assert_eq!(quote, again);
    println!(
        "✅ Second request served from cache ({} upstream call)",
        upstream_calls.load(Ordering::SeqCst)
    );

    for _ in 0..3 {
        tokio::time::sleep(Duration::from_millis(1100)).await;
        let quote = client.latest(None).await?;
        println!(
            "   {} gold {} silver {}",
            quote.timestamp_utc, quote.gold_per_ounce, quote.silver_per_ounce
        );
    }

    println!(
        "✅ Done after {} upstream calls",
        upstream_calls.load(Ordering::SeqCst)
    );
    Ok(())
}
