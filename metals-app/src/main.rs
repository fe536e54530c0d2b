//! # Metals Application
//!
//! Binary that wires together all the components:
//! - Load configuration from file and environment
//! - Initialize the upstream transport and the quote cache
//! - Create the price fetcher
//! - Start the HTTP server

mod config;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use metals_hex::{PriceFetcher, inbound::HttpServer};
use metals_upstream::{InMemoryQuoteCache, MetalpriceTransport};

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("metals-service"), provider))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // OpenTelemetry export only when a collector is configured
    let otel = if std::env::var_os("OTEL_EXPORTER_OTLP_ENDPOINT").is_some() {
        Some(init_tracer()?)
    } else {
        None
    };
    let (telemetry, otel_provider) = match otel {
        Some((tracer, provider)) => (
            Some(tracing_opentelemetry::layer().with_tracer(tracer)),
            Some(provider),
        ),
        None => (None, None),
    };

    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,metals_app=debug,metals_hex=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .with(telemetry)
        .init();

    // Load configuration
    let config = config::Config::from_env()?;

    tracing::info!(
        "Starting metal prices server on port {} ({:?})",
        config.port,
        config.environment
    );
    tracing::info!(
        base_url = %config.base_url,
        base_currency = %config.fetcher.default_base_currency,
        cache_secs = config.fetcher.cache_ttl.as_secs(),
        "Upstream configured"
    );

    // One cache per process, shared by every request
    let transport = MetalpriceTransport::new(&config.base_url, config.upstream_timeout)?;
    let cache = InMemoryQuoteCache::new();
    let fetcher = PriceFetcher::new(transport, cache, config.fetcher);

    // Create and run the HTTP server
    let server = HttpServer::new(fetcher)
        .with_environment(config.environment)
        .with_allowed_origins(config.allowed_origins);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    if let Some(provider) = otel_provider {
        let _ = provider.shutdown();
    }
    Ok(())
}
