//! HTTP Server configuration and startup.

use std::str::FromStr;
use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use metals_types::{QuoteCache, UpstreamTransport};

use super::cors::cors_layer;
use super::handlers::{self, AppState};
use crate::PriceFetcher;

/// Deployment environment; development enables the dev CORS origin and
/// the OpenAPI document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!(
                "Unknown environment: {other}. Expected development or production"
            )),
        }
    }
}

/// HTTP Server for the Metal Prices API.
pub struct HttpServer<T: UpstreamTransport, C: QuoteCache> {
    state: Arc<AppState<T, C>>,
    environment: Environment,
    allowed_origins: Vec<String>,
}

impl<T: UpstreamTransport, C: QuoteCache> HttpServer<T, C> {
    /// Creates a production server with no cross-origin access.
    pub fn new(fetcher: PriceFetcher<T, C>) -> Self {
        Self {
            state: Arc::new(AppState { fetcher }),
            environment: Environment::Production,
            allowed_origins: Vec::new(),
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Origins allowed to call the API from a browser (already resolved).
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .route("/health", get(handlers::health))
            .route("/api/metals/latest", get(handlers::latest::<T, C>));

        if self.environment.is_development() {
            router = router.route("/openapi.json", get(handlers::openapi));
        }

        router
            .layer(cors_layer(&self.allowed_origins))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);
        tracing::info!(origins = ?self.allowed_origins, "CORS allowed origins");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
