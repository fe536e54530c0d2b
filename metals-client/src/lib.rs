//! # Metals Client SDK
//!
//! A typed Rust client for the Metal Prices API.

use metals_types::{PriceQuote, ProblemDetails};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} {title} - {detail}")]
    Api {
        status: u16,
        title: String,
        detail: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Metal Prices API client.
#[derive(Clone)]
pub struct MetalsClient {
    base_url: String,
    http: Client,
}

impl MetalsClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Fetches the latest gold and silver quote.
    ///
    /// `base` is forwarded as `baseCurrency`; `None` uses the server default.
    pub async fn latest(&self, base: Option<&str>) -> Result<PriceQuote, ClientError> {
        let mut req = self.http.get(format!("{}/api/metals/latest", self.base_url));
        if let Some(base) = base {
            req = req.query(&[("baseCurrency", base)]);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        let body = resp.text().await?;
        if status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }

        // Problem bodies carry title/detail; anything else is passed through raw
        Err(match serde_json::from_str::<ProblemDetails>(&body) {
            Ok(problem) => ClientError::Api {
                status: status.as_u16(),
                title: problem.title,
                detail: problem.detail,
            },
            Err(_) => ClientError::Api {
                status: status.as_u16(),
                title: status.canonical_reason().unwrap_or("Error").to_string(),
                detail: body,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::Query,
        http::{StatusCode, header},
        response::IntoResponse,
        routing::get,
    };
    use std::collections::HashMap;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn quote(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
        let base = params
            .get("baseCurrency")
            .cloned()
            .unwrap_or_else(|| "USD".into())
            .to_uppercase();
        Json(serde_json::json!({
            "baseCurrency": base,
            "timestampUtc": "2024-01-01T00:00:00Z",
            "goldPerOunce": 2034.59,
            "silverPerOunce": 23.1,
            "unit": format!("{base} per oz"),
        }))
    }

    #[test]
    fn test_client_creation() {
        let client = MetalsClient::new("http://localhost:5080");
        assert_eq!(client.base_url(), "http://localhost:5080");
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = MetalsClient::new("http://localhost:5080/");
        assert_eq!(client.base_url(), "http://localhost:5080");
    }

    #[tokio::test]
    async fn test_latest_parses_quote() {
        let url = serve(Router::new().route("/api/metals/latest", get(quote))).await;
        let client = MetalsClient::new(url);

        let quote = client.latest(Some("eur")).await.unwrap();

        assert_eq!(quote.base_currency, "EUR");
        assert_eq!(quote.unit, "EUR per oz");
        assert_eq!(quote.gold_per_ounce.to_string(), "2034.59");
        assert_eq!(quote.silver_per_ounce.to_string(), "23.1");
    }

    #[tokio::test]
    async fn test_problem_body_becomes_api_error() {
        let router = Router::new().route(
            "/api/metals/latest",
            get(|| async {
                (
                    StatusCode::BAD_GATEWAY,
                    [(header::CONTENT_TYPE, "application/problem+json")],
                    r#"{"title":"Upstream API error","detail":"MetalpriceAPI returned 503","status":502}"#,
                )
            }),
        );
        let client = MetalsClient::new(serve(router).await);

        match client.latest(None).await {
            Err(ClientError::Api {
                status,
                title,
                detail,
            }) => {
                assert_eq!(status, 502);
                assert_eq!(title, "Upstream API error");
                assert!(detail.contains("503"));
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_problem_error_keeps_raw_body() {
        let router = Router::new().route(
            "/api/metals/latest",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down for maintenance") }),
        );
        let client = MetalsClient::new(serve(router).await);

        match client.latest(None).await {
            Err(ClientError::Api { status, detail, .. }) => {
                assert_eq!(status, 503);
                assert_eq!(detail, "down for maintenance");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_health() {
        let router = Router::new().route("/health", get(|| async { "ok" }));
        let client = MetalsClient::new(serve(router).await);
        assert!(client.health().await.unwrap());
    }
}
