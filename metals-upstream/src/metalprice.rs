//! MetalpriceAPI HTTP transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use metals_types::{TransportError, UpstreamResponse, UpstreamTransport};

/// Production MetalpriceAPI endpoint (no trailing slash).
pub const DEFAULT_BASE_URL: &str = "https://api.metalpriceapi.com/v1";

/// Safety-net timeout for a single upstream request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// reqwest-backed transport rooted at a provider base URL.
#[derive(Clone)]
pub struct MetalpriceTransport {
    base_url: String,
    http: Client,
}

impl MetalpriceTransport {
    /// Creates a transport with its own client and request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("metals-upstream/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(map_reqwest_error)?;
        Ok(Self::with_client(base_url, http))
    }

    /// Creates a transport around an existing client.
    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl UpstreamTransport for MetalpriceTransport {
    // Query carries the API key: never record it.
    #[tracing::instrument(skip(self, query), fields(base_url = %self.base_url))]
    async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<UpstreamResponse, TransportError> {
        let response = self
            .http
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "upstream responded");

        Ok(UpstreamResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().map(String::from),
            body,
        })
    }
}

/// The request URL contains the API key, so it is stripped from the error.
fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(err.without_url().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::net::SocketAddr;

    use axum::{
        Json, Router,
        extract::Query,
        http::StatusCode,
        response::IntoResponse,
        routing::get,
    };

    async fn serve(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    async fn echo_query(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
        Json(params)
    }

    async fn unavailable() -> impl IntoResponse {
        (StatusCode::SERVICE_UNAVAILABLE, "maintenance window")
    }

    async fn slow() -> impl IntoResponse {
        tokio::time::sleep(Duration::from_secs(5)).await;
        "late"
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let transport = MetalpriceTransport::new("https://example.test/v1/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(transport.base_url(), "https://example.test/v1");
        assert_eq!(transport.url("latest"), "https://example.test/v1/latest");
        assert_eq!(transport.url("/latest"), "https://example.test/v1/latest");
    }

    #[tokio::test]
    async fn test_forwards_path_and_query() {
        let addr = serve(Router::new().route("/v1/latest", get(echo_query))).await;
        let transport =
            MetalpriceTransport::new(format!("http://{addr}/v1"), DEFAULT_TIMEOUT).unwrap();

        let response = transport
            .get(
                "latest",
                &[("api_key", "k"), ("base", "USD"), ("currencies", "XAU,XAG")],
            )
            .await
            .unwrap();

        assert!(response.is_ok());
        let echoed: HashMap<String, String> = serde_json::from_str(&response.body).unwrap();
        assert_eq!(echoed["api_key"], "k");
        assert_eq!(echoed["base"], "USD");
        assert_eq!(echoed["currencies"], "XAU,XAG");
    }

    #[tokio::test]
    async fn test_reads_body_of_error_status() {
        let addr = serve(Router::new().route("/latest", get(unavailable))).await;
        let transport = MetalpriceTransport::new(format!("http://{addr}"), DEFAULT_TIMEOUT).unwrap();

        let response = transport.get("latest", &[]).await.unwrap();

        assert_eq!(response.status, 503);
        assert_eq!(response.reason.as_deref(), Some("Service Unavailable"));
        assert_eq!(response.body, "maintenance window");
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let addr = serve(Router::new().route("/latest", get(slow))).await;
        let transport =
            MetalpriceTransport::new(format!("http://{addr}"), Duration::from_millis(100)).unwrap();

        let err = transport.get("latest", &[]).await.unwrap_err();

        assert!(matches!(err, TransportError::Timeout));
    }

    #[tokio::test]
    async fn test_network_error_hides_api_key() {
        // Bind then drop to get a port with nothing listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = MetalpriceTransport::new(format!("http://{addr}"), DEFAULT_TIMEOUT).unwrap();
        let err = transport
            .get("latest", &[("api_key", "super-secret")])
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Network(_)));
        assert!(!err.to_string().contains("super-secret"));
    }
}
