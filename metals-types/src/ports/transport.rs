//! Upstream transport port.
//!
//! This trait defines the single outbound call the fetcher needs.
//! Implementations can be HTTP clients, canned fixtures, etc.

use crate::error::TransportError;

/// Status line and full body of an upstream response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    /// Reason phrase, e.g. `Service Unavailable`
    pub reason: Option<String>,
    pub body: String,
}

impl UpstreamResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Port trait for talking to the metals-price provider.
#[async_trait::async_trait]
pub trait UpstreamTransport: Send + Sync + 'static {
    /// Issues `GET <base_url>/<path>?<query>` and reads the whole body,
    /// whatever the status code.
    ///
    /// Dropping the returned future must abort the request.
    async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<UpstreamResponse, TransportError>;
}
