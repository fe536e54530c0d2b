//! Data Transfer Objects for requests, responses and the upstream payload.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// ─────────────────────────────────────────────────────────────────────────────
// Inbound DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Query string of `GET /api/metals/latest`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LatestQuery {
    /// Currency to quote prices in; the configured default when omitted
    #[param(example = "EUR")]
    pub base_currency: Option<String>,
}

/// Problem body returned for failed requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProblemDetails {
    #[schema(example = "Upstream API error")]
    pub title: String,
    #[schema(example = "MetalpriceAPI returned 503 Service Unavailable. Body: ")]
    pub detail: String,
    #[schema(example = 502)]
    pub status: u16,
}

// ─────────────────────────────────────────────────────────────────────────────
// Upstream DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Body of MetalpriceAPI `GET /latest`. Every field is optional upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetalpriceLatestResponse {
    #[serde(default)]
    pub success: Option<bool>,
    /// Seconds since the Unix epoch
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub base: Option<String>,
    /// Metal units per 1 unit of `base`
    #[serde(default)]
    pub rates: Option<HashMap<String, f64>>,
    #[serde(default)]
    pub error: Option<MetalpriceApiError>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetalpriceApiError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub info: Option<String>,
}
