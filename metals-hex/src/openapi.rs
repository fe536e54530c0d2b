//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use utoipa::OpenApi;

use metals_types::{LatestQuery, PriceQuote, ProblemDetails};

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Latest gold and silver prices per troy ounce
#[utoipa::path(
    get,
    path = "/api/metals/latest",
    tag = "metals",
    params(LatestQuery),
    responses(
        (status = 200, description = "Current quote, possibly served from a short-lived cache", body = PriceQuote),
        (status = 500, description = "Configuration error (missing API key, invalid upstream data)", body = ProblemDetails, content_type = "application/problem+json"),
        (status = 502, description = "Upstream API error (non-200 status or network failure)", body = ProblemDetails, content_type = "application/problem+json")
    )
)]
async fn latest() {}

/// OpenAPI documentation for the Metal Prices API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Metal Prices API",
        version = "1.0.0",
        description = "Live gold (XAU) and silver (XAG) spot prices from MetalpriceAPI, expressed in a base currency per troy ounce.\n\nQuotes are cached per base currency for a few seconds; poll rather than hammer.",
        license(name = "MIT"),
    ),
    paths(health, latest),
    components(schemas(PriceQuote, ProblemDetails)),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "metals", description = "Precious metal prices"),
    )
)]
pub struct ApiDoc;
