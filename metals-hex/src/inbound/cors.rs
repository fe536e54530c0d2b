//! Cross-origin policy for the browser frontend.

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::server::Environment;

/// Vite dev server, allowed by default in development.
pub const DEV_ORIGIN: &str = "http://localhost:5173";

/// Trims configured origins and drops blanks. Development falls back to
/// the local dev server when nothing is configured.
pub fn allowed_origins(configured: &[String], environment: Environment) -> Vec<String> {
    let origins: Vec<String> = configured
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect();

    if origins.is_empty() && environment.is_development() {
        return vec![DEV_ORIGIN.to_string()];
    }
    origins
}

/// Any header and method, only from the listed origins.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
