//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tokio_util::sync::CancellationToken;
use utoipa::OpenApi;

use metals_types::{FetchError, LatestQuery, ProblemDetails, QuoteCache, UpstreamTransport};

use crate::PriceFetcher;
use crate::openapi::ApiDoc;

/// Status nginx uses for "client closed request"; never reaches the client.
const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Application state shared across handlers.
pub struct AppState<T: UpstreamTransport, C: QuoteCache> {
    pub fetcher: PriceFetcher<T, C>,
}

/// Wrapper to implement IntoResponse for FetchError (orphan rule workaround).
pub struct ApiError(pub FetchError);

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    fn status_and_title(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            FetchError::Configuration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error")
            }
            FetchError::Upstream(_) => (StatusCode::BAD_GATEWAY, "Upstream API error"),
            FetchError::Cancelled => (
                StatusCode::from_u16(CLIENT_CLOSED_REQUEST).unwrap_or(StatusCode::BAD_REQUEST),
                "Request cancelled",
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, title) = self.status_and_title();

        match &self.0 {
            FetchError::Configuration(msg) => tracing::error!("configuration error: {}", msg),
            FetchError::Upstream(msg) => tracing::warn!("upstream error: {}", msg),
            FetchError::Cancelled => tracing::debug!("request cancelled by client"),
        }

        let body = ProblemDetails {
            title: title.to_string(),
            detail: self.0.to_string(),
            status: status.as_u16(),
        };

        (
            status,
            [(header::CONTENT_TYPE, "application/problem+json")],
            Json(body),
        )
            .into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// OpenAPI document (development only).
pub async fn openapi() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Latest gold and silver prices per troy ounce.
///
/// If the client disconnects, axum drops this future and the drop guard
/// cancels the outbound call.
#[tracing::instrument(skip(state))]
pub async fn latest<T: UpstreamTransport, C: QuoteCache>(
    State(state): State<Arc<AppState<T, C>>>,
    Query(query): Query<LatestQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let quote = state
        .fetcher
        .fetch_latest(query.base_currency.as_deref(), &cancel)
        .await?;
    Ok(Json(quote))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (
                FetchError::Configuration("x".into()),
                500,
                "Configuration error",
            ),
            (FetchError::Upstream("x".into()), 502, "Upstream API error"),
            (FetchError::Cancelled, 499, "Request cancelled"),
        ];

        for (err, status, title) in cases {
            let (got_status, got_title) = ApiError(err).status_and_title();
            assert_eq!(got_status.as_u16(), status);
            assert_eq!(got_title, title);
        }
    }

    #[test]
    fn test_problem_response_content_type() {
        let response = ApiError(FetchError::Upstream("down".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/problem+json"
        );
    }
}
