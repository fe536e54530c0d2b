//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the price fetcher.

mod cors;
mod handlers;
mod server;

pub use cors::{DEV_ORIGIN, allowed_origins, cors_layer};
pub use handlers::{ApiError, AppState};
pub use server::{Environment, HttpServer};
