//! HTTP delivery for the vitae assistant: settings, routes and app assembly.

mod error;
pub mod routes;
pub mod settings;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;

pub use error::ApiError;
pub use routes::{AppState, SharedState, router};
pub use settings::Settings;

/// Router with the CORS policy for the configured client origin.
pub fn app(settings: &Settings, state: AppState) -> anyhow::Result<Router> {
    Ok(router(Arc::new(state)).layer(cors_layer(&settings.client_origin)?))
}

fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin = origin
        .parse::<HeaderValue>()
        .with_context(|| format!("invalid CLIENT_ORIGIN {origin:?}"))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}
