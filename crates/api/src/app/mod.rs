//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage, accounts, products and translator wiring
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    http::{HeaderName, HeaderValue, Method},
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use satchel_infra::AppConfig;

use crate::middleware::{self, AuthGate};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router from configuration (entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let services = Arc::new(AppServices::from_config(config).await?);
    router(services, config)
}

/// Assemble routes, per-group auth gates, CORS and request tracing around
/// already-built services.
pub fn router(services: Arc<AppServices>, config: &AppConfig) -> anyhow::Result<Router> {
    let products_gate = AuthGate::new(config.auth.authenticator(config.auth.products_scheme)?);
    let translate_gate = AuthGate::new(config.auth.authenticator(config.auth.translate_scheme)?);
    tracing::info!(
        products = ?config.auth.products_scheme,
        translate = ?config.auth.translate_scheme,
        "auth schemes configured"
    );

    let products = routes::products::router().layer(axum::middleware::from_fn_with_state(
        products_gate,
        middleware::auth_middleware,
    ));
    let translate = routes::translate::router().layer(axum::middleware::from_fn_with_state(
        translate_gate,
        middleware::auth_middleware,
    ));

    Ok(routes::public_router()
        .merge(products)
        .merge(translate)
        .fallback(routes::system::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(config)?)
                .layer(Extension(services)),
        ))
}

/// Permissive when no origins are configured.
fn cors_layer(config: &AppConfig) -> anyhow::Result<CorsLayer> {
    if config.cors.origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let shared_secret_header =
        HeaderName::from_bytes(config.auth.shared_secret_header.trim().as_bytes())
            .map_err(|e| anyhow::anyhow!("invalid shared secret header name: {e}"))?;
    let origins = config
        .cors
        .origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).map_err(|e| anyhow::anyhow!("invalid CORS origin '{o}': {e}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            shared_secret_header,
        ]))
}
