use axum::{
    routing::{get, post},
    Router,
};

pub mod accounts;
pub mod products;
pub mod system;
pub mod translate;

/// Routes that need no credentials.
pub fn public_router() -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/api/v1", get(system::v1_index))
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
}
