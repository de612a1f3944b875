use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::app::dto::{CredentialsRequest, MessageResponse, TokenResponse};
use crate::app::errors;
use crate::app::services::AppServices;

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return errors::invalid_body(rejection),
    };

    match services.accounts.register(&body.username, &body.password).await {
        Ok(username) => (
            StatusCode::CREATED,
            Json(MessageResponse::new(format!("user '{username}' registered"))),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return errors::invalid_body(rejection),
    };

    match services.accounts.login(&body.username, &body.password).await {
        Ok(issued) => (
            StatusCode::OK,
            Json(TokenResponse {
                token: issued.token,
                expires_at: issued.expires_at,
            }),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
