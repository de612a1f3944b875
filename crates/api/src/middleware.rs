use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use satchel_auth::{AuthError, Authenticator, Identity};

use crate::app::errors::json_error;
use crate::context::AuthContext;

/// State for one route group's gate.
#[derive(Debug, Clone)]
pub struct AuthGate {
    authenticator: Arc<Authenticator>,
}

impl AuthGate {
    pub fn new(authenticator: Authenticator) -> Self {
        Self {
            authenticator: Arc::new(authenticator),
        }
    }

    fn check(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        let value = match headers.get(self.authenticator.header_name()) {
            Some(v) => Some(
                v.to_str()
                    .map_err(|_| AuthError::malformed("credential header is not valid text"))?,
            ),
            None => None,
        };
        self.authenticator.authenticate(value, Utc::now())
    }
}

/// All-or-nothing gate: on failure the inner handler is never called.
pub async fn auth_middleware(
    State(gate): State<AuthGate>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    match gate.check(req.headers()) {
        Ok(identity) => {
            req.extensions_mut().insert(AuthContext::new(identity));
            next.run(req).await
        }
        Err(err) if err.is_credential_error() => {
            tracing::info!(
                scheme = ?gate.authenticator.scheme(),
                method = %req.method(),
                path = %req.uri().path(),
                error = %err,
                "request rejected by auth gate"
            );
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", err.to_string())
        }
        Err(err) => {
            tracing::error!(error = %err, "auth gate failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "authentication unavailable",
            )
        }
    }
}
