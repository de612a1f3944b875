use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::dto::{Envelope, NotFoundBody};
use crate::context::AuthContext;

pub async fn root() -> &'static str {
    "server is running!"
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn v1_index() -> Json<Envelope<&'static str>> {
    Json(Envelope {
        code: 200,
        msg: "success".to_string(),
        data: "/api/v1 router",
    })
}

pub async fn whoami(Extension(ctx): Extension<AuthContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "username": ctx.username(),
    }))
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundBody {
            code: 404,
            msg: "404 Not found".to_string(),
            err: "The route is not defined.".to_string(),
        }),
    )
}
