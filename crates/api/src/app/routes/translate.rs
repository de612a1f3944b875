use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use satchel_infra::ServiceError;
use satchel_translate::{translate_batch, TranslateBatch};

use crate::app::dto::{TranslateRequest, TranslateResponse, TranslateResult};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::AuthContext;

/// Translation proxy; mounted behind the translate gate.
pub fn router() -> Router {
    Router::new()
        .route("/trans", post(translate))
        .route("/api/v1/trans", post(translate))
}

/// Each text is translated on its own; a failed item is reported inline and
/// the response is still `200`.
pub async fn translate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return errors::invalid_body(rejection),
    };

    let batch = match TranslateBatch::new(body.from_lang, body.to_lang, body.texts) {
        Ok(batch) => batch,
        Err(e) => return errors::service_error_to_response(ServiceError::validation(e.to_string())),
    };

    let outcomes = translate_batch(services.translator.as_ref(), &batch).await;
    let failed = outcomes.iter().filter(|o| o.is_failed()).count();
    tracing::info!(
        actor = ctx.username().unwrap_or("shared-secret"),
        from = %batch.pair().from,
        to = %batch.pair().to,
        items = outcomes.len(),
        failed,
        "translation batch processed"
    );

    let results = outcomes.into_iter().map(TranslateResult::from).collect();
    (StatusCode::OK, Json(TranslateResponse { results })).into_response()
}
