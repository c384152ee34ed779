use axum::{debug_handler, response::IntoResponse, Extension, Json};
use hyper::StatusCode;

use crate::{
    app_state::AppState,
    models::translation::{SummaryRequest, SummaryResponse, TranslateRequest, TranslateResponse},
    services::{summary_service, translation_service},
};

/// POST /translate
///
/// Model failures answer 500 with the original text as the translation.
#[debug_handler]
pub async fn translate(
    Extension(state): Extension<AppState>,
    Json(payload): Json<TranslateRequest>,
) -> impl IntoResponse {
    let result =
        translation_service::translate(state.model.as_ref(), &payload.text, &payload.to_lang).await;

    let status = if result.degraded {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };

    (
        status,
        Json(TranslateResponse {
            translated_text: result.translated_text,
        }),
    )
}

/// POST /summary
#[debug_handler]
pub async fn summary(
    Extension(state): Extension<AppState>,
    Json(payload): Json<SummaryRequest>,
) -> impl IntoResponse {
    let result = summary_service::summarize(state.model.as_ref(), &payload.text).await;

    let status = if result.failed {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };

    (
        status,
        Json(SummaryResponse {
            summary: result.summary,
        }),
    )
}
