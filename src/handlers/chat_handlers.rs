use axum::{debug_handler, response::IntoResponse, Extension, Json};
use hyper::StatusCode;
use log::error;
use serde_json::json;
use validator::Validate;

use crate::{app_state::AppState, models::message::NewMessage};

/// GET /messages: current ordered snapshot of the log
#[debug_handler]
pub async fn get_messages(Extension(state): Extension<AppState>) -> impl IntoResponse {
    Json(state.messages.snapshot().as_ref().clone())
}

/// POST /messages: appends one message
#[debug_handler]
pub async fn append_message(
    Extension(state): Extension<AppState>,
    Json(payload): Json<NewMessage>,
) -> impl IntoResponse {
    if let Err(errors) = payload.validate() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response();
    }

    match state.messages.append(payload).await {
        Ok(message) => (StatusCode::CREATED, Json(message)).into_response(),
        Err(e) => {
            error!("Error appending message: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
