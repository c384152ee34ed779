use axum::{
    body::Bytes,
    debug_handler,
    extract::{Path, Query},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use hyper::StatusCode;
use log::{error, info};
use serde_json::json;

use crate::{
    app_state::AppState,
    models::audio::{AudioUploadParams, AudioUploadResponse},
    repositories::{audio_repository::audio_key, message_repository::StoreError},
};

fn store_error_status(e: &StoreError) -> StatusCode {
    match e {
        StoreError::AlreadyExists(_) => StatusCode::CONFLICT,
        StoreError::InvalidKey(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// POST /audio?capturedAt=<millis>: stores a recording once and returns its URL
#[debug_handler]
pub async fn upload_audio(
    Extension(state): Extension<AppState>,
    Query(params): Query<AudioUploadParams>,
    body: Bytes,
) -> impl IntoResponse {
    let key = audio_key(params.captured_at);

    match state.audio.put(&key, body.to_vec()).await {
        Ok(()) => {
            info!("Stored audio object {} ({} bytes)", key, body.len());
            (
                StatusCode::CREATED,
                Json(AudioUploadResponse {
                    audio_url: state.audio_url(&key),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Error storing audio object {}: {}", key, e);
            (store_error_status(&e), Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

/// GET /audio/:key
#[debug_handler]
pub async fn get_audio(
    Extension(state): Extension<AppState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    match state.audio.get(&key).await {
        Ok(Some(bytes)) => (StatusCode::OK, [(header::CONTENT_TYPE, "audio/wav")], bytes).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            error!("Error reading audio object {}: {}", key, e);
            (store_error_status(&e), Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}
