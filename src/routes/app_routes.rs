// src/routes/app_routes.rs

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Router,
};
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::handlers::audio_handlers::{get_audio, upload_audio};
use crate::handlers::chat_handlers::{append_message, get_messages};
use crate::handlers::translation_handlers::{summary, translate};
use crate::websocket::handlers::subscribe_handler;

pub fn create_router(state: AppState) -> Router {
    let audio_limit = DefaultBodyLimit::max(state.max_audio_bytes);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/translate", post(translate))
        .route("/summary", post(summary))
        .route("/messages", get(get_messages).post(append_message))
        .route("/messages/ws", get(subscribe_handler))
        .route("/audio", post(upload_audio).layer(audio_limit))
        .route("/audio/:key", get(get_audio))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}
