pub mod backend;
pub mod capture;
pub mod http_backend;
pub mod local_backend;
pub mod session;
pub mod view;

use thiserror::Error;

use crate::config::ConfigError;
use crate::repositories::message_repository::StoreError;
use capture::CaptureError;

/// Conversation client error types
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server rejected request ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Subscription failed: {0}")]
    Subscription(String),

    #[error("Subscription closed")]
    SubscriptionClosed,

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Audio encoding error: {0}")]
    Audio(#[from] hound::Error),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
