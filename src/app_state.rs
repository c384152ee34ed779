// app_state.rs

use std::sync::Arc;

use crate::config::DEFAULT_MAX_AUDIO_BYTES;
use crate::repositories::audio_repository::AudioStore;
use crate::services::llm_service::ChatModel;
use crate::services::message_log::MessageLog;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Conversation log and its live subscriptions
    pub messages: MessageLog,
    /// Language model used by the translate and summary endpoints
    pub model: Arc<dyn ChatModel>,
    /// Object store for recorded audio
    pub audio: Arc<dyn AudioStore>,
    /// Prefix of durable audio URLs handed back to clients
    pub public_base_url: String,
    /// Body limit of the audio upload route
    pub max_audio_bytes: usize,
}

impl AppState {
    /// Creates a new instance of AppState
    ///
    /// # Arguments
    /// * `messages` - Opened message log
    /// * `model` - Chat model client
    /// * `audio` - Audio object store
    /// * `public_base_url` - Externally reachable base URL of this server
    pub fn new(
        messages: MessageLog,
        model: Arc<dyn ChatModel>,
        audio: Arc<dyn AudioStore>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            messages,
            model,
            audio,
            public_base_url: public_base_url.into(),
            max_audio_bytes: DEFAULT_MAX_AUDIO_BYTES,
        }
    }

    pub fn with_max_audio_bytes(mut self, max_audio_bytes: usize) -> Self {
        self.max_audio_bytes = max_audio_bytes;
        self
    }

    /// Durable URL under which the object `key` is served
    pub fn audio_url(&self, key: &str) -> String {
        format!("{}/audio/{}", self.public_base_url, key)
    }
}
