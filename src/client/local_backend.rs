use async_trait::async_trait;

use super::backend::{ConversationBackend, Subscription};
use super::capture::AudioClip;
use super::ClientError;
use crate::app_state::AppState;
use crate::models::message::{Message, NewMessage};
use crate::repositories::audio_repository::audio_key;
use crate::services::{summary_service, translation_service};

/// Runs the client against in-process services instead of a remote server
#[derive(Clone)]
pub struct LocalBackend {
    state: AppState,
}

impl LocalBackend {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl ConversationBackend for LocalBackend {
    async fn translate(&self, text: &str, to_lang: &str) -> Result<String, ClientError> {
        let result = translation_service::translate(self.state.model.as_ref(), text, to_lang).await;
        Ok(result.translated_text)
    }

    async fn summarize(&self, transcript: &str) -> Result<String, ClientError> {
        let result = summary_service::summarize(self.state.model.as_ref(), transcript).await;
        Ok(result.summary)
    }

    async fn append(&self, message: NewMessage) -> Result<Message, ClientError> {
        Ok(self.state.messages.append(message).await?)
    }

    async fn upload_audio(&self, clip: &AudioClip) -> Result<String, ClientError> {
        let key = audio_key(clip.captured_at.timestamp_millis());
        self.state.audio.put(&key, clip.to_wav()?).await?;
        Ok(self.state.audio_url(&key))
    }

    async fn subscribe(&self) -> Result<Subscription, ClientError> {
        Ok(Subscription::new(self.state.messages.subscribe()))
    }
}
