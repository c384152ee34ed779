use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};
use tokio::sync::watch;

use super::backend::{ConversationBackend, Subscription};
use super::capture::{AudioCapture, CapturePhase};
use super::view::{filter_messages, transcript};
use super::ClientError;
use crate::config::LanguageMap;
use crate::models::message::{Message, MessageKind, NewMessage, Role, AUDIO_MESSAGE_TEXT};
use crate::services::message_log::Snapshot;
use crate::services::summary_service::SUMMARY_ERROR;

async fn send_as(
    backend: &dyn ConversationBackend,
    role: Role,
    languages: &LanguageMap,
    text: &str,
    kind: MessageKind,
) -> Result<Message, ClientError> {
    let translated_text = match backend.translate(text, languages.target_for(role)).await {
        Ok(translated) => translated,
        Err(e) => {
            warn!("Translation unavailable, sending original text: {}", e);
            text.to_string()
        }
    };

    let message = NewMessage {
        text: text.to_string(),
        translated_text,
        role,
        timestamp: Utc::now(),
        kind,
    };
    backend.append(message).await
}

// Leaves the finalizing phase however the upload ends
struct FinishOnDrop<'a>(&'a mut AudioCapture);

impl Drop for FinishOnDrop<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.0.finish() {
            warn!("Audio capture was not finalizing: {}", e);
        }
    }
}

/// A client that has not chosen a role yet
pub struct ConversationClient {
    backend: Arc<dyn ConversationBackend>,
    languages: LanguageMap,
}

impl ConversationClient {
    pub fn new(backend: Arc<dyn ConversationBackend>, languages: LanguageMap) -> Self {
        Self { backend, languages }
    }

    /// Chooses the participant role for this session and subscribes to the log.
    ///
    /// Consumes the client: a session's role cannot be changed afterwards.
    pub async fn select_role(self, role: Role) -> Result<ActiveSession, ClientError> {
        let subscription = self.backend.subscribe().await?;
        info!("Session started as {}", role);

        Ok(ActiveSession {
            role,
            backend: self.backend,
            languages: self.languages,
            subscription,
            capture: AudioCapture::new(),
        })
    }
}

/// A conversation session with a fixed role and one live log subscription
pub struct ActiveSession {
    role: Role,
    backend: Arc<dyn ConversationBackend>,
    languages: LanguageMap,
    subscription: Subscription,
    capture: AudioCapture,
}

impl ActiveSession {
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn target_language(&self) -> &str {
        self.languages.target_for(self.role)
    }

    /// The log as last delivered by the subscription
    pub fn messages(&self) -> Snapshot {
        self.subscription.latest()
    }

    pub fn updates(&self) -> watch::Receiver<Snapshot> {
        self.subscription.updates()
    }

    pub async fn wait_for_update(&mut self) -> Result<Snapshot, ClientError> {
        self.subscription.changed().await
    }

    /// Translates and persists `text`. Whitespace-only input is ignored.
    ///
    /// The message shows up in [`ActiveSession::messages`] only once the
    /// subscription delivers it.
    pub async fn send(&self, text: &str) -> Result<Option<Message>, ClientError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        self.send_message(text, MessageKind::text()).await.map(Some)
    }

    async fn send_message(&self, text: &str, kind: MessageKind) -> Result<Message, ClientError> {
        send_as(&*self.backend, self.role, &self.languages, text, kind).await
    }

    /// Summary of the currently loaded log, or the fixed error text
    pub async fn summarize(&self) -> String {
        let transcript = transcript(&self.messages());
        match self.backend.summarize(&transcript).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Summary unavailable: {}", e);
                SUMMARY_ERROR.to_string()
            }
        }
    }

    pub fn filter(&self, query: &str) -> Vec<Message> {
        filter_messages(&self.messages(), query)
    }

    pub fn capture_phase(&self) -> CapturePhase {
        self.capture.phase()
    }

    pub fn start_recording(&mut self, sample_rate: u32) -> Result<(), ClientError> {
        Ok(self.capture.start(sample_rate)?)
    }

    pub fn record_samples(&mut self, samples: &[f32]) -> Result<(), ClientError> {
        Ok(self.capture.push(samples)?)
    }

    /// Stops recording, uploads the clip and sends it as an audio message.
    ///
    /// The capture returns to idle when this completes, fails or is dropped.
    pub async fn stop_and_send_audio(&mut self) -> Result<Message, ClientError> {
        let Self {
            role,
            backend,
            languages,
            capture,
            ..
        } = self;

        let clip = capture.stop()?;
        let _finalizing = FinishOnDrop(capture);
        info!("Recorded {:.1}s of audio", clip.duration_secs());

        let audio_url = backend.upload_audio(&clip).await?;
        send_as(
            &**backend,
            *role,
            languages,
            AUDIO_MESSAGE_TEXT,
            MessageKind::audio(audio_url),
        )
        .await
    }

    /// Ends the session and its subscription
    pub fn close(self) {
        info!("Session as {} closed", self.role);
        self.subscription.close();
    }
}
