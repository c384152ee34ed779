use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::capture::AudioClip;
use super::ClientError;
use crate::models::message::{Message, NewMessage};
use crate::services::message_log::Snapshot;

/// Everything the conversation client needs from the outside world
#[async_trait]
pub trait ConversationBackend: Send + Sync {
    /// Translated text, or the pass-through text the translator degraded to
    async fn translate(&self, text: &str, to_lang: &str) -> Result<String, ClientError>;

    async fn summarize(&self, transcript: &str) -> Result<String, ClientError>;

    async fn append(&self, message: NewMessage) -> Result<Message, ClientError>;

    /// Uploads a finished recording, returning its durable URL
    async fn upload_audio(&self, clip: &AudioClip) -> Result<String, ClientError>;

    async fn subscribe(&self) -> Result<Subscription, ClientError>;
}

/// Owned handle on a live log subscription.
///
/// Dropping the handle stops any background worker feeding it.
pub struct Subscription {
    updates: watch::Receiver<Snapshot>,
    worker: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(updates: watch::Receiver<Snapshot>) -> Self {
        Self {
            updates,
            worker: None,
        }
    }

    pub fn with_worker(updates: watch::Receiver<Snapshot>, worker: JoinHandle<()>) -> Self {
        Self {
            updates,
            worker: Some(worker),
        }
    }

    /// Most recently delivered snapshot
    pub fn latest(&self) -> Snapshot {
        self.updates.borrow().clone()
    }

    /// Independent receiver over the same snapshots
    pub fn updates(&self) -> watch::Receiver<Snapshot> {
        self.updates.clone()
    }

    /// Waits for the next snapshot
    pub async fn changed(&mut self) -> Result<Snapshot, ClientError> {
        self.updates
            .changed()
            .await
            .map_err(|_| ClientError::SubscriptionClosed)?;
        Ok(self.updates.borrow_and_update().clone())
    }

    pub fn close(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}
