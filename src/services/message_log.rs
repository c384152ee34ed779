// services/message_log.rs

use std::sync::Arc;

use log::{error, info};
use tokio::sync::{watch, Mutex};

use crate::models::message::{Message, NewMessage};
use crate::repositories::message_repository::{MessageStore, StoreError};

/// Full ordered view of the log at one point in time
pub type Snapshot = Arc<Vec<Message>>;

/// Append-only conversation log with live full-snapshot subscriptions.
///
/// Every successful append re-reads the ordered collection from the store and
/// publishes it to all subscribers.
#[derive(Clone)]
pub struct MessageLog {
    store: Arc<dyn MessageStore>,
    snapshots: Arc<watch::Sender<Snapshot>>,
    // serializes append + publish so snapshots never go backwards
    publish_lock: Arc<Mutex<()>>,
}

impl MessageLog {
    /// Opens the log, loading the current snapshot from `store`
    pub async fn open(store: Arc<dyn MessageStore>) -> Result<Self, StoreError> {
        let initial = store.list_ordered().await?;
        info!("Message log opened with {} messages", initial.len());
        let (sender, _) = watch::channel(Arc::new(initial));

        Ok(Self {
            store,
            snapshots: Arc::new(sender),
            publish_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Persists `message` and publishes the new snapshot.
    ///
    /// Once the store accepts the message this never fails. If the ordered
    /// re-read fails, the stored message is merged into the last published
    /// snapshot instead.
    pub async fn append(&self, message: NewMessage) -> Result<Message, StoreError> {
        let _guard = self.publish_lock.lock().await;

        let stored = self.store.append(message).await?;
        let ordered = match self.store.list_ordered().await {
            Ok(ordered) => ordered,
            Err(e) => {
                error!("Error re-reading message log after append {}: {}", stored.id, e);
                merge_in_order(&self.snapshot(), stored.clone())
            }
        };
        self.snapshots.send_replace(Arc::new(ordered));

        Ok(stored)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver yielding the full ordered collection after every change
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }
}

// after every entry with an equal or earlier timestamp
fn merge_in_order(previous: &[Message], stored: Message) -> Vec<Message> {
    let position = previous.partition_point(|m| m.timestamp <= stored.timestamp);
    let mut merged = Vec::with_capacity(previous.len() + 1);
    merged.extend_from_slice(&previous[..position]);
    merged.push(stored);
    merged.extend_from_slice(&previous[position..]);
    merged
}
