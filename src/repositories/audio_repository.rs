// repositories/audio_repository.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use super::message_repository::StoreError;

static OBJECT_KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("object key pattern is valid"));

/// Object key for a recording captured at `captured_at_millis`
pub fn audio_key(captured_at_millis: i64) -> String {
    format!("{}.wav", captured_at_millis)
}

/// Rejects keys that could escape the store's namespace
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.starts_with('.') || !OBJECT_KEY_REGEX.is_match(key) {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Write-once blob storage for recorded audio
#[async_trait]
pub trait AudioStore: Send + Sync {
    /// Stores `bytes` under `key`; fails if the key is already taken
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError>;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
}

#[derive(Clone)]
pub struct FilesystemAudioStore {
    root: PathBuf,
}

impl FilesystemAudioStore {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl AudioStore for FilesystemAudioStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        validate_key(key)?;
        let path = self.file_path(key);

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        file.write_all(&bytes).await?;
        file.flush().await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        validate_key(key)?;
        match fs::read(self.file_path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local object store used when no directory is configured
#[derive(Default)]
pub struct InMemoryAudioStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryAudioStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AudioStore for InMemoryAudioStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        validate_key(key)?;
        let mut objects = self.objects.write().await;
        if objects.contains_key(key) {
            return Err(StoreError::AlreadyExists(key.to_string()));
        }
        objects.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        validate_key(key)?;
        Ok(self.objects.read().await.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("clinic-chat-audio-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn key_is_capture_millis() {
        assert_eq!(audio_key(1714557600000), "1714557600000.wav");
    }

    #[test]
    fn rejects_traversal_keys() {
        assert!(validate_key("1714557600000.wav").is_ok());
        assert!(validate_key("../secret").is_err());
        assert!(validate_key("..").is_err());
        assert!(validate_key("a/b.wav").is_err());
        assert!(validate_key("").is_err());
    }

    #[tokio::test]
    async fn memory_store_is_write_once() {
        let store = InMemoryAudioStore::new();
        store.put("1.wav", vec![1, 2, 3]).await.unwrap();

        let second = store.put("1.wav", vec![9]).await;
        assert!(matches!(second, Err(StoreError::AlreadyExists(_))));
        assert_eq!(store.get("1.wav").await.unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(store.get("2.wav").await.unwrap(), None);
    }

    #[tokio::test]
    async fn filesystem_store_round_trips_and_refuses_overwrite() {
        let dir = scratch_dir();
        let store = FilesystemAudioStore::new(&dir).unwrap();

        store.put("42.wav", b"RIFF".to_vec()).await.unwrap();
        assert_eq!(store.get("42.wav").await.unwrap(), Some(b"RIFF".to_vec()));

        let again = store.put("42.wav", b"other".to_vec()).await;
        assert!(matches!(again, Err(StoreError::AlreadyExists(_))));
        assert_eq!(store.get("missing.wav").await.unwrap(), None);

        std::fs::remove_dir_all(dir).ok();
    }
}
