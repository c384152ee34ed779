use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Placeholder text persisted for recorded audio messages.
pub const AUDIO_MESSAGE_TEXT: &str = "Audio message";

/// One of the two fixed participants of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Doctor,
    Patient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Patient => "patient",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "doctor" => Ok(Role::Doctor),
            "patient" => Ok(Role::Patient),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// What a message carries besides its text.
///
/// Serialized flattened into the message document: the audio variant adds an
/// `audioUrl` field, the text variant adds nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageKind {
    Audio {
        #[serde(rename = "audioUrl")]
        audio_url: String,
    },
    Text {},
}

impl MessageKind {
    pub fn text() -> Self {
        MessageKind::Text {}
    }

    pub fn audio(audio_url: impl Into<String>) -> Self {
        MessageKind::Audio {
            audio_url: audio_url.into(),
        }
    }

    pub fn audio_url(&self) -> Option<&str> {
        match self {
            MessageKind::Audio { audio_url } => Some(audio_url),
            MessageKind::Text {} => None,
        }
    }
}

impl From<Option<String>> for MessageKind {
    fn from(audio_url: Option<String>) -> Self {
        match audio_url {
            Some(url) => MessageKind::Audio { audio_url: url },
            None => MessageKind::Text {},
        }
    }
}

/// A persisted entry of the conversation log. Never modified once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub translated_text: String,
    pub role: Role,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: MessageKind,
}

impl Message {
    /// Builds the stored record for `new` under the id chosen by the store
    pub fn from_new(id: Uuid, new: NewMessage) -> Self {
        Self {
            id,
            text: new.text,
            translated_text: new.translated_text,
            role: new.role,
            timestamp: new.timestamp,
            kind: new.kind,
        }
    }
}

/// Request body for appending to the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    #[validate(length(min = 1, message = "Message text must not be empty"))]
    pub text: String,
    pub translated_text: String,
    pub role: Role,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: MessageKind,
}
