use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioUploadResponse {
    pub audio_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioUploadParams {
    /// Capture time in unix milliseconds; keys the stored object
    pub captured_at: i64,
}
