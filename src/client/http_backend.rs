use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use log::{error, info, warn};
use reqwest::{header::CONTENT_TYPE, Client, Response};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::{connect_async, tungstenite, MaybeTlsStream, WebSocketStream};

use super::backend::{ConversationBackend, Subscription};
use super::capture::AudioClip;
use super::ClientError;
use crate::models::audio::AudioUploadResponse;
use crate::models::message::{Message, NewMessage};
use crate::models::translation::{SummaryRequest, SummaryResponse, TranslateRequest, TranslateResponse};

type LogSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Talks to a running chat server over HTTP and its WebSocket log feed
#[derive(Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn ws_url(&self) -> String {
        let url = self.url("/messages/ws");
        if let Some(rest) = url.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = url.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            url
        }
    }
}

async fn error_for_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        body,
    })
}

// Next snapshot frame; `None` once the server closes the feed
async fn next_snapshot(socket: &mut LogSocket) -> Result<Option<Vec<Message>>, ClientError> {
    while let Some(frame) = socket.next().await {
        match frame {
            Ok(tungstenite::Message::Text(text)) => {
                return Ok(Some(serde_json::from_str(&text)?));
            }
            Ok(tungstenite::Message::Close(_)) => return Ok(None),
            Ok(_) => continue,
            Err(e) => return Err(ClientError::Subscription(e.to_string())),
        }
    }
    Ok(None)
}

#[async_trait]
impl ConversationBackend for HttpBackend {
    async fn translate(&self, text: &str, to_lang: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .post(self.url("/translate"))
            .json(&TranslateRequest {
                text: text.to_string(),
                to_lang: to_lang.to_string(),
            })
            .send()
            .await?;

        // a 500 still carries the pass-through text
        let status = response.status();
        let body: TranslateResponse = response.json().await?;
        if !status.is_success() {
            warn!("Translation degraded by server ({})", status);
        }
        Ok(body.translated_text)
    }

    async fn summarize(&self, transcript: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .post(self.url("/summary"))
            .json(&SummaryRequest {
                text: transcript.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        let body: SummaryResponse = response.json().await?;
        if !status.is_success() {
            warn!("Summary failed on server ({})", status);
        }
        Ok(body.summary)
    }

    async fn append(&self, message: NewMessage) -> Result<Message, ClientError> {
        let response = self
            .http
            .post(self.url("/messages"))
            .json(&message)
            .send()
            .await?;

        let response = error_for_status(response).await?;
        Ok(response.json().await?)
    }

    async fn upload_audio(&self, clip: &AudioClip) -> Result<String, ClientError> {
        let url = format!(
            "{}?capturedAt={}",
            self.url("/audio"),
            clip.captured_at.timestamp_millis()
        );
        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "audio/wav")
            .body(clip.to_wav()?)
            .send()
            .await?;

        let response = error_for_status(response).await?;
        let body: AudioUploadResponse = response.json().await?;
        Ok(body.audio_url)
    }

    async fn subscribe(&self) -> Result<Subscription, ClientError> {
        let (mut socket, _) = connect_async(self.ws_url())
            .await
            .map_err(|e| ClientError::Subscription(e.to_string()))?;

        // the server opens the feed with the current snapshot
        let initial = next_snapshot(&mut socket)
            .await?
            .ok_or(ClientError::SubscriptionClosed)?;
        info!("Subscribed to message log ({} messages)", initial.len());

        let (sender, receiver) = watch::channel(Arc::new(initial));
        let worker = tokio::spawn(async move {
            loop {
                match next_snapshot(&mut socket).await {
                    Ok(Some(snapshot)) => {
                        if sender.send(Arc::new(snapshot)).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        info!("Message log feed closed by server");
                        break;
                    }
                    Err(e) => {
                        error!("Message log feed failed: {}", e);
                        break;
                    }
                }
            }
        });

        Ok(Subscription::with_worker(receiver, worker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn websocket_url_follows_http_scheme() {
        assert_eq!(
            HttpBackend::new("http://localhost:3000/").ws_url(),
            "ws://localhost:3000/messages/ws"
        );
        assert_eq!(
            HttpBackend::new("https://clinic.example").ws_url(),
            "wss://clinic.example/messages/ws"
        );
    }
}
