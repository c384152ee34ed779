use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clinic_chat::{
    app_state::AppState,
    client::{http_backend::HttpBackend, session::ConversationClient},
    config::LanguageMap,
    models::message::{Role, AUDIO_MESSAGE_TEXT},
    repositories::{audio_repository::InMemoryAudioStore, message_repository::InMemoryMessageStore},
    routes::app_routes::create_router,
    services::{
        llm_service::{ChatModel, LlmError},
        message_log::{MessageLog, Snapshot},
        summary_service::SUMMARY_PROMPT,
    },
};
use tokio::time::timeout;

/// Answers translations with a language-tagged echo and summaries with a fixed line
struct EchoModel;

#[async_trait]
impl ChatModel for EchoModel {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        if system == SUMMARY_PROMPT {
            return Ok(format!("{} lines discussed", user.lines().count()));
        }
        let lang = system
            .trim_start_matches("Translate the following text to ")
            .split('.')
            .next()
            .unwrap_or_default();
        Ok(format!("[{}] {}", lang, user))
    }
}

async fn spawn_server() -> (String, AppState) {
    let messages = MessageLog::open(Arc::new(InMemoryMessageStore::new()))
        .await
        .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    let state = AppState::new(
        messages,
        Arc::new(EchoModel),
        Arc::new(InMemoryAudioStore::new()),
        base_url.clone(),
    );
    let app = create_router(state.clone());

    tokio::spawn(async move {
        axum::Server::from_tcp(listener)
            .unwrap()
            .serve(app.into_make_service())
            .await
            .unwrap();
    });

    (base_url, state)
}

async fn next_with(
    session: &mut clinic_chat::client::session::ActiveSession,
    count: usize,
) -> Snapshot {
    loop {
        let snapshot = timeout(Duration::from_secs(5), session.wait_for_update())
            .await
            .expect("snapshot within timeout")
            .unwrap();
        if snapshot.len() >= count {
            return snapshot;
        }
    }
}

#[tokio::test]
async fn two_participants_share_the_translated_log() {
    let (base_url, _) = spawn_server().await;

    let mut doctor = ConversationClient::new(
        Arc::new(HttpBackend::new(base_url.clone())),
        LanguageMap::default(),
    )
    .select_role(Role::Doctor)
    .await
    .unwrap();
    let mut patient = ConversationClient::new(
        Arc::new(HttpBackend::new(base_url.clone())),
        LanguageMap::default(),
    )
    .select_role(Role::Patient)
    .await
    .unwrap();

    assert!(doctor.messages().is_empty());

    doctor.send("I have a headache").await.unwrap();
    let seen_by_patient = next_with(&mut patient, 1).await;
    assert_eq!(seen_by_patient[0].text, "I have a headache");
    assert_eq!(seen_by_patient[0].translated_text, "[es] I have a headache");
    assert_eq!(seen_by_patient[0].role, Role::Doctor);

    patient.send("Me duele la cabeza").await.unwrap();
    let seen_by_doctor = next_with(&mut doctor, 2).await;
    assert_eq!(seen_by_doctor[1].translated_text, "[en] Me duele la cabeza");

    assert_eq!(doctor.summarize().await, "2 lines discussed");
    assert_eq!(doctor.filter("CABEZA").len(), 1);

    doctor.close();
    patient.close();
}

#[tokio::test]
async fn audio_message_is_uploaded_and_retrievable() {
    let (base_url, state) = spawn_server().await;

    let mut patient = ConversationClient::new(
        Arc::new(HttpBackend::new(base_url.clone())),
        LanguageMap::default(),
    )
    .select_role(Role::Patient)
    .await
    .unwrap();

    patient.start_recording(16_000).unwrap();
    patient.record_samples(&[0.0; 1600]).unwrap();
    let sent = patient.stop_and_send_audio().await.unwrap();

    assert_eq!(sent.text, AUDIO_MESSAGE_TEXT);
    let audio_url = sent.kind.audio_url().unwrap().to_string();
    assert!(audio_url.starts_with(&format!("{}/audio/", base_url)));

    let bytes = reqwest::get(&audio_url).await.unwrap().bytes().await.unwrap();
    assert_eq!(&bytes[..4], b"RIFF");

    let snapshot = next_with(&mut patient, 1).await;
    assert_eq!(snapshot[0].kind.audio_url(), Some(audio_url.as_str()));
    assert_eq!(state.messages.snapshot().len(), 1);
}

#[tokio::test]
async fn late_subscriber_receives_existing_log() {
    let (base_url, _) = spawn_server().await;

    let doctor = ConversationClient::new(
        Arc::new(HttpBackend::new(base_url.clone())),
        LanguageMap::default(),
    )
    .select_role(Role::Doctor)
    .await
    .unwrap();
    doctor.send("Please describe the pain").await.unwrap();

    let patient = ConversationClient::new(
        Arc::new(HttpBackend::new(base_url)),
        LanguageMap::default(),
    )
    .select_role(Role::Patient)
    .await
    .unwrap();

    assert_eq!(patient.messages().len(), 1);
    assert_eq!(patient.messages()[0].text, "Please describe the pain");
}
