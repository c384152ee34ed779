use std::sync::Arc;

use clinic_chat::{
    app_state::AppState,
    config::ServerConfig,
    database::init::init_db,
    repositories::{
        audio_repository::{AudioStore, FilesystemAudioStore, InMemoryAudioStore},
        message_repository::{InMemoryMessageStore, MessageStore, PgMessageStore},
    },
    routes::app_routes::create_router,
    services::{llm_service::OpenAiClient, message_log::MessageLog},
};
use tokio::signal;
use tracing::{error, info, warn};

// The main entry point for the application using the tokio runtime.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    if config.openai.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; translate and summary requests will degrade");
    }

    let store: Arc<dyn MessageStore> = match &config.database_url {
        Some(url) => match init_db(url, &config.db_pool).await {
            Ok(pool) => Arc::new(PgMessageStore::new(pool)),
            Err(e) => {
                error!("Error initializing the database: {}", e);
                return;
            }
        },
        None => {
            warn!("DATABASE_URL is not set; using an in-memory message log");
            Arc::new(InMemoryMessageStore::new())
        }
    };

    let audio: Arc<dyn AudioStore> = match &config.audio_dir {
        Some(dir) => match FilesystemAudioStore::new(dir) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                error!("Error opening audio storage at {}: {}", dir.display(), e);
                return;
            }
        },
        None => {
            warn!("AUDIO_STORAGE_DIR is not set; audio is kept in memory");
            Arc::new(InMemoryAudioStore::new())
        }
    };

    let messages = match MessageLog::open(store).await {
        Ok(messages) => messages,
        Err(e) => {
            error!("Error loading the message log: {}", e);
            return;
        }
    };

    let model = Arc::new(OpenAiClient::new(config.openai.clone()));
    let state = AppState::new(messages, model, audio, config.public_base_url.clone())
        .with_max_audio_bytes(config.max_audio_bytes);
    let app = create_router(state);

    info!("Server running on http://{}", config.bind_addr);

    if let Err(e) = axum::Server::bind(&config.bind_addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
    }
}

// A function to handle graceful shutdown by listening for termination signals.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Signal received, starting graceful shutdown");
}
