use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use clinic_chat::{
    client::{
        http_backend::HttpBackend,
        session::{ActiveSession, ConversationClient},
        ClientError,
    },
    config::ClientConfig,
    models::message::{Message, Role},
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

const CHUNK_SAMPLES: usize = 4096;

#[derive(Parser, Debug)]
#[command(name = "chat_client", about = "Doctor/patient conversation client")]
struct Args {
    /// Chat server base URL (overrides CHAT_SERVER_URL)
    #[arg(long)]
    server: Option<String>,

    /// Participant role: doctor or patient
    #[arg(long, value_parser = parse_role)]
    role: Option<Role>,
}

fn parse_role(value: &str) -> Result<Role, String> {
    value.parse()
}

enum Command {
    Send(String),
    Summary,
    Search(String),
    Audio(String),
    Quit,
}

fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    match trimmed.split_once(' ') {
        Some(("/search", query)) => Command::Search(query.trim().to_string()),
        Some(("/audio", path)) => Command::Audio(path.trim().to_string()),
        _ => match trimmed {
            "/summary" => Command::Summary,
            "/quit" | "/exit" => Command::Quit,
            "/search" => Command::Search(String::new()),
            _ => Command::Send(line.to_string()),
        },
    }
}

fn render(messages: &[Message], own_role: Role) {
    println!("----------------------------------------");
    for message in messages {
        let speaker = if message.role == own_role {
            "you".to_string()
        } else {
            message.role.to_string()
        };
        println!(
            "[{}] {}: {}",
            message.timestamp.format("%H:%M:%S"),
            speaker,
            message.text
        );
        println!("           {}", message.translated_text);
        if let Some(url) = message.kind.audio_url() {
            println!("           audio: {}", url);
        }
    }
    println!("----------------------------------------");
}

async fn prompt_role(lines: &mut Lines<BufReader<Stdin>>) -> Result<Option<Role>, ClientError> {
    loop {
        println!("Select your role (doctor/patient):");
        match lines.next_line().await? {
            Some(line) => match line.parse::<Role>() {
                Ok(role) => return Ok(Some(role)),
                Err(e) => println!("{}", e),
            },
            None => return Ok(None),
        }
    }
}

// Feeds a WAV file through the capture state machine as if it were recorded live
async fn send_wav(session: &mut ActiveSession, path: &Path) -> Result<Message, ClientError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<f32>, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|value| value as f32 / scale))
                .collect::<Result<Vec<f32>, _>>()?
        }
    };
    let mono: Vec<f32> = samples.into_iter().step_by(channels).collect();

    session.start_recording(spec.sample_rate)?;
    for chunk in mono.chunks(CHUNK_SAMPLES) {
        session.record_samples(chunk)?;
    }
    session.stop_and_send_audio().await
}

async fn run(args: Args) -> Result<(), ClientError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(server) = args.server {
        config.server_url = server.trim_end_matches('/').to_string();
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let role = match args.role {
        Some(role) => role,
        None => match prompt_role(&mut lines).await? {
            Some(role) => role,
            None => return Ok(()),
        },
    };

    let backend = Arc::new(HttpBackend::new(config.server_url.clone()));
    let mut session = ConversationClient::new(backend, config.languages)
        .select_role(role)
        .await?;

    println!(
        "Connected to {} as {} (messages translate to {}).",
        config.server_url,
        role,
        session.target_language()
    );
    println!("Commands: /summary, /search <text>, /audio <file.wav>, /quit");
    render(&session.messages(), role);

    let mut updates = session.updates();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    println!("Connection to the message log was lost.");
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                render(&snapshot, role);
            }
            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => break,
                };
                match parse_command(&line) {
                    Command::Quit => break,
                    Command::Summary => {
                        println!("=== Summary ===\n{}\n===============", session.summarize().await);
                    }
                    Command::Search(query) => render(&session.filter(&query), role),
                    Command::Audio(path) => match send_wav(&mut session, Path::new(&path)).await {
                        Ok(_) => println!("Audio message sent."),
                        Err(e) => eprintln!("Failed to send audio: {}", e),
                    },
                    Command::Send(text) => {
                        if let Err(e) = session.send(&text).await {
                            eprintln!("Failed to send message: {}", e);
                        }
                    }
                }
            }
        }
    }

    session.close();
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run(Args::parse()).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
