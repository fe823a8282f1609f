use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use parley::kernel::debug::InMemoryDebugRegistry;
use parley::kernel::event::{Event, InputContent};
use parley::kernel::presence::Mood;
use parley::kernel::reactor::{Collaborators, DEBUG_OWNER};
use parley::kernel::telemetry::{FanoutSink, Notification, NotificationBus, TelemetryRecorder};
use parley::outputs::{ChannelTextSink, LoggingDisplay};
use parley::services::types::Classification;
use parley::services::{HttpDialogClient, HttpQaClient};
use parley::{ParleyConfig, Reactor};

const SOURCE: &str = "console";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Setup Logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    // 2. Config
    let config = match config_path() {
        Some(path) => ParleyConfig::load(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ParleyConfig::default(),
    };
    tracing::info!(dialog = %config.conversation.dialog_name, "Parley booting...");

    // 3. Collaborators
    let timeout = config.services.request_timeout();
    let bus = NotificationBus::default();
    let recorder = Arc::new(TelemetryRecorder::new());
    let debug_registry = Arc::new(InMemoryDebugRegistry::new());
    let (text_sink, mut text_rx) = ChannelTextSink::new();

    let collaborators = Collaborators {
        dialog: Arc::new(
            HttpDialogClient::new(&config.services.dialog_url, timeout)
                .context("building dialog client")?,
        ),
        qa: Arc::new(
            HttpQaClient::new(&config.services.qa_url, timeout).context("building qa client")?,
        ),
        notifications: Arc::new(
            FanoutSink::new()
                .with(Arc::new(bus.clone()))
                .with(recorder.clone()),
        ),
        debug: debug_registry.clone(),
        text: Arc::new(text_sink),
        display: Arc::new(LoggingDisplay),
    };

    // 4. Reactor + Channels
    let (tx, rx) = mpsc::channel(100);
    let mut reactor = Reactor::new(rx, tx.clone(), &config, collaborators)
        .context("building reactor")?;

    let shutdown = CancellationToken::new();
    let reactor_shutdown = shutdown.clone();
    let reactor_task = tokio::spawn(async move {
        reactor.run(reactor_shutdown).await;
    });

    // Spoken output
    tokio::spawn(async move {
        while let Some(output) = text_rx.recv().await {
            println!("avatar> {}", output.content);
        }
    });

    // Notifications of interest to a console user
    let mut notifications = bus.subscribe();
    tokio::spawn(async move {
        while let Ok(notification) = notifications.recv().await {
            match notification {
                Notification::StateChanged { from, to } => println!("[state] {from} -> {to}"),
                Notification::MoodChanged { mood } => println!("[mood] {mood}"),
                Notification::DebugMessage(msg) => println!("[debug] {msg}"),
                _ => {}
            }
        }
    });

    println!("Commands: wake [category confidence text] | say <category> <confidence> <text> | miss | cancel | sleep | speaking on|off | mood <name> | status | quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line {
            "quit" | "exit" => break,
            "status" => {
                match debug_registry.latest(DEBUG_OWNER) {
                    Some(snapshot) => println!("{}", serde_json::to_string_pretty(&snapshot)?),
                    None => println!("(no snapshot yet)"),
                }
                let stats = recorder.snapshot();
                println!(
                    "transitions={} errors={} answers={}",
                    stats.turn_stats.transitions,
                    stats.turn_stats.errors,
                    stats.answer_stats.delivered
                );
                continue;
            }
            _ => {}
        }

        match parse_command(line) {
            Ok(content) => {
                if tx.send(Event::input(SOURCE, content)).await.is_err() {
                    tracing::warn!("Reactor is gone");
                    break;
                }
            }
            Err(msg) => println!("? {msg}"),
        }
    }

    shutdown.cancel();
    reactor_task.await.context("reactor task panicked")?;
    tracing::info!("Parley stopped");
    Ok(())
}

fn config_path() -> Option<PathBuf> {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("PARLEY_CONFIG").ok())
        .map(PathBuf::from)
}

fn parse_command(line: &str) -> Result<InputContent, String> {
    let mut parts = line.splitn(2, ' ');
    let verb = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default().trim();

    match verb {
        "wake" if rest.is_empty() => Ok(InputContent::Wake(None)),
        "wake" => parse_classification(rest).map(|c| InputContent::Wake(Some(c))),
        "say" => parse_classification(rest).map(InputContent::Classified),
        "miss" => Ok(InputContent::ClassificationFailed),
        "cancel" => Ok(InputContent::Cancel),
        "sleep" => Ok(InputContent::Sleep),
        "speaking" => match rest {
            "on" => Ok(InputContent::Speaking(true)),
            "off" => Ok(InputContent::Speaking(false)),
            other => Err(format!("speaking expects on|off, got '{other}'")),
        },
        "mood" => rest.parse::<Mood>().map(InputContent::SetMood),
        other => Err(format!("unknown command '{other}'")),
    }
}

fn parse_classification(rest: &str) -> Result<Classification, String> {
    let mut parts = rest.splitn(3, ' ');
    let category = parts.next().filter(|s| !s.is_empty()).ok_or("missing category")?;
    let confidence: f32 = parts
        .next()
        .ok_or("missing confidence")?
        .parse()
        .map_err(|e| format!("bad confidence: {e}"))?;
    let text = parts.next().unwrap_or_default();
    Ok(Classification::new(category, confidence, text))
}
