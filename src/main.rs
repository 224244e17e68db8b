//! chatterd - chat-bot runtime daemon.
//!
//! Bootstraps the engine, installs the built-in module catalog, wires the
//! chat client into the event queue, and feeds stdin lines in as console
//! input events.

use chatter_api::{ChatClient, Event};
use chatterd::{Config, Engine, StdioClient};
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            info!(path = %config_path, error = %e, "No usable config file, using defaults");
            Config::default()
        }
    };

    info!(
        bot = %config.bot.name,
        send_channel = %config.bot.send_channel,
        "Starting chatterd"
    );

    let client = Arc::new(StdioClient::from_directory(&config.directory));
    client.connect().await?;

    let (handle, rx) = Engine::channel();
    let mut engine = Engine::new(client.clone(), &config);

    // Install the built-in provider catalog, then load the configured
    // subset. A failed load is logged and skipped, never fatal.
    for provider in chatterd::modules::builtin() {
        engine.install(provider);
    }
    for name in &config.modules.autoload {
        if let Err(e) = engine.load_module(name) {
            error!(module = %name, error = %e, "Failed to load module");
        }
    }

    // Forward remote events into the queue. The listener only enqueues;
    // matching and formatting happen on the engine task.
    {
        let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel::<Event>();
        client.start_listening(event_tx);
        let handle = handle.clone();
        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                handle.push(event);
            }
        });
    }

    tokio::spawn(engine.run(rx));

    // Console loop: every stdin line becomes a console_input event.
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        handle.push(Event::of("console_input").with("text", line));
    }

    info!("Console closed, shutting down");
    Ok(())
}
