//! Integration test common infrastructure.
//!
//! Provides a recording mock chat client, recording/failing handlers, and
//! an engine constructor wired to both.

#![allow(dead_code)]

use async_trait::async_trait;
use chatter_api::{ChatClient, ClientError, Event, OutboundMessage};
use chatterd::{BotContext, Config, Engine, Handler, HandlerResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// A chat client that records outbound messages and resolves a fixed
/// directory: channel `C1` is `general`, user `U1` is `ada`.
pub struct MockClient {
    pub sent: Mutex<Vec<OutboundMessage>>,
    channel_names: HashMap<String, String>,
    channel_ids: HashMap<String, String>,
    nicks: HashMap<String, String>,
}

impl MockClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            channel_names: HashMap::from([("C1".to_string(), "general".to_string())]),
            channel_ids: HashMap::from([("general".to_string(), "C1".to_string())]),
            nicks: HashMap::from([("U1".to_string(), "ada".to_string())]),
        })
    }

    /// Texts of everything sent so far.
    pub fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.text.clone())
            .collect()
    }
}

#[async_trait]
impl ChatClient for MockClient {
    async fn connect(&self) -> Result<(), ClientError> {
        Ok(())
    }

    fn start_listening(&self, _events: mpsc::UnboundedSender<Event>) {}

    async fn send(&self, message: OutboundMessage) -> Result<(), ClientError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }

    async fn channel_name(&self, id: &str) -> Option<String> {
        self.channel_names.get(id).cloned()
    }

    async fn channel_id(&self, name: &str) -> Option<String> {
        self.channel_ids.get(name).cloned()
    }

    async fn nick(&self, id: &str) -> Option<String> {
        self.nicks.get(id).cloned()
    }
}

/// An engine over a fresh mock client and default config.
pub fn engine() -> (Engine, Arc<MockClient>) {
    let client = MockClient::new();
    let engine = Engine::new(client.clone(), &Config::default());
    (engine, client)
}

/// Shared invocation log.
pub type Log = Arc<Mutex<Vec<String>>>;

pub fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Handler that appends its tag (and any captures) to a shared log.
pub struct Recorder {
    pub tag: String,
    pub log: Log,
}

impl Recorder {
    pub fn new(tag: &str, log: &Log) -> Arc<Self> {
        Arc::new(Self {
            tag: tag.to_string(),
            log: log.clone(),
        })
    }
}

#[async_trait]
impl Handler for Recorder {
    async fn handle(
        &self,
        _ctx: &mut BotContext<'_>,
        _event: &Event,
        captures: &[String],
    ) -> HandlerResult {
        let mut entry = self.tag.clone();
        for capture in captures {
            entry.push(':');
            entry.push_str(capture);
        }
        self.log.lock().unwrap().push(entry);
        Ok(())
    }
}

/// Handler that records the event's text, after an optional delay.
pub struct TextRecorder {
    pub log: Log,
    pub delay: std::time::Duration,
}

impl TextRecorder {
    pub fn new(log: &Log) -> Arc<Self> {
        Arc::new(Self {
            log: log.clone(),
            delay: std::time::Duration::ZERO,
        })
    }

    pub fn slow(log: &Log, delay: std::time::Duration) -> Arc<Self> {
        Arc::new(Self {
            log: log.clone(),
            delay,
        })
    }
}

#[async_trait]
impl Handler for TextRecorder {
    async fn handle(
        &self,
        _ctx: &mut BotContext<'_>,
        event: &Event,
        _captures: &[String],
    ) -> HandlerResult {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.log
            .lock()
            .unwrap()
            .push(event.text().unwrap_or("").to_string());
        Ok(())
    }
}

/// Handler that always fails.
pub struct Exploder;

#[async_trait]
impl Handler for Exploder {
    async fn handle(
        &self,
        _ctx: &mut BotContext<'_>,
        _event: &Event,
        _captures: &[String],
    ) -> HandlerResult {
        Err(anyhow::anyhow!("deliberate handler fault").into())
    }
}
