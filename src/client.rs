//! Local stdio chat client.
//!
//! The wire protocol is an external collaborator; this client is the
//! in-tree stand-in so the binary runs end to end. Directory lookups come
//! from static config maps, outbound sends print to the terminal, and no
//! remote events are produced (the binary feeds console input events
//! directly into the queue).

use crate::config::DirectoryConfig;
use async_trait::async_trait;
use chatter_api::{ChatClient, ClientError, Event, OutboundMessage};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::info;

/// Terminal-backed [`ChatClient`].
pub struct StdioClient {
    channel_names: HashMap<String, String>,
    channel_ids: HashMap<String, String>,
    nicks: HashMap<String, String>,
}

impl StdioClient {
    /// Build a client from the configured id/name directories.
    pub fn from_directory(directory: &DirectoryConfig) -> Self {
        let mut channel_names = HashMap::new();
        let mut channel_ids = HashMap::new();
        for entry in &directory.channels {
            channel_names.insert(entry.id.clone(), entry.name.clone());
            channel_ids.insert(entry.name.clone(), entry.id.clone());
        }
        let nicks = directory
            .users
            .iter()
            .map(|entry| (entry.id.clone(), entry.name.clone()))
            .collect();

        Self {
            channel_names,
            channel_ids,
            nicks,
        }
    }
}

#[async_trait]
impl ChatClient for StdioClient {
    async fn connect(&self) -> Result<(), ClientError> {
        info!("Stdio client connected");
        Ok(())
    }

    fn start_listening(&self, _events: mpsc::UnboundedSender<Event>) {
        // No remote side; console input is pushed by the binary.
    }

    async fn send(&self, message: OutboundMessage) -> Result<(), ClientError> {
        let channel = self
            .channel_names
            .get(&message.channel)
            .map(String::as_str)
            .unwrap_or(&message.channel);
        println!("-> [{}] {}", channel, message.text);
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
