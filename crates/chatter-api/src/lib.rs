//! Chat-service collaborator interface for chatterd.
//!
//! The runtime core never speaks a wire protocol. Everything it needs from
//! the remote chat service is reduced to the [`ChatClient`] trait: produce a
//! sequence of inbound [`Event`]s, accept outbound sends, and answer
//! best-effort id-to-name lookups.

mod event;

pub use event::Event;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors surfaced by a chat client implementation.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("client is not connected")]
    NotConnected,

    #[error("transport error: {0}")]
    Transport(String),
}

/// An outbound message to the chat service.
///
/// Mirrors the minimal `{type, channel, text}` payload the service accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Message kind, `"message"` for ordinary chat text.
    #[serde(rename = "type")]
    pub kind: String,
    /// Destination channel id.
    pub channel: String,
    /// Message body.
    pub text: String,
}

impl OutboundMessage {
    /// Build an ordinary chat message.
    pub fn message(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: "message".to_string(),
            channel: channel.into(),
            text: text.into(),
        }
    }
}

/// Connection to a remote chat service.
///
/// Implementations own the wire protocol and connection management. The
/// runtime only pushes events through the listening channel and calls back
/// for sends and directory lookups. Lookup misses are not errors: callers
/// fall back to the raw id.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Establish the connection.
    async fn connect(&self) -> Result<(), ClientError>;

    /// Start producing inbound events on `events`.
    ///
    /// Must not block: implementations spawn their own reader task. The
    /// receiving side guarantees the send itself never blocks (unbounded
    /// queue), so a listener can forward events as fast as they arrive.
    fn start_listening(&self, events: mpsc::UnboundedSender<Event>);

    /// Send a message to the service.
    async fn send(&self, message: OutboundMessage) -> Result<(), ClientError>;

    /// Resolve a channel id to its display name.
    async fn channel_name(&self, id: &str) -> Option<String>;

    /// Resolve a channel display name back to its id.
    async fn channel_id(&self, name: &str) -> Option<String>;

    /// Resolve a user id to a nick.
    async fn nick(&self, id: &str) -> Option<String>;
}
