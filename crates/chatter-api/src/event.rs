//! Inbound event representation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A structured inbound notification from the chat service.
///
/// Events are open-ended JSON objects: a message, a typing indicator, a
/// presence change, and so on. The action field (`type` on the wire) names
/// the event kind; everything else is event-specific. Enrichment adds
/// `channel_name` and `user_name` alongside the raw ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event {
    fields: Map<String, Value>,
}

impl Event {
    /// An empty event with no action field.
    pub fn new() -> Self {
        Self::default()
    }

    /// An event of the given action kind.
    pub fn of(action: impl Into<String>) -> Self {
        let mut event = Self::new();
        event.set("type", action.into());
        event
    }

    /// An ordinary chat message event.
    pub fn message(
        channel: impl Into<String>,
        user: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::of("message")
            .with("channel", channel.into())
            .with("user", user.into())
            .with("text", text.into())
    }

    /// Builder-style field assignment.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Raw field access.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// String field access; `None` when absent or not a string.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// The action field (`type` on the wire).
    pub fn action(&self) -> Option<&str> {
        self.str_field("type")
    }

    /// The message text, when present.
    pub fn text(&self) -> Option<&str> {
        self.str_field("text")
    }

    /// The raw channel id.
    pub fn channel(&self) -> Option<&str> {
        self.str_field("channel")
    }

    /// The raw user id, when it is a plain id. Some events (e.g. team
    /// joins) carry a user object here instead.
    pub fn user(&self) -> Option<&str> {
        self.str_field("user")
    }

    /// The enriched channel display name.
    pub fn channel_name(&self) -> Option<&str> {
        self.str_field("channel_name")
    }

    /// The enriched user nick.
    pub fn user_name(&self) -> Option<&str> {
        self.str_field("user_name")
    }

    /// The event subtype, when present.
    pub fn subtype(&self) -> Option<&str> {
        self.str_field("subtype")
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.fields.clone()))
    }
}

impl From<Map<String, Value>> for Event {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}
