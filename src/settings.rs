//! Process-wide mutable bot settings.
//!
//! A string-keyed map shared by all handlers for the lifetime of the
//! process (`send_channel`, `show_typing`, ...). Owned by the engine and
//! mutated only on the dispatch task, so no locking is needed.

use serde_json::Value;
use std::collections::HashMap;

/// Mutable configuration mapping exposed to handlers.
#[derive(Debug, Default)]
pub struct Settings {
    values: HashMap<String, Value>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value access.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// String value access.
    pub fn str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Boolean value access.
    pub fn bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    /// Set a value, replacing any previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_accessors() {
        let mut settings = Settings::new();
        settings.set("send_channel", "general");
        settings.set("show_typing", true);

        assert_eq!(settings.str("send_channel"), Some("general"));
        assert_eq!(settings.bool("show_typing"), Some(true));
        assert_eq!(settings.str("show_typing"), None);
        assert_eq!(settings.get("missing"), None);
    }

    #[test]
    fn set_replaces() {
        let mut settings = Settings::new();
        settings.set("send_channel", "general");
        settings.set("send_channel", "bot_test");
        assert_eq!(settings.str("send_channel"), Some("bot_test"));
    }
}
