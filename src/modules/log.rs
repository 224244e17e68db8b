//! Terminal activity logging.
//!
//! Hidden, non-occluding commands at priority 10 that narrate chat traffic
//! to the operator: messages, edits, typing indicators, presence changes,
//! and team joins. Nothing here replies into chat.

use crate::command::{Command, Handler};
use crate::engine::BotContext;
use crate::error::HandlerResult;
use crate::registry::CommandModule;
use async_trait::async_trait;
use chatter_api::Event;
use std::sync::Arc;
use tracing::info;

const PRIORITY: i32 = 10;

/// Provider for the `log` module.
pub struct LogModule;

impl CommandModule for LogModule {
    fn name(&self) -> &'static str {
        "log"
    }

    fn describe(&self) -> &'static str {
        "logs chat activity to the terminal"
    }

    fn commands(&self) -> anyhow::Result<Vec<Command>> {
        Ok(vec![
            Command::builder("log_message", Arc::new(LogMessage))
                .pattern(r".*")
                .priority(PRIORITY)
                .hidden()
                .build()?,
            Command::builder("log_received", Arc::new(LogReceived))
                .no_action()
                .field_present("reply_to")
                .priority(PRIORITY)
                .hidden()
                .build()?,
            Command::builder("log_typing", Arc::new(LogTyping))
                .action("user_typing")
                .priority(PRIORITY)
                .hidden()
                .build()?,
            Command::builder("log_presence_change", Arc::new(LogPresenceChange))
                .action("presence_change")
                .priority(PRIORITY)
                .hidden()
                .build()?,
            Command::builder("log_message_changed", Arc::new(LogMessageChanged))
                .field("subtype", "message_changed")
                .priority(PRIORITY)
                .hidden()
                .build()?,
            Command::builder("log_team_join", Arc::new(LogTeamJoin))
                .action("team_join")
                .priority(PRIORITY)
                .hidden()
                .build()?,
        ])
    }
}

/// A message someone has written.
struct LogMessage;

#[async_trait]
impl Handler for LogMessage {
    async fn handle(
        &self,
        _ctx: &mut BotContext<'_>,
        event: &Event,
        _captures: &[String],
    ) -> HandlerResult {
        info!(
            channel = event.channel_name().unwrap_or("?"),
            user = event.user_name().unwrap_or("?"),
            text = event.text().unwrap_or(""),
            "message"
        );
        Ok(())
    }
}

/// A delivery acknowledgement for something the bot itself said: no action
/// field, but a reply_to marker.
struct LogReceived;

#[async_trait]
impl Handler for LogReceived {
    async fn handle(
        &self,
        _ctx: &mut BotContext<'_>,
        event: &Event,
        _captures: &[String],
    ) -> HandlerResult {
        info!(
            channel = event.channel_name().unwrap_or("?"),
            text = event.text().unwrap_or(""),
            "sent"
        );
        Ok(())
    }
}

/// A typing indicator. Silent unless the `show_typing` setting is on.
struct LogTyping;

#[async_trait]
impl Handler for LogTyping {
    async fn handle(
        &self,
        ctx: &mut BotContext<'_>,
        event: &Event,
        _captures: &[String],
    ) -> HandlerResult {
        if ctx.settings().bool("show_typing").unwrap_or(false) {
            match event.channel_name() {
                Some(channel) => info!(
                    user = event.user_name().unwrap_or("?"),
                    channel = channel,
                    "typing"
                ),
                None => info!(user = event.user_name().unwrap_or("?"), "typing in direct message"),
            }
        }
        Ok(())
    }
}

/// A user went active or away.
struct LogPresenceChange;

#[async_trait]
impl Handler for LogPresenceChange {
    async fn handle(
        &self,
        _ctx: &mut BotContext<'_>,
        event: &Event,
        _captures: &[String],
    ) -> HandlerResult {
        info!(
            user = event.user_name().unwrap_or("?"),
            presence = event.str_field("presence").unwrap_or("?"),
            "presence change"
        );
        Ok(())
    }
}

/// A message was edited. The edited body arrives as a nested message
/// object; automatic link unfurling also surfaces this way.
struct LogMessageChanged;

#[async_trait]
impl Handler for LogMessageChanged {
    async fn handle(
        &self,
        ctx: &mut BotContext<'_>,
        event: &Event,
        _captures: &[String],
    ) -> HandlerResult {
        let message = event.get("message");
        let user_id = message
            .and_then(|m| m.get("user"))
            .and_then(|v| v.as_str())
            .unwrap_or("?");
        let user = ctx.nick(user_id).await.unwrap_or_else(|| user_id.to_string());
        let text = message
            .and_then(|m| m.get("text"))
            .and_then(|v| v.as_str())
            .unwrap_or("");

        info!(
            channel = event.channel_name().unwrap_or("?"),
            user = %user,
            text = text,
            "message edited"
        );
        Ok(())
    }
}

/// A new user joined the team. The user field is an object here, not an id.
struct LogTeamJoin;

#[async_trait]
impl Handler for LogTeamJoin {
    async fn handle(
        &self,
        _ctx: &mut BotContext<'_>,
        event: &Event,
        _captures: &[String],
    ) -> HandlerResult {
        let user = event.get("user");
        info!(
            name = user
                .and_then(|u| u.get("name"))
                .and_then(|v| v.as_str())
                .unwrap_or("?"),
            real_name = user
                .and_then(|u| u.get("real_name"))
                .and_then(|v| v.as_str())
                .unwrap_or(""),
            "joined the team"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_hidden_and_non_occluding() {
        let commands = LogModule.commands().unwrap();
        assert_eq!(commands.len(), 6);
        for cmd in &commands {
            assert!(cmd.hidden(), "{} should be hidden", cmd.name());
            assert!(!cmd.occludes(), "{} should not occlude", cmd.name());
            assert_eq!(cmd.priority(), PRIORITY);
        }
    }

    #[test]
    fn matchers_select_the_right_events() {
        let commands = LogModule.commands().unwrap();
        let by_name = |name: &str| {
            commands
                .iter()
                .find(|c| c.name() == name)
                .expect("command present")
        };

        let message = Event::message("C1", "U1", "hello");
        assert!(by_name("log_message").matches(&message).is_some());
        assert!(by_name("log_typing").matches(&message).is_none());

        let typing = Event::of("user_typing").with("user", "U1");
        assert!(by_name("log_typing").matches(&typing).is_some());

        let ack = Event::new().with("reply_to", 3).with("text", "hi");
        assert!(by_name("log_received").matches(&ack).is_some());
        // An acked event with an action is not a delivery receipt.
        let not_ack = Event::of("message").with("reply_to", 3);
        assert!(by_name("log_received").matches(&not_ack).is_none());

        let edited = Event::of("message").with("subtype", "message_changed");
        assert!(by_name("log_message_changed").matches(&edited).is_some());
    }
}
