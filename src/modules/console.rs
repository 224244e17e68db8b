//! Console input handling.
//!
//! The binary turns every stdin line into a `console_input` event; the
//! single command here interprets it. Lines starting with `/` are local
//! directives (`/channel`, `/show_typing`), anything else is sent to the
//! configured `send_channel`.

use crate::command::{Command, Handler};
use crate::engine::BotContext;
use crate::error::HandlerResult;
use crate::registry::CommandModule;
use async_trait::async_trait;
use chatter_api::Event;
use std::sync::Arc;
use tracing::{info, warn};

/// Provider for the `console` module.
pub struct ConsoleModule;

impl CommandModule for ConsoleModule {
    fn name(&self) -> &'static str {
        "console"
    }

    fn describe(&self) -> &'static str {
        "interprets operator console input"
    }

    fn commands(&self) -> anyhow::Result<Vec<Command>> {
        Ok(vec![
            Command::builder("console_input", Arc::new(ConsoleInput))
                .action("console_input")
                .priority(10)
                .hidden()
                .build()?,
        ])
    }
}

struct ConsoleInput;

impl ConsoleInput {
    fn channel_directive(ctx: &mut BotContext<'_>, args: &[&str]) {
        if let Some(channel) = args.first() {
            ctx.settings_mut().set("send_channel", *channel);
            info!(channel = %channel, "Send channel set");
        } else {
            let current = ctx.settings().str("send_channel").unwrap_or("?");
            info!(channel = %current, "Currently sending to");
        }
    }

    fn show_typing_directive(ctx: &mut BotContext<'_>, args: &[&str]) {
        let Some(setting) = args.first() else {
            return;
        };
        let show = *setting != "0";
        ctx.settings_mut().set("show_typing", show);
        info!(show_typing = show, "Typing display toggled");
    }
}

#[async_trait]
impl Handler for ConsoleInput {
    async fn handle(
        &self,
        ctx: &mut BotContext<'_>,
        event: &Event,
        _captures: &[String],
    ) -> HandlerResult {
        let line = event.text().unwrap_or("");

        if let Some(directive) = line.strip_prefix('/') {
            let mut parts = directive.split_whitespace();
            let name = parts.next().unwrap_or("");
            let args: Vec<&str> = parts.collect();
            match name {
                "channel" => Self::channel_directive(ctx, &args),
                "show_typing" => Self::show_typing_directive(ctx, &args),
                other => warn!(directive = %other, "Unknown console directive"),
            }
            return Ok(());
        }

        let channel = ctx
            .settings()
            .str("send_channel")
            .unwrap_or("general")
            .to_string();
        ctx.send(line, &channel).await
    }
}
