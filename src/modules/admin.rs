//! Chat-driven module administration.
//!
//! `!load`/`!reload` and `!unload` exercise the registry's transactional
//! surface from inside a handler; the pass iterates a snapshot, so a
//! reload mid-dispatch is safe. Load failures come back to the requester
//! as a structured reply, never a crash. `!commands` and `!modules` list
//! the active commands and the provider catalog.

use crate::command::{Command, Handler};
use crate::engine::BotContext;
use crate::error::HandlerResult;
use crate::registry::CommandModule;
use async_trait::async_trait;
use chatter_api::Event;
use std::sync::Arc;

/// Provider for the `admin` module.
pub struct AdminModule;

impl CommandModule for AdminModule {
    fn name(&self) -> &'static str {
        "admin"
    }

    fn describe(&self) -> &'static str {
        "chat-driven module load/unload and introspection"
    }

    fn commands(&self) -> anyhow::Result<Vec<Command>> {
        Ok(vec![
            Command::builder("load_module", Arc::new(LoadModule))
                .action("message")
                .pattern(r"^!(?:load|reload)\s+(\S+)\s*$")
                .priority(20)
                .build()?,
            Command::builder("unload_module", Arc::new(UnloadModule))
                .action("message")
                .pattern(r"^!unload\s+(\S+)\s*$")
                .priority(20)
                .build()?,
            Command::builder("list_commands", Arc::new(ListCommands))
                .action("message")
                .pattern(r"^!commands\s*$")
                .priority(20)
                .build()?,
            Command::builder("list_modules", Arc::new(ListModules))
                .action("message")
                .pattern(r"^!modules\s*$")
                .priority(20)
                .build()?,
        ])
    }
}

struct LoadModule;

#[async_trait]
impl Handler for LoadModule {
    async fn handle(
        &self,
        ctx: &mut BotContext<'_>,
        _event: &Event,
        captures: &[String],
    ) -> HandlerResult {
        let Some(name) = captures.first() else {
            return Ok(());
        };
        let reply = match ctx.load_module(name) {
            Ok(()) => format!("module `{name}` loaded"),
            Err(e) => format!("load of `{name}` failed: {e}"),
        };
        ctx.reply(&reply).await
    }
}

struct UnloadModule;

#[async_trait]
impl Handler for UnloadModule {
    async fn handle(
        &self,
        ctx: &mut BotContext<'_>,
        _event: &Event,
        captures: &[String],
    ) -> HandlerResult {
        let Some(name) = captures.first() else {
            return Ok(());
        };
        let removed = ctx.unload_module(name);
        let reply = if removed.is_empty() {
            format!("module `{name}` was not loaded")
        } else {
            format!("module `{name}` unloaded ({} commands)", removed.len())
        };
        ctx.reply(&reply).await
    }
}

struct ListCommands;

#[async_trait]
impl Handler for ListCommands {
    async fn handle(
        &self,
        ctx: &mut BotContext<'_>,
        _event: &Event,
        _captures: &[String],
    ) -> HandlerResult {
        let mut lines: Vec<String> = ctx
            .active_commands()
            .iter()
            .filter(|cmd| !cmd.hidden())
            .map(|cmd| {
                format!(
                    "{} (priority {}, module {})",
                    cmd.name(),
                    cmd.priority(),
                    cmd.owner().unwrap_or("-")
                )
            })
            .collect();
        if lines.is_empty() {
            lines.push("no visible commands".to_string());
        }
        ctx.reply(&lines.join("\n")).await
    }
}

struct ListModules;

#[async_trait]
impl Handler for ListModules {
    async fn handle(
        &self,
        ctx: &mut BotContext<'_>,
        _event: &Event,
        _captures: &[String],
    ) -> HandlerResult {
        let loaded = ctx.loaded_modules();
        let lines: Vec<String> = ctx
            .installed_modules()
            .into_iter()
            .map(|(name, describe)| {
                let state = if loaded.iter().any(|m| *m == name) {
                    "loaded"
                } else {
                    "installed"
                };
                if describe.is_empty() {
                    format!("{name} ({state})")
                } else {
                    format!("{name} ({state}): {describe}")
                }
            })
            .collect();
        ctx.reply(&lines.join("\n")).await
    }
}
