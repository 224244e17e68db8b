//! The engine: queue-decoupled event loop, enrichment, and dispatch.
//!
//! Two logical tasks exist. Ingestion (the chat connection, the stdin
//! reader) only pushes [`EngineInput`]s into an unbounded queue and never
//! blocks. The single consumer task owns all mutable state — registry,
//! dispatcher, settings — and runs matched handlers to completion before
//! advancing, so handlers get exclusive access to the command list during
//! their own invocation and may reload modules without extra locking.
//! Module load/unload requests from other tasks are marshaled onto the
//! consumer via control inputs, preserving the snapshot guarantee.

use crate::command::Command;
use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::error::{HandlerError, LoadError};
use crate::registry::{CommandModule, Registry};
use crate::settings::Settings;
use chatter_api::{ChatClient, Event, OutboundMessage};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

/// Inputs consumed by the engine task.
pub enum EngineInput {
    /// An inbound event to enrich and dispatch.
    Event(Event),
    /// Marshaled module load request.
    Load {
        name: String,
        reply: oneshot::Sender<Result<(), LoadError>>,
    },
    /// Marshaled module unload request.
    Unload {
        name: String,
        reply: oneshot::Sender<Vec<Arc<Command>>>,
    },
    /// Marshaled direct command registration (no owning module).
    Register { commands: Vec<Command> },
}

/// Clonable handle to a running engine.
///
/// `push` never blocks; the queue is unbounded so ingestion can always
/// enqueue the next inbound event immediately.
#[derive(Clone)]
pub struct BotHandle {
    tx: mpsc::UnboundedSender<EngineInput>,
}

impl BotHandle {
    /// Enqueue an event for dispatch.
    pub fn push(&self, event: Event) {
        let _ = self.tx.send(EngineInput::Event(event));
    }

    /// Load (or reload) a module on the engine task.
    pub async fn load_module(&self, name: &str) -> Result<(), LoadError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(EngineInput::Load {
                name: name.to_string(),
                reply,
            })
            .map_err(|_| LoadError::EngineStopped)?;
        rx.await.map_err(|_| LoadError::EngineStopped)?
    }

    /// Unload a module on the engine task, returning its removed commands.
    pub async fn unload_module(&self, name: &str) -> Vec<Arc<Command>> {
        let (reply, rx) = oneshot::channel();
        if self
            .tx
            .send(EngineInput::Unload {
                name: name.to_string(),
                reply,
            })
            .is_err()
        {
            return Vec::new();
        }
        rx.await.unwrap_or_default()
    }

    /// Register standalone commands on the engine task.
    pub fn register(&self, commands: Vec<Command>) {
        let _ = self.tx.send(EngineInput::Register { commands });
    }
}

/// The dispatch core: registry, active command list, settings, client.
pub struct Engine {
    registry: Registry,
    dispatcher: Dispatcher,
    settings: Settings,
    client: Arc<dyn ChatClient>,
}

impl Engine {
    /// Build an engine, seeding settings from the bot config.
    pub fn new(client: Arc<dyn ChatClient>, config: &Config) -> Self {
        let mut settings = Settings::new();
        settings.set("send_channel", config.bot.send_channel.clone());
        settings.set("show_typing", config.bot.show_typing);

        Self {
            registry: Registry::new(),
            dispatcher: Dispatcher::new(),
            settings,
            client,
        }
    }

    /// Create the input queue and its handle.
    pub fn channel() -> (BotHandle, mpsc::UnboundedReceiver<EngineInput>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (BotHandle { tx }, rx)
    }

    /// Install a command-module provider in the registry catalog.
    pub fn install(&mut self, provider: Arc<dyn CommandModule>) {
        self.registry.install(provider);
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// (Re)load a module and sync the active list.
    ///
    /// On provider failure nothing changes: the registry rolled back and
    /// the dispatcher was never touched.
    pub fn load_module(&mut self, name: &str) -> Result<(), LoadError> {
        let outcome = self.registry.load(name)?;
        for cmd in &outcome.removed {
            self.dispatcher.unregister(cmd.id());
        }
        let count = outcome.added.len();
        self.dispatcher.register(outcome.added);
        info!(module = %name, commands = count, "Module loaded");
        Ok(())
    }

    /// Unload a module, removing exactly its commands from the active list.
    pub fn unload_module(&mut self, name: &str) -> Vec<Arc<Command>> {
        let removed = self.registry.unload(name);
        for cmd in &removed {
            self.dispatcher.unregister(cmd.id());
        }
        if !removed.is_empty() {
            info!(module = %name, commands = removed.len(), "Module unloaded");
        }
        removed
    }

    /// Register standalone commands (owned by no module).
    pub fn register_commands(&mut self, commands: Vec<Command>) {
        self.dispatcher
            .register(commands.into_iter().map(Arc::new));
    }

    /// Enrich a raw event: resolve ids to display names next to the raw
    /// fields. A resolution miss keeps the raw id, silently.
    async fn enrich(&self, event: &mut Event) {
        if let Some(channel) = event.channel().map(str::to_string) {
            let name = self
                .client
                .channel_name(&channel)
                .await
                .unwrap_or(channel);
            event.set("channel_name", name);
        }
        if let Some(user) = event.user().map(str::to_string) {
            let nick = self.client.nick(&user).await.unwrap_or(user);
            event.set("user_name", nick);
        }
    }

    /// Enrich one event and run it through the active command list.
    pub async fn dispatch(&mut self, mut event: Event) {
        self.enrich(&mut event).await;
        let now = Utc::now();

        // Iterate a stable snapshot: handlers may mutate the registry
        // mid-pass. Commands removed mid-pass no longer fire.
        for cmd in self.dispatcher.snapshot() {
            if !self.dispatcher.contains(cmd.id()) {
                continue;
            }
            if cmd.expired(now) {
                self.remove(&cmd);
                debug!(command = %cmd.name(), id = %cmd.id(), "Expired command purged");
                continue;
            }
            let Some(captures) = cmd.matches(&event) else {
                continue;
            };

            let outcome = {
                let mut ctx = BotContext {
                    engine: self,
                    origin: Some(&event),
                };
                cmd.handler().handle(&mut ctx, &event, &captures).await
            };

            match outcome {
                Ok(()) => {
                    if cmd.spend_activation() {
                        self.remove(&cmd);
                        debug!(command = %cmd.name(), id = %cmd.id(), "Activations exhausted");
                    }
                }
                Err(e) => {
                    error!(command = %cmd.name(), error = %e, event = %event, "Handler failed");
                }
            }

            if cmd.occludes() {
                debug!(command = %cmd.name(), "Match occluded remaining commands");
                break;
            }
        }
    }

    fn remove(&mut self, cmd: &Arc<Command>) {
        self.dispatcher.unregister(cmd.id());
        if let Some(owner) = cmd.owner() {
            self.registry.discard(owner, cmd.id());
        }
    }

    /// Consume inputs forever. A fault in any single iteration is logged
    /// and the loop continues; the loop itself never terminates on a
    /// handler or dispatch fault, only when every handle is dropped.
    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<EngineInput>) {
        while let Some(input) = rx.recv().await {
            match input {
                EngineInput::Event(event) => {
                    debug!(event = %event, "Dispatching event");
                    self.dispatch(event).await;
                }
                EngineInput::Load { name, reply } => {
                    let _ = reply.send(self.load_module(&name));
                }
                EngineInput::Unload { name, reply } => {
                    let _ = reply.send(self.unload_module(&name));
                }
                EngineInput::Register { commands } => {
                    self.register_commands(commands);
                }
            }
        }
        info!("Engine queue closed, stopping");
    }
}

/// The bot context passed to each handler invocation.
///
/// Handlers run on the engine task, so registry mutation through the
/// context (e.g. a reload command) is trivially safe.
pub struct BotContext<'a> {
    engine: &'a mut Engine,
    origin: Option<&'a Event>,
}

impl BotContext<'_> {
    /// Send text to the channel the originating event came from.
    ///
    /// No-op when the event has no channel to reply to.
    pub async fn reply(&self, text: &str) -> Result<(), HandlerError> {
        let Some(channel) = self
            .origin
            .and_then(|e| e.channel_name().or(e.channel()))
            .map(str::to_string)
        else {
            return Ok(());
        };
        self.send(text, &channel).await
    }

    /// Send text to a channel, by display name or raw id. Empty text is
    /// silently dropped.
    pub async fn send(&self, text: &str, channel: &str) -> Result<(), HandlerError> {
        if text.is_empty() {
            return Ok(());
        }
        let id = self
            .engine
            .client
            .channel_id(channel)
            .await
            .unwrap_or_else(|| channel.to_string());
        self.engine
            .client
            .send(OutboundMessage::message(id, text))
            .await?;
        Ok(())
    }

    /// Resolve a user id to a nick. Best-effort.
    pub async fn nick(&self, id: &str) -> Option<String> {
        self.engine.client.nick(id).await
    }

    /// Resolve a channel id to a display name. Best-effort.
    pub async fn channel_name(&self, id: &str) -> Option<String> {
        self.engine.client.channel_name(id).await
    }

    /// The process-wide settings map.
    pub fn settings(&self) -> &Settings {
        &self.engine.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.engine.settings
    }

    /// (Re)load a module. Safe mid-dispatch: the pass iterates a snapshot.
    pub fn load_module(&mut self, name: &str) -> Result<(), LoadError> {
        self.engine.load_module(name)
    }

    /// Unload a module, returning its removed commands.
    pub fn unload_module(&mut self, name: &str) -> Vec<Arc<Command>> {
        self.engine.unload_module(name)
    }

    /// Register standalone commands.
    pub fn register_commands(&mut self, commands: Vec<Command>) {
        self.engine.register_commands(commands);
    }

    /// The current active command list, in dispatch order.
    pub fn active_commands(&self) -> Vec<Arc<Command>> {
        self.engine.dispatcher.snapshot()
    }

    /// Installed module providers as (name, description) pairs.
    pub fn installed_modules(&self) -> Vec<(String, String)> {
        self.engine
            .registry
            .installed()
            .into_iter()
            .map(|(name, describe)| (name.to_string(), describe.to_string()))
            .collect()
    }

    /// Names of currently loaded modules.
    pub fn loaded_modules(&self) -> Vec<String> {
        self.engine
            .registry
            .modules()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}
