//! chatterd - a queue-decoupled chat-bot runtime.
//!
//! Inbound events from a chat service are pushed into a never-blocking
//! FIFO queue; a single consumer task enriches each event and routes it
//! through a priority-ordered command list. Commands are contributed by
//! named modules that can be loaded, replaced, or unloaded at runtime
//! without restarting the process, with transactional rollback on failed
//! loads.

pub mod client;
pub mod command;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod modules;
pub mod registry;
pub mod settings;

pub use client::StdioClient;
pub use command::{Command, CommandBuilder, CommandError, CommandId, Handler};
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use engine::{BotContext, BotHandle, Engine, EngineInput};
pub use error::{HandlerError, HandlerResult, LoadError};
pub use matcher::{ActionPattern, FieldPattern, Matcher};
pub use registry::{CommandModule, LoadOutcome, Registry};
pub use settings::Settings;
