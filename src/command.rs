//! Commands: matcher + handler + lifecycle policy.
//!
//! A command is immutable once registered, except for its remaining
//! activation budget. Expiry is lazy: the dispatcher checks the deadline
//! when it reaches the command, never via a background timer.

use crate::engine::BotContext;
use crate::error::HandlerResult;
use crate::matcher::{ActionPattern, FieldPattern, Matcher};
use async_trait::async_trait;
use chatter_api::Event;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use thiserror::Error;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique command identity. Unregistration is by id, so two
/// commands built from the same parts are still distinct registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId(u64);

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Trait implemented by all command handlers.
///
/// `captures` holds the regex capture groups (positions 1..) when the
/// command carries a text pattern, and is empty otherwise.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handle a matched event.
    async fn handle(
        &self,
        ctx: &mut BotContext<'_>,
        event: &Event,
        captures: &[String],
    ) -> HandlerResult;
}

/// Errors from building a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid pattern for command {name}: {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// A registered rule + handler + lifecycle tuple.
pub struct Command {
    id: CommandId,
    name: String,
    matcher: Matcher,
    handler: Arc<dyn Handler>,
    priority: i32,
    deadline: Option<DateTime<Utc>>,
    activations: Option<AtomicU32>,
    occludes: bool,
    hidden: bool,
    owner: Option<String>,
}

impl Command {
    /// Start building a command.
    pub fn builder(name: impl Into<String>, handler: Arc<dyn Handler>) -> CommandBuilder {
        CommandBuilder {
            name: name.into(),
            handler,
            actions: None,
            fields: None,
            pattern: None,
            priority: 0,
            deadline: None,
            activations: None,
            occludes: false,
            hidden: false,
        }
    }

    pub fn id(&self) -> CommandId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Whether a successful match suppresses lower-priority commands.
    pub fn occludes(&self) -> bool {
        self.occludes
    }

    /// Hidden commands are excluded from introspection listings only;
    /// matching is unaffected.
    pub fn hidden(&self) -> bool {
        self.hidden
    }

    /// The module that registered this command, if any.
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub(crate) fn set_owner(&mut self, module: &str) {
        self.owner = Some(module.to_string());
    }

    pub(crate) fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// Whether the deadline has passed as of `now`.
    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| deadline < now)
    }

    /// Remaining activation budget; `None` means unlimited.
    pub fn remaining_activations(&self) -> Option<u32> {
        self.activations
            .as_ref()
            .map(|left| left.load(Ordering::Relaxed))
    }

    /// Consume one activation after a successful invocation.
    ///
    /// Returns true when the budget is now exhausted and the command must
    /// be unregistered. The decrement is checked: a budget already at zero
    /// stays at zero and keeps reporting exhaustion.
    pub(crate) fn spend_activation(&self) -> bool {
        match &self.activations {
            Some(left) => left
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
                .map(|prev| prev == 1)
                .unwrap_or(true),
            None => false,
        }
    }

    /// Test this command's matcher against an event.
    pub fn matches(&self, event: &Event) -> Option<Vec<String>> {
        self.matcher.matches(event)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("deadline", &self.deadline)
            .field("activations", &self.remaining_activations())
            .field("occludes", &self.occludes)
            .field("hidden", &self.hidden)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Command`].
pub struct CommandBuilder {
    name: String,
    handler: Arc<dyn Handler>,
    actions: Option<Vec<ActionPattern>>,
    fields: Option<BTreeMap<String, FieldPattern>>,
    pattern: Option<String>,
    priority: i32,
    deadline: Option<DateTime<Utc>>,
    activations: Option<u32>,
    occludes: bool,
    hidden: bool,
}

impl CommandBuilder {
    /// Add a named action to the action filter.
    pub fn action(mut self, name: impl Into<String>) -> Self {
        self.actions
            .get_or_insert_with(Vec::new)
            .push(ActionPattern::Named(name.into()));
        self
    }

    /// Accept events with no action field.
    pub fn no_action(mut self) -> Self {
        self.actions
            .get_or_insert_with(Vec::new)
            .push(ActionPattern::None);
        self
    }

    /// Accept any event regardless of action.
    pub fn any_action(mut self) -> Self {
        self.actions
            .get_or_insert_with(Vec::new)
            .push(ActionPattern::Any);
        self
    }

    /// Require a field to equal a value.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), FieldPattern::Equals(value.into()));
        self
    }

    /// Require a field to be present, any value.
    pub fn field_present(mut self, key: impl Into<String>) -> Self {
        self.fields
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), FieldPattern::Present);
        self
    }

    /// Require the event text to match a regex. Unanchored search; use
    /// explicit `^...$` for full-line matches.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Dispatch priority; higher runs first. Defaults to 0.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Absolute expiry deadline. Checked lazily at dispatch time.
    pub fn deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Finite invocation budget; the command is removed when it hits zero.
    pub fn activations(mut self, count: u32) -> Self {
        self.activations = Some(count);
        self
    }

    /// Suppress lower-priority commands after a successful match.
    pub fn occludes(mut self) -> Self {
        self.occludes = true;
        self
    }

    /// Exclude from introspection listings.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Compile the matcher and produce the command.
    pub fn build(self) -> Result<Command, CommandError> {
        let pattern = match self.pattern {
            Some(raw) => Some(Regex::new(&raw).map_err(|source| CommandError::Pattern {
                name: self.name.clone(),
                source,
            })?),
            None => None,
        };

        Ok(Command {
            id: CommandId(NEXT_ID.fetch_add(1, Ordering::Relaxed)),
            name: self.name,
            matcher: Matcher {
                actions: self.actions,
                fields: self.fields,
                pattern,
            },
            handler: self.handler,
            priority: self.priority,
            deadline: self.deadline,
            activations: self.activations.map(AtomicU32::new),
            occludes: self.occludes,
            hidden: self.hidden,
            owner: None,
        })
    }
}
