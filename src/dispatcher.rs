//! The active command list.
//!
//! Kept sorted by descending priority with registration order preserved
//! among equal priorities (stable sort). Expected scale is tens of
//! commands, so removal is a linear scan.

use crate::command::{Command, CommandId};
use std::sync::Arc;

/// Priority-ordered list of active commands.
#[derive(Default)]
pub struct Dispatcher {
    active: Vec<Arc<Command>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append commands and re-sort.
    ///
    /// `Vec::sort_by` is stable, so commands registered earlier keep their
    /// position among equal priorities across any number of later sorts.
    pub fn register(&mut self, commands: impl IntoIterator<Item = Arc<Command>>) {
        self.active.extend(commands);
        self.active
            .sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// Remove a command by identity. Idempotent; preserves the ordering of
    /// the remainder.
    pub fn unregister(&mut self, id: CommandId) -> bool {
        let before = self.active.len();
        self.active.retain(|cmd| cmd.id() != id);
        self.active.len() != before
    }

    /// Whether a command is currently registered.
    pub fn contains(&self, id: CommandId) -> bool {
        self.active.iter().any(|cmd| cmd.id() == id)
    }

    /// A stable snapshot of the active list for one dispatch pass.
    ///
    /// Handlers may register or unregister commands mid-pass (e.g. a reload
    /// command); iterating the snapshot means that never skips or
    /// double-invokes unrelated commands for the same event.
    pub fn snapshot(&self) -> Vec<Arc<Command>> {
        self.active.clone()
    }

    /// The current active list, in dispatch order.
    pub fn commands(&self) -> &[Arc<Command>] {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Handler;
    use crate::engine::BotContext;
    use crate::error::HandlerResult;
    use async_trait::async_trait;
    use chatter_api::Event;

    struct Noop;

    #[async_trait]
    impl Handler for Noop {
        async fn handle(
            &self,
            _ctx: &mut BotContext<'_>,
            _event: &Event,
            _captures: &[String],
        ) -> HandlerResult {
            Ok(())
        }
    }

    fn cmd(name: &str, priority: i32) -> Arc<Command> {
        Arc::new(
            Command::builder(name, std::sync::Arc::new(Noop))
                .priority(priority)
                .build()
                .unwrap(),
        )
    }

    fn names(dispatcher: &Dispatcher) -> Vec<&str> {
        dispatcher
            .commands()
            .iter()
            .map(|c| c.name())
            .collect()
    }

    #[test]
    fn sorted_by_descending_priority() {
        let mut d = Dispatcher::new();
        d.register([cmd("low", 1), cmd("high", 10), cmd("mid", 5)]);
        assert_eq!(names(&d), vec!["high", "mid", "low"]);
    }

    #[test]
    fn registration_order_breaks_ties() {
        let mut d = Dispatcher::new();
        d.register([cmd("first", 5), cmd("second", 5)]);
        d.register([cmd("third", 5), cmd("top", 9)]);
        assert_eq!(names(&d), vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn unregister_is_idempotent_and_order_preserving() {
        let mut d = Dispatcher::new();
        let victim = cmd("victim", 5);
        let id = victim.id();
        d.register([cmd("a", 9), victim, cmd("b", 1)]);

        assert!(d.unregister(id));
        assert!(!d.unregister(id));
        assert_eq!(names(&d), vec!["a", "b"]);
        assert!(!d.contains(id));
    }

    #[test]
    fn snapshot_is_detached_from_later_mutation() {
        let mut d = Dispatcher::new();
        let a = cmd("a", 2);
        d.register([a.clone(), cmd("b", 1)]);

        let snapshot = d.snapshot();
        d.unregister(a.id());

        assert_eq!(snapshot.len(), 2);
        assert_eq!(d.len(), 1);
    }
}
