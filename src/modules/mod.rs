//! Built-in command modules.
//!
//! Each module is a compiled [`CommandModule`](crate::registry::CommandModule)
//! provider; the binary installs the whole catalog at startup and loads the
//! configured subset. Reloading a module rebuilds its command set
//! atomically.

pub mod admin;
pub mod console;
pub mod log;

use crate::registry::CommandModule;
use std::sync::Arc;

/// The full built-in provider catalog.
pub fn builtin() -> Vec<Arc<dyn CommandModule>> {
    vec![
        Arc::new(log::LogModule),
        Arc::new(console::ConsoleModule),
        Arc::new(admin::AdminModule),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_names_are_distinct() {
        let providers = builtin();
        let mut names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), providers.len());
    }

    #[test]
    fn every_builtin_module_builds_its_commands() {
        for provider in builtin() {
            let commands = provider.commands().expect("builtin module must build");
            assert!(!commands.is_empty(), "{} produced no commands", provider.name());
        }
    }
}
