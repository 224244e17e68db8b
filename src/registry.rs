//! Module registry: the authoritative map from module name to the command
//! set it contributed.
//!
//! Modules are compiled provider units installed in a catalog; (re)loading
//! one asks the provider for a fresh command set. The replace is atomic
//! with respect to the previously observed set: the provider either yields
//! a complete new set, or the registry is left exactly as it was. No
//! partially-registered commands can leak because nothing is applied until
//! the whole candidate set exists.

use crate::command::{Command, CommandId};
use crate::error::LoadError;
use std::collections::HashMap;
use std::sync::Arc;

/// A named, atomically (re)loadable unit that contributes commands.
///
/// Providers are installed once and may be asked for commands any number
/// of times; each load is a fresh set. A provider that fails leaves no
/// trace.
pub trait CommandModule: Send + Sync {
    /// Module name; the registry key.
    fn name(&self) -> &'static str;

    /// One-line description for listings.
    fn describe(&self) -> &'static str {
        ""
    }

    /// Produce a complete command set for this module.
    fn commands(&self) -> anyhow::Result<Vec<Command>>;
}

/// Result of a successful load: what must be registered and unregistered
/// with the dispatcher to bring the active list in sync.
pub struct LoadOutcome {
    pub added: Vec<Arc<Command>>,
    pub removed: Vec<Arc<Command>>,
}

impl std::fmt::Debug for LoadOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadOutcome")
            .field("added", &self.added.iter().map(|c| c.name()).collect::<Vec<_>>())
            .field("removed", &self.removed.iter().map(|c| c.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// Owns the module-name → command-set mapping.
#[derive(Default)]
pub struct Registry {
    providers: HashMap<String, Arc<dyn CommandModule>>,
    loaded: HashMap<String, Vec<Arc<Command>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider to the catalog without loading it.
    pub fn install(&mut self, provider: Arc<dyn CommandModule>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    /// Installed providers as (name, description) pairs, sorted by name.
    pub fn installed(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .providers
            .values()
            .map(|provider| (provider.name(), provider.describe()))
            .collect();
        entries.sort_unstable_by_key(|(name, _)| *name);
        entries
    }

    /// Names of currently loaded modules, sorted.
    pub fn modules(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.loaded.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// (Re)load a module from its installed provider.
    ///
    /// On failure the observable state is untouched: a previously loaded
    /// set stays exactly as it was, an absent module stays absent.
    pub fn load(&mut self, name: &str) -> Result<LoadOutcome, LoadError> {
        let provider = self
            .providers
            .get(name)
            .cloned()
            .ok_or_else(|| LoadError::UnknownModule(name.to_string()))?;

        // Build the complete candidate set before touching any state.
        let built = provider.commands().map_err(|source| LoadError::Module {
            module: name.to_string(),
            source,
        })?;

        let added: Vec<Arc<Command>> = built
            .into_iter()
            .map(|mut cmd| {
                cmd.set_owner(name);
                Arc::new(cmd)
            })
            .collect();

        let removed = self
            .loaded
            .insert(name.to_string(), added.clone())
            .unwrap_or_default();

        Ok(LoadOutcome { added, removed })
    }

    /// Remove and return all commands owned by `name`; empty if unknown.
    pub fn unload(&mut self, name: &str) -> Vec<Arc<Command>> {
        self.loaded.remove(name).unwrap_or_default()
    }

    /// The live command set currently owned by `name`.
    pub fn module(&self, name: &str) -> &[Arc<Command>] {
        self.loaded.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Drop a single command from its owner's set (expiry, exhaustion).
    pub(crate) fn discard(&mut self, owner: &str, id: CommandId) {
        if let Some(set) = self.loaded.get_mut(owner) {
            set.retain(|cmd| cmd.id() != id);
        }
    }
}
