//! Definition store consumed by the reader.
//!
//! The reader talks to the store through the narrow [`DefinitionRegistry`]
//! trait. [`InMemoryDefinitionRegistry`] is the bundled implementation: it is
//! internally synchronized, holds its lock only for the duration of a single
//! operation and never calls back out, so a document that imports another
//! document can re-enter it from the same thread.

use std::sync::{PoisonError, RwLock};

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::types::Definition;

/// Rejections raised by the definition store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Names and aliases must not be blank.
    #[error("Definition name and alias must not be empty")]
    EmptyName,

    /// A definition already exists and overriding is disabled.
    #[error("Cannot register definition '{name}': there is already a definition bound under that name and overriding is disabled")]
    DuplicateDefinition { name: String },

    /// The name is already used as an alias for another definition.
    #[error("Cannot register definition '{name}': the name is already an alias for '{target}'")]
    NameIsAlias { name: String, target: String },

    /// The alias is already bound to a different name.
    #[error("Cannot define alias '{alias}' for name '{name}': it is already registered for name '{existing}'")]
    AliasConflict {
        alias: String,
        name: String,
        existing: String,
    },

    /// The binding would make an alias resolve back to itself.
    #[error("Cannot register alias '{alias}' for name '{name}': circular reference - '{name}' is a direct or indirect alias for '{alias}' already")]
    AliasCycle { alias: String, name: String },
}

/// Store for definitions and alias bindings.
///
/// Implementations must be safe to call from several threads and must not
/// hold locks across calls, since imports re-enter the reader from the same
/// thread.
pub trait DefinitionRegistry: Send + Sync {
    /// Register a definition under its primary name.
    fn register_definition(&self, name: &str, definition: Definition)
        -> Result<(), RegistryError>;

    /// Bind an alias to a name.
    fn register_alias(&self, name: &str, alias: &str) -> Result<(), RegistryError>;

    /// Remove an alias binding, returning the name it pointed to.
    fn remove_alias(&self, alias: &str) -> Option<String>;

    /// Check whether a definition exists under this exact name.
    fn contains_definition(&self, name: &str) -> bool;

    /// Fetch a copy of a definition by primary name.
    fn definition(&self, name: &str) -> Option<Definition>;

    /// Primary names in registration order.
    fn definition_names(&self) -> Vec<String>;

    /// Number of registered definitions.
    fn definition_count(&self) -> usize;

    /// Check whether a name is bound as an alias.
    fn is_alias(&self, name: &str) -> bool;

    /// All aliases that resolve, directly or transitively, to `name`.
    fn aliases(&self, name: &str) -> Vec<String>;

    /// Follow alias bindings to the canonical name.
    fn canonical_name(&self, name: &str) -> String;

    /// Check whether a name is used either as definition name or as alias.
    fn is_name_in_use(&self, name: &str) -> bool {
        self.contains_definition(name) || self.is_alias(name)
    }

    /// Override policy for definitions and aliases.
    fn allows_overriding(&self) -> bool;
}

#[derive(Debug, Default)]
struct RegistryState {
    definitions: IndexMap<String, Definition>,
    /// alias -> name
    aliases: IndexMap<String, String>,
}

impl RegistryState {
    /// Check whether `alias` already resolves to `name` through the bindings.
    fn has_alias(&self, name: &str, alias: &str) -> bool {
        self.aliases
            .iter()
            .filter(|(_, registered_name)| registered_name.as_str() == name)
            .any(|(registered_alias, _)| {
                registered_alias == alias || self.has_alias(registered_alias, alias)
            })
    }

    fn collect_aliases(&self, name: &str, result: &mut Vec<String>) {
        for (alias, registered_name) in &self.aliases {
            if registered_name == name && !result.contains(alias) {
                result.push(alias.clone());
                self.collect_aliases(alias, result);
            }
        }
    }

    fn canonical_name(&self, name: &str) -> String {
        let mut canonical = name;
        while let Some(target) = self.aliases.get(canonical) {
            canonical = target;
        }
        canonical.to_string()
    }
}

/// Registry contents in a serializable form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrySnapshot {
    pub definitions: IndexMap<String, Definition>,
    pub aliases: IndexMap<String, String>,
}

/// In-memory, lock-protected definition store.
#[derive(Debug)]
pub struct InMemoryDefinitionRegistry {
    state: RwLock<RegistryState>,
    allow_overriding: bool,
}

impl InMemoryDefinitionRegistry {
    /// Create an empty registry that allows overriding.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            allow_overriding: true,
        }
    }

    /// Set the override policy.
    #[must_use]
    pub fn with_overriding(mut self, allow: bool) -> Self {
        self.allow_overriding = allow;
        self
    }

    /// Copy the current contents.
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        RegistrySnapshot {
            definitions: state.definitions.clone(),
            aliases: state.aliases.clone(),
        }
    }
}

impl Default for InMemoryDefinitionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionRegistry for InMemoryDefinitionRegistry {
    fn register_definition(
        &self,
        name: &str,
        definition: Definition,
    ) -> Result<(), RegistryError> {
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(target) = state.aliases.get(name) {
            if !self.allow_overriding {
                return Err(RegistryError::NameIsAlias {
                    name: name.to_string(),
                    target: target.clone(),
                });
            }
            tracing::debug!(name, target = %target, "Definition replaces existing alias");
            state.aliases.shift_remove(name);
        }

        if state.definitions.contains_key(name) {
            if !self.allow_overriding {
                return Err(RegistryError::DuplicateDefinition {
                    name: name.to_string(),
                });
            }
            tracing::debug!(name, "Overriding definition");
        }

        state.definitions.insert(name.to_string(), definition);
        Ok(())
    }

    fn register_alias(&self, name: &str, alias: &str) -> Result<(), RegistryError> {
        if name.trim().is_empty() || alias.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if alias == name {
            if state.aliases.shift_remove(alias).is_some() {
                tracing::debug!(alias, "Alias points to its own name, removed earlier binding");
            }
            return Ok(());
        }

        if let Some(existing) = state.aliases.get(alias) {
            if existing == name {
                return Ok(());
            }
            if !self.allow_overriding {
                return Err(RegistryError::AliasConflict {
                    alias: alias.to_string(),
                    name: name.to_string(),
                    existing: existing.clone(),
                });
            }
            tracing::debug!(alias, name, existing = %existing, "Overriding alias");
        }

        if state.has_alias(alias, name) {
            return Err(RegistryError::AliasCycle {
                alias: alias.to_string(),
                name: name.to_string(),
            });
        }

        state.aliases.insert(alias.to_string(), name.to_string());
        tracing::trace!(alias, name, "Alias registered");
        Ok(())
    }

    fn remove_alias(&self, alias: &str) -> Option<String> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.aliases.shift_remove(alias)
    }

    fn contains_definition(&self, name: &str) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.definitions.contains_key(name)
    }

    fn definition(&self, name: &str) -> Option<Definition> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.definitions.get(name).cloned()
    }

    fn definition_names(&self) -> Vec<String> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.definitions.keys().cloned().collect()
    }

    fn definition_count(&self) -> usize {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.definitions.len()
    }

    fn is_alias(&self, name: &str) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.aliases.contains_key(name)
    }

    fn aliases(&self, name: &str) -> Vec<String> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let mut result = Vec::new();
        state.collect_aliases(name, &mut result);
        result
    }

    fn canonical_name(&self, name: &str) -> String {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.canonical_name(name)
    }

    fn allows_overriding(&self) -> bool {
        self.allow_overriding
    }
}
