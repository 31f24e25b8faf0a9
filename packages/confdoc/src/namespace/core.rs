//! Handler registry mapping namespace URIs to handlers.

use std::collections::{HashMap, HashSet};

use super::handler::NamespaceHandler;

/// Registry mapping namespace URIs to handlers.
///
/// Populated when the host application configures the reader. Namespaces
/// can also be marked as ignored: nodes in them are neither dispatched nor
/// reported.
pub struct NamespaceHandlerRegistry {
    handlers: HashMap<String, Box<dyn NamespaceHandler>>,
    ignored: HashSet<String>,
}

impl NamespaceHandlerRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            ignored: HashSet::new(),
        }
    }

    /// Register a handler for a namespace URI.
    pub fn register(
        &mut self,
        namespace_uri: impl Into<String>,
        handler: impl NamespaceHandler + 'static,
    ) {
        self.handlers
            .insert(namespace_uri.into(), Box::new(handler));
    }

    /// Mark namespaces as ignored.
    pub fn ignore(&mut self, namespace_uris: impl IntoIterator<Item = impl Into<String>>) {
        for uri in namespace_uris {
            self.ignored.insert(uri.into());
        }
    }

    /// Resolve the handler for a namespace URI.
    #[must_use]
    pub fn resolve(&self, namespace_uri: &str) -> Option<&dyn NamespaceHandler> {
        self.handlers.get(namespace_uri).map(|h| h.as_ref())
    }

    /// Check if a namespace is ignored.
    #[must_use]
    pub fn is_ignored(&self, namespace_uri: &str) -> bool {
        self.ignored.contains(namespace_uri)
    }

    /// Check if a handler is registered for a namespace.
    #[must_use]
    pub fn has_handler(&self, namespace_uri: &str) -> bool {
        self.handlers.contains_key(namespace_uri)
    }

    /// Return set of all registered namespace URIs.
    #[must_use]
    pub fn registered_namespaces(&self) -> HashSet<&str> {
        self.handlers.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for NamespaceHandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NamespaceHandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamespaceHandlerRegistry")
            .field("namespaces", &self.registered_namespaces())
            .field("ignored", &self.ignored)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DummyHandler;

    impl NamespaceHandler for DummyHandler {}

    #[test]
    fn test_registry_register_and_resolve() {
        let mut registry = NamespaceHandlerRegistry::new();
        registry.register("http://example.com/cache", DummyHandler);

        assert!(registry.resolve("http://example.com/cache").is_some());
        assert!(registry.resolve("http://example.com/other").is_none());
    }

    #[test]
    fn test_registry_ignore() {
        let mut registry = NamespaceHandlerRegistry::new();
        registry.ignore(["http://www.w3.org/2001/XMLSchema-instance"]);

        assert!(registry.is_ignored("http://www.w3.org/2001/XMLSchema-instance"));
        assert!(!registry.is_ignored("http://example.com/cache"));
    }

    #[test]
    fn test_registry_has_handler() {
        let mut registry = NamespaceHandlerRegistry::new();
        registry.register("http://example.com/cache", DummyHandler);

        assert!(registry.has_handler("http://example.com/cache"));
        assert!(!registry.has_handler("missing"));
        assert_eq!(registry.registered_namespaces().len(), 1);
    }
}
