//! Entry point: loading documents by location.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, ThreadId};

use indexmap::IndexSet;
use roxmltree::{Document, ParsingOptions};

use super::context::ReaderContext;
use super::document::DocumentReader;
use super::events::{NoopEventListener, ReaderEventListener};
use super::problem::{CollectingProblemReporter, ProblemReporter};
use crate::config::GlobalDefaults;
use crate::environment::{Environment, StandardEnvironment};
use crate::error::{ReaderError, Result};
use crate::namespace::{create_default_handlers, NamespaceHandlerRegistry};
use crate::registry::DefinitionRegistry;
use crate::resource::{DefaultResourceLoader, Resource, ResourceLoader};

/// Loads configuration documents into a [`DefinitionRegistry`].
///
/// Owns the collaborators used while reading: environment, resource
/// loader, namespace handlers, problem reporter and event listener. Imports
/// re-enter the reader through [`ReaderContext::load_from`], and a document
/// that is already being loaded on the current thread is reported as a
/// cyclic import instead of being read again.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use confdoc::reader::XmlDefinitionReader;
/// use confdoc::registry::{DefinitionRegistry, InMemoryDefinitionRegistry};
///
/// let registry = Arc::new(InMemoryDefinitionRegistry::new());
/// let reader = XmlDefinitionReader::new(registry.clone());
/// let count = reader
///     .load_str("example", r#"<beans><bean id="svc" class="pkg.Svc"/></beans>"#)
///     .unwrap();
/// assert_eq!(count, 1);
/// assert!(registry.contains_definition("svc"));
/// ```
pub struct XmlDefinitionReader {
    registry: Arc<dyn DefinitionRegistry>,
    environment: Arc<dyn Environment>,
    loader: Arc<dyn ResourceLoader>,
    handlers: NamespaceHandlerRegistry,
    reporter: Arc<dyn ProblemReporter>,
    listener: Arc<dyn ReaderEventListener>,
    document_reader: DocumentReader,
    globals: GlobalDefaults,
    loading: Mutex<HashMap<ThreadId, Vec<Resource>>>,
    inner_counter: AtomicUsize,
}

impl XmlDefinitionReader {
    /// Create a reader with the default collaborators.
    ///
    /// Uses a [`StandardEnvironment`], a [`DefaultResourceLoader`] without
    /// search roots, the built-in namespace handlers and a
    /// [`CollectingProblemReporter`].
    #[must_use]
    pub fn new(registry: Arc<dyn DefinitionRegistry>) -> Self {
        Self {
            registry,
            environment: Arc::new(StandardEnvironment::new()),
            loader: Arc::new(DefaultResourceLoader::new()),
            handlers: create_default_handlers(),
            reporter: Arc::new(CollectingProblemReporter::new()),
            listener: Arc::new(NoopEventListener),
            document_reader: DocumentReader::new(),
            globals: GlobalDefaults::default(),
            loading: Mutex::new(HashMap::new()),
            inner_counter: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_environment(mut self, environment: Arc<dyn Environment>) -> Self {
        self.environment = environment;
        self
    }

    #[must_use]
    pub fn with_resource_loader(mut self, loader: Arc<dyn ResourceLoader>) -> Self {
        self.loader = loader;
        self
    }

    #[must_use]
    pub fn with_namespace_handlers(mut self, handlers: NamespaceHandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    #[must_use]
    pub fn with_problem_reporter(mut self, reporter: Arc<dyn ProblemReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    #[must_use]
    pub fn with_event_listener(mut self, listener: Arc<dyn ReaderEventListener>) -> Self {
        self.listener = listener;
        self
    }

    #[must_use]
    pub fn with_document_reader(mut self, document_reader: DocumentReader) -> Self {
        self.document_reader = document_reader;
        self
    }

    #[must_use]
    pub fn with_global_defaults(mut self, globals: GlobalDefaults) -> Self {
        self.globals = globals;
        self
    }

    pub fn registry(&self) -> &dyn DefinitionRegistry {
        self.registry.as_ref()
    }

    pub fn environment(&self) -> &dyn Environment {
        self.environment.as_ref()
    }

    pub fn resource_loader(&self) -> &dyn ResourceLoader {
        self.loader.as_ref()
    }

    pub fn namespace_handlers(&self) -> &NamespaceHandlerRegistry {
        &self.handlers
    }

    pub fn problem_reporter(&self) -> &dyn ProblemReporter {
        self.reporter.as_ref()
    }

    pub fn event_listener(&self) -> &dyn ReaderEventListener {
        self.listener.as_ref()
    }

    pub fn globals(&self) -> &GlobalDefaults {
        &self.globals
    }

    /// Load every document matching a location.
    ///
    /// Returns the number of definitions registered.
    ///
    /// # Errors
    /// Fails when the location cannot be resolved, a document cannot be
    /// read or parsed, or the problem reporter escalates.
    pub fn load_definitions(&self, location: &str) -> Result<usize> {
        self.load_definitions_into(location, &mut IndexSet::new())
    }

    /// Like [`Self::load_definitions`], recording each loaded resource.
    pub fn load_definitions_into(
        &self,
        location: &str,
        actual: &mut IndexSet<Resource>,
    ) -> Result<usize> {
        let resources = self.loader.resources(location)?;
        tracing::trace!(location, matches = resources.len(), "Resolved location");

        let mut count = 0;
        for resource in resources {
            count += self.load_resource(&resource)?;
            actual.insert(resource);
        }
        Ok(count)
    }

    /// Load a single document.
    ///
    /// # Errors
    /// Fails when the document is already being loaded further up the
    /// import chain, cannot be read or parsed, or the problem reporter
    /// escalates.
    pub fn load_resource(&self, resource: &Resource) -> Result<usize> {
        tracing::debug!(resource = %resource, "Loading definitions");
        self.begin_loading(resource)?;
        let result = self
            .loader
            .read_to_string(resource)
            .and_then(|content| self.register_document(&content, resource));
        self.finish_loading(resource);
        result
    }

    /// Load a document given as a string.
    ///
    /// Relative imports inside it cannot be resolved since it has no
    /// location of its own.
    ///
    /// # Errors
    /// Fails when the document cannot be parsed or the problem reporter
    /// escalates.
    pub fn load_str(&self, name: &str, xml: &str) -> Result<usize> {
        self.register_document(xml, &Resource::inline(name))
    }

    fn register_document(&self, content: &str, resource: &Resource) -> Result<usize> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let document =
            Document::parse_with_options(content, options).map_err(|source| {
                ReaderError::XmlParse {
                    resource: resource.description().to_string(),
                    source,
                }
            })?;

        let before = self.registry.definition_count();
        let ctx = ReaderContext::new(self, resource);
        self.document_reader
            .register_definitions(document.root_element(), &ctx)?;
        let count = self.registry.definition_count().saturating_sub(before);

        tracing::debug!(resource = %resource, definitions = count, "Loaded definitions");
        Ok(count)
    }

    fn begin_loading(&self, resource: &Resource) -> Result<()> {
        let mut loading = self.loading.lock().unwrap_or_else(PoisonError::into_inner);
        let stack = loading.entry(thread::current().id()).or_default();
        if stack.contains(resource) {
            return Err(ReaderError::CyclicImport(resource.description().to_string()));
        }
        stack.push(resource.clone());
        Ok(())
    }

    fn finish_loading(&self, resource: &Resource) {
        let mut loading = self.loading.lock().unwrap_or_else(PoisonError::into_inner);
        let id = thread::current().id();
        if let Some(stack) = loading.get_mut(&id) {
            if let Some(position) = stack.iter().rposition(|r| r == resource) {
                stack.remove(position);
            }
            if stack.is_empty() {
                loading.remove(&id);
            }
        }
    }

    pub(crate) fn next_inner_id(&self) -> usize {
        self.inner_counter.fetch_add(1, Ordering::Relaxed)
    }
}

impl std::fmt::Debug for XmlDefinitionReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlDefinitionReader")
            .field("handlers", &self.handlers)
            .field("globals", &self.globals)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProblemKind;
    use crate::reader::{CollectingEventListener, FailFastProblemReporter};
    use crate::registry::InMemoryDefinitionRegistry;
    use crate::resource::InMemoryResourceLoader;

    const NS: &str = r#"xmlns="http://www.springframework.org/schema/beans""#;

    #[test]
    fn test_load_counts_definitions() {
        let registry = Arc::new(InMemoryDefinitionRegistry::new());
        let loader = InMemoryResourceLoader::new().with_document(
            "app.xml",
            format!(r#"<beans {NS}><bean id="a" class="A"/><bean id="b" class="B"/></beans>"#),
        );
        let reader = XmlDefinitionReader::new(registry.clone()).with_resource_loader(Arc::new(loader));

        assert_eq!(reader.load_definitions("app.xml").unwrap(), 2);
        assert_eq!(registry.definition_count(), 2);
    }

    #[test]
    fn test_invalid_xml_is_an_error() {
        let registry = Arc::new(InMemoryDefinitionRegistry::new());
        let reader = XmlDefinitionReader::new(registry);
        let err = reader.load_str("broken", "<beans><bean></beans>").unwrap_err();
        assert!(matches!(err, ReaderError::XmlParse { .. }));
    }

    #[test]
    fn test_cyclic_import_reported() {
        let registry = Arc::new(InMemoryDefinitionRegistry::new());
        let reporter = Arc::new(CollectingProblemReporter::new());
        let loader = InMemoryResourceLoader::new()
            .with_document(
                "a.xml",
                format!(r#"<beans {NS}><import resource="b.xml"/><bean id="a" class="A"/></beans>"#),
            )
            .with_document(
                "b.xml",
                format!(r#"<beans {NS}><import resource="a.xml"/><bean id="b" class="B"/></beans>"#),
            );
        let reader = XmlDefinitionReader::new(registry.clone())
            .with_resource_loader(Arc::new(loader))
            .with_problem_reporter(reporter.clone());

        assert_eq!(reader.load_definitions("a.xml").unwrap(), 2);

        let problems = reporter.problems();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].kind, ProblemKind::Resolution);
        assert_eq!(problems[0].location.resource, "resource [memory:/b.xml]");
        assert!(problems[0]
            .cause
            .as_deref()
            .is_some_and(|cause| cause.contains("cyclic loading")));
    }

    #[test]
    fn test_fail_fast_aborts_on_first_problem() {
        let registry = Arc::new(InMemoryDefinitionRegistry::new());
        let listener = Arc::new(CollectingEventListener::new());
        let loader = InMemoryResourceLoader::new()
            .with_document(
                "main.xml",
                format!(r#"<beans {NS}><import resource="nested.xml"/><bean id="after" class="A"/></beans>"#),
            )
            .with_document(
                "nested.xml",
                format!(r#"<beans {NS}><import resource=""/><bean id="never" class="N"/></beans>"#),
            );
        let reader = XmlDefinitionReader::new(registry.clone())
            .with_resource_loader(Arc::new(loader))
            .with_problem_reporter(Arc::new(FailFastProblemReporter))
            .with_event_listener(listener.clone());

        let err = reader.load_definitions("main.xml").unwrap_err();
        let ReaderError::Escalated(problem) = err else {
            panic!("expected escalation, got {err:?}");
        };
        assert_eq!(problem.message, "Resource location must not be empty");
        assert_eq!(problem.location.resource, "resource [memory:/nested.xml]");
        assert_eq!(registry.definition_count(), 0);
    }

    #[test]
    fn test_inner_ids_are_unique() {
        let reader = XmlDefinitionReader::new(Arc::new(InMemoryDefinitionRegistry::new()));
        let first = reader.next_inner_id();
        assert_ne!(first, reader.next_inner_id());
    }
}
