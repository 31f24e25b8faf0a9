//! Per-document reader context.

use indexmap::IndexSet;
use roxmltree::Node;

use super::defaults::ResolvedDefaults;
use super::events::{AliasRecord, ComponentRecord, DefaultsRecord, ImportRecord};
use super::problem::{Problem, SourceLocation};
use super::xml_reader::XmlDefinitionReader;
use crate::config::GlobalDefaults;
use crate::environment::Environment;
use crate::error::{ReaderError, Result};
use crate::namespace::NamespaceHandlerRegistry;
use crate::registry::DefinitionRegistry;
use crate::resource::Resource;
use crate::types::DefinitionHolder;

/// Everything the reader needs while walking one document.
///
/// Gives access to the document's resource, the environment, the registry
/// and the namespace handlers, and routes problems and events to the
/// reporter and listener of the owning [`XmlDefinitionReader`]. Loading
/// other documents goes back through the same reader.
#[derive(Clone, Copy)]
pub struct ReaderContext<'r> {
    reader: &'r XmlDefinitionReader,
    resource: &'r Resource,
}

impl<'r> ReaderContext<'r> {
    #[must_use]
    pub fn new(reader: &'r XmlDefinitionReader, resource: &'r Resource) -> Self {
        Self { reader, resource }
    }

    /// The document being read.
    #[must_use]
    pub fn resource(&self) -> &'r Resource {
        self.resource
    }

    /// URL of the document being read, the base for relative imports.
    ///
    /// # Errors
    /// Fails for documents that were not loaded from a URL.
    pub fn current_location(&self) -> Result<String> {
        self.resource.url_or_error().map(ToString::to_string)
    }

    #[must_use]
    pub fn environment(&self) -> &'r dyn Environment {
        self.reader.environment()
    }

    #[must_use]
    pub fn registry(&self) -> &'r dyn DefinitionRegistry {
        self.reader.registry()
    }

    #[must_use]
    pub fn namespace_handlers(&self) -> &'r NamespaceHandlerRegistry {
        self.reader.namespace_handlers()
    }

    #[must_use]
    pub fn globals(&self) -> &'r GlobalDefaults {
        self.reader.globals()
    }

    /// Source location of an element in the current document.
    #[must_use]
    pub fn source_of(&self, node: Node<'_, '_>) -> SourceLocation {
        SourceLocation::of(node, self.resource)
    }

    /// Report an error against an element.
    ///
    /// Returns `Err` only when the problem reporter escalates. An error that
    /// was already escalated while reading a nested document is passed on
    /// unchanged instead of being reported a second time.
    pub fn error(&self, node: Node<'_, '_>, error: ReaderError) -> Result<()> {
        if let ReaderError::Escalated(_) = error {
            return Err(error);
        }
        self.reader
            .problem_reporter()
            .error(Problem::from_error(&error, node, self.resource))
    }

    /// Report a warning against an element.
    pub fn warning(&self, node: Node<'_, '_>, error: &ReaderError) {
        self.reader
            .problem_reporter()
            .warning(Problem::from_error(error, node, self.resource));
    }

    /// Load every document matching a location, recording each one in `actual`.
    ///
    /// Returns the number of definitions registered.
    pub fn load_from(&self, location: &str, actual: &mut IndexSet<Resource>) -> Result<usize> {
        self.reader.load_definitions_into(location, actual)
    }

    /// Load a single document.
    pub fn load_resource(&self, resource: &Resource) -> Result<usize> {
        self.reader.load_resource(resource)
    }

    #[must_use]
    pub fn resource_exists(&self, resource: &Resource) -> bool {
        self.reader.resource_loader().exists(resource)
    }

    /// Next number for generated inner component names.
    #[must_use]
    pub fn next_inner_id(&self) -> usize {
        self.reader.next_inner_id()
    }

    pub fn fire_import_processed(
        &self,
        location: &str,
        absolute: bool,
        resources: IndexSet<Resource>,
        node: Node<'_, '_>,
    ) {
        self.reader.event_listener().import_processed(&ImportRecord {
            location: location.to_string(),
            absolute,
            resources: resources.into_iter().collect(),
            source: self.source_of(node),
        });
    }

    pub fn fire_alias_registered(&self, name: &str, alias: &str, node: Node<'_, '_>) {
        self.reader.event_listener().alias_registered(&AliasRecord {
            name: name.to_string(),
            alias: alias.to_string(),
            source: self.source_of(node),
        });
    }

    pub fn fire_component_registered(&self, holder: &DefinitionHolder, node: Node<'_, '_>) {
        self.reader
            .event_listener()
            .component_registered(&ComponentRecord {
                holder: holder.clone(),
                source: self.source_of(node),
            });
    }

    pub fn fire_defaults_registered(&self, defaults: ResolvedDefaults, node: Node<'_, '_>) {
        self.reader.event_listener().defaults_registered(&DefaultsRecord {
            defaults,
            source: self.source_of(node),
        });
    }
}
