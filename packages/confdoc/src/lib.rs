//! confdoc - Read declarative component configuration documents.
//!
//! This crate interprets XML configuration documents in the `beans`
//! vocabulary and turns them into a registry of component definitions:
//! named descriptors that a separate runtime can later instantiate. It
//! handles nested scopes with inherited defaults, profile-based inclusion,
//! imports across documents, aliases, and extension namespaces.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use confdoc::environment::StandardEnvironment;
//! use confdoc::reader::XmlDefinitionReader;
//! use confdoc::registry::{DefinitionRegistry, InMemoryDefinitionRegistry};
//!
//! let xml = r#"
//!     <beans xmlns="http://www.springframework.org/schema/beans">
//!         <bean id="svc" class="pkg.Svc"/>
//!         <alias name="svc" alias="service"/>
//!         <beans profile="prod">
//!             <bean id="audit" class="pkg.Audit"/>
//!         </beans>
//!     </beans>"#;
//!
//! let registry = Arc::new(InMemoryDefinitionRegistry::new());
//! let reader = XmlDefinitionReader::new(registry.clone())
//!     .with_environment(Arc::new(StandardEnvironment::new().with_active_profiles(["dev"])));
//! reader.load_str("example", xml).unwrap();
//!
//! assert_eq!(registry.definition_names(), vec!["svc"]);
//! assert_eq!(registry.canonical_name("service"), "svc");
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Vocabulary constants, delimiters and global defaults
//! - [`types`]: Definitions, values and definition holders
//! - [`error`]: Error types and Result alias
//! - [`registry`]: Definition and alias store
//! - [`environment`]: Profiles and placeholder resolution
//! - [`resource`]: Resources and resource loaders
//! - [`http`]: HTTP client for remote documents
//! - [`xml`]: XML utilities
//! - [`namespace`]: Extension namespace handlers
//! - [`reader`]: Document reading and registration
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod http;
pub mod namespace;
pub mod reader;
pub mod registry;
pub mod resource;
pub mod types;
pub mod xml;

// Re-export commonly used items
pub use environment::{Environment, StandardEnvironment};
pub use error::{ProblemKind, ReaderError, Result};
pub use reader::{
    CollectingProblemReporter, FailFastProblemReporter, Problem, ProblemReporter,
    XmlDefinitionReader,
};
pub use registry::{DefinitionRegistry, InMemoryDefinitionRegistry, RegistryError};
pub use types::{Definition, DefinitionHolder, Value};
