//! Document reading: from XML elements to registered definitions.
//!
//! [`XmlDefinitionReader`] loads documents and hands their root element to
//! the [`DocumentReader`], which walks scopes and dispatches directives:
//! - `import` to [`resolve_import`]
//! - `alias` to [`register_alias`]
//! - `bean` to the [`ElementDelegate`], then to the registry
//! - nested `beans` back into itself with chained [`ScopeDefaults`]
//!
//! Failures become [`Problem`]s for the configured [`ProblemReporter`];
//! progress is announced to a [`ReaderEventListener`].

mod alias;
mod context;
mod defaults;
mod delegate;
mod document;
mod events;
mod import;
mod problem;
mod xml_reader;

pub use alias::register_alias;
pub use context::ReaderContext;
pub use defaults::{ResolvedDefaults, ScopeDefaults};
pub use delegate::ElementDelegate;
pub use document::{DocumentHooks, DocumentReader, NoopHooks};
pub use events::{
    AliasRecord, CollectingEventListener, ComponentRecord, DefaultsRecord, ImportRecord,
    NoopEventListener, ReaderEvent, ReaderEventListener,
};
pub use import::resolve_import;
pub use problem::{
    CollectingProblemReporter, FailFastProblemReporter, Problem, ProblemReporter, SourceLocation,
};
pub use xml_reader::XmlDefinitionReader;
