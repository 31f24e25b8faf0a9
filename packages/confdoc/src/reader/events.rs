//! Reader lifecycle events.

use std::sync::{Mutex, PoisonError};

use super::defaults::ResolvedDefaults;
use super::problem::SourceLocation;
use crate::resource::Resource;
use crate::types::DefinitionHolder;

/// An `<import>` directive was processed.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRecord {
    /// Location exactly as written in the document.
    pub location: String,
    /// Whether the location was treated as absolute.
    pub absolute: bool,
    /// Resources actually loaded, without duplicates, in load order.
    pub resources: Vec<Resource>,
    pub source: SourceLocation,
}

/// An `<alias>` directive was registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasRecord {
    pub name: String,
    pub alias: String,
    pub source: SourceLocation,
}

/// A component definition was registered.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentRecord {
    pub holder: DefinitionHolder,
    pub source: SourceLocation,
}

/// Default settings of a scope were resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultsRecord {
    pub defaults: ResolvedDefaults,
    pub source: SourceLocation,
}

/// Any reader event, as recorded by [`CollectingEventListener`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReaderEvent {
    Defaults(DefaultsRecord),
    Component(ComponentRecord),
    Alias(AliasRecord),
    Import(ImportRecord),
}

/// Observer of reader progress. All methods default to doing nothing.
pub trait ReaderEventListener: Send + Sync {
    fn defaults_registered(&self, _record: &DefaultsRecord) {}

    fn component_registered(&self, _record: &ComponentRecord) {}

    fn alias_registered(&self, _record: &AliasRecord) {}

    fn import_processed(&self, _record: &ImportRecord) {}
}

/// Listener that ignores all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventListener;

impl ReaderEventListener for NoopEventListener {}

/// Listener that records every event in order.
#[derive(Debug, Default)]
pub struct CollectingEventListener {
    events: Mutex<Vec<ReaderEvent>>,
}

impl CollectingEventListener {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<ReaderEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn imports(&self) -> Vec<ImportRecord> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ReaderEvent::Import(record) => Some(record),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn aliases(&self) -> Vec<AliasRecord> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ReaderEvent::Alias(record) => Some(record),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn components(&self) -> Vec<ComponentRecord> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ReaderEvent::Component(record) => Some(record),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn defaults(&self) -> Vec<DefaultsRecord> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ReaderEvent::Defaults(record) => Some(record),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ReaderEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl ReaderEventListener for CollectingEventListener {
    fn defaults_registered(&self, record: &DefaultsRecord) {
        self.push(ReaderEvent::Defaults(record.clone()));
    }

    fn component_registered(&self, record: &ComponentRecord) {
        self.push(ReaderEvent::Component(record.clone()));
    }

    fn alias_registered(&self, record: &AliasRecord) {
        self.push(ReaderEvent::Alias(record.clone()));
    }

    fn import_processed(&self, record: &ImportRecord) {
        self.push(ReaderEvent::Import(record.clone()));
    }
}
