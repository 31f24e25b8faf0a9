//! Extension namespaces.
//!
//! Elements and attributes outside the default namespace are dispatched to
//! a [`NamespaceHandler`] looked up by namespace URI. Handlers are
//! registered when the reader is configured.

mod config;
mod core;
mod handler;
pub mod handlers;

pub use config::create_default_handlers;
pub use core::NamespaceHandlerRegistry;
pub use handler::{DecorationTarget, NamespaceHandler};
