//! Default handler configuration.

use super::core::NamespaceHandlerRegistry;
use super::handlers::{ConstructorNamespaceHandler, PropertyNamespaceHandler};
use crate::config::{C_NAMESPACE_URI, P_NAMESPACE_URI, XML_NAMESPACE_URI, XSI_NAMESPACE_URI};

/// Create a handler registry with the built-in namespaces.
///
/// Registers the `p` and `c` shorthand namespaces. Schema-instance
/// attributes (`xsi:schemaLocation`) and the reserved `xml:` attributes
/// carry no configuration and are ignored.
#[must_use]
pub fn create_default_handlers() -> NamespaceHandlerRegistry {
    let mut registry = NamespaceHandlerRegistry::new();

    registry.register(P_NAMESPACE_URI, PropertyNamespaceHandler);
    registry.register(C_NAMESPACE_URI, ConstructorNamespaceHandler);

    registry.ignore([XSI_NAMESPACE_URI, XML_NAMESPACE_URI]);

    registry
}
