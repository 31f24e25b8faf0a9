//! Namespace handler trait definition.

use roxmltree::{Attribute, Node};

use crate::error::{ReaderError, Result};
use crate::reader::ElementDelegate;
use crate::types::DefinitionHolder;
use crate::xml::qualified_tag_name;

/// A non-default-namespace node that may decorate a component definition.
#[derive(Clone)]
pub enum DecorationTarget<'a, 'input> {
    /// Attribute on a component element, e.g. `p:url="..."`.
    Attribute {
        owner: Node<'a, 'input>,
        attribute: Attribute<'a, 'input>,
    },
    /// Child element of a component element.
    Element(Node<'a, 'input>),
}

impl<'a, 'input> DecorationTarget<'a, 'input> {
    /// The element to report problems against.
    #[must_use]
    pub fn node(&self) -> Node<'a, 'input> {
        match self {
            Self::Attribute { owner, .. } => *owner,
            Self::Element(node) => *node,
        }
    }

    /// Namespace URI of the attribute or element.
    #[must_use]
    pub fn namespace(&self) -> Option<&'a str> {
        match self {
            Self::Attribute { attribute, .. } => attribute.namespace(),
            Self::Element(node) => node.tag_name().namespace(),
        }
    }

    /// Local name of the attribute or element.
    #[must_use]
    pub fn local_name(&self) -> &'a str {
        match self {
            Self::Attribute { attribute, .. } => attribute.name(),
            Self::Element(node) => node.tag_name().name(),
        }
    }

    /// Name used in diagnostics.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Self::Attribute { attribute, .. } => format!("@{}", attribute.name()),
            Self::Element(node) => qualified_tag_name(*node),
        }
    }
}

/// Handler for one extension namespace.
///
/// `parse` handles custom elements that appear where a component could
/// appear; handlers that produce definitions register them directly through
/// the delegate's context. `decorate` augments a component parsed from the
/// default namespace; each decorator receives the holder produced by the
/// previous one.
///
/// Both methods default to reporting that the namespace does not support
/// the corresponding usage.
pub trait NamespaceHandler: Send + Sync {
    /// Handle a custom element.
    fn parse(
        &self,
        element: Node<'_, '_>,
        delegate: &ElementDelegate<'_>,
    ) -> Result<Option<DefinitionHolder>> {
        delegate.context().error(
            element,
            ReaderError::structural(format!(
                "Namespace of <{}> does not support custom elements",
                qualified_tag_name(element)
            )),
        )?;
        Ok(None)
    }

    /// Decorate a component definition.
    fn decorate(
        &self,
        target: &DecorationTarget<'_, '_>,
        holder: DefinitionHolder,
        delegate: &ElementDelegate<'_>,
    ) -> Result<DefinitionHolder> {
        delegate.context().error(
            target.node(),
            ReaderError::structural(format!(
                "Namespace of {} does not support decoration",
                target.display_name()
            )),
        )?;
        Ok(holder)
    }
}
