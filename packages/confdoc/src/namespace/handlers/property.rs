//! Handler for the `p` namespace: attributes become property values.
//!
//! `p:first-name="Jane"` assigns the literal to property `firstName`,
//! `p:data-source-ref="ds"` assigns a reference to the component `ds`.

use super::split_ref_suffix;
use crate::config::attribute_to_property_name;
use crate::error::{ReaderError, Result};
use crate::namespace::{DecorationTarget, NamespaceHandler};
use crate::reader::ElementDelegate;
use crate::types::{DefinitionHolder, Value};

/// Handler turning `p:*` attributes into property values.
pub struct PropertyNamespaceHandler;

impl NamespaceHandler for PropertyNamespaceHandler {
    fn decorate(
        &self,
        target: &DecorationTarget<'_, '_>,
        mut holder: DefinitionHolder,
        delegate: &ElementDelegate<'_>,
    ) -> Result<DefinitionHolder> {
        let DecorationTarget::Attribute { owner, attribute } = target else {
            delegate.context().error(
                target.node(),
                ReaderError::structural(format!(
                    "Element <{}> is not supported in the property namespace",
                    target.display_name()
                )),
            )?;
            return Ok(holder);
        };

        let (stem, is_reference) = split_ref_suffix(attribute.name());
        let property_name = attribute_to_property_name(stem);
        if property_name.is_empty() {
            delegate.context().error(
                *owner,
                ReaderError::structural(format!(
                    "Attribute '{}' does not name a property",
                    attribute.name()
                )),
            )?;
            return Ok(holder);
        }
        if holder.definition().has_property(&property_name) {
            delegate.context().error(
                *owner,
                ReaderError::structural(format!(
                    "Property '{property_name}' is already defined using both <property> and inline syntax. Only one approach may be used per property."
                )),
            )?;
            return Ok(holder);
        }

        let value = if is_reference {
            Value::Reference(attribute.value().to_string())
        } else {
            Value::Literal(attribute.value().to_string())
        };
        tracing::trace!(component = holder.name(), property = %property_name, "Applied inline property");
        holder.definition_mut().set_property(property_name, value);
        Ok(holder)
    }
}
