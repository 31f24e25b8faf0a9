//! Handler for the `c` namespace: attributes become constructor arguments.
//!
//! `c:_0="x"` sets the argument at index 0, `c:max-size="10"` sets the
//! argument named `maxSize`. A `-ref` suffix turns the value into a
//! reference.

use super::split_ref_suffix;
use crate::config::attribute_to_property_name;
use crate::error::{ReaderError, Result};
use crate::namespace::{DecorationTarget, NamespaceHandler};
use crate::reader::ElementDelegate;
use crate::types::{ConstructorArg, DefinitionHolder, Value};

/// Prefix of index-based argument attributes.
const INDEX_PREFIX: char = '_';

/// Handler turning `c:*` attributes into constructor arguments.
pub struct ConstructorNamespaceHandler;

impl NamespaceHandler for ConstructorNamespaceHandler {
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
                    "Element <{}> is not supported in the constructor namespace",
                    target.display_name()
                )),
            )?;
            return Ok(holder);
        };

        let attribute_name = attribute.name();
        let (stem, is_reference) = split_ref_suffix(attribute_name);
        let value = if is_reference {
            Value::Reference(attribute.value().to_string())
        } else {
            Value::Literal(attribute.value().to_string())
        };

        let argument = if let Some(index) = stem.strip_prefix(INDEX_PREFIX) {
            let Ok(index) = index.trim().parse::<usize>() else {
                delegate.context().error(
                    *owner,
                    ReaderError::structural(format!(
                        "Constructor argument '{attribute_name}' specifies an invalid index"
                    )),
                )?;
                return Ok(holder);
            };
            if holder.definition().constructor_arg_at(index).is_some() {
                delegate.context().error(
                    *owner,
                    ReaderError::structural(format!(
                        "Constructor argument '{attribute_name}' already defined using <constructor-arg>. Only one approach may be used per argument."
                    )),
                )?;
                return Ok(holder);
            }
            ConstructorArg::new(value).with_index(index)
        } else {
            let name = attribute_to_property_name(stem);
            if holder.definition().constructor_arg_named(&name).is_some() {
                delegate.context().error(
                    *owner,
                    ReaderError::structural(format!(
                        "Constructor argument '{attribute_name}' already defined using <constructor-arg>. Only one approach may be used per argument."
                    )),
                )?;
                return Ok(holder);
            }
            ConstructorArg::new(value).with_name(name)
        };

        holder.definition_mut().constructor_args.push(argument);
        Ok(holder)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use crate::error::ProblemKind;
    use crate::reader::{CollectingProblemReporter, XmlDefinitionReader};
    use crate::registry::{DefinitionRegistry, InMemoryDefinitionRegistry};
    use crate::types::Value;

    fn load(xml: &str) -> (Arc<InMemoryDefinitionRegistry>, Arc<CollectingProblemReporter>) {
        let registry = Arc::new(InMemoryDefinitionRegistry::new());
        let reporter = Arc::new(CollectingProblemReporter::new());
        let reader =
            XmlDefinitionReader::new(registry.clone()).with_problem_reporter(reporter.clone());
        reader.load_str("c-namespace", xml).unwrap();
        (registry, reporter)
    }

    #[test]
    fn test_index_and_name_arguments() {
        let (registry, reporter) = load(
            r#"<beans xmlns="http://www.springframework.org/schema/beans"
                      xmlns:c="http://www.springframework.org/schema/c">
                 <bean id="pool" class="pkg.Pool" c:_0="primary" c:max-size="10" c:_1-ref="ds"/>
               </beans>"#,
        );

        assert!(reporter.is_empty());
        let definition = registry.definition("pool").unwrap();
        assert_eq!(definition.constructor_args.len(), 3);
        assert_eq!(
            definition.constructor_arg_at(0).map(|a| &a.value),
            Some(&Value::Literal("primary".to_string()))
        );
        assert_eq!(
            definition.constructor_arg_at(1).map(|a| &a.value),
            Some(&Value::Reference("ds".to_string()))
        );
        assert_eq!(
            definition.constructor_arg_named("maxSize").map(|a| &a.value),
            Some(&Value::Literal("10".to_string()))
        );
    }

    #[test]
    fn test_invalid_and_duplicate_index() {
        let (registry, reporter) = load(
            r#"<beans xmlns="http://www.springframework.org/schema/beans"
                      xmlns:c="http://www.springframework.org/schema/c">
                 <bean id="pool" class="pkg.Pool" c:_x="a" c:_0="b">
                   <constructor-arg index="0" value="explicit"/>
                 </bean>
               </beans>"#,
        );

        assert_eq!(
            reporter.kinds(),
            vec![ProblemKind::Structural, ProblemKind::Structural]
        );
        let definition = registry.definition("pool").unwrap();
        assert_eq!(definition.constructor_args.len(), 1);
    }
}
