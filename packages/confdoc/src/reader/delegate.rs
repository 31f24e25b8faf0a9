//! Parsing of component elements and dispatch to namespace handlers.

use std::cell::RefCell;
use std::collections::HashSet;

use indexmap::IndexMap;
use roxmltree::Node;

use super::context::ReaderContext;
use super::defaults::ScopeDefaults;
use crate::config::{
    has_text, is_default_value, simple_match, tokenize, ABSTRACT_ATTRIBUTE,
    AUTOWIRE_ATTRIBUTE, AUTOWIRE_CANDIDATE_ATTRIBUTE, BEAN_ELEMENT, BEAN_REF_ATTRIBUTE,
    CLASS_ATTRIBUTE, CONSTRUCTOR_ARG_ELEMENT, DEPENDS_ON_ATTRIBUTE, DESCRIPTION_ELEMENT,
    DESTROY_METHOD_ATTRIBUTE, ENTRY_ELEMENT, FACTORY_BEAN_ATTRIBUTE, FACTORY_METHOD_ATTRIBUTE,
    GENERATED_NAME_SEPARATOR, ID_ATTRIBUTE, IDREF_ELEMENT, INDEX_ATTRIBUTE,
    INIT_METHOD_ATTRIBUTE, KEY_ATTRIBUTE, LAZY_INIT_ATTRIBUTE, LIST_ELEMENT, MAP_ELEMENT,
    MERGE_ATTRIBUTE, META_ELEMENT, NAME_ATTRIBUTE, NULL_ELEMENT, PARENT_ATTRIBUTE,
    PRIMARY_ATTRIBUTE, PROPERTY_ELEMENT, PROPS_ELEMENT, PROP_ELEMENT, REF_ATTRIBUTE,
    REF_ELEMENT, SCOPE_ATTRIBUTE, SET_ELEMENT, SINGLETON_ATTRIBUTE, TRUE_VALUE,
    TYPE_ATTRIBUTE, VALUE_ATTRIBUTE, VALUE_ELEMENT, VALUE_REF_ATTRIBUTE,
};
use crate::error::{ReaderError, Result};
use crate::namespace::DecorationTarget;
use crate::types::{AutowireMode, ConstructorArg, Definition, DefinitionHolder, Value};
use crate::xml::{
    element_children, get_attribute, get_tag_name, get_text, has_tag, is_default_element,
    is_default_namespace, is_default_namespace_uri, namespace_uri, qualified_tag_name,
};

/// Parser for the elements of one scope level.
///
/// Holds the scope's [`ScopeDefaults`] (chained to the enclosing scope's)
/// and the names already used at this level.
pub struct ElementDelegate<'d> {
    ctx: &'d ReaderContext<'d>,
    defaults: ScopeDefaults<'d>,
    used_names: RefCell<HashSet<String>>,
}

impl<'d> ElementDelegate<'d> {
    /// Create the delegate for a scope element and announce its defaults.
    #[must_use]
    pub fn new(
        ctx: &'d ReaderContext<'d>,
        root: Node<'_, '_>,
        parent: Option<&'d ScopeDefaults<'d>>,
    ) -> Self {
        let defaults = ScopeDefaults::from_element(root, parent, ctx.globals());
        ctx.fire_defaults_registered(defaults.resolve(), root);
        Self {
            ctx,
            defaults,
            used_names: RefCell::new(HashSet::new()),
        }
    }

    #[must_use]
    pub fn context(&self) -> &'d ReaderContext<'d> {
        self.ctx
    }

    #[must_use]
    pub fn defaults(&self) -> &ScopeDefaults<'d> {
        &self.defaults
    }

    /// Check whether a node belongs to the default namespace.
    #[must_use]
    pub fn is_default_namespace(&self, node: Node<'_, '_>) -> bool {
        is_default_namespace(node)
    }

    /// Parse a top-level `<bean>` element.
    ///
    /// Returns `Ok(None)` when the element was rejected; the reason has
    /// been reported.
    pub fn parse_component(&self, element: Node<'_, '_>) -> Result<Option<DefinitionHolder>> {
        self.parse_component_element(element, false)
    }

    /// Parse a `<bean>` nested inside a value.
    ///
    /// Inner components are not checked for name uniqueness and get
    /// generated names with a unique hex suffix.
    pub fn parse_inner_component(
        &self,
        element: Node<'_, '_>,
    ) -> Result<Option<DefinitionHolder>> {
        self.parse_component_element(element, true)
    }

    fn parse_component_element(
        &self,
        element: Node<'_, '_>,
        inner: bool,
    ) -> Result<Option<DefinitionHolder>> {
        let id = get_attribute(element, ID_ATTRIBUTE);
        let mut aliases = get_attribute(element, NAME_ATTRIBUTE)
            .map(tokenize)
            .unwrap_or_default();

        let mut name = id.map(String::from);
        if name.is_none() && !aliases.is_empty() {
            let first = aliases.remove(0);
            tracing::debug!(
                name = %first,
                aliases = ?aliases,
                "No id specified, using first name as component name"
            );
            name = Some(first);
        }

        if !inner {
            if let Some(name) = &name {
                if !self.check_name_uniqueness(name, &aliases, element)? {
                    return Ok(None);
                }
            }
        }

        let Some(definition) = self.parse_definition(element, name.as_deref())? else {
            return Ok(None);
        };

        let name = match name {
            Some(name) => name,
            None => {
                let Some(generated) = self.generate_name(&definition, inner) else {
                    self.error(
                        element,
                        "Unnamed component definition specifies neither 'class' nor 'parent' nor 'factory-bean', cannot generate a name",
                    )?;
                    return Ok(None);
                };
                if !inner {
                    if let Some(class_name) = &definition.class_name {
                        if generated.starts_with(class_name.as_str())
                            && generated.len() > class_name.len()
                            && !self.ctx.registry().is_name_in_use(class_name)
                        {
                            aliases.push(class_name.clone());
                        }
                    }
                }
                tracing::debug!(name = %generated, "Generated component name");
                generated
            }
        };

        Ok(Some(DefinitionHolder::new(name, definition).with_aliases(aliases)))
    }

    /// Names and aliases must be unique within one scope level.
    fn check_name_uniqueness(
        &self,
        name: &str,
        aliases: &[String],
        element: Node<'_, '_>,
    ) -> Result<bool> {
        let mut used = self.used_names.borrow_mut();
        let clash = std::iter::once(name)
            .chain(aliases.iter().map(String::as_str))
            .find(|candidate| used.contains(*candidate))
            .map(String::from);
        if let Some(clash) = clash {
            drop(used);
            self.error(
                element,
                format!("Component name '{clash}' is already used in this <beans> element"),
            )?;
            return Ok(false);
        }
        used.insert(name.to_string());
        used.extend(aliases.iter().cloned());
        Ok(true)
    }

    fn generate_name(&self, definition: &Definition, inner: bool) -> Option<String> {
        let base = definition
            .class_name
            .clone()
            .or_else(|| definition.parent_name.as_ref().map(|p| format!("{p}$child")))
            .or_else(|| {
                definition
                    .factory_bean
                    .as_ref()
                    .map(|f| format!("{f}$created"))
            })?;

        let prefix = format!("{base}{GENERATED_NAME_SEPARATOR}");
        if inner {
            return Some(format!("{prefix}{:x}", self.ctx.next_inner_id()));
        }
        let registry = self.ctx.registry();
        let mut counter = 0usize;
        loop {
            let candidate = format!("{prefix}{counter}");
            if !registry.contains_definition(&candidate) {
                return Some(candidate);
            }
            counter += 1;
        }
    }

    fn parse_definition(
        &self,
        element: Node<'_, '_>,
        name: Option<&str>,
    ) -> Result<Option<Definition>> {
        let mut definition = Definition {
            class_name: get_attribute(element, CLASS_ATTRIBUTE).map(String::from),
            parent_name: get_attribute(element, PARENT_ATTRIBUTE).map(String::from),
            resource: Some(self.ctx.resource().description().to_string()),
            ..Definition::default()
        };

        self.parse_definition_attributes(element, name, &mut definition)?;

        if !definition.is_abstract
            && definition.class_name.is_none()
            && definition.parent_name.is_none()
            && definition.factory_bean.is_none()
        {
            self.error(
                element,
                "Component definition must specify a 'class', a 'parent' or a 'factory-bean' unless it is abstract",
            )?;
            return Ok(None);
        }

        definition.description = element_children(element)
            .find(|child| is_default_element(*child, DESCRIPTION_ELEMENT))
            .map(get_text);

        let mut valid = true;
        for child in element_children(element) {
            if !is_default_namespace(child) {
                continue;
            }
            valid &= match get_tag_name(child) {
                META_ELEMENT => self.parse_meta_element(child, &mut definition)?,
                CONSTRUCTOR_ARG_ELEMENT => self.parse_constructor_arg_element(child, &mut definition)?,
                PROPERTY_ELEMENT => self.parse_property_element(child, &mut definition)?,
                _ => true,
            };
        }

        Ok(valid.then_some(definition))
    }

    fn parse_definition_attributes(
        &self,
        element: Node<'_, '_>,
        name: Option<&str>,
        definition: &mut Definition,
    ) -> Result<()> {
        if element.has_attribute(SINGLETON_ATTRIBUTE) {
            self.error(
                element,
                "Old 'singleton' attribute in use, use a 'scope' declaration instead",
            )?;
        }
        definition.scope = get_attribute(element, SCOPE_ATTRIBUTE).map(String::from);
        definition.is_abstract = get_attribute(element, ABSTRACT_ATTRIBUTE) == Some(TRUE_VALUE);

        let lazy_init = get_attribute(element, LAZY_INIT_ATTRIBUTE);
        definition.lazy_init = if is_default_value(lazy_init) {
            self.defaults.lazy_init()
        } else {
            lazy_init == Some(TRUE_VALUE)
        };

        let autowire = get_attribute(element, AUTOWIRE_ATTRIBUTE);
        definition.autowire = match autowire {
            Some(value) if !is_default_value(Some(value)) => AutowireMode::from_attribute(value),
            _ => self.defaults.autowire(),
        };

        definition.depends_on = get_attribute(element, DEPENDS_ON_ATTRIBUTE)
            .map(tokenize)
            .unwrap_or_default();

        let candidate = get_attribute(element, AUTOWIRE_CANDIDATE_ATTRIBUTE);
        definition.autowire_candidate = if is_default_value(candidate) {
            match self.defaults.autowire_candidates() {
                Some(patterns) => name.is_some_and(|name| {
                    patterns.iter().any(|pattern| simple_match(pattern, name))
                }),
                None => true,
            }
        } else {
            candidate == Some(TRUE_VALUE)
        };

        definition.primary = get_attribute(element, PRIMARY_ATTRIBUTE) == Some(TRUE_VALUE);

        definition.init_method = match get_attribute(element, INIT_METHOD_ATTRIBUTE) {
            Some(method) => Some(method.to_string()),
            None => self.defaults.init_method().map(String::from),
        };
        definition.destroy_method = match get_attribute(element, DESTROY_METHOD_ATTRIBUTE) {
            Some(method) => Some(method.to_string()),
            None => self.defaults.destroy_method().map(String::from),
        };

        definition.factory_method =
            get_attribute(element, FACTORY_METHOD_ATTRIBUTE).map(String::from);
        definition.factory_bean = get_attribute(element, FACTORY_BEAN_ATTRIBUTE).map(String::from);
        Ok(())
    }

    fn parse_meta_element(&self, element: Node<'_, '_>, definition: &mut Definition) -> Result<bool> {
        let Some(key) = get_attribute(element, KEY_ATTRIBUTE) else {
            self.error(element, "Tag 'meta' must have a 'key' attribute")?;
            return Ok(false);
        };
        let value = element.attribute(VALUE_ATTRIBUTE).unwrap_or_default();
        definition
            .attributes
            .insert(key.to_string(), value.to_string());
        Ok(true)
    }

    fn parse_constructor_arg_element(
        &self,
        element: Node<'_, '_>,
        definition: &mut Definition,
    ) -> Result<bool> {
        let index = match get_attribute(element, INDEX_ATTRIBUTE) {
            Some(text) => match text.parse::<usize>() {
                Ok(index) => Some(index),
                Err(_) => {
                    self.error(
                        element,
                        "Attribute 'index' of tag 'constructor-arg' must be a non-negative integer",
                    )?;
                    return Ok(false);
                }
            },
            None => None,
        };
        if let Some(index) = index {
            if definition.constructor_arg_at(index).is_some() {
                self.error(
                    element,
                    format!("Ambiguous constructor-arg entries for index {index}"),
                )?;
                return Ok(false);
            }
        }

        let Some(value) = self.parse_property_value(element, None)? else {
            return Ok(false);
        };
        definition.constructor_args.push(ConstructorArg {
            index,
            name: get_attribute(element, NAME_ATTRIBUTE).map(String::from),
            type_name: get_attribute(element, TYPE_ATTRIBUTE).map(String::from),
            value,
        });
        Ok(true)
    }

    fn parse_property_element(
        &self,
        element: Node<'_, '_>,
        definition: &mut Definition,
    ) -> Result<bool> {
        let Some(name) = get_attribute(element, NAME_ATTRIBUTE) else {
            self.error(element, "Tag 'property' must have a 'name' attribute")?;
            return Ok(false);
        };
        if definition.has_property(name) {
            self.error(
                element,
                format!("Multiple 'property' definitions for property '{name}'"),
            )?;
            return Ok(false);
        }
        let Some(value) = self.parse_property_value(element, Some(name))? else {
            return Ok(false);
        };
        definition.set_property(name, value);
        Ok(true)
    }

    /// Parse the value of a `<property>` or `<constructor-arg>`.
    fn parse_property_value(
        &self,
        element: Node<'_, '_>,
        property_name: Option<&str>,
    ) -> Result<Option<Value>> {
        let element_name = match property_name {
            Some(name) => format!("<property> element for property '{name}'"),
            None => "<constructor-arg> element".to_string(),
        };

        let mut sub_elements = element_children(element).filter(|child| {
            !is_default_element(*child, DESCRIPTION_ELEMENT) && !is_default_element(*child, META_ELEMENT)
        });
        let sub_element = sub_elements.next();
        if sub_elements.next().is_some() {
            self.error(
                element,
                format!("{element_name} must not contain more than one sub-element"),
            )?;
            return Ok(None);
        }

        let reference = element.attribute(REF_ATTRIBUTE);
        let literal = element.attribute(VALUE_ATTRIBUTE);
        let attribute_count = usize::from(reference.is_some()) + usize::from(literal.is_some());
        if attribute_count > 1 || (attribute_count == 1 && sub_element.is_some()) {
            self.error(
                element,
                format!("{element_name} is only allowed to contain either 'ref' attribute OR 'value' attribute OR sub-element"),
            )?;
            return Ok(None);
        }

        if let Some(reference) = reference {
            if !has_text(Some(reference)) {
                self.error(element, format!("{element_name} contains empty 'ref' attribute"))?;
                return Ok(None);
            }
            return Ok(Some(Value::Reference(reference.trim().to_string())));
        }
        if let Some(literal) = literal {
            return Ok(Some(Value::Literal(literal.to_string())));
        }
        if let Some(sub_element) = sub_element {
            return self.parse_sub_element(sub_element);
        }

        self.error(element, format!("{element_name} must specify a ref or value"))?;
        Ok(None)
    }

    /// Parse a value element: `ref`, `idref`, `value`, `null`, a collection,
    /// an inner `bean` or a custom element.
    pub fn parse_sub_element(&self, element: Node<'_, '_>) -> Result<Option<Value>> {
        if !self.is_default_namespace(element) {
            let Some(holder) = self.parse_custom_element(element)? else {
                return Ok(None);
            };
            return Ok(Some(Value::Inner(Box::new(holder))));
        }

        match get_tag_name(element) {
            BEAN_ELEMENT => {
                let Some(holder) = self.parse_inner_component(element)? else {
                    return Ok(None);
                };
                let holder = self.decorate(element, holder)?;
                Ok(Some(Value::Inner(Box::new(holder))))
            }
            REF_ELEMENT => {
                let target = get_attribute(element, BEAN_REF_ATTRIBUTE)
                    .or_else(|| get_attribute(element, PARENT_ATTRIBUTE));
                match target {
                    Some(target) => Ok(Some(Value::Reference(target.to_string()))),
                    None => {
                        self.error(element, "'bean' or 'parent' is required for <ref> element")?;
                        Ok(None)
                    }
                }
            }
            IDREF_ELEMENT => match get_attribute(element, BEAN_REF_ATTRIBUTE) {
                Some(target) => Ok(Some(Value::Literal(target.to_string()))),
                None => {
                    self.error(element, "'bean' is required for <idref> element")?;
                    Ok(None)
                }
            },
            VALUE_ELEMENT => Ok(Some(Value::Literal(raw_text(element)))),
            NULL_ELEMENT => Ok(Some(Value::Null)),
            LIST_ELEMENT => Ok(Some(Value::List {
                items: self.parse_collection_items(element)?,
                merge: self.parse_merge(element),
            })),
            SET_ELEMENT => Ok(Some(Value::Set {
                items: self.parse_collection_items(element)?,
                merge: self.parse_merge(element),
            })),
            MAP_ELEMENT => Ok(self.parse_map_element(element)?.map(|entries| Value::Map {
                entries,
                merge: self.parse_merge(element),
            })),
            PROPS_ELEMENT => Ok(self.parse_props_element(element)?.map(|entries| Value::Map {
                entries,
                merge: self.parse_merge(element),
            })),
            _ => {
                self.error(
                    element,
                    format!("Unknown property sub-element: [<{}>]", qualified_tag_name(element)),
                )?;
                Ok(None)
            }
        }
    }

    fn parse_merge(&self, element: Node<'_, '_>) -> bool {
        let merge = get_attribute(element, MERGE_ATTRIBUTE);
        if is_default_value(merge) {
            self.defaults.merge()
        } else {
            merge == Some(TRUE_VALUE)
        }
    }

    fn parse_collection_items(&self, element: Node<'_, '_>) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        for child in element_children(element) {
            if is_default_element(child, DESCRIPTION_ELEMENT) {
                continue;
            }
            if let Some(item) = self.parse_sub_element(child)? {
                items.push(item);
            }
        }
        Ok(items)
    }

    fn parse_map_element(&self, element: Node<'_, '_>) -> Result<Option<IndexMap<String, Value>>> {
        let mut entries = IndexMap::new();
        for entry in element_children(element).filter(|child| is_default_element(*child, ENTRY_ELEMENT)) {
            let Some(key) = get_attribute(entry, KEY_ATTRIBUTE) else {
                self.error(entry, "<entry> element must specify a 'key' attribute")?;
                return Ok(None);
            };

            let literal = entry.attribute(VALUE_ATTRIBUTE);
            let reference = get_attribute(entry, VALUE_REF_ATTRIBUTE);
            let sub_element = element_children(entry)
                .find(|child| !is_default_element(*child, DESCRIPTION_ELEMENT));
            let sources = usize::from(literal.is_some())
                + usize::from(reference.is_some())
                + usize::from(sub_element.is_some());
            if sources > 1 {
                self.error(
                    entry,
                    "<entry> element is only allowed to contain either 'value' attribute OR 'value-ref' attribute OR a value sub-element",
                )?;
                return Ok(None);
            }

            let value = if let Some(literal) = literal {
                Value::Literal(literal.to_string())
            } else if let Some(reference) = reference {
                Value::Reference(reference.to_string())
            } else if let Some(sub_element) = sub_element {
                match self.parse_sub_element(sub_element)? {
                    Some(value) => value,
                    None => return Ok(None),
                }
            } else {
                self.error(entry, "<entry> element must specify a value")?;
                return Ok(None);
            };
            entries.insert(key.to_string(), value);
        }
        Ok(Some(entries))
    }

    fn parse_props_element(&self, element: Node<'_, '_>) -> Result<Option<IndexMap<String, Value>>> {
        let mut entries = IndexMap::new();
        for prop in element_children(element).filter(|child| has_tag(*child, PROP_ELEMENT)) {
            let Some(key) = get_attribute(prop, KEY_ATTRIBUTE) else {
                self.error(prop, "<prop> element must specify a 'key' attribute")?;
                return Ok(None);
            };
            entries.insert(key.to_string(), Value::Literal(get_text(prop)));
        }
        Ok(Some(entries))
    }

    /// Let namespace handlers decorate a parsed component.
    ///
    /// Attributes are visited first, then child elements, each in document
    /// order. Every handler receives the holder returned by the previous one.
    pub fn decorate(
        &self,
        element: Node<'_, '_>,
        holder: DefinitionHolder,
    ) -> Result<DefinitionHolder> {
        let mut holder = holder;
        for attribute in element.attributes() {
            holder = self.decorate_if_required(
                &DecorationTarget::Attribute {
                    owner: element,
                    attribute,
                },
                holder,
            )?;
        }
        for child in element_children(element) {
            holder = self.decorate_if_required(&DecorationTarget::Element(child), holder)?;
        }
        Ok(holder)
    }

    fn decorate_if_required(
        &self,
        target: &DecorationTarget<'_, '_>,
        holder: DefinitionHolder,
    ) -> Result<DefinitionHolder> {
        let Some(uri) = target.namespace() else {
            return Ok(holder);
        };
        if is_default_namespace_uri(Some(uri)) {
            return Ok(holder);
        }
        let handlers = self.ctx.namespace_handlers();
        if handlers.is_ignored(uri) {
            return Ok(holder);
        }
        match handlers.resolve(uri) {
            Some(handler) => handler.decorate(target, holder, self),
            None => {
                self.ctx.error(
                    target.node(),
                    ReaderError::UnrecognizedExtension {
                        namespace: uri.to_string(),
                        element: target.display_name(),
                    },
                )?;
                Ok(holder)
            }
        }
    }

    /// Hand an element from a non-default namespace to its handler.
    ///
    /// Elements in ignored namespaces are skipped silently; elements without
    /// a handler are reported.
    pub fn parse_custom_element(&self, element: Node<'_, '_>) -> Result<Option<DefinitionHolder>> {
        let Some(uri) = namespace_uri(element) else {
            return Ok(None);
        };
        let handlers = self.ctx.namespace_handlers();
        if handlers.is_ignored(uri) {
            return Ok(None);
        }
        match handlers.resolve(uri) {
            Some(handler) => handler.parse(element, self),
            None => {
                self.ctx.error(
                    element,
                    ReaderError::UnrecognizedExtension {
                        namespace: uri.to_string(),
                        element: qualified_tag_name(element),
                    },
                )?;
                Ok(None)
            }
        }
    }

    fn error(&self, node: Node<'_, '_>, message: impl Into<String>) -> Result<()> {
        self.ctx.error(node, ReaderError::structural(message))
    }
}

/// Text content of an element, untrimmed.
fn raw_text(element: Node<'_, '_>) -> String {
    element
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}
