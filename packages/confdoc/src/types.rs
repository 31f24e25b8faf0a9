//! Core data types for component definitions.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

/// Autowiring mode of a component definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AutowireMode {
    #[default]
    No,
    ByName,
    ByType,
    Constructor,
}

impl AutowireMode {
    /// Parse the attribute spelling of an autowire mode.
    ///
    /// Unknown values fall back to [`AutowireMode::No`].
    #[must_use]
    pub fn from_attribute(value: &str) -> Self {
        match value {
            "byName" => Self::ByName,
            "byType" => Self::ByType,
            "constructor" => Self::Constructor,
            _ => Self::No,
        }
    }

    /// Attribute spelling of this mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::No => "no",
            Self::ByName => "byName",
            Self::ByType => "byType",
            Self::Constructor => "constructor",
        }
    }
}

/// A value assigned to a property or constructor argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Literal string, converted by the runtime.
    Literal(String),
    /// Reference to another definition by name.
    Reference(String),
    /// Explicit null.
    Null,
    /// Ordered collection.
    List { items: Vec<Value>, merge: bool },
    /// Collection with set semantics (left to the runtime).
    Set { items: Vec<Value>, merge: bool },
    /// Keyed collection, insertion ordered.
    Map {
        entries: IndexMap<String, Value>,
        merge: bool,
    },
    /// Anonymous inner component.
    Inner(Box<DefinitionHolder>),
}

/// Named property assignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyValue {
    pub name: String,
    pub value: Value,
}

/// Constructor argument, addressed by index, by name or by position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstructorArg {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    pub value: Value,
}

impl ConstructorArg {
    /// Create a positional argument.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self {
            index: None,
            name: None,
            type_name: None,
            value,
        }
    }

    /// Address the argument by index.
    #[must_use]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Address the argument by parameter name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Construction recipe of one component.
///
/// The reader only produces, decorates and registers definitions; it never
/// instantiates them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    #[serde(rename = "class", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(rename = "parent", skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub is_abstract: bool,
    pub lazy_init: bool,
    pub autowire: AutowireMode,
    pub autowire_candidate: bool,
    pub primary: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destroy_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factory_bean: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factory_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constructor_args: Vec<ConstructorArg>,
    /// Free-form metadata from `<meta>` elements and decorators.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,
    /// Description of the resource the definition was read from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
}

impl Default for Definition {
    fn default() -> Self {
        Self {
            class_name: None,
            parent_name: None,
            scope: None,
            is_abstract: false,
            lazy_init: false,
            autowire: AutowireMode::No,
            autowire_candidate: true,
            primary: false,
            depends_on: Vec::new(),
            init_method: None,
            destroy_method: None,
            factory_bean: None,
            factory_method: None,
            description: None,
            properties: Vec::new(),
            constructor_args: Vec::new(),
            attributes: IndexMap::new(),
            resource: None,
        }
    }
}

impl Definition {
    /// Create an empty definition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a definition for a class.
    #[must_use]
    pub fn for_class(class_name: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            ..Self::default()
        }
    }

    /// Look up a property value by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    /// Check whether a property is already assigned.
    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p.name == name)
    }

    /// Assign a property, replacing an earlier assignment of the same name.
    pub fn set_property(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(existing) = self.properties.iter_mut().find(|p| p.name == name) {
            existing.value = value;
        } else {
            self.properties.push(PropertyValue { name, value });
        }
    }

    /// Look up a constructor argument by index.
    #[must_use]
    pub fn constructor_arg_at(&self, index: usize) -> Option<&ConstructorArg> {
        self.constructor_args
            .iter()
            .find(|arg| arg.index == Some(index))
    }

    /// Look up a constructor argument by parameter name.
    #[must_use]
    pub fn constructor_arg_named(&self, name: &str) -> Option<&ConstructorArg> {
        self.constructor_args
            .iter()
            .find(|arg| arg.name.as_deref() == Some(name))
    }
}

/// A definition together with its primary name and aliases.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefinitionHolder {
    name: String,
    definition: Definition,
    aliases: IndexSet<String>,
}

impl DefinitionHolder {
    /// Create a holder without aliases.
    #[must_use]
    pub fn new(name: impl Into<String>, definition: Definition) -> Self {
        Self {
            name: name.into(),
            definition,
            aliases: IndexSet::new(),
        }
    }

    /// Attach aliases; duplicates and the primary name itself are dropped.
    #[must_use]
    pub fn with_aliases(mut self, aliases: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for alias in aliases {
            let alias = alias.into();
            if alias != self.name {
                self.aliases.insert(alias);
            }
        }
        self
    }

    /// Primary name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The definition payload.
    #[must_use]
    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// Mutable access for decorators.
    pub fn definition_mut(&mut self) -> &mut Definition {
        &mut self.definition
    }

    /// Aliases in declaration order.
    #[must_use]
    pub fn aliases(&self) -> &IndexSet<String> {
        &self.aliases
    }

    /// Check whether the holder answers to a name (primary or alias).
    #[must_use]
    pub fn matches_name(&self, candidate: &str) -> bool {
        self.name == candidate || self.aliases.contains(candidate)
    }

    /// Split the holder into its parts.
    #[must_use]
    pub fn into_parts(self) -> (String, Definition, IndexSet<String>) {
        (self.name, self.definition, self.aliases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_autowire_from_attribute() {
        assert_eq!(AutowireMode::from_attribute("byName"), AutowireMode::ByName);
        assert_eq!(AutowireMode::from_attribute("byType"), AutowireMode::ByType);
        assert_eq!(
            AutowireMode::from_attribute("constructor"),
            AutowireMode::Constructor
        );
        assert_eq!(AutowireMode::from_attribute("bogus"), AutowireMode::No);
    }

    #[test]
    fn test_holder_aliases_are_ordered_and_unique() {
        let holder = DefinitionHolder::new("svc", Definition::for_class("pkg.Svc"))
            .with_aliases(["service", "svc", "main", "service"]);
        let aliases: Vec<&str> = holder.aliases().iter().map(String::as_str).collect();
        assert_eq!(aliases, vec!["service", "main"]);
        assert!(holder.matches_name("main"));
        assert!(!holder.matches_name("other"));
    }

    #[test]
    fn test_set_property_replaces() {
        let mut def = Definition::for_class("pkg.Svc");
        def.set_property("url", Value::Literal("a".to_string()));
        def.set_property("url", Value::Literal("b".to_string()));
        assert_eq!(def.properties.len(), 1);
        assert_eq!(def.property("url"), Some(&Value::Literal("b".to_string())));
    }

    #[test]
    fn test_definition_defaults() {
        let def = Definition::new();
        assert!(def.autowire_candidate);
        assert!(!def.lazy_init);
        assert_eq!(def.autowire, AutowireMode::No);
    }
}
