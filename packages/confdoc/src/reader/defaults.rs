//! Inherited default settings of nested scopes.
//!
//! Each `<beans>` element may set `default-*` attributes. A scope that does
//! not set a value (or sets it to `default`) inherits it from the enclosing
//! scope, and the outermost scope falls back to [`GlobalDefaults`].
//! Inheritance is resolved field by field on lookup through a chain of
//! parent references, so nothing is copied when a scope is entered.

use roxmltree::Node;

use crate::config::{
    is_default_value, tokenize, GlobalDefaults, DEFAULT_AUTOWIRE_ATTRIBUTE,
    DEFAULT_AUTOWIRE_CANDIDATES_ATTRIBUTE, DEFAULT_DESTROY_METHOD_ATTRIBUTE,
    DEFAULT_INIT_METHOD_ATTRIBUTE, DEFAULT_LAZY_INIT_ATTRIBUTE, DEFAULT_MERGE_ATTRIBUTE,
    TRUE_VALUE,
};
use crate::types::AutowireMode;
use crate::xml::get_attribute;

/// Default settings declared by one scope, chained to its parent.
#[derive(Debug, Clone)]
pub struct ScopeDefaults<'d> {
    lazy_init: Option<bool>,
    merge: Option<bool>,
    autowire: Option<AutowireMode>,
    autowire_candidates: Option<Vec<String>>,
    init_method: Option<String>,
    destroy_method: Option<String>,
    parent: Option<&'d ScopeDefaults<'d>>,
    globals: &'d GlobalDefaults,
}

impl<'d> ScopeDefaults<'d> {
    /// Defaults of a scope that declares nothing itself.
    #[must_use]
    pub fn root(globals: &'d GlobalDefaults) -> Self {
        Self {
            lazy_init: None,
            merge: None,
            autowire: None,
            autowire_candidates: None,
            init_method: None,
            destroy_method: None,
            parent: None,
            globals,
        }
    }

    /// Read the `default-*` attributes of a scope element.
    #[must_use]
    pub fn from_element(
        element: Node<'_, '_>,
        parent: Option<&'d ScopeDefaults<'d>>,
        globals: &'d GlobalDefaults,
    ) -> Self {
        let flag = |name: &str| {
            let value = get_attribute(element, name);
            (!is_default_value(value)).then(|| value == Some(TRUE_VALUE))
        };
        let text = |name: &str| get_attribute(element, name).map(String::from);

        Self {
            lazy_init: flag(DEFAULT_LAZY_INIT_ATTRIBUTE),
            merge: flag(DEFAULT_MERGE_ATTRIBUTE),
            autowire: get_attribute(element, DEFAULT_AUTOWIRE_ATTRIBUTE)
                .filter(|value| !is_default_value(Some(*value)))
                .map(AutowireMode::from_attribute),
            autowire_candidates: get_attribute(element, DEFAULT_AUTOWIRE_CANDIDATES_ATTRIBUTE)
                .map(tokenize),
            init_method: text(DEFAULT_INIT_METHOD_ATTRIBUTE),
            destroy_method: text(DEFAULT_DESTROY_METHOD_ATTRIBUTE),
            parent,
            globals,
        }
    }

    #[must_use]
    pub fn lazy_init(&self) -> bool {
        self.lazy_init
            .or_else(|| self.parent.map(ScopeDefaults::lazy_init))
            .unwrap_or(self.globals.lazy_init)
    }

    #[must_use]
    pub fn merge(&self) -> bool {
        self.merge
            .or_else(|| self.parent.map(ScopeDefaults::merge))
            .unwrap_or(self.globals.merge)
    }

    #[must_use]
    pub fn autowire(&self) -> AutowireMode {
        self.autowire
            .or_else(|| self.parent.map(ScopeDefaults::autowire))
            .unwrap_or(self.globals.autowire)
    }

    /// Name patterns restricting which components are autowire candidates.
    #[must_use]
    pub fn autowire_candidates(&self) -> Option<&[String]> {
        match &self.autowire_candidates {
            Some(patterns) => Some(patterns),
            None => match self.parent {
                Some(parent) => parent.autowire_candidates(),
                None => self.globals.autowire_candidates.as_deref(),
            },
        }
    }

    #[must_use]
    pub fn init_method(&self) -> Option<&str> {
        match &self.init_method {
            Some(method) => Some(method),
            None => match self.parent {
                Some(parent) => parent.init_method(),
                None => self.globals.init_method.as_deref(),
            },
        }
    }

    #[must_use]
    pub fn destroy_method(&self) -> Option<&str> {
        match &self.destroy_method {
            Some(method) => Some(method),
            None => match self.parent {
                Some(parent) => parent.destroy_method(),
                None => self.globals.destroy_method.as_deref(),
            },
        }
    }

    /// Snapshot of every effective setting.
    #[must_use]
    pub fn resolve(&self) -> ResolvedDefaults {
        ResolvedDefaults {
            lazy_init: self.lazy_init(),
            merge: self.merge(),
            autowire: self.autowire(),
            autowire_candidates: self.autowire_candidates().map(<[String]>::to_vec),
            init_method: self.init_method().map(String::from),
            destroy_method: self.destroy_method().map(String::from),
        }
    }
}

/// Effective default settings of a scope.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ResolvedDefaults {
    pub lazy_init: bool,
    pub merge: bool,
    pub autowire: AutowireMode,
    pub autowire_candidates: Option<Vec<String>>,
    pub init_method: Option<String>,
    pub destroy_method: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use roxmltree::Document;

    #[test]
    fn test_root_uses_globals() {
        let globals = GlobalDefaults::default();
        let defaults = ScopeDefaults::root(&globals).resolve();
        assert_eq!(
            defaults,
            ResolvedDefaults {
                lazy_init: false,
                merge: false,
                autowire: AutowireMode::No,
                autowire_candidates: None,
                init_method: None,
                destroy_method: None,
            }
        );
    }

    #[test]
    fn test_inheritance_is_field_by_field() {
        let xml = r#"<beans default-lazy-init="true" default-init-method="setUp">
                       <beans default-lazy-init="default" default-autowire="byName">
                         <beans default-lazy-init="false" default-init-method="start"/>
                       </beans>
                     </beans>"#;
        let doc = Document::parse(xml).unwrap();
        let outer_el = doc.root_element();
        let middle_el = outer_el.first_element_child().unwrap();
        let inner_el = middle_el.first_element_child().unwrap();

        let globals = GlobalDefaults::default();
        let outer = ScopeDefaults::from_element(outer_el, None, &globals);
        let middle = ScopeDefaults::from_element(middle_el, Some(&outer), &globals);
        let inner = ScopeDefaults::from_element(inner_el, Some(&middle), &globals);

        assert!(outer.lazy_init());
        assert!(middle.lazy_init());
        assert_eq!(middle.autowire(), AutowireMode::ByName);
        assert_eq!(middle.init_method(), Some("setUp"));

        assert!(!inner.lazy_init());
        assert_eq!(inner.autowire(), AutowireMode::ByName);
        assert_eq!(inner.init_method(), Some("start"));
        assert!(!inner.merge());
    }

    #[test]
    fn test_autowire_candidates_tokenized() {
        let xml = r#"<beans default-autowire-candidates="*Service, *Repository"/>"#;
        let doc = Document::parse(xml).unwrap();
        let globals = GlobalDefaults::default();
        let defaults = ScopeDefaults::from_element(doc.root_element(), None, &globals);
        assert_eq!(
            defaults.autowire_candidates(),
            Some(&["*Service".to_string(), "*Repository".to_string()][..])
        );
    }
}
