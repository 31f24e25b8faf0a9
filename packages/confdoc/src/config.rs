//! Vocabulary constants, process-wide defaults and small validation helpers.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::AutowireMode;

/// Namespace URI of the elements this reader interprets natively.
pub const BEANS_NAMESPACE_URI: &str = "http://www.springframework.org/schema/beans";

/// Namespace URI of the inline property shorthand (`p:name="value"`).
pub const P_NAMESPACE_URI: &str = "http://www.springframework.org/schema/p";

/// Namespace URI of the inline constructor-argument shorthand (`c:name="value"`).
pub const C_NAMESPACE_URI: &str = "http://www.springframework.org/schema/c";

/// XML Schema instance namespace (`xsi:schemaLocation` etc.), never dispatched.
pub const XSI_NAMESPACE_URI: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Reserved namespace of the `xml:` prefix (`xml:lang`, `xml:space`, `xml:base`).
pub const XML_NAMESPACE_URI: &str = "http://www.w3.org/XML/1998/namespace";

pub const NESTED_BEANS_ELEMENT: &str = "beans";
pub const BEAN_ELEMENT: &str = "bean";
pub const IMPORT_ELEMENT: &str = "import";
pub const ALIAS_ELEMENT: &str = "alias";
pub const DESCRIPTION_ELEMENT: &str = "description";
pub const META_ELEMENT: &str = "meta";
pub const PROPERTY_ELEMENT: &str = "property";
pub const CONSTRUCTOR_ARG_ELEMENT: &str = "constructor-arg";
pub const REF_ELEMENT: &str = "ref";
pub const IDREF_ELEMENT: &str = "idref";
pub const VALUE_ELEMENT: &str = "value";
pub const NULL_ELEMENT: &str = "null";
pub const LIST_ELEMENT: &str = "list";
pub const SET_ELEMENT: &str = "set";
pub const MAP_ELEMENT: &str = "map";
pub const ENTRY_ELEMENT: &str = "entry";
pub const PROPS_ELEMENT: &str = "props";
pub const PROP_ELEMENT: &str = "prop";

pub const RESOURCE_ATTRIBUTE: &str = "resource";
pub const NAME_ATTRIBUTE: &str = "name";
pub const ALIAS_ATTRIBUTE: &str = "alias";
pub const PROFILE_ATTRIBUTE: &str = "profile";
pub const ID_ATTRIBUTE: &str = "id";
pub const CLASS_ATTRIBUTE: &str = "class";
pub const PARENT_ATTRIBUTE: &str = "parent";
pub const SCOPE_ATTRIBUTE: &str = "scope";
pub const SINGLETON_ATTRIBUTE: &str = "singleton";
pub const ABSTRACT_ATTRIBUTE: &str = "abstract";
pub const LAZY_INIT_ATTRIBUTE: &str = "lazy-init";
pub const AUTOWIRE_ATTRIBUTE: &str = "autowire";
pub const AUTOWIRE_CANDIDATE_ATTRIBUTE: &str = "autowire-candidate";
pub const PRIMARY_ATTRIBUTE: &str = "primary";
pub const DEPENDS_ON_ATTRIBUTE: &str = "depends-on";
pub const INIT_METHOD_ATTRIBUTE: &str = "init-method";
pub const DESTROY_METHOD_ATTRIBUTE: &str = "destroy-method";
pub const FACTORY_METHOD_ATTRIBUTE: &str = "factory-method";
pub const FACTORY_BEAN_ATTRIBUTE: &str = "factory-bean";
pub const INDEX_ATTRIBUTE: &str = "index";
pub const TYPE_ATTRIBUTE: &str = "type";
pub const VALUE_ATTRIBUTE: &str = "value";
pub const REF_ATTRIBUTE: &str = "ref";
pub const BEAN_REF_ATTRIBUTE: &str = "bean";
pub const KEY_ATTRIBUTE: &str = "key";
pub const VALUE_REF_ATTRIBUTE: &str = "value-ref";
pub const MERGE_ATTRIBUTE: &str = "merge";

pub const DEFAULT_LAZY_INIT_ATTRIBUTE: &str = "default-lazy-init";
pub const DEFAULT_MERGE_ATTRIBUTE: &str = "default-merge";
pub const DEFAULT_AUTOWIRE_ATTRIBUTE: &str = "default-autowire";
pub const DEFAULT_AUTOWIRE_CANDIDATES_ATTRIBUTE: &str = "default-autowire-candidates";
pub const DEFAULT_INIT_METHOD_ATTRIBUTE: &str = "default-init-method";
pub const DEFAULT_DESTROY_METHOD_ATTRIBUTE: &str = "default-destroy-method";

/// Attribute value meaning "inherit from the enclosing scope".
pub const DEFAULT_VALUE: &str = "default";
pub const TRUE_VALUE: &str = "true";

/// Delimiters for multi-value attributes (`name`, `profile`, `depends-on`, ...).
pub const MULTI_VALUE_ATTRIBUTE_DELIMITERS: &[char] = &[',', ';', ' '];

/// Prefix matching a location in every configured search root.
pub const ALL_SEARCH_ROOTS_PREFIX: &str = "classpath*:";

/// Prefix matching a location in the first search root that has it.
pub const SEARCH_ROOT_PREFIX: &str = "classpath:";

/// Separator between a class name and the counter of a generated name.
pub const GENERATED_NAME_SEPARATOR: &str = "#";

/// Profile that is active when no profile has been activated explicitly.
pub const DEFAULT_PROFILE: &str = "default";

/// HTTP timeout in seconds for remote imports.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Placeholder pattern: `${key}` or `${key:default}`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
pub static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^{}:]+)(?::([^{}]*))?\}").expect("valid regex"));

/// Wildcard characters recognised in resource locations.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static WILDCARD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[*?\[{]").expect("valid regex"));

/// Process-wide defaults, used when no enclosing scope sets a value.
///
/// Constructed once when the reader is built and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalDefaults {
    pub lazy_init: bool,
    pub merge: bool,
    pub autowire: AutowireMode,
    pub autowire_candidates: Option<Vec<String>>,
    pub init_method: Option<String>,
    pub destroy_method: Option<String>,
}

impl Default for GlobalDefaults {
    fn default() -> Self {
        Self {
            lazy_init: false,
            merge: false,
            autowire: AutowireMode::No,
            autowire_candidates: None,
            init_method: None,
            destroy_method: None,
        }
    }
}

/// Split a multi-value attribute on the recognised delimiters.
///
/// Tokens are trimmed and empty tokens are dropped.
///
/// # Examples
/// ```
/// use confdoc::config::tokenize;
///
/// assert_eq!(tokenize("dev, prod;test"), vec!["dev", "prod", "test"]);
/// assert!(tokenize("  ").is_empty());
/// ```
pub fn tokenize(value: &str) -> Vec<String> {
    value
        .split(MULTI_VALUE_ATTRIBUTE_DELIMITERS)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
        .collect()
}

/// Check whether a string has non-whitespace content.
pub fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Check whether an attribute value defers to the enclosing scope.
pub fn is_default_value(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.is_empty() || v == DEFAULT_VALUE)
}

/// Check whether a resource location contains wildcard characters.
///
/// # Examples
/// ```
/// use confdoc::config::has_wildcard;
///
/// assert!(has_wildcard("conf/*.xml"));
/// assert!(!has_wildcard("conf/app.xml"));
/// ```
pub fn has_wildcard(location: &str) -> bool {
    WILDCARD_PATTERN.is_match(location)
}

/// Match a name against a simple `*` pattern (`*Service`, `repo*`, `*dao*`).
///
/// # Examples
/// ```
/// use confdoc::config::simple_match;
///
/// assert!(simple_match("*Service", "userService"));
/// assert!(simple_match("repo*", "repository"));
/// assert!(!simple_match("*Dao", "userService"));
/// ```
pub fn simple_match(pattern: &str, name: &str) -> bool {
    let Some(first) = pattern.find('*') else {
        return pattern == name;
    };
    if first == 0 {
        if pattern.len() == 1 {
            return true;
        }
        let rest = &pattern[1..];
        return match rest.find('*') {
            None => name.ends_with(rest),
            Some(next) => {
                let part = &rest[..next];
                if part.is_empty() {
                    return simple_match(rest, name);
                }
                let mut offset = 0;
                while let Some(found) = name[offset..].find(part) {
                    let start = offset + found;
                    if simple_match(&rest[next..], &name[start + part.len()..]) {
                        return true;
                    }
                    offset = start + part.chars().next().map_or(1, char::len_utf8);
                }
                false
            }
        };
    }
    match name.get(..first) {
        Some(prefix) if prefix == &pattern[..first] => {
            simple_match(&pattern[first..], &name[first..])
        }
        _ => false,
    }
}

/// Convert an attribute-style name (`first-name`) into a property name (`firstName`).
///
/// # Examples
/// ```
/// use confdoc::config::attribute_to_property_name;
///
/// assert_eq!(attribute_to_property_name("first-name"), "firstName");
/// assert_eq!(attribute_to_property_name("url"), "url");
/// ```
pub fn attribute_to_property_name(attribute: &str) -> String {
    let mut result = String::with_capacity(attribute.len());
    let mut upper_next = false;
    for c in attribute.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next {
            result.extend(c.to_uppercase());
            upper_next = false;
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_all_delimiters() {
        assert_eq!(tokenize("a,b;c d"), vec!["a", "b", "c", "d"]);
        assert_eq!(tokenize(" ,, prod "), vec!["prod"]);
    }

    #[test]
    fn test_is_default_value() {
        assert!(is_default_value(None));
        assert!(is_default_value(Some("")));
        assert!(is_default_value(Some("default")));
        assert!(!is_default_value(Some("true")));
    }

    #[test]
    fn test_has_text() {
        assert!(has_text(Some("x")));
        assert!(!has_text(Some("   ")));
        assert!(!has_text(None));
    }

    #[test]
    fn test_simple_match() {
        assert!(simple_match("*", "anything"));
        assert!(simple_match("*Dao*", "userDaoImpl"));
        assert!(simple_match("user*Impl", "userServiceImpl"));
        assert!(!simple_match("user*Impl", "userService"));
        assert!(simple_match("exact", "exact"));
        assert!(!simple_match("exact", "exactly"));
    }

    #[test]
    fn test_global_defaults() {
        let defaults = GlobalDefaults::default();
        assert!(!defaults.lazy_init);
        assert!(!defaults.merge);
        assert_eq!(defaults.autowire, AutowireMode::No);
        assert!(defaults.init_method.is_none());
    }

    #[test]
    fn test_placeholder_pattern() {
        let caps = PLACEHOLDER_PATTERN.captures("${app.home:/opt}/conf.xml");
        let caps = caps.unwrap();
        assert_eq!(&caps[1], "app.home");
        assert_eq!(caps.get(2).map(|m| m.as_str()), Some("/opt"));
    }
}
