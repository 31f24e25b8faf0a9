//! XML utility functions for navigating and classifying DOM nodes.

use roxmltree::Node;

use crate::config::BEANS_NAMESPACE_URI;

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use confdoc::xml::get_tag_name;
///
/// let xml = r#"<beans><bean id="a"/></beans>"#;
/// let doc = Document::parse(xml).unwrap();
/// let bean = doc.root_element().first_element_child().unwrap();
/// assert_eq!(get_tag_name(bean), "bean");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Get the tag name as written, including the namespace prefix if any.
///
/// Used for diagnostics only.
pub fn qualified_tag_name(node: Node<'_, '_>) -> String {
    let name = get_tag_name(node);
    match node
        .tag_name()
        .namespace()
        .and_then(|uri| node.lookup_prefix(uri))
    {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{name}"),
        _ => name.to_string(),
    }
}

/// Get the resolved namespace URI of an element.
pub fn namespace_uri<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.tag_name().namespace()
}

/// Check whether a namespace URI is the default (natively interpreted) one.
///
/// A missing namespace counts as default, which covers unqualified documents.
pub fn is_default_namespace_uri(uri: Option<&str>) -> bool {
    uri.is_none_or(|uri| uri.is_empty() || uri == BEANS_NAMESPACE_URI)
}

/// Check whether an element belongs to the default namespace.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use confdoc::xml::is_default_namespace;
///
/// let xml = r#"<beans xmlns="http://www.springframework.org/schema/beans"
///                     xmlns:x="http://example.com/x"><x:thing/></beans>"#;
/// let doc = Document::parse(xml).unwrap();
/// let root = doc.root_element();
/// assert!(is_default_namespace(root));
/// assert!(!is_default_namespace(root.first_element_child().unwrap()));
/// ```
pub fn is_default_namespace(node: Node<'_, '_>) -> bool {
    is_default_namespace_uri(namespace_uri(node))
}

/// Check if a node is an element with the given local name.
pub fn has_tag(node: Node<'_, '_>, tag: &str) -> bool {
    node.is_element() && get_tag_name(node) == tag
}

/// Check if a node is a default-namespace element with the given local name.
pub fn is_default_element(node: Node<'_, '_>, tag: &str) -> bool {
    has_tag(node, tag) && is_default_namespace(node)
}

/// Find the first child element with the given tag name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use confdoc::xml::find_child;
///
/// let xml = r#"<bean><description>x</description><property name="a"/></bean>"#;
/// let doc = Document::parse(xml).unwrap();
/// let root = doc.root_element();
///
/// assert!(find_child(root, "description").is_some());
/// assert!(find_child(root, "missing").is_none());
/// ```
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| has_tag(*child, tag))
}

/// Find all child elements with the given tag name.
pub fn find_children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |child| has_tag(*child, tag))
}

/// Get the text content of a node, trimmed.
///
/// Text of nested elements is included; comments are not.
pub fn get_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Get an attribute value with surrounding whitespace removed.
///
/// Returns `None` for missing as well as blank attributes.
pub fn get_attribute<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Get all element children of a node.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

/// Get the 1-based line and column of a node in its document.
pub fn position(node: Node<'_, '_>) -> (u32, u32) {
    let pos = node.document().text_pos_at(node.range().start);
    (pos.row, pos.col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    #[test]
    fn test_get_tag_name_with_namespace() {
        let xml = r#"<ns:root xmlns:ns="http://example.com"><ns:child/></ns:root>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_tag_name(doc.root_element()), "root");
    }

    #[test]
    fn test_qualified_tag_name() {
        let xml = r#"<beans xmlns:cache="http://example.com/cache"><cache:region/></beans>"#;
        let doc = Document::parse(xml).unwrap();
        let region = doc.root_element().first_element_child().unwrap();
        assert_eq!(qualified_tag_name(region), "cache:region");
        assert_eq!(qualified_tag_name(doc.root_element()), "beans");
    }

    #[test]
    fn test_unqualified_is_default_namespace() {
        let xml = r#"<beans><bean/></beans>"#;
        let doc = Document::parse(xml).unwrap();
        assert!(is_default_namespace(doc.root_element()));
    }

    #[test]
    fn test_foreign_namespace_is_not_default() {
        let xml = r#"<x:beans xmlns:x="http://example.com/x"/>"#;
        let doc = Document::parse(xml).unwrap();
        assert!(!is_default_namespace(doc.root_element()));
        assert!(!is_default_element(doc.root_element(), "beans"));
    }

    #[test]
    fn test_find_children() {
        let xml = r#"<bean><property/><meta/><property/></bean>"#;
        let doc = Document::parse(xml).unwrap();
        let items: Vec<_> = find_children(doc.root_element(), "property").collect();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_get_text() {
        let xml = r#"<value>  trimmed <!-- note --> text  </value>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_text(doc.root_element()), "trimmed  text");
    }

    #[test]
    fn test_get_attribute_blank_is_none() {
        let xml = r#"<bean id="  svc " name="  "/>"#;
        let doc = Document::parse(xml).unwrap();
        let root = doc.root_element();

        assert_eq!(get_attribute(root, "id"), Some("svc"));
        assert_eq!(get_attribute(root, "name"), None);
        assert_eq!(get_attribute(root, "missing"), None);
    }

    #[test]
    fn test_element_children() {
        let xml = r#"<beans>text<bean/>more<!-- c --><alias/></beans>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(element_children(doc.root_element()).count(), 2);
    }

    #[test]
    fn test_position() {
        let xml = "<beans>\n  <bean/>\n</beans>";
        let doc = Document::parse(xml).unwrap();
        let bean = doc.root_element().first_element_child().unwrap();
        assert_eq!(position(bean), (2, 3));
    }
}
