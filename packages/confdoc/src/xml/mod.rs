//! XML utilities.

mod utils;

pub use utils::{
    element_children, find_child, find_children, get_attribute, get_tag_name, get_text,
    has_tag, is_default_element, is_default_namespace, is_default_namespace_uri,
    namespace_uri, position, qualified_tag_name,
};
