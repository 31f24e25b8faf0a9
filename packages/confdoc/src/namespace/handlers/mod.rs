//! Built-in handlers for the shorthand `p` and `c` namespaces.

mod constructor;
mod property;

pub use constructor::ConstructorNamespaceHandler;
pub use property::PropertyNamespaceHandler;

/// Attribute suffix marking a reference instead of a literal value.
pub const REF_SUFFIX: &str = "-ref";

/// Split an attribute name into its stem and whether it is a reference.
fn split_ref_suffix(local_name: &str) -> (&str, bool) {
    match local_name.strip_suffix(REF_SUFFIX) {
        Some(stem) => (stem, true),
        None => (local_name, false),
    }
}
