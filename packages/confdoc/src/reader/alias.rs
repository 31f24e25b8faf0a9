//! `<alias name="..." alias="..."/>` handling.

use roxmltree::Node;

use super::context::ReaderContext;
use crate::error::{ReaderError, Result};

/// Validate an alias directive and bind the alias in the registry.
///
/// Empty names and aliases are reported individually and skip the
/// directive. Rejections by the registry are reported as conflicts.
///
/// # Errors
/// Only returns an error when the problem reporter escalates.
pub fn register_alias(
    name: &str,
    alias: &str,
    element: Node<'_, '_>,
    ctx: &ReaderContext<'_>,
) -> Result<()> {
    let name = name.trim();
    let alias = alias.trim();

    let mut valid = true;
    if name.is_empty() {
        ctx.error(element, ReaderError::structural("Name must not be empty"))?;
        valid = false;
    }
    if alias.is_empty() {
        ctx.error(element, ReaderError::structural("Alias must not be empty"))?;
        valid = false;
    }
    if !valid {
        return Ok(());
    }

    if let Err(source) = ctx.registry().register_alias(name, alias) {
        return ctx.error(
            element,
            ReaderError::RegistryConflict {
                message: format!(
                    "Failed to register alias '{alias}' for definition with name '{name}'"
                ),
                source,
            },
        );
    }

    tracing::debug!(name, alias, "Registered alias");
    ctx.fire_alias_registered(name, alias, element);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use crate::error::ProblemKind;
    use crate::reader::{CollectingEventListener, CollectingProblemReporter, XmlDefinitionReader};
    use crate::registry::{DefinitionRegistry, InMemoryDefinitionRegistry};

    fn load(
        registry: Arc<InMemoryDefinitionRegistry>,
        body: &str,
    ) -> (Arc<CollectingProblemReporter>, Arc<CollectingEventListener>) {
        let reporter = Arc::new(CollectingProblemReporter::new());
        let listener = Arc::new(CollectingEventListener::new());
        let reader = XmlDefinitionReader::new(registry)
            .with_problem_reporter(reporter.clone())
            .with_event_listener(listener.clone());
        reader
            .load_str(
                "aliases",
                &format!(r#"<beans xmlns="http://www.springframework.org/schema/beans">{body}</beans>"#),
            )
            .unwrap();
        (reporter, listener)
    }

    #[test]
    fn test_alias_after_component() {
        let registry = Arc::new(InMemoryDefinitionRegistry::new());
        let (reporter, listener) = load(
            registry.clone(),
            r#"<bean name="svc" class="pkg.Svc"/><alias name="svc" alias="service"/>"#,
        );

        assert!(reporter.is_empty());
        assert_eq!(registry.canonical_name("service"), "svc");
        let aliases = listener.aliases();
        assert_eq!(aliases.len(), 1);
        assert_eq!(aliases[0].name, "svc");
        assert_eq!(aliases[0].alias, "service");
    }

    #[test]
    fn test_empty_name_and_alias_both_reported() {
        let registry = Arc::new(InMemoryDefinitionRegistry::new());
        let (reporter, listener) = load(registry.clone(), r#"<alias name=" " alias=""/>"#);

        assert_eq!(
            reporter.messages(),
            vec!["Name must not be empty", "Alias must not be empty"]
        );
        assert!(listener.aliases().is_empty());
    }

    #[test]
    fn test_cycle_rejected_and_bindings_unchanged() {
        let registry = Arc::new(InMemoryDefinitionRegistry::new());
        let (reporter, listener) = load(
            registry.clone(),
            r#"<alias name="B" alias="A"/><alias name="A" alias="B"/>"#,
        );

        assert_eq!(reporter.kinds(), vec![ProblemKind::RegistryConflict]);
        assert_eq!(
            reporter.messages(),
            vec!["Failed to register alias 'B' for definition with name 'A'"]
        );
        assert_eq!(registry.canonical_name("A"), "B");
        assert!(!registry.is_alias("B"));
        assert_eq!(listener.aliases().len(), 1);
    }

    #[test]
    fn test_self_alias_removes_previous_binding() {
        let registry = Arc::new(InMemoryDefinitionRegistry::new());
        let (reporter, _) = load(
            registry.clone(),
            r#"<alias name="other" alias="N"/><alias name="N" alias="N"/>"#,
        );

        assert!(reporter.is_empty());
        assert!(!registry.is_alias("N"));
        assert_eq!(registry.canonical_name("N"), "N");
    }

    #[test]
    fn test_rebind_conflict_without_overriding() {
        let registry = Arc::new(InMemoryDefinitionRegistry::new().with_overriding(false));
        let (reporter, _) = load(
            registry.clone(),
            r#"<alias name="one" alias="x"/><alias name="one" alias="x"/><alias name="two" alias="x"/>"#,
        );

        assert_eq!(reporter.kinds(), vec![ProblemKind::RegistryConflict]);
        assert_eq!(registry.canonical_name("x"), "one");
    }
}
