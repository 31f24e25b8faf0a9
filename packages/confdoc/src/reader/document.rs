//! Document walker that turns a configuration document into registrations.

use roxmltree::Node;

use super::alias::register_alias;
use super::context::ReaderContext;
use super::delegate::ElementDelegate;
use super::import::resolve_import;
use crate::config::{
    tokenize, ALIAS_ATTRIBUTE, ALIAS_ELEMENT, BEAN_ELEMENT, DESCRIPTION_ELEMENT, IMPORT_ELEMENT,
    NAME_ATTRIBUTE, NESTED_BEANS_ELEMENT, PROFILE_ATTRIBUTE, RESOURCE_ATTRIBUTE,
};
use crate::error::{ReaderError, Result};
use crate::registry::{DefinitionRegistry, RegistryError};
use crate::xml::{element_children, get_attribute, get_tag_name, qualified_tag_name};

/// Extension points invoked around each scope.
pub trait DocumentHooks: Send + Sync {
    /// Called before the children of a scope are processed.
    fn pre_process(&self, _root: Node<'_, '_>, _ctx: &ReaderContext<'_>) {}

    /// Called after the children of a scope are processed.
    fn post_process(&self, _root: Node<'_, '_>, _ctx: &ReaderContext<'_>) {}
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl DocumentHooks for NoopHooks {}

/// Walks the element tree of a document and registers what it declares.
///
/// Default-namespace children are dispatched by tag: `import`, `alias`,
/// `bean` and nested `beans`. Everything else goes to the namespace
/// handlers. Failures are reported through the context and processing
/// continues with the next sibling; only an escalating problem reporter
/// makes this return `Err`.
pub struct DocumentReader {
    hooks: Box<dyn DocumentHooks>,
}

impl DocumentReader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            hooks: Box::new(NoopHooks),
        }
    }

    /// Use custom pre/post-processing hooks.
    #[must_use]
    pub fn with_hooks(hooks: impl DocumentHooks + 'static) -> Self {
        Self {
            hooks: Box::new(hooks),
        }
    }

    /// Register everything declared below a document's root element.
    ///
    /// # Errors
    /// Only returns an error when the problem reporter escalates.
    pub fn register_definitions(&self, root: Node<'_, '_>, ctx: &ReaderContext<'_>) -> Result<()> {
        tracing::debug!(resource = %ctx.resource(), "Registering definitions");
        self.register_scope(root, ctx, None)
    }

    fn register_scope(
        &self,
        root: Node<'_, '_>,
        ctx: &ReaderContext<'_>,
        parent: Option<&ElementDelegate<'_>>,
    ) -> Result<()> {
        let delegate = ElementDelegate::new(ctx, root, parent.map(ElementDelegate::defaults));

        if delegate.is_default_namespace(root) {
            if let Some(profile_value) = get_attribute(root, PROFILE_ATTRIBUTE) {
                let profiles = tokenize(profile_value);
                if !profiles.is_empty() && !ctx.environment().accepts_profiles(&profiles) {
                    tracing::debug!(
                        profiles = ?profiles,
                        resource = %ctx.resource(),
                        "Skipped scope: no specified profile is active"
                    );
                    return Ok(());
                }
            }
        }

        self.hooks.pre_process(root, ctx);
        self.parse_definitions(root, &delegate)?;
        self.hooks.post_process(root, ctx);
        Ok(())
    }

    fn parse_definitions(&self, root: Node<'_, '_>, delegate: &ElementDelegate<'_>) -> Result<()> {
        if !delegate.is_default_namespace(root) {
            delegate.parse_custom_element(root)?;
            return Ok(());
        }

        for child in element_children(root) {
            if delegate.is_default_namespace(child) {
                self.parse_default_element(child, delegate)?;
            } else {
                delegate.parse_custom_element(child)?;
            }
        }
        Ok(())
    }

    fn parse_default_element(&self, element: Node<'_, '_>, delegate: &ElementDelegate<'_>) -> Result<()> {
        let ctx = delegate.context();
        match get_tag_name(element) {
            IMPORT_ELEMENT => {
                let location = element.attribute(RESOURCE_ATTRIBUTE).unwrap_or_default();
                resolve_import(location, element, ctx)
            }
            ALIAS_ELEMENT => {
                let name = element.attribute(NAME_ATTRIBUTE).unwrap_or_default();
                let alias = element.attribute(ALIAS_ATTRIBUTE).unwrap_or_default();
                register_alias(name, alias, element, ctx)
            }
            BEAN_ELEMENT => self.process_component(element, delegate),
            NESTED_BEANS_ELEMENT => self.register_scope(element, ctx, Some(delegate)),
            DESCRIPTION_ELEMENT => Ok(()),
            _ => {
                ctx.warning(
                    element,
                    &ReaderError::structural(format!(
                        "Ignoring unknown element <{}>",
                        qualified_tag_name(element)
                    )),
                );
                Ok(())
            }
        }
    }

    /// Parse, decorate and register one component element.
    fn process_component(&self, element: Node<'_, '_>, delegate: &ElementDelegate<'_>) -> Result<()> {
        let Some(holder) = delegate.parse_component(element)? else {
            return Ok(());
        };
        let holder = delegate.decorate(element, holder)?;

        let ctx = delegate.context();
        let registry = ctx.registry();
        if let Err(source) = registry.register_definition(holder.name(), holder.definition().clone()) {
            return ctx.error(element, registration_failed(holder.name(), source));
        }
        // The definition stays registered when an alias is rejected
        for alias in holder.aliases() {
            if let Err(source) = registry.register_alias(holder.name(), alias) {
                ctx.error(element, registration_failed(holder.name(), source))?;
                break;
            }
        }

        tracing::debug!(
            name = holder.name(),
            aliases = ?holder.aliases(),
            "Registered component"
        );
        ctx.fire_component_registered(&holder, element);
        Ok(())
    }
}

fn registration_failed(name: &str, source: RegistryError) -> ReaderError {
    ReaderError::RegistryConflict {
        message: format!("Failed to register definition with name '{name}'"),
        source,
    }
}

impl Default for DocumentReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::environment::StandardEnvironment;
    use crate::error::ProblemKind;
    use crate::reader::{CollectingEventListener, CollectingProblemReporter, XmlDefinitionReader};
    use crate::registry::{DefinitionRegistry, InMemoryDefinitionRegistry};

    struct Harness {
        registry: Arc<InMemoryDefinitionRegistry>,
        reporter: Arc<CollectingProblemReporter>,
        listener: Arc<CollectingEventListener>,
    }

    fn load_with_profiles(xml: &str, profiles: &[&str]) -> Harness {
        let registry = Arc::new(InMemoryDefinitionRegistry::new());
        let reporter = Arc::new(CollectingProblemReporter::new());
        let listener = Arc::new(CollectingEventListener::new());
        let environment = StandardEnvironment::new()
            .with_active_profiles(profiles.iter().copied())
            .without_system_environment();
        let reader = XmlDefinitionReader::new(registry.clone())
            .with_environment(Arc::new(environment))
            .with_problem_reporter(reporter.clone())
            .with_event_listener(listener.clone());
        reader.load_str("document", xml).unwrap();
        Harness {
            registry,
            reporter,
            listener,
        }
    }

    #[test]
    fn test_single_component() {
        let h = load_with_profiles(
            r#"<beans xmlns="http://www.springframework.org/schema/beans">
                 <bean name="svc" class="pkg.Svc"/>
               </beans>"#,
            &[],
        );
        assert!(h.reporter.is_empty());
        assert_eq!(h.registry.definition_names(), vec!["svc"]);
        assert!(h.registry.aliases("svc").is_empty());

        let components = h.listener.components();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].holder.name(), "svc");
        assert!(components[0].holder.aliases().is_empty());
    }

    #[test]
    fn test_profile_filtering() {
        let xml = r#"<beans xmlns="http://www.springframework.org/schema/beans">
                       <bean id="always" class="pkg.A"/>
                       <beans profile="prod">
                         <bean id="prodOnly" class="pkg.P"/>
                         <alias name="prodOnly" alias="production"/>
                         <beans><bean id="nested" class="pkg.N"/></beans>
                       </beans>
                     </beans>"#;

        let dev = load_with_profiles(xml, &["dev"]);
        assert!(dev.reporter.is_empty());
        assert_eq!(dev.registry.definition_names(), vec!["always"]);
        assert!(!dev.registry.is_alias("production"));

        let both = load_with_profiles(xml, &["dev", "prod"]);
        assert_eq!(both.registry.definition_names(), vec!["always", "prodOnly", "nested"]);
        assert_eq!(both.registry.canonical_name("production"), "prodOnly");
    }

    #[test]
    fn test_profile_negation_and_default_profile() {
        let xml = r#"<beans xmlns="http://www.springframework.org/schema/beans">
                       <beans profile="!prod"><bean id="notProd" class="pkg.A"/></beans>
                       <beans profile="default"><bean id="fallback" class="pkg.B"/></beans>
                     </beans>"#;

        let none = load_with_profiles(xml, &[]);
        assert_eq!(none.registry.definition_names(), vec!["notProd", "fallback"]);

        let prod = load_with_profiles(xml, &["prod"]);
        assert!(prod.registry.definition_names().is_empty());
    }

    #[test]
    fn test_nesting_is_transparent() {
        let nested = load_with_profiles(
            r#"<beans xmlns="http://www.springframework.org/schema/beans">
                 <bean id="a" class="pkg.A"/>
                 <beans>
                   <bean id="b" class="pkg.B"/>
                   <beans><alias name="a" alias="first"/></beans>
                 </beans>
                 <bean id="c" class="pkg.C"/>
               </beans>"#,
            &[],
        );
        let flat = load_with_profiles(
            r#"<beans xmlns="http://www.springframework.org/schema/beans">
                 <bean id="a" class="pkg.A"/>
                 <bean id="b" class="pkg.B"/>
                 <alias name="a" alias="first"/>
                 <bean id="c" class="pkg.C"/>
               </beans>"#,
            &[],
        );
        assert_eq!(nested.registry.snapshot(), flat.registry.snapshot());
    }

    #[test]
    fn test_defaults_event_per_scope() {
        let h = load_with_profiles(
            r#"<beans xmlns="http://www.springframework.org/schema/beans" default-lazy-init="true">
                 <beans default-lazy-init="false"/>
               </beans>"#,
            &[],
        );
        let defaults = h.listener.defaults();
        assert_eq!(defaults.len(), 2);
        assert!(defaults[0].defaults.lazy_init);
        assert!(!defaults[1].defaults.lazy_init);
        assert_eq!(defaults[1].source.line, 2);
    }

    #[test]
    fn test_unknown_custom_element_reported_and_siblings_continue() {
        let h = load_with_profiles(
            r#"<beans xmlns="http://www.springframework.org/schema/beans"
                      xmlns:tx="http://example.com/tx">
                 <tx:annotation-driven/>
                 <bean id="after" class="pkg.After"/>
               </beans>"#,
            &[],
        );
        assert_eq!(h.reporter.kinds(), vec![ProblemKind::UnrecognizedExtension]);
        assert_eq!(h.registry.definition_names(), vec!["after"]);
    }

    #[test]
    fn test_duplicate_definition_reported_as_conflict() {
        let registry = Arc::new(InMemoryDefinitionRegistry::new().with_overriding(false));
        let reporter = Arc::new(CollectingProblemReporter::new());
        let reader =
            XmlDefinitionReader::new(registry.clone()).with_problem_reporter(reporter.clone());
        reader
            .load_str(
                "conflict",
                r#"<beans xmlns="http://www.springframework.org/schema/beans">
                     <bean id="a" class="pkg.A"/>
                     <beans><bean id="a" class="pkg.B"/></beans>
                   </beans>"#,
            )
            .unwrap();

        assert_eq!(reporter.kinds(), vec![ProblemKind::RegistryConflict]);
        assert_eq!(
            reporter.messages(),
            vec!["Failed to register definition with name 'a'"]
        );
        assert_eq!(
            registry.definition("a").unwrap().class_name.as_deref(),
            Some("pkg.A")
        );
    }

    #[test]
    fn test_rejected_alias_keeps_component_event() {
        let registry = Arc::new(InMemoryDefinitionRegistry::new().with_overriding(false));
        let reporter = Arc::new(CollectingProblemReporter::new());
        let listener = Arc::new(CollectingEventListener::new());
        let reader = XmlDefinitionReader::new(registry.clone())
            .with_problem_reporter(reporter.clone())
            .with_event_listener(listener.clone());
        reader
            .load_str(
                "alias-conflict",
                r#"<beans xmlns="http://www.springframework.org/schema/beans">
                     <alias name="other" alias="x"/>
                     <bean id="a" name="x,y" class="pkg.A"/>
                   </beans>"#,
            )
            .unwrap();

        assert_eq!(reporter.kinds(), vec![ProblemKind::RegistryConflict]);
        assert_eq!(registry.definition_names(), vec!["a"]);
        assert_eq!(registry.canonical_name("x"), "other");

        let components = listener.components();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].holder.name(), "a");
    }

    #[test]
    fn test_unknown_default_element_is_a_warning() {
        let h = load_with_profiles(
            r#"<beans xmlns="http://www.springframework.org/schema/beans">
                 <description>Wiring</description>
                 <bean-definition id="typo"/>
                 <bean id="after" class="pkg.After"/>
               </beans>"#,
            &[],
        );
        assert!(h.reporter.is_empty());
        assert_eq!(h.registry.definition_names(), vec!["after"]);

        let warnings = h.reporter.warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message, "Ignoring unknown element <bean-definition>");
        assert_eq!(warnings[0].location.line, 3);
    }

    #[test]
    fn test_reserved_xml_attributes_are_not_extensions() {
        let h = load_with_profiles(
            r#"<beans xmlns="http://www.springframework.org/schema/beans" xml:lang="en">
                 <bean id="greeting" class="pkg.Greeting" xml:lang="nl" xml:space="preserve"/>
               </beans>"#,
            &[],
        );
        assert!(h.reporter.is_empty(), "{:?}", h.reporter.problems());
        assert_eq!(h.registry.definition_names(), vec!["greeting"]);
    }

    struct RecordingHooks {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl DocumentHooks for RecordingHooks {
        fn pre_process(&self, root: Node<'_, '_>, _ctx: &ReaderContext<'_>) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("pre:{}", root.attribute("id").unwrap_or("-")));
        }

        fn post_process(&self, root: Node<'_, '_>, _ctx: &ReaderContext<'_>) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("post:{}", root.attribute("id").unwrap_or("-")));
        }
    }

    #[test]
    fn test_hooks_wrap_each_processed_scope() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let registry = Arc::new(InMemoryDefinitionRegistry::new());
        let reader = XmlDefinitionReader::new(registry).with_document_reader(
            DocumentReader::with_hooks(RecordingHooks {
                calls: calls.clone(),
            }),
        );
        reader
            .load_str(
                "hooks",
                r#"<beans id="outer"><beans id="inner"/><beans id="skipped" profile="nope"/></beans>"#,
            )
            .unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec!["pre:outer", "pre:inner", "post:inner", "post:outer"]
        );
    }
}
