//! Tests for loading documents over HTTP.

use std::sync::Arc;

use confdoc::error::ProblemKind;
use confdoc::reader::{CollectingEventListener, CollectingProblemReporter, XmlDefinitionReader};
use confdoc::registry::{DefinitionRegistry, InMemoryDefinitionRegistry};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MAIN: &str = r#"<beans xmlns="http://www.springframework.org/schema/beans">
    <import resource="db.xml"/>
    <import resource="missing.xml"/>
    <bean id="app" class="example.App"/>
</beans>"#;

const DB: &str = r#"<beans xmlns="http://www.springframework.org/schema/beans">
    <bean id="dataSource" class="example.DataSource"/>
</beans>"#;

#[tokio::test(flavor = "multi_thread")]
async fn test_remote_document_with_relative_imports() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/conf/main.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MAIN))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/conf/db.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DB))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/conf/missing.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let location = format!("{}/conf/main.xml", server.uri());
    let registry = Arc::new(InMemoryDefinitionRegistry::new());
    let reporter = Arc::new(CollectingProblemReporter::new());
    let listener = Arc::new(CollectingEventListener::new());

    let count = {
        let registry = registry.clone();
        let reporter = reporter.clone();
        let listener = listener.clone();
        tokio::task::spawn_blocking(move || {
            XmlDefinitionReader::new(registry)
                .with_problem_reporter(reporter)
                .with_event_listener(listener)
                .load_definitions(&location)
        })
        .await
        .unwrap()
        .unwrap()
    };

    assert_eq!(count, 2);
    assert_eq!(registry.definition_names(), vec!["dataSource", "app"]);

    let problems = reporter.problems();
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].kind, ProblemKind::Resolution);
    assert!(problems[0].location.resource.starts_with("URL [http://"));

    let imports = listener.imports();
    assert_eq!(imports.len(), 2);
    assert_eq!(
        imports[0].resources[0].location(),
        format!("{}/conf/db.xml", server.uri())
    );
    assert!(imports[1].resources.is_empty());
}
