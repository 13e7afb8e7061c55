//! HTTP collaborators against a mocked discovery service, catalog and converter

use serde_json::json;
use specbridge::upstream::{
    build_http_client, CapabilityCatalog, HttpCapabilityCatalog, HttpSpecLocator, HttpSwaggerConverter, SpecLocator,
    SwaggerConverter,
};
use specbridge::BridgeError;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> reqwest::Client {
    build_http_client(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_locator_resolves_id_through_discovery() {
    let mock_server = MockServer::start().await;
    let spec_url = format!("{}/files/petstore.json", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/specs/petstore"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"openapiUrl": spec_url})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/petstore.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"openapi": "3.0.0"}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let locator = HttpSpecLocator::new(client(), format!("{}/specs/", mock_server.uri()));
    let source = locator.locate("petstore").await.unwrap();

    assert_eq!(source.url, spec_url);
    assert_eq!(source.text, r#"{"openapi": "3.0.0"}"#);
}

#[tokio::test]
async fn test_locator_fetches_direct_urls_without_discovery() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/raw/openapi.yaml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("openapi: 3.1.0\n"))
        .mount(&mock_server)
        .await;
    Mock::given(path("/specs/never"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let locator = HttpSpecLocator::new(client(), format!("{}/specs", mock_server.uri()));
    let direct = format!("{}/raw/openapi.yaml", mock_server.uri());
    let source = locator.locate(&direct).await.unwrap();

    assert_eq!(source.url, direct);
    assert_eq!(source.text, "openapi: 3.1.0\n");
}

#[tokio::test]
async fn test_locator_maps_discovery_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/specs/unknown"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/specs/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let locator = HttpSpecLocator::new(client(), format!("{}/specs", mock_server.uri()));

    match locator.locate("unknown").await {
        Err(BridgeError::NotFound { message }) => assert!(message.contains("unknown")),
        other => panic!("expected not found, got {:?}", other),
    }
    match locator.locate("flaky").await {
        Err(BridgeError::Upstream { status, .. }) => assert_eq!(status, 503),
        other => panic!("expected upstream error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_locator_spec_fetch_failure_is_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone.json"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&mock_server)
        .await;

    let locator = HttpSpecLocator::new(client(), format!("{}/specs", mock_server.uri()));
    let result = locator.locate(&format!("{}/gone.json", mock_server.uri())).await;

    assert!(matches!(result, Err(BridgeError::Upstream { status: 410, .. })));
}

#[tokio::test]
async fn test_catalog_text_is_trimmed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/catalog.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("\nAvailable APIs: stripe, github\n\n"))
        .mount(&mock_server)
        .await;

    let catalog = HttpCapabilityCatalog::new(client(), format!("{}/catalog.txt", mock_server.uri()));
    assert_eq!(catalog.catalog_text().await.unwrap(), "Available APIs: stripe, github");
}

#[tokio::test]
async fn test_catalog_failure_is_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/catalog.txt"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let catalog = HttpCapabilityCatalog::new(client(), format!("{}/catalog.txt", mock_server.uri()));
    assert!(matches!(catalog.catalog_text().await, Err(BridgeError::Upstream { status: 502, .. })));
}

#[tokio::test]
async fn test_converter_sends_source_url_and_parses_yaml() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/convert"))
        .and(query_param("url", "https://legacy.example.com/swagger.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("openapi: 3.0.1\ninfo:\n  title: Legacy\n"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let converter = HttpSwaggerConverter::new(client(), format!("{}/convert", mock_server.uri()));
    let document = converter
        .convert("https://legacy.example.com/swagger.json")
        .await
        .unwrap();

    assert_eq!(document["openapi"], "3.0.1");
    assert_eq!(document["info"]["title"], "Legacy");
}
