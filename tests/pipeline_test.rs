//! End-to-end spec pipeline against mocked upstream services

use serde_json::{json, Value};
use specbridge::config::UpstreamConfig;
use specbridge::spec::SpecPipeline;
use specbridge::BridgeError;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PET_STORE_YAML: &str = r#"
openapi: 3.0.0
info:
  title: Pet Store
  version: 1.0.0
servers:
  - url: https://petstore.example.com/v1
paths:
  /pets:
    get:
      operationId: listPets
      summary: List pets
      parameters:
        - name: limit
          in: query
          schema:
            type: integer
      responses:
        200:
          description: A page of pets
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: '#/components/schemas/Pet'
components:
  schemas:
    Pet:
      type: object
      properties:
        name:
          type: string
"#;

fn swagger_document() -> Value {
    json!({
        "swagger": "2.0",
        "info": {"title": "Legacy", "version": "2"},
        "host": "legacy.example.com",
        "paths": {"/items": {"get": {"operationId": "listItems"}}}
    })
}

fn converted_document() -> Value {
    json!({
        "openapi": "3.0.1",
        "info": {"title": "Legacy", "version": "2"},
        "servers": [{"url": "https://legacy.example.com/"}],
        "paths": {"/items": {"get": {"operationId": "listItems", "summary": "List items"}}}
    })
}

fn upstream_config(mock_server: &MockServer) -> UpstreamConfig {
    UpstreamConfig {
        discovery_url: format!("{}/specs", mock_server.uri()),
        catalog_url: format!("{}/catalog.txt", mock_server.uri()),
        converter_url: format!("{}/convert", mock_server.uri()),
        detail_base_url: "https://specs.test/api".to_string(),
        ..UpstreamConfig::default()
    }
}

async fn mount_spec(mock_server: &MockServer, id: &str, file: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/specs/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "openapiUrl": format!("{}/files/{}", mock_server.uri(), file)
        })))
        .mount(mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/files/{}", file)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_pet_store_overview() {
    let mock_server = MockServer::start().await;
    mount_spec(&mock_server, "petstore", "petstore.yaml", PET_STORE_YAML.to_string()).await;
    Mock::given(path("/convert"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let pipeline = SpecPipeline::from_config(&upstream_config(&mock_server)).unwrap();
    let overview = pipeline.api_overview("petstore").await.unwrap();

    assert!(overview.starts_with("Pet Store v1.0.0 - https://petstore.example.com\n"));
    assert!(overview.contains(
        "- listPets GET https://petstore.example.com/pets?limit=integer - List pets ( Spec: https://specs.test/api/petstore/operations/listPets )"
    ));
    assert!(overview.ends_with(
        "1 endpoint available. Use getApiOperation with id 'petstore' and an operationId or route to get the full specification of one endpoint."
    ));
}

#[tokio::test]
async fn test_pet_store_operation_is_dereferenced_yaml() {
    let mock_server = MockServer::start().await;
    mount_spec(&mock_server, "petstore", "petstore.yaml", PET_STORE_YAML.to_string()).await;

    let pipeline = SpecPipeline::from_config(&upstream_config(&mock_server)).unwrap();

    for token in ["listPets", "/pets", "pets"] {
        let yaml = pipeline.api_operation("petstore", token).await.unwrap();
        let detail: Value = serde_yaml::from_str(&yaml).unwrap();

        assert!(!yaml.contains("$ref"), "unresolved ref for token {}", token);
        assert!(detail.get("components").is_none());
        assert_eq!(
            detail["paths"]["/pets"]["get"]["responses"]["200"]["content"]["application/json"]["schema"]["items"]
                ["properties"]["name"]["type"],
            "string"
        );
    }
}

#[tokio::test]
async fn test_swagger_is_converted_before_rendering() {
    let mock_server = MockServer::start().await;
    let spec_url = format!("{}/files/legacy.json", mock_server.uri());
    mount_spec(&mock_server, "legacy", "legacy.json", swagger_document().to_string()).await;

    Mock::given(method("GET"))
        .and(path("/convert"))
        .and(query_param("url", spec_url.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(converted_document()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let pipeline = SpecPipeline::from_config(&upstream_config(&mock_server)).unwrap();
    let overview = pipeline.api_overview("legacy").await.unwrap();

    assert!(overview.starts_with("Legacy v2 - https://legacy.example.com\n"));
    assert!(overview.contains("- listItems GET https://legacy.example.com/items - List items"));
}

#[tokio::test]
async fn test_slow_converter_is_conversion_error() {
    let mock_server = MockServer::start().await;
    mount_spec(&mock_server, "legacy", "legacy.json", swagger_document().to_string()).await;

    Mock::given(method("GET"))
        .and(path("/convert"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(converted_document())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let pipeline = SpecPipeline::from_config(&upstream_config(&mock_server))
        .unwrap()
        .with_conversion_timeout(Duration::from_millis(200));

    match pipeline.api_overview("legacy").await {
        Err(BridgeError::Conversion { message }) => assert!(message.contains("did not finish")),
        other => panic!("expected conversion error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failing_converter_is_conversion_error() {
    let mock_server = MockServer::start().await;
    mount_spec(&mock_server, "legacy", "legacy.json", swagger_document().to_string()).await;

    Mock::given(method("GET"))
        .and(path("/convert"))
        .respond_with(ResponseTemplate::new(400).set_body_string("cannot convert"))
        .mount(&mock_server)
        .await;

    let pipeline = SpecPipeline::from_config(&upstream_config(&mock_server)).unwrap();
    assert!(matches!(
        pipeline.api_overview("legacy").await,
        Err(BridgeError::Conversion { .. })
    ));
}

#[tokio::test]
async fn test_unparsable_spec_is_parse_error() {
    let mock_server = MockServer::start().await;
    mount_spec(&mock_server, "broken", "broken.json", "{\"openapi\": [unclosed".to_string()).await;

    let pipeline = SpecPipeline::from_config(&upstream_config(&mock_server)).unwrap();
    assert!(matches!(
        pipeline.api_overview("broken").await,
        Err(BridgeError::Parse { .. })
    ));
}

#[tokio::test]
async fn test_huge_spec_is_rejected_not_truncated() {
    let mock_server = MockServer::start().await;

    let mut paths = serde_json::Map::new();
    for i in 0..4000 {
        paths.insert(
            format!("/collections/{}/entries", i),
            json!({"get": {"operationId": format!("listCollectionEntries{}", i), "summary": "s".repeat(40)}}),
        );
    }
    let document = json!({"openapi": "3.0.0", "info": {"title": "Huge", "version": "1"}, "paths": paths});
    mount_spec(&mock_server, "huge", "huge.json", document.to_string()).await;

    let pipeline = SpecPipeline::from_config(&upstream_config(&mock_server)).unwrap();
    match pipeline.api_overview("huge").await {
        Err(BridgeError::TooLarge { length, limit }) => {
            assert_eq!(limit, 250_000);
            assert!(length > limit);
        }
        other => panic!("expected too large, got {:?}", other.map(|text| text.len())),
    }
}
