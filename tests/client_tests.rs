//! End-to-end client behaviour against mock oEmbed providers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use oembed_client::prelude::*;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RESOURCE: &str = "https://example.com/photos/1";

fn fixture(name: &str) -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read(path).unwrap()
}

/// Registry with a single "Example" provider owning `endpoint`.
fn registry_with(endpoint: serde_json::Value) -> Registry {
    let providers = serde_json::json!([{
        "provider_name": "Example",
        "provider_url": "https://example.com",
        "endpoints": [endpoint]
    }]);
    Registry::from_json_slice(&serde_json::to_vec(&providers).unwrap()).unwrap()
}

fn json_client(server: &MockServer) -> OEmbedClient {
    let registry = registry_with(
        serde_json::json!({
            "schemes": ["https://example.com/*"],
            "url": format!("{}/oembed", server.uri())
        }),
    );
    OEmbedClient::builder().registry(registry).build().unwrap()
}

fn json_response(body: impl Into<Vec<u8>>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/json; charset=utf-8")
        .set_body_bytes(body)
}

fn request() -> OEmbedRequest {
    OEmbedRequest::parse(RESOURCE).unwrap()
}

#[tokio::test]
async fn fetches_json_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oembed"))
        .and(query_param("format", "json"))
        .and(query_param("url", RESOURCE))
        .respond_with(json_response(fixture("photo.json")))
        .expect(1)
        .mount(&server)
        .await;

    let response = json_client(&server).execute(&request()).await.unwrap();

    assert_eq!(response.kind(), OEmbedType::Photo);
    assert_eq!(response.title(), Some("Bacon Lollys"));
    assert_eq!(response.width(), Some(240));
    assert_eq!(response.height(), Some(160));
    assert_eq!(response.url(), Some("https://example.com/images/1.jpg"));
    assert_eq!(response.cache_age(), Some(Duration::from_secs(2)));
    assert_eq!(
        response.custom_property("license"),
        Some(&serde_json::json!("CC BY 2.0"))
    );
}

#[tokio::test]
async fn response_with_cache_age_is_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oembed"))
        .respond_with(json_response(fixture("photo.json")))
        .expect(1)
        .mount(&server)
        .await;

    let client = json_client(&server);
    let first = client.execute(&request()).await.unwrap();
    let second = client.execute(&request()).await.unwrap();

    assert_eq!(first, second);
    server.verify().await;
}

#[tokio::test]
async fn response_without_cache_age_is_fetched_every_time() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oembed"))
        .respond_with(json_response(
            r#"{"type":"link","version":"1.0","title":"No cache"}"#,
        ))
        .expect(2)
        .mount(&server)
        .await;

    let client = json_client(&server);
    assert!(client.execute(&request()).await.is_some());
    assert!(client.execute(&request()).await.is_some());
    server.verify().await;
}

#[tokio::test]
async fn concurrent_requests_share_one_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oembed"))
        .respond_with(
            json_response(r#"{"type":"link","version":"1.0"}"#)
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = json_client(&server);
    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..5 {
        let client = client.clone();
        tasks.spawn(async move { client.execute(&request()).await });
    }
    while let Some(result) = tasks.join_next().await {
        assert!(result.unwrap().is_some());
    }
    server.verify().await;
}

#[tokio::test]
async fn skip_cache_sends_size_constraints() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oembed"))
        .and(query_param("maxheight", "100"))
        .and(query_param("maxwidth", "200"))
        .and(query_param("url", RESOURCE))
        .respond_with(json_response(fixture("photo.json")))
        .expect(2)
        .mount(&server)
        .await;

    let client = json_client(&server);
    let request = OEmbedRequest::builder(Url::parse(RESOURCE).unwrap())
        .max_height(100)
        .max_width(200)
        .build()
        .unwrap();

    assert!(client.execute_skip_cache(&request).await.is_some());
    assert!(client.execute_skip_cache(&request).await.is_some());
    assert!(client.cache().is_empty().await);
    server.verify().await;
}

#[tokio::test]
async fn fetches_xml_from_xml_only_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oembed.xml"))
        .and(query_param("url", RESOURCE))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/xml")
                .set_body_bytes(fixture("video.xml")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry_with(
        serde_json::json!({
            "schemes": ["https://example.com/*"],
            "url": format!("{}/oembed.{{format}}", server.uri()),
            "formats": ["xml"]
        }),
    );
    let client = OEmbedClient::builder().registry(registry).build().unwrap();

    let response = client.execute(&request()).await.unwrap();
    assert_eq!(response.kind(), OEmbedType::Video);
    assert_eq!(response.width(), Some(425));
    assert!(response.html().unwrap().starts_with("<iframe"));
    assert_eq!(
        response.custom_property("slide_count"),
        Some(&serde_json::json!("12"))
    );
}

#[tokio::test]
async fn follows_a_single_redirect() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oembed"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/v2/oembed"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/oembed"))
        .respond_with(json_response(fixture("photo.json")))
        .expect(1)
        .mount(&server)
        .await;

    let response = json_client(&server).execute_skip_cache(&request()).await;
    assert!(response.is_some());
    server.verify().await;
}

#[tokio::test]
async fn second_redirect_yields_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oembed"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/hop"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hop"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/final"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/final"))
        .respond_with(json_response(fixture("photo.json")))
        .expect(0)
        .mount(&server)
        .await;

    assert!(json_client(&server).execute(&request()).await.is_none());
    server.verify().await;
}

#[tokio::test]
async fn error_status_yields_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oembed"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(json_client(&server).execute(&request()).await.is_none());
}

#[tokio::test]
async fn invalid_body_yields_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oembed"))
        .respond_with(json_response(r#"{"type":"photo","version":"1.0"}"#))
        .mount(&server)
        .await;

    assert!(json_client(&server).execute(&request()).await.is_none());
}

#[tokio::test]
async fn unknown_resource_is_not_fetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(json_response(fixture("photo.json")))
        .expect(0)
        .mount(&server)
        .await;

    let request = OEmbedRequest::parse("https://other.com/x").unwrap();
    assert!(json_client(&server).execute(&request).await.is_none());
    server.verify().await;
}

#[tokio::test]
async fn caller_chosen_endpoint_is_used() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/custom/oembed"))
        .respond_with(json_response(fixture("photo.json")))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = Endpoint::builder(format!("{}/custom/oembed", server.uri()))
        .scheme("https://example.com/photos/*")
        .build()
        .unwrap();
    let response = json_client(&server)
        .execute_with_endpoint(&request(), &endpoint)
        .await;
    assert!(response.is_some());
    server.verify().await;
}

#[test]
fn custom_properties_round_trip_through_json() {
    let body = fixture("photo.json");
    let response: OEmbedResponse = serde_json::from_slice(&body).unwrap();
    let encoded = serde_json::to_value(&response).unwrap();

    assert_eq!(encoded["license"], "CC BY 2.0");
    assert_eq!(encoded["license_id"], 4);
    assert_eq!(encoded["cache_age"], 2);
    assert_eq!(
        serde_json::from_value::<OEmbedResponse>(encoded).unwrap(),
        response
    );
}

#[tokio::test]
async fn custom_transport_is_used() {
    struct Canned;

    #[async_trait::async_trait]
    impl Transport for Canned {
        async fn fetch(&self, _url: &Url) -> oembed_client::Result<TransportResponse> {
            Ok(TransportResponse::ok(
                "application/json",
                r#"{"type":"link","version":"1.0","title":"canned"}"#,
            ))
        }
    }

    let registry = registry_with(
        serde_json::json!({
            "schemes": ["https://example.com/*"],
            "url": "https://example.com/oembed"
        }),
    );
    let client = OEmbedClient::builder()
        .registry(registry)
        .transport(Arc::new(Canned))
        .build()
        .unwrap();

    let response = client.execute(&request()).await.unwrap();
    assert_eq!(response.title(), Some("canned"));
}
