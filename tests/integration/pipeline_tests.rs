//! Integration tests for the harvest pipeline
//!
//! These tests use wiremock to stand in for the YouTube Data API and the
//! schema registry, and an in-memory sink in place of the Kafka producer.

use apache_avro::types::Value;
use futures::TryStreamExt;
use playlist_harvester::config::{SchemaRegistryConfig, YouTubeConfig};
use playlist_harvester::publish::{AvroValueEncoder, MemorySink, Publisher, SchemaRegistryClient};
use playlist_harvester::youtube::{PlaylistItem, YouTubeClient};
use playlist_harvester::{HarvestError, Harvester, PipelineState};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const VALUE_SCHEMA: &str = r#"{
    "type": "record",
    "name": "youtube_videos",
    "fields": [
        {"name": "TITLE", "type": "string"},
        {"name": "VIEWS", "type": "long"},
        {"name": "LIKES", "type": "long"},
        {"name": "COMMENTS", "type": "long"}
    ]
}"#;

/// Matches first-page requests, which carry no `pageToken`
struct NoPageToken;

impl Match for NoPageToken {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(key, _)| key == "pageToken")
    }
}

/// Matches requests that carry no `maxResults`
struct NoPageSize;

impl Match for NoPageSize {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(key, _)| key == "maxResults")
    }
}

fn create_test_config(base_url: &str) -> YouTubeConfig {
    YouTubeConfig {
        api_key: "test-key".to_string(),
        playlist_id: "PL1".to_string(),
        base_url: base_url.to_string(),
        request_timeout_secs: 5,
        connect_timeout_secs: 2,
        max_results: None,
    }
}

fn create_test_client(server: &MockServer) -> YouTubeClient {
    YouTubeClient::new(&create_test_config(&server.uri())).expect("Failed to build client")
}

fn playlist_page(video_ids: &[&str], next: Option<&str>) -> serde_json::Value {
    let items: Vec<_> = video_ids
        .iter()
        .map(|id| json!({"contentDetails": {"videoId": id}}))
        .collect();
    match next {
        Some(token) => json!({"items": items, "nextPageToken": token}),
        None => json!({"items": items}),
    }
}

fn video_page(id: &str, title: &str, statistics: serde_json::Value) -> serde_json::Value {
    json!({
        "items": [{
            "id": id,
            "snippet": {"title": title},
            "statistics": statistics
        }]
    })
}

async fn mount_video(server: &MockServer, id: &str, title: &str, statistics: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", id))
        .respond_with(ResponseTemplate::new(200).set_body_json(video_page(id, title, statistics)))
        .mount(server)
        .await;
}

async fn mount_registry(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/subjects/youtube_videos-value/versions/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "subject": "youtube_videos-value",
            "id": 7,
            "version": 1,
            "schema": VALUE_SCHEMA
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// Looks up the value schema in the mock registry and publishes into `sink`
async fn create_test_publisher(server: &MockServer, sink: Arc<MemorySink>) -> Publisher {
    let registry = SchemaRegistryClient::new(
        &SchemaRegistryConfig {
            url: server.uri(),
            subject: "youtube_videos-value".to_string(),
            basic_auth_user_info: None,
        },
        Duration::from_secs(5),
    )
    .expect("Failed to build registry client");

    let registered = registry
        .latest("youtube_videos-value")
        .await
        .expect("Schema lookup failed");
    let encoder = AvroValueEncoder::from_registered(&registered).expect("Schema rejected");

    Publisher::new("youtube_videos", encoder, sink, Duration::from_secs(5))
}

#[tokio::test]
async fn test_pagination_follows_cursors_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("playlistId", "PL1"))
        .and(query_param("part", "contentDetails"))
        .and(query_param("key", "test-key"))
        .and(NoPageToken)
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(&["v1", "v2"], Some("A"))))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("pageToken", "A"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(playlist_page(&["v3", "v4", "v5"], Some("B"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("pageToken", "B"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(&["v6"], None)))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let items: Vec<PlaylistItem> = client
        .playlist_items("PL1")
        .try_collect()
        .await
        .expect("Traversal failed");

    let ids: Vec<&str> = items.iter().map(|item| item.video_id()).collect();
    assert_eq!(ids, ["v1", "v2", "v3", "v4", "v5", "v6"]);
    assert_eq!(client.fetch_count(), 3);
}

#[tokio::test]
async fn test_single_page_without_cursor_terminates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(NoPageToken)
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(&["v1"], None)))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let items: Vec<PlaylistItem> = client.playlist_items("PL1").try_collect().await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(client.fetch_count(), 1);
}

#[tokio::test]
async fn test_empty_page_with_cursor_is_followed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(NoPageToken)
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(&[], Some("A"))))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("pageToken", "A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(&["v9"], None)))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let items: Vec<PlaylistItem> = client.playlist_items("PL1").try_collect().await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].video_id(), "v9");
}

#[tokio::test]
async fn test_page_size_is_sent_when_configured() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("maxResults", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(&["v1"], None)))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri());
    config.max_results = Some(50);
    let client = YouTubeClient::new(&config).unwrap();

    let items: Vec<PlaylistItem> = client.playlist_items("PL1").try_collect().await.unwrap();
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn test_page_size_is_not_sent_to_video_lookups() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("maxResults", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(&["v1"], None)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "v1"))
        .and(NoPageSize)
        .respond_with(ResponseTemplate::new(200).set_body_json(video_page(
            "v1",
            "T",
            json!({"viewCount": "1"}),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri());
    config.max_results = Some(25);
    let client = YouTubeClient::new(&config).unwrap();
    let mut harvester = Harvester::new(client, "PL1", None);

    let summary = harvester.run().await.expect("Harvest failed");
    assert_eq!(summary.videos, 1);
}

#[tokio::test]
async fn test_empty_playlist_publishes_nothing() {
    let server = MockServer::start().await;
    mount_registry(&server).await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(&[], None)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(0)
        .mount(&server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let publisher = create_test_publisher(&server, Arc::clone(&sink)).await;
    let mut harvester = Harvester::new(create_test_client(&server), "PL1", Some(publisher));

    let summary = harvester.run().await.expect("Harvest failed");

    assert_eq!(harvester.state(), PipelineState::Done);
    assert_eq!(summary.playlist_items, 0);
    assert_eq!(summary.videos, 0);
    assert_eq!(summary.delivery.enqueued, 0);
    assert!(summary.delivery.is_clean());
    assert!(sink.sent().is_empty());
}

#[tokio::test]
async fn test_full_harvest_publishes_keyed_avro_records() {
    let server = MockServer::start().await;
    mount_registry(&server).await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(&["v1", "v2"], None)))
        .mount(&server)
        .await;

    // likeCount hidden on v1; counts arrive as decimal strings
    mount_video(
        &server,
        "v1",
        "T",
        json!({"viewCount": "100", "commentCount": "5"}),
    )
    .await;
    mount_video(
        &server,
        "v2",
        "Second",
        json!({"viewCount": "3000000000", "likeCount": "12", "commentCount": "0"}),
    )
    .await;

    let sink = Arc::new(MemorySink::new());
    let publisher = create_test_publisher(&server, Arc::clone(&sink)).await;
    let encoder = publisher.encoder().clone();
    let mut harvester = Harvester::new(create_test_client(&server), "PL1", Some(publisher));

    let summary = harvester.run().await.expect("Harvest failed");

    assert_eq!(harvester.state(), PipelineState::Done);
    assert_eq!(summary.playlist_items, 2);
    assert_eq!(summary.videos, 2);
    assert_eq!(summary.fetches, 3);
    assert!(summary.published);
    assert_eq!(summary.delivery.enqueued, 2);
    assert_eq!(summary.delivery.delivered, 2);

    let sent = sink.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].topic, "youtube_videos");
    assert_eq!(sent[0].record.key, "v1");
    assert_eq!(sent[1].record.key, "v2");

    let first = encoder.decode(&sent[0].record.payload).unwrap();
    assert_eq!(
        first,
        Value::Record(vec![
            ("TITLE".to_string(), Value::String("T".to_string())),
            ("VIEWS".to_string(), Value::Long(100)),
            ("LIKES".to_string(), Value::Long(0)),
            ("COMMENTS".to_string(), Value::Long(5)),
        ])
    );

    let second = encoder.decode(&sent[1].record.payload).unwrap();
    match second {
        Value::Record(fields) => {
            assert_eq!(fields[1], ("VIEWS".to_string(), Value::Long(3_000_000_000)));
        }
        other => panic!("expected a record, got {:?}", other),
    }
}

#[tokio::test]
async fn test_video_without_statistics_publishes_zero_counts() {
    let server = MockServer::start().await;
    mount_registry(&server).await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(&["v1"], None)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "v1", "snippet": {"title": "Quiet"}}]
        })))
        .mount(&server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let publisher = create_test_publisher(&server, Arc::clone(&sink)).await;
    let encoder = publisher.encoder().clone();
    let mut harvester = Harvester::new(create_test_client(&server), "PL1", Some(publisher));

    harvester.run().await.expect("Harvest failed");

    let sent = sink.sent();
    assert_eq!(sent.len(), 1);
    let value = encoder.decode(&sent[0].record.payload).unwrap();
    assert_eq!(
        value,
        Value::Record(vec![
            ("TITLE".to_string(), Value::String("Quiet".to_string())),
            ("VIEWS".to_string(), Value::Long(0)),
            ("LIKES".to_string(), Value::Long(0)),
            ("COMMENTS".to_string(), Value::Long(0)),
        ])
    );
}

#[tokio::test]
async fn test_unknown_video_id_is_skipped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(&["gone", "v1"], None)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "gone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;
    mount_video(&server, "v1", "Still here", json!({"viewCount": "1"})).await;

    let mut harvester = Harvester::new(create_test_client(&server), "PL1", None);
    let summary = harvester.run().await.expect("Harvest failed");

    assert_eq!(summary.playlist_items, 2);
    assert_eq!(summary.videos, 1);
    assert!(!summary.published);
}

#[tokio::test]
async fn test_malformed_playlist_page_fails_run() {
    let server = MockServer::start().await;
    mount_registry(&server).await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let publisher = create_test_publisher(&server, Arc::clone(&sink)).await;
    let mut harvester = Harvester::new(create_test_client(&server), "PL1", Some(publisher));

    let result = harvester.run().await;

    match result {
        Err(HarvestError::MalformedResponse { endpoint, .. }) => {
            assert_eq!(endpoint, "playlistItems");
        }
        other => panic!("expected MalformedResponse, got {:?}", other),
    }
    assert_eq!(harvester.state(), PipelineState::Failed);
    assert!(sink.sent().is_empty());
}

#[tokio::test]
async fn test_non_numeric_count_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(&["v1"], None)))
        .mount(&server)
        .await;
    mount_video(&server, "v1", "T", json!({"viewCount": "lots"})).await;

    let mut harvester = Harvester::new(create_test_client(&server), "PL1", None);
    let result = harvester.run().await;

    assert!(matches!(
        result,
        Err(HarvestError::MalformedResponse { ref endpoint, .. }) if endpoint == "videos"
    ));
    assert_eq!(harvester.state(), PipelineState::Failed);
}

#[tokio::test]
async fn test_upstream_error_status_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(&["v1"], None)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
        .mount(&server)
        .await;

    let mut harvester = Harvester::new(create_test_client(&server), "PL1", None);
    let result = harvester.run().await;

    match result {
        Err(HarvestError::Transport { endpoint, message }) => {
            assert_eq!(endpoint, "videos");
            assert!(message.contains("500"), "unexpected message: {}", message);
        }
        other => panic!("expected Transport, got {:?}", other),
    }
    assert_eq!(harvester.state(), PipelineState::Failed);
}

#[tokio::test]
async fn test_delivery_failures_are_counted() {
    let server = MockServer::start().await;
    mount_registry(&server).await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(&["v1", "v2"], None)))
        .mount(&server)
        .await;
    mount_video(&server, "v1", "One", json!({"viewCount": "1"})).await;
    mount_video(&server, "v2", "Two", json!({"viewCount": "2"})).await;

    let sink = Arc::new(MemorySink::rejecting(["v2"]));
    let publisher = create_test_publisher(&server, Arc::clone(&sink)).await;
    let mut harvester = Harvester::new(create_test_client(&server), "PL1", Some(publisher));

    let summary = harvester.run().await.expect("Harvest failed");

    assert_eq!(harvester.state(), PipelineState::Done);
    assert_eq!(summary.delivery.enqueued, 2);
    assert_eq!(summary.delivery.delivered, 1);
    assert_eq!(summary.delivery.failed, 1);
    assert!(!summary.delivery.is_clean());
}

#[tokio::test]
async fn test_delivery_failures_fail_run_when_configured() {
    let server = MockServer::start().await;
    mount_registry(&server).await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(&["v1"], None)))
        .mount(&server)
        .await;
    mount_video(&server, "v1", "One", json!({"viewCount": "1"})).await;

    let sink = Arc::new(MemorySink::rejecting(["v1"]));
    let publisher = create_test_publisher(&server, sink).await;
    let mut harvester = Harvester::new(create_test_client(&server), "PL1", Some(publisher))
        .fail_on_delivery_error(true);

    let result = harvester.run().await;

    assert!(matches!(result, Err(HarvestError::Delivery(_))));
    assert_eq!(harvester.state(), PipelineState::Failed);
}
