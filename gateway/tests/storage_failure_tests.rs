//! Storage Failure Tests
//!
//! Point the S3 client at endpoints that refuse or fail requests and check
//! that every operation reports an error without leaving anything behind.

mod fixtures;

use axum::http::StatusCode;
use tempfile::TempDir;
use tower::util::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fixtures::*;
use voiceover_gateway::config::StorageConfig;
use voiceover_gateway::{AppState, ObjectStorage};

/// Path-style S3 client against `endpoint` with no retries and short timeouts.
fn s3_storage(endpoint: &str) -> ObjectStorage {
    let config = StorageConfig {
        endpoint: endpoint.to_string(),
        access_key: Some("tid_test".to_string()),
        secret_key: Some("tsec_test".to_string()),
        virtual_hosted_style: false,
        allow_http: true,
        request_timeout_seconds: 2,
        connect_timeout_seconds: 1,
        max_retries: 0,
        ..StorageConfig::default()
    };
    ObjectStorage::from_config(&config).unwrap()
}

#[tokio::test]
async fn test_generate_with_unreachable_storage() {
    let dir = TempDir::new().unwrap();
    let synth = FakeSynthesizer::new(SynthBehavior::Echo);
    let storage = s3_storage("http://127.0.0.1:9");
    let state = AppState::with_clients(test_config(dir.path()), storage, synth.clone());

    let response = app(state).oneshot(generate_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = json_body(response).await;
    assert_eq!(json["error"], true);
    assert_eq!(json["message"], "Object storage is unavailable.");
    assert_eq!(synth.calls(), 0);
    assert!(dir_is_empty(dir.path()));
}

#[tokio::test]
async fn test_upload_with_unreachable_storage() {
    let dir = TempDir::new().unwrap();
    let storage = s3_storage("http://127.0.0.1:9");
    let state = AppState::with_clients(
        test_config(dir.path()),
        storage,
        FakeSynthesizer::new(SynthBehavior::Echo),
    );

    let response = app(state)
        .oneshot(upload_file_request(b"Hello investors."))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["error"], true);
    assert!(dir_is_empty(dir.path()));
}

#[tokio::test]
async fn test_audio_upload_failure_after_synthesis() {
    let bucket = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pitchbox/script.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"5d41402abc4b2a76b9719d911017c592\"")
                .insert_header("Last-Modified", "Tue, 06 Jan 2026 12:00:00 GMT")
                .set_body_bytes(b"Hello investors.".to_vec()),
        )
        .mount(&bucket)
        .await;

    Mock::given(method("PUT"))
        .and(path("/pitchbox/output.mp3"))
        .respond_with(ResponseTemplate::new(403).set_body_string(
            "<Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>",
        ))
        .expect(1)
        .mount(&bucket)
        .await;

    let dir = TempDir::new().unwrap();
    let synth = FakeSynthesizer::new(SynthBehavior::Echo);
    let state = AppState::with_clients(
        test_config(dir.path()),
        s3_storage(&bucket.uri()),
        synth.clone(),
    );

    let response = app(state).oneshot(generate_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await.to_string();
    assert!(!body.contains("AccessDenied"));
    assert_eq!(synth.calls(), 1);
    assert!(dir_is_empty(dir.path()));
}
