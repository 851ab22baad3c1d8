//! Test Fixtures Module
//!
//! Shared helpers for the gateway integration tests:
//! - In-memory application state with a scripted synthesizer
//! - Multipart request builders
//! - Response body helpers

// Not every test binary uses every helper
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{Router, body::Body, http::Request, response::Response};
use bytes::Bytes;
use object_store::memory::InMemory;
use serde_json::Value;

use voiceover_gateway::{
    AppState, AudioStream, ObjectStorage, ServerConfig, SpeechSynthesizer, SynthesisRequest,
    TTSError, TTSResult, routes,
};

pub const BOUNDARY: &str = "voiceover-test-boundary";

/// What the fake synthesizer answers with.
#[derive(Clone)]
pub enum SynthBehavior {
    /// Echo the request text back as the audio bytes, prefixed with `ID3`
    Echo,
    /// Return an empty, successful stream
    Empty,
    /// Fail before streaming
    Fail(TTSError),
}

pub struct FakeSynthesizer {
    behavior: SynthBehavior,
    calls: AtomicUsize,
}

impl FakeSynthesizer {
    pub fn new(behavior: SynthBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    fn provider_name(&self) -> &'static str {
        "fake"
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> TTSResult<AudioStream> {
        request.validate()?;
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            SynthBehavior::Echo => {
                let chunks: Vec<TTSResult<Bytes>> = vec![
                    Ok(Bytes::from_static(b"ID3")),
                    Ok(Bytes::from(request.text.clone().into_bytes())),
                ];
                Ok(Box::pin(futures::stream::iter(chunks)))
            }
            SynthBehavior::Empty => Ok(Box::pin(futures::stream::empty::<TTSResult<Bytes>>())),
            SynthBehavior::Fail(err) => Err(err.clone()),
        }
    }
}

/// Test configuration with scratch files under `temp_dir`.
pub fn test_config(temp_dir: &Path) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.host = "127.0.0.1".to_string();
    config.elevenlabs_api_key = Some("test_elevenlabs_key".to_string());
    config.temp_dir = Some(temp_dir.to_path_buf());
    config.max_upload_bytes = 1024;
    config
}

/// State backed by an in-memory bucket and the given synthesizer.
pub fn memory_state(
    temp_dir: &Path,
    synthesizer: Arc<dyn SpeechSynthesizer>,
) -> (Arc<AppState>, ObjectStorage) {
    let storage = ObjectStorage::new(Arc::new(InMemory::new()), "pitchbox");
    let state = AppState::with_clients(test_config(temp_dir), storage.clone(), synthesizer);
    (state, storage)
}

pub fn app(state: Arc<AppState>) -> Router {
    routes::api::create_app(state)
}

pub fn multipart_body(field: &str, file_name: Option<&str>, content: &[u8]) -> Vec<u8> {
    let disposition = match file_name {
        Some(name) => format!("form-data; name=\"{field}\"; filename=\"{name}\""),
        None => format!("form-data; name=\"{field}\""),
    };

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Disposition: {disposition}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: text/plain\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload-tigris")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn upload_file_request(content: &[u8]) -> Request<Body> {
    upload_request(multipart_body("file", Some("script.txt"), content))
}

pub fn generate_request() -> Request<Body> {
    Request::builder()
        .uri("/generate-audio")
        .body(Body::empty())
        .unwrap()
}

pub async fn json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}
