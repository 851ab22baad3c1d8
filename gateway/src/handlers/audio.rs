use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::info;

use crate::errors::AppResult;
use crate::state::AppState;

/// Response body for a successful synthesis run.
#[derive(Debug, Serialize)]
pub struct GenerateAudioResponse {
    pub message: String,
    /// Object key the audio was stored under
    pub key: String,
    /// Size of the stored audio in bytes
    pub bytes: u64,
}

/// Handler for GET /generate-audio
///
/// Reads the stored script, synthesizes it with the configured voice and
/// stores the audio under the configured audio key, replacing any previous
/// artifact.
///
/// # Response
///
/// ```json
/// {
///   "message": "Audio generated and uploaded successfully.",
///   "key": "output.mp3",
///   "bytes": 48213
/// }
/// ```
pub async fn generate_audio(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<GenerateAudioResponse>> {
    info!("Audio generation requested");

    let generated = state.pipeline.generate_audio().await?;

    Ok(Json(GenerateAudioResponse {
        message: "Audio generated and uploaded successfully.".to_string(),
        key: generated.key,
        bytes: generated.bytes,
    }))
}
