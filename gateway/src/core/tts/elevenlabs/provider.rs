//! ElevenLabs TTS provider implementation.

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::json;
use tracing::{debug, error, info, warn};
use url::Url;

use super::config::{ElevenLabsOutputFormat, ElevenLabsTTSConfig};
use crate::core::tts::base::{
    AudioStream, SpeechSynthesizer, SynthesisRequest, TTSError, TTSResult,
};

/// ElevenLabs API root
pub const ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io";

/// Longest slice of a vendor error body written to the logs
const MAX_LOGGED_BODY: usize = 512;

/// Leading part of a vendor error body that is safe to log.
pub(crate) fn body_snippet(body: &str) -> &str {
    match body.char_indices().nth(MAX_LOGGED_BODY) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}

// =============================================================================
// ElevenLabs TTS Provider
// =============================================================================

/// Text-to-speech over the ElevenLabs REST API.
///
/// One instance holds a pooled HTTP client and may be shared across tasks.
pub struct ElevenLabsTTS {
    client: reqwest::Client,
    config: ElevenLabsTTSConfig,
    base_url: Url,
}

impl std::fmt::Debug for ElevenLabsTTS {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabsTTS")
            .field("config", &self.config)
            .finish()
    }
}

impl ElevenLabsTTS {
    pub fn new(config: ElevenLabsTTSConfig) -> TTSResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(TTSError::InvalidConfiguration(
                "ElevenLabs API key is empty".to_string(),
            ));
        }

        let base_url = Url::parse(&config.base_url).map_err(|e| {
            TTSError::InvalidConfiguration(format!(
                "Invalid ElevenLabs base URL '{}': {e}",
                config.base_url
            ))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(TTSError::InvalidConfiguration(format!(
                "ElevenLabs base URL '{}' cannot be a base",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                TTSError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    /// `{base}/v1/text-to-speech/{voice_id}?output_format={format}`
    pub(crate) fn speech_url(&self, voice_id: &str, output_format: &str) -> TTSResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                TTSError::InvalidConfiguration("ElevenLabs base URL cannot be a base".to_string())
            })?
            .pop_if_empty()
            .extend(["v1", "text-to-speech", voice_id]);
        url.query_pairs_mut()
            .append_pair("output_format", output_format);
        Ok(url)
    }

    /// Map a non-success status to an error, logging the vendor body.
    async fn status_error(response: reqwest::Response) -> TTSError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        error!(
            "ElevenLabs returned HTTP {}: {}",
            status.as_u16(),
            body_snippet(&body)
        );

        match status.as_u16() {
            401 | 403 => TTSError::Unauthorized(status.as_u16()),
            429 => TTSError::RateLimited,
            code if status.is_client_error() => TTSError::Rejected { status: code },
            code => TTSError::ProviderError(format!("ElevenLabs returned HTTP {code}")),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsTTS {
    fn provider_name(&self) -> &'static str {
        "elevenlabs"
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> TTSResult<AudioStream> {
        request.validate()?;

        if let Err(e) = ElevenLabsOutputFormat::parse(&request.output_format) {
            // The vendor may know formats this build does not; let it decide
            warn!("{e}; sending it to ElevenLabs unchanged");
        }

        let url = self.speech_url(&request.voice_id, &request.output_format)?;
        let body = json!({
            "text": request.text,
            "model_id": request.model_id,
        });

        debug!(
            "Requesting speech from ElevenLabs - voice={}, model={}, format={}, chars={}",
            request.voice_id,
            request.model_id,
            request.output_format,
            request.text.chars().count()
        );

        let response = self
            .client
            .post(url)
            .header("xi-api-key", &self.config.api_key)
            .header("Accept", "audio/*")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("ElevenLabs request failed: {}", e);
                TTSError::from(e)
            })?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        info!(
            "ElevenLabs accepted synthesis request for voice {}",
            request.voice_id
        );

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(TTSError::from));
        Ok(Box::pin(stream))
    }
}
