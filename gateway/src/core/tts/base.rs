use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::Serialize;
use thiserror::Error;

/// Errors raised by speech synthesis providers.
///
/// Messages never include the provider's raw response body; providers log
/// that separately.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TTSError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Text to synthesize is empty")]
    EmptyText,

    #[error("Provider rejected the credentials (HTTP {0})")]
    Unauthorized(u16),

    #[error("Provider rate limit or quota exceeded")]
    RateLimited,

    #[error("Provider rejected the request (HTTP {status})")]
    Rejected { status: u16 },

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Request to provider timed out")]
    Timeout,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Audio stream interrupted: {0}")]
    StreamInterrupted(String),
}

pub type TTSResult<T> = Result<T, TTSError>;

impl From<reqwest::Error> for TTSError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TTSError::Timeout
        } else if err.is_connect() || err.is_request() {
            TTSError::NetworkError(err.to_string())
        } else if err.is_body() || err.is_decode() {
            TTSError::StreamInterrupted(err.to_string())
        } else {
            TTSError::ProviderError(err.to_string())
        }
    }
}

/// Audio produced by a synthesis call.
///
/// The stream is finite and single-pass. Consumers must drain it completely;
/// stopping early leaves a truncated artifact.
pub type AudioStream = Pin<Box<dyn Stream<Item = TTSResult<Bytes>> + Send>>;

/// One text-to-speech conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice_id: String,
    pub model_id: String,
    pub output_format: String,
}

impl SynthesisRequest {
    pub fn new(
        text: impl Into<String>,
        voice_id: impl Into<String>,
        model_id: impl Into<String>,
        output_format: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            voice_id: voice_id.into(),
            model_id: model_id.into(),
            output_format: output_format.into(),
        }
    }

    /// Reject requests that would make the provider produce garbage.
    ///
    /// Blank text fails fast instead of being passed through to the vendor.
    pub fn validate(&self) -> TTSResult<()> {
        if self.text.trim().is_empty() {
            return Err(TTSError::EmptyText);
        }
        if self.voice_id.trim().is_empty() {
            return Err(TTSError::InvalidConfiguration(
                "voice_id must not be empty".to_string(),
            ));
        }
        if self.model_id.trim().is_empty() {
            return Err(TTSError::InvalidConfiguration(
                "model_id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A text-to-speech backend.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Short provider identifier used in logs.
    fn provider_name(&self) -> &'static str;

    /// Start a conversion and return the audio as a byte stream.
    async fn synthesize(&self, request: &SynthesisRequest) -> TTSResult<AudioStream>;
}

pub type BoxedSynthesizer = Arc<dyn SpeechSynthesizer>;
