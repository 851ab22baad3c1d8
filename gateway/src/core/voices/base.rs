use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while registering a voice.
#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid voice registration: {0}")]
    InvalidRequest(String),

    #[error("Cannot read sample {}: {source}", path.display())]
    SampleUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Provider rejected the credentials (HTTP {0})")]
    Unauthorized(u16),

    #[error("Provider rate limit or quota exceeded")]
    RateLimited,

    #[error("Provider rejected the registration (HTTP {status})")]
    Rejected { status: u16 },

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Request to provider timed out")]
    Timeout,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Unexpected provider response: {0}")]
    InvalidResponse(String),
}

pub type VoiceResult<T> = Result<T, VoiceError>;

impl From<reqwest::Error> for VoiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            VoiceError::Timeout
        } else if err.is_decode() {
            VoiceError::InvalidResponse(err.to_string())
        } else if err.is_connect() || err.is_request() {
            VoiceError::NetworkError(err.to_string())
        } else {
            VoiceError::ProviderError(err.to_string())
        }
    }
}

/// Input for creating a cloned voice.
#[derive(Debug, Clone, Default)]
pub struct VoiceRegistration {
    pub name: String,
    pub description: Option<String>,
    /// Local sample recordings; at least one is required
    pub sample_paths: Vec<PathBuf>,
    pub remove_background_noise: bool,
    pub labels: HashMap<String, String>,
}

impl VoiceRegistration {
    pub fn new(name: impl Into<String>, sample_paths: Vec<PathBuf>) -> Self {
        Self {
            name: name.into(),
            sample_paths,
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Check the request shape. Sample files are checked when they are read.
    pub fn validate(&self) -> VoiceResult<()> {
        if self.name.trim().is_empty() {
            return Err(VoiceError::InvalidRequest(
                "voice name must not be empty".to_string(),
            ));
        }
        if self.sample_paths.is_empty() {
            return Err(VoiceError::InvalidRequest(
                "at least one audio sample is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse a `key=value` voice label.
pub fn parse_label(input: &str) -> VoiceResult<(String, String)> {
    match input.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(VoiceError::InvalidRequest(format!(
            "label '{input}' must look like key=value"
        ))),
    }
}

/// A voice created on the provider side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub voice_id: String,
    pub name: String,
    /// RFC 3339 creation timestamp
    pub created_at: String,
}

/// A provider able to create cloned voices.
///
/// Registration is not idempotent, so implementations must not retry.
#[async_trait]
pub trait VoiceRegistrar: Send + Sync {
    async fn register_voice(&self, registration: &VoiceRegistration) -> VoiceResult<VoiceProfile>;
}
