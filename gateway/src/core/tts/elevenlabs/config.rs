//! Configuration types for the ElevenLabs REST API.

use std::time::Duration;

use super::provider::ELEVENLABS_API_URL;
use crate::config::ServerConfig;
use crate::core::tts::base::{TTSError, TTSResult};

/// Connection settings for the ElevenLabs API.
#[derive(Clone)]
pub struct ElevenLabsTTSConfig {
    pub api_key: String,
    /// API root, e.g. `https://api.elevenlabs.io`
    pub base_url: String,
    /// Applies to the whole request, streamed body included
    pub timeout: Duration,
}

impl std::fmt::Debug for ElevenLabsTTSConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabsTTSConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Drop for ElevenLabsTTSConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.api_key.zeroize();
    }
}

impl ElevenLabsTTSConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: ELEVENLABS_API_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build from server configuration, failing when no API key is set.
    pub fn from_server_config(config: &ServerConfig) -> TTSResult<Self> {
        let api_key = config
            .get_elevenlabs_api_key()
            .map_err(TTSError::InvalidConfiguration)?;

        Ok(Self::new(api_key)
            .with_base_url(config.elevenlabs_base_url.clone())
            .with_timeout(config.tts_timeout()))
    }
}

// =============================================================================
// Output formats
// =============================================================================

/// Container/codec family of an ElevenLabs output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCodec {
    Mp3,
    Pcm,
    Ulaw,
    Alaw,
    Opus,
    Wav,
}

impl AudioCodec {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Pcm => "audio/pcm",
            Self::Ulaw => "audio/basic",
            Self::Alaw => "audio/x-alaw-basic",
            Self::Opus => "audio/ogg",
            Self::Wav => "audio/wav",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Pcm => "pcm",
            Self::Ulaw => "ulaw",
            Self::Alaw => "alaw",
            Self::Opus => "opus",
            Self::Wav => "wav",
        }
    }
}

/// Parsed ElevenLabs `output_format` such as `mp3_44100_128` or `pcm_16000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElevenLabsOutputFormat {
    pub codec: AudioCodec,
    pub sample_rate: u32,
    /// Bitrate in kbps for compressed formats
    pub bitrate_kbps: Option<u32>,
}

impl ElevenLabsOutputFormat {
    /// Parse the `{codec}_{sample_rate}[_{bitrate}]` form used by the API.
    pub fn parse(format: &str) -> TTSResult<Self> {
        let invalid = || TTSError::InvalidConfiguration(format!("Unknown output format: {format}"));

        let mut parts = format.split('_');
        let codec = match parts.next().map(|p| p.to_lowercase()).as_deref() {
            Some("mp3") => AudioCodec::Mp3,
            Some("pcm") => AudioCodec::Pcm,
            Some("ulaw") => AudioCodec::Ulaw,
            Some("alaw") => AudioCodec::Alaw,
            Some("opus") => AudioCodec::Opus,
            Some("wav") => AudioCodec::Wav,
            _ => return Err(invalid()),
        };

        let sample_rate = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(invalid)?;

        let bitrate_kbps = match parts.next() {
            Some(p) => Some(p.parse::<u32>().map_err(|_| invalid())?),
            None => None,
        };

        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            codec,
            sample_rate,
            bitrate_kbps,
        })
    }

    pub fn content_type(&self) -> &'static str {
        self.codec.content_type()
    }

    pub fn extension(&self) -> &'static str {
        self.codec.extension()
    }
}
