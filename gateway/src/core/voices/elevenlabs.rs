//! ElevenLabs instant voice cloning.
//!
//! - Endpoint: `POST {base}/v1/voices/add`
//! - Body: multipart with `name`, optional `description`, one `files` part per sample

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{error, info};
use url::Url;

use super::base::{VoiceError, VoiceProfile, VoiceRegistrar, VoiceRegistration, VoiceResult};
use super::format::detect_audio_format;
use crate::core::tts::elevenlabs::body_snippet;

/// ElevenLabs voice creation response.
#[derive(Debug, Deserialize)]
struct ElevenLabsVoiceCreateResponse {
    voice_id: String,
    name: Option<String>,
}

/// Voice registration against the ElevenLabs API.
pub struct ElevenLabsVoices {
    client: reqwest::Client,
    api_key: String,
    base_url: Url,
}

impl std::fmt::Debug for ElevenLabsVoices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabsVoices")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl Drop for ElevenLabsVoices {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.api_key.zeroize();
    }
}

impl ElevenLabsVoices {
    pub fn new(api_key: impl Into<String>, base_url: &str, timeout: Duration) -> VoiceResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(VoiceError::InvalidConfiguration(
                "ElevenLabs API key is empty".to_string(),
            ));
        }

        let base_url = Url::parse(base_url).map_err(|e| {
            VoiceError::InvalidConfiguration(format!("Invalid ElevenLabs base URL '{base_url}': {e}"))
        })?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                VoiceError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            api_key,
            base_url,
        })
    }

    fn add_voice_url(&self) -> VoiceResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                VoiceError::InvalidConfiguration("ElevenLabs base URL cannot be a base".to_string())
            })?
            .pop_if_empty()
            .extend(["v1", "voices", "add"]);
        Ok(url)
    }

    async fn build_form(registration: &VoiceRegistration) -> VoiceResult<Form> {
        let mut form = Form::new().text("name", registration.name.clone());

        if let Some(desc) = &registration.description {
            form = form.text("description", desc.clone());
        }

        if registration.remove_background_noise {
            form = form.text("remove_background_noise", "true");
        }

        if !registration.labels.is_empty() {
            let labels_json = serde_json::to_string(&registration.labels)
                .map_err(|e| VoiceError::InvalidRequest(format!("Invalid labels: {e}")))?;
            form = form.text("labels", labels_json);
        }

        for (i, sample_path) in registration.sample_paths.iter().enumerate() {
            let data = tokio::fs::read(sample_path)
                .await
                .map_err(|source| VoiceError::SampleUnreadable {
                    path: sample_path.clone(),
                    source,
                })?;

            if data.is_empty() {
                return Err(VoiceError::InvalidRequest(format!(
                    "sample {} is empty",
                    sample_path.display()
                )));
            }

            let (mime_type, extension) = detect_audio_format(&data);
            let file_name = sample_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("sample_{i}.{extension}"));

            let part = Part::bytes(data)
                .file_name(file_name)
                .mime_str(mime_type)
                .map_err(|e| VoiceError::InvalidRequest(format!("Failed to set MIME type: {e}")))?;

            form = form.part("files", part);
        }

        Ok(form)
    }
}

#[async_trait]
impl VoiceRegistrar for ElevenLabsVoices {
    async fn register_voice(&self, registration: &VoiceRegistration) -> VoiceResult<VoiceProfile> {
        registration.validate()?;

        let form = Self::build_form(registration).await?;
        let url = self.add_voice_url()?;

        info!(
            "Registering voice '{}' with {} sample(s)",
            registration.name,
            registration.sample_paths.len()
        );

        let response = self
            .client
            .post(url)
            .header("xi-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!("Voice registration request failed: {}", e);
                VoiceError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                "ElevenLabs voice registration returned HTTP {}: {}",
                status.as_u16(),
                body_snippet(&body)
            );
            return Err(match status.as_u16() {
                401 | 403 => VoiceError::Unauthorized(status.as_u16()),
                429 => VoiceError::RateLimited,
                code if status.is_client_error() => VoiceError::Rejected { status: code },
                code => VoiceError::ProviderError(format!("ElevenLabs returned HTTP {code}")),
            });
        }

        let created: ElevenLabsVoiceCreateResponse = response.json().await.map_err(|e| {
            error!("Failed to parse ElevenLabs voice response: {}", e);
            VoiceError::InvalidResponse(e.to_string())
        })?;

        let profile = VoiceProfile {
            voice_id: created.voice_id,
            name: created.name.unwrap_or_else(|| registration.name.clone()),
            created_at: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_default(),
        };

        info!(
            "Voice '{}' registered with id {}",
            profile.name, profile.voice_id
        );
        Ok(profile)
    }
}
