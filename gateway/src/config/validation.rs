use object_store::path::Path as ObjectPath;

use super::StorageConfig;
use crate::utils::url_validation::{validate_endpoint_url, virtual_hosted_endpoint};

/// Validate the ElevenLabs settings that do not depend on credentials.
pub(crate) fn validate_speech_settings(
    base_url: &str,
    voice_id: &str,
    model_id: &str,
    output_format: &str,
    timeout_seconds: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    validate_endpoint_url(base_url, false)
        .map_err(|e| format!("Invalid ElevenLabs base URL '{base_url}': {e}"))?;

    if voice_id.trim().is_empty() {
        return Err("VOICE_ID must not be empty".into());
    }
    if model_id.trim().is_empty() {
        return Err("ElevenLabs model id must not be empty".into());
    }
    if output_format.trim().is_empty() {
        return Err("ElevenLabs output format must not be empty".into());
    }
    if timeout_seconds == 0 {
        return Err("TTS_TIMEOUT_SECONDS must be greater than zero".into());
    }

    Ok(())
}

/// Validate the object storage settings that do not depend on credentials.
pub(crate) fn validate_storage_settings(
    storage: &StorageConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if storage.bucket.trim().is_empty() {
        return Err("Storage bucket name must not be empty".into());
    }

    validate_endpoint_url(&storage.endpoint, storage.allow_http)
        .map_err(|e| format!("Invalid storage endpoint '{}': {e}", storage.endpoint))?;

    if storage.virtual_hosted_style {
        virtual_hosted_endpoint(&storage.endpoint, &storage.bucket).map_err(|e| {
            format!(
                "Cannot address bucket '{}' virtual-hosted-style at '{}': {e}",
                storage.bucket, storage.endpoint
            )
        })?;
    }

    if storage.region.trim().is_empty() {
        return Err("Storage region must not be empty".into());
    }
    if storage.request_timeout_seconds == 0 {
        return Err("STORAGE_TIMEOUT_SECONDS must be greater than zero".into());
    }
    if storage.connect_timeout_seconds == 0 {
        return Err("STORAGE_CONNECT_TIMEOUT_SECONDS must be greater than zero".into());
    }

    Ok(())
}

/// Validate the fixed object keys used by the pipeline.
pub(crate) fn validate_object_keys(
    script_key: &str,
    audio_key: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    for (name, key) in [("SCRIPT_KEY", script_key), ("AUDIO_KEY", audio_key)] {
        if key.trim().is_empty() {
            return Err(format!("{name} must not be empty").into());
        }
        ObjectPath::parse(key).map_err(|e| format!("Invalid {name} '{key}': {e}"))?;
    }

    if script_key == audio_key {
        return Err("SCRIPT_KEY and AUDIO_KEY must differ".into());
    }

    Ok(())
}

/// Validate HTTP server limits.
pub(crate) fn validate_limits(
    max_upload_bytes: usize,
    rate_limit_requests_per_second: u32,
    rate_limit_burst_size: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    if max_upload_bytes == 0 {
        return Err("MAX_UPLOAD_BYTES must be greater than zero".into());
    }
    if rate_limit_requests_per_second == 0 {
        return Err("RATE_LIMIT_REQUESTS_PER_SECOND must be greater than zero".into());
    }
    if rate_limit_burst_size == 0 {
        return Err("RATE_LIMIT_BURST_SIZE must be greater than zero".into());
    }
    Ok(())
}
