use std::path::PathBuf;

use super::env::EnvConfig;
use super::yaml::YamlConfig;
use super::{ServerConfig, TlsConfig};

/// Build a [`ServerConfig`] from environment values with optional YAML overrides.
///
/// Priority: YAML > environment > defaults.
pub(crate) fn merge_config(
    yaml: Option<YamlConfig>,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let env = EnvConfig::load()?;
    let yaml = yaml.unwrap_or_default();

    let server = yaml.server.unwrap_or_default();
    let elevenlabs = yaml.elevenlabs.unwrap_or_default();
    let storage = yaml.storage.unwrap_or_default();
    let pipeline = yaml.pipeline.unwrap_or_default();
    let security = yaml.security.unwrap_or_default();

    let mut config = ServerConfig::default();

    if let Some(host) = server.host.or(env.host) {
        config.host = host;
    }
    if let Some(port) = server.port.or(env.port) {
        config.port = port;
    }

    let yaml_tls = server.tls.unwrap_or_default();
    let tls_enabled = yaml_tls.enabled.or(env.tls_enabled).unwrap_or(false);
    if tls_enabled {
        let cert_path = yaml_tls
            .cert_path
            .or(env.tls_cert_path)
            .ok_or("TLS is enabled but no certificate path (TLS_CERT_PATH) is configured")?;
        let key_path = yaml_tls
            .key_path
            .or(env.tls_key_path)
            .ok_or("TLS is enabled but no key path (TLS_KEY_PATH) is configured")?;
        config.tls = Some(TlsConfig {
            cert_path: PathBuf::from(cert_path),
            key_path: PathBuf::from(key_path),
        });
    }

    config.elevenlabs_api_key = elevenlabs.api_key.or(env.elevenlabs_api_key);
    if let Some(base_url) = elevenlabs.base_url.or(env.elevenlabs_base_url) {
        config.elevenlabs_base_url = base_url;
    }
    if let Some(voice_id) = elevenlabs.voice_id.or(env.voice_id) {
        config.voice_id = voice_id;
    }
    if let Some(model_id) = elevenlabs.model_id.or(env.model_id) {
        config.model_id = model_id;
    }
    if let Some(output_format) = elevenlabs.output_format.or(env.output_format) {
        config.output_format = output_format;
    }
    if let Some(timeout) = elevenlabs.timeout_seconds.or(env.tts_timeout_seconds) {
        config.tts_timeout_seconds = timeout;
    }

    if let Some(bucket) = storage.bucket.or(env.storage_bucket) {
        config.storage.bucket = bucket;
    }
    if let Some(endpoint) = storage.endpoint.or(env.storage_endpoint) {
        config.storage.endpoint = endpoint;
    }
    if let Some(region) = storage.region.or(env.storage_region) {
        config.storage.region = region;
    }
    config.storage.access_key = storage.access_key.or(env.storage_access_key);
    config.storage.secret_key = storage.secret_key.or(env.storage_secret_key);
    if let Some(virtual_hosted) = storage
        .virtual_hosted_style
        .or(env.storage_virtual_hosted_style)
    {
        config.storage.virtual_hosted_style = virtual_hosted;
    }
    if let Some(allow_http) = storage.allow_http.or(env.storage_allow_http) {
        config.storage.allow_http = allow_http;
    }
    if let Some(timeout) = storage
        .request_timeout_seconds
        .or(env.storage_request_timeout_seconds)
    {
        config.storage.request_timeout_seconds = timeout;
    }
    if let Some(timeout) = storage
        .connect_timeout_seconds
        .or(env.storage_connect_timeout_seconds)
    {
        config.storage.connect_timeout_seconds = timeout;
    }
    if let Some(retries) = storage.max_retries.or(env.storage_max_retries) {
        config.storage.max_retries = retries;
    }

    if let Some(script_key) = pipeline.script_key.or(env.script_key) {
        config.script_key = script_key;
    }
    if let Some(audio_key) = pipeline.audio_key.or(env.audio_key) {
        config.audio_key = audio_key;
    }
    config.temp_dir = pipeline.temp_dir.or(env.temp_dir).map(PathBuf::from);
    if let Some(limit) = pipeline.max_upload_bytes.or(env.max_upload_bytes) {
        config.max_upload_bytes = limit;
    }

    config.cors_allowed_origins = security.cors_allowed_origins.or(env.cors_allowed_origins);
    if let Some(rps) = security
        .rate_limit_requests_per_second
        .or(env.rate_limit_requests_per_second)
    {
        config.rate_limit_requests_per_second = rps;
    }
    if let Some(burst) = security.rate_limit_burst_size.or(env.rate_limit_burst_size) {
        config.rate_limit_burst_size = burst;
    }

    Ok(config)
}
