use super::utils::{env_var, parse_env, parse_env_bool};

/// Raw configuration values read from the process environment.
///
/// Every field is optional here; defaults are applied in `merge`.
#[derive(Debug, Default, Clone)]
pub(crate) struct EnvConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tls_enabled: Option<bool>,
    pub tls_cert_path: Option<String>,
    pub tls_key_path: Option<String>,

    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_base_url: Option<String>,
    pub voice_id: Option<String>,
    pub model_id: Option<String>,
    pub output_format: Option<String>,
    pub tts_timeout_seconds: Option<u64>,

    pub storage_bucket: Option<String>,
    pub storage_endpoint: Option<String>,
    pub storage_region: Option<String>,
    pub storage_access_key: Option<String>,
    pub storage_secret_key: Option<String>,
    pub storage_virtual_hosted_style: Option<bool>,
    pub storage_allow_http: Option<bool>,
    pub storage_request_timeout_seconds: Option<u64>,
    pub storage_connect_timeout_seconds: Option<u64>,
    pub storage_max_retries: Option<usize>,

    pub script_key: Option<String>,
    pub audio_key: Option<String>,
    pub temp_dir: Option<String>,
    pub max_upload_bytes: Option<usize>,

    pub cors_allowed_origins: Option<String>,
    pub rate_limit_requests_per_second: Option<u32>,
    pub rate_limit_burst_size: Option<u32>,
}

impl EnvConfig {
    /// Read all supported variables.
    ///
    /// The storage credentials use the `TIGRIS_*` names the deployment already
    /// exports.
    pub(crate) fn load() -> Result<Self, String> {
        Ok(Self {
            host: env_var("HOST"),
            port: parse_env("PORT")?,
            tls_enabled: parse_env_bool("TLS_ENABLED")?,
            tls_cert_path: env_var("TLS_CERT_PATH"),
            tls_key_path: env_var("TLS_KEY_PATH"),

            elevenlabs_api_key: env_var("ELEVENLABS_API_KEY"),
            elevenlabs_base_url: env_var("ELEVENLABS_BASE_URL"),
            voice_id: env_var("VOICE_ID"),
            model_id: env_var("ELEVENLABS_MODEL_ID"),
            output_format: env_var("ELEVENLABS_OUTPUT_FORMAT"),
            tts_timeout_seconds: parse_env("TTS_TIMEOUT_SECONDS")?,

            storage_bucket: env_var("TIGRIS_BUCKET"),
            storage_endpoint: env_var("TIGRIS_ENDPOINT"),
            storage_region: env_var("TIGRIS_REGION"),
            storage_access_key: env_var("TIGRIS_ACCESS_KEY"),
            storage_secret_key: env_var("TIGRIS_SECRET_KEY"),
            storage_virtual_hosted_style: parse_env_bool("TIGRIS_VIRTUAL_HOSTED_STYLE")?,
            storage_allow_http: parse_env_bool("TIGRIS_ALLOW_HTTP")?,
            storage_request_timeout_seconds: parse_env("STORAGE_TIMEOUT_SECONDS")?,
            storage_connect_timeout_seconds: parse_env("STORAGE_CONNECT_TIMEOUT_SECONDS")?,
            storage_max_retries: parse_env("STORAGE_MAX_RETRIES")?,

            script_key: env_var("SCRIPT_KEY"),
            audio_key: env_var("AUDIO_KEY"),
            temp_dir: env_var("TEMP_DIR"),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES")?,

            cors_allowed_origins: env_var("CORS_ALLOWED_ORIGINS"),
            rate_limit_requests_per_second: parse_env("RATE_LIMIT_REQUESTS_PER_SECOND")?,
            rate_limit_burst_size: parse_env("RATE_LIMIT_BURST_SIZE")?,
        })
    }
}
