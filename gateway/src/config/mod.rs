//! Configuration module for the voiceover gateway
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//! - `utils`: Utility functions for configuration parsing
//!
//! # Example
//! ```rust,no_run
//! use voiceover_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

mod env;
mod merge;
mod utils;
mod validation;
mod yaml;

pub use yaml::YamlConfig;

/// Default ElevenLabs REST endpoint
pub const DEFAULT_ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";
/// Voice used when `VOICE_ID` is not set
pub const DEFAULT_VOICE_ID: &str = "JBFqnCBsd6RMkjVDRZzb";
pub const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";
pub const DEFAULT_OUTPUT_FORMAT: &str = "mp3_44100_128";
/// Tigris global endpoint
pub const DEFAULT_STORAGE_ENDPOINT: &str = "https://t3.storage.dev";
pub const DEFAULT_BUCKET: &str = "pitchbox";
pub const DEFAULT_SCRIPT_KEY: &str = "script.txt";
pub const DEFAULT_AUDIO_KEY: &str = "output.mp3";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// TLS configuration for HTTPS
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// S3-compatible object storage configuration
///
/// The secrets in here are zeroized when the owning [`ServerConfig`] is dropped.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// The single bucket holding the script and the audio artifact
    pub bucket: String,
    /// Service endpoint without the bucket (e.g. `https://t3.storage.dev`)
    pub endpoint: String,
    /// Signing region; Tigris accepts `auto`
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// Address the bucket as `https://{bucket}.{endpoint-host}`
    pub virtual_hosted_style: bool,
    /// Permit `http://` endpoints (local S3 emulators only)
    pub allow_http: bool,
    /// Per-request timeout; timed out requests are retried
    pub request_timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
    /// Maximum retries for idempotent object requests
    pub max_retries: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            endpoint: DEFAULT_STORAGE_ENDPOINT.to_string(),
            region: "auto".to_string(),
            access_key: None,
            secret_key: None,
            virtual_hosted_style: true,
            allow_http: false,
            request_timeout_seconds: 30,
            connect_timeout_seconds: 5,
            max_retries: 3,
        }
    }
}

impl StorageConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

/// Server configuration
///
/// Contains all configuration needed to run the voiceover gateway, including:
/// - Server settings (host, port, TLS)
/// - ElevenLabs credentials and synthesis defaults
/// - Object storage settings
/// - Pipeline object keys and local scratch directory
/// - Security settings (CORS, rate limiting, upload size)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    // ElevenLabs settings
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_base_url: String,
    /// Voice used for synthesis (typically a cloned voice id)
    pub voice_id: String,
    pub model_id: String,
    pub output_format: String,
    pub tts_timeout_seconds: u64,

    // Object storage
    pub storage: StorageConfig,

    // Pipeline settings
    pub script_key: String,
    pub audio_key: String,
    /// Directory for scoped temporary files; system temp dir when `None`
    pub temp_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: None (CORS disabled, same-origin only)
    pub cors_allowed_origins: Option<String>,
    /// Maximum requests per second per IP address
    /// Default: 60
    pub rate_limit_requests_per_second: u32,
    /// Maximum burst size for rate limiting
    /// Default: 10
    pub rate_limit_burst_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            tls: None,
            elevenlabs_api_key: None,
            elevenlabs_base_url: DEFAULT_ELEVENLABS_BASE_URL.to_string(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            tts_timeout_seconds: 120,
            storage: StorageConfig::default(),
            script_key: DEFAULT_SCRIPT_KEY.to_string(),
            audio_key: DEFAULT_AUDIO_KEY.to_string(),
            temp_dir: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cors_allowed_origins: None,
            rate_limit_requests_per_second: 60,
            rate_limit_burst_size: 10,
        }
    }
}

/// Implement Drop to zeroize all secret fields when ServerConfig is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.elevenlabs_api_key {
            key.zeroize();
        }
        if let Some(ref mut key) = self.storage.access_key {
            key.zeroize();
        }
        if let Some(ref mut secret) = self.storage.secret_key {
            secret.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Expects `.env` to have been loaded already (see `main.rs`). Performs
    /// format validation but not credential checks; see
    /// [`ServerConfig::require_speech_credentials`] and
    /// [`ServerConfig::require_storage_credentials`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = merge::merge_config(None)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate formats, endpoints, object keys and limits.
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        validation::validate_speech_settings(
            &self.elevenlabs_base_url,
            &self.voice_id,
            &self.model_id,
            &self.output_format,
            self.tts_timeout_seconds,
        )?;
        validation::validate_storage_settings(&self.storage)?;
        validation::validate_object_keys(&self.script_key, &self.audio_key)?;
        validation::validate_limits(
            self.max_upload_bytes,
            self.rate_limit_requests_per_second,
            self.rate_limit_burst_size,
        )?;
        Ok(())
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if TLS is enabled
    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    /// Get the ElevenLabs API key
    ///
    /// # Returns
    /// * `Result<String, String>` - The API key on success, or an error message on failure
    pub fn get_elevenlabs_api_key(&self) -> Result<String, String> {
        self.elevenlabs_api_key
            .as_ref()
            .cloned()
            .ok_or_else(|| "ElevenLabs API key not configured (ELEVENLABS_API_KEY)".to_string())
    }

    /// Get storage credentials as `(access_key, secret_key)`
    pub fn get_storage_credentials(&self) -> Result<(String, String), String> {
        let access_key = self
            .storage
            .access_key
            .as_ref()
            .cloned()
            .ok_or_else(|| "Storage access key not configured (TIGRIS_ACCESS_KEY)".to_string())?;
        let secret_key = self
            .storage
            .secret_key
            .as_ref()
            .cloned()
            .ok_or_else(|| "Storage secret key not configured (TIGRIS_SECRET_KEY)".to_string())?;
        Ok((access_key, secret_key))
    }

    /// Fail unless the speech vendor can be called.
    pub fn require_speech_credentials(&self) -> Result<(), String> {
        self.get_elevenlabs_api_key().map(|_| ())
    }

    /// Fail unless the bucket can be reached.
    pub fn require_storage_credentials(&self) -> Result<(), String> {
        self.get_storage_credentials().map(|_| ())
    }

    /// Timeout applied to each speech vendor request, body included
    pub fn tts_timeout(&self) -> Duration {
        Duration::from_secs(self.tts_timeout_seconds)
    }

    /// Directory where scoped temporary files are created
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
