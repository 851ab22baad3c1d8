use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// This structure represents the full configuration that can be loaded from a YAML file.
/// All fields are optional to allow partial configuration. Values found here override
/// environment variables.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 3001
///
/// elevenlabs:
///   api_key: "your-elevenlabs-key"
///   voice_id: "JBFqnCBsd6RMkjVDRZzb"
///   model_id: "eleven_multilingual_v2"
///   output_format: "mp3_44100_128"
///   timeout_seconds: 120
///
/// storage:
///   bucket: "pitchbox"
///   endpoint: "https://t3.storage.dev"
///   region: "auto"
///   access_key: "tid_..."
///   secret_key: "tsec_..."
///   virtual_hosted_style: true
///   request_timeout_seconds: 30
///   max_retries: 3
///
/// pipeline:
///   script_key: "script.txt"
///   audio_key: "output.mp3"
///   temp_dir: "/var/tmp/voiceover"
///   max_upload_bytes: 10485760
///
/// security:
///   cors_allowed_origins: "*"
///   rate_limit_requests_per_second: 60
///   rate_limit_burst_size: 10
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub elevenlabs: Option<ElevenLabsYaml>,
    pub storage: Option<StorageYaml>,
    pub pipeline: Option<PipelineYaml>,
    pub security: Option<SecurityYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tls: Option<TlsYaml>,
}

/// TLS configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TlsYaml {
    pub enabled: Option<bool>,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

/// ElevenLabs settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ElevenLabsYaml {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Voice used for every synthesis request (usually a cloned voice)
    pub voice_id: Option<String>,
    pub model_id: Option<String>,
    /// ElevenLabs output format, e.g. `mp3_44100_128`
    pub output_format: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// S3-compatible object storage settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StorageYaml {
    pub bucket: Option<String>,
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub virtual_hosted_style: Option<bool>,
    pub allow_http: Option<bool>,
    pub request_timeout_seconds: Option<u64>,
    pub connect_timeout_seconds: Option<u64>,
    pub max_retries: Option<usize>,
}

/// Pipeline settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PipelineYaml {
    pub script_key: Option<String>,
    pub audio_key: Option<String>,
    pub temp_dir: Option<String>,
    pub max_upload_bytes: Option<usize>,
}

/// Security configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    /// CORS allowed origins (comma-separated list or "*")
    pub cors_allowed_origins: Option<String>,
    pub rate_limit_requests_per_second: Option<u32>,
    pub rate_limit_burst_size: Option<u32>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be read
    /// - The YAML is malformed
    /// - Fields have invalid types
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_config_full() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 8080

elevenlabs:
  api_key: "el-key"
  voice_id: "voice-123"
  model_id: "eleven_turbo_v2_5"
  output_format: "mp3_22050_32"
  timeout_seconds: 60

storage:
  bucket: "pitchbox"
  endpoint: "https://t3.storage.dev"
  region: "auto"
  access_key: "access"
  secret_key: "secret"
  virtual_hosted_style: false
  max_retries: 5

pipeline:
  script_key: "scripts/latest.txt"
  audio_key: "audio/latest.mp3"
  max_upload_bytes: 1024

security:
  cors_allowed_origins: "*"
  rate_limit_requests_per_second: 20
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();

        let server = config.server.as_ref().unwrap();
        assert_eq!(server.host, Some("127.0.0.1".to_string()));
        assert_eq!(server.port, Some(8080));

        let elevenlabs = config.elevenlabs.as_ref().unwrap();
        assert_eq!(elevenlabs.api_key, Some("el-key".to_string()));
        assert_eq!(elevenlabs.voice_id, Some("voice-123".to_string()));
        assert_eq!(elevenlabs.model_id, Some("eleven_turbo_v2_5".to_string()));
        assert_eq!(elevenlabs.output_format, Some("mp3_22050_32".to_string()));
        assert_eq!(elevenlabs.timeout_seconds, Some(60));
        assert!(elevenlabs.base_url.is_none());

        let storage = config.storage.as_ref().unwrap();
        assert_eq!(storage.bucket, Some("pitchbox".to_string()));
        assert_eq!(storage.virtual_hosted_style, Some(false));
        assert_eq!(storage.max_retries, Some(5));
        assert!(storage.allow_http.is_none());

        let pipeline = config.pipeline.as_ref().unwrap();
        assert_eq!(pipeline.script_key, Some("scripts/latest.txt".to_string()));
        assert_eq!(pipeline.audio_key, Some("audio/latest.mp3".to_string()));
        assert_eq!(pipeline.max_upload_bytes, Some(1024));
        assert!(pipeline.temp_dir.is_none());

        let security = config.security.as_ref().unwrap();
        assert_eq!(security.cors_allowed_origins, Some("*".to_string()));
        assert_eq!(security.rate_limit_requests_per_second, Some(20));
        assert!(security.rate_limit_burst_size.is_none());
    }

    #[test]
    fn test_yaml_config_partial() {
        let yaml = r#"
server:
  port: 9000

storage:
  bucket: "other-bucket"
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();

        assert!(config.server.as_ref().unwrap().host.is_none());
        assert_eq!(config.server.as_ref().unwrap().port, Some(9000));
        assert!(config.elevenlabs.is_none());
        assert_eq!(
            config.storage.as_ref().unwrap().bucket,
            Some("other-bucket".to_string())
        );
        assert!(config.storage.as_ref().unwrap().endpoint.is_none());
    }

    #[test]
    fn test_yaml_config_empty() {
        let config: YamlConfig = serde_yaml::from_str("").unwrap();

        assert!(config.server.is_none());
        assert!(config.elevenlabs.is_none());
        assert!(config.storage.is_none());
        assert!(config.pipeline.is_none());
        assert!(config.security.is_none());
    }

    #[test]
    fn test_yaml_config_tls() {
        let yaml = r#"
server:
  tls:
    enabled: true
    cert_path: "/etc/ssl/cert.pem"
    key_path: "/etc/ssl/key.pem"
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        let tls = config.server.unwrap().tls.unwrap();
        assert_eq!(tls.enabled, Some(true));
        assert_eq!(tls.cert_path, Some("/etc/ssl/cert.pem".to_string()));
        assert_eq!(tls.key_path, Some("/etc/ssl/key.pem".to_string()));
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let yaml_content = r#"
server:
  host: "localhost"
  port: 3000
"#;

        fs::write(&config_path, yaml_content).unwrap();

        let config = YamlConfig::from_file(&config_path).unwrap();

        assert_eq!(
            config.server.as_ref().unwrap().host,
            Some("localhost".to_string())
        );
        assert_eq!(config.server.as_ref().unwrap().port, Some(3000));
    }

    #[test]
    fn test_from_file_not_found() {
        let path = PathBuf::from("/nonexistent/config.yaml");
        let result = YamlConfig::from_file(&path);

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }

    #[test]
    fn test_from_file_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("invalid.yaml");

        fs::write(&config_path, "invalid: yaml: content:").unwrap();

        let result = YamlConfig::from_file(&config_path);

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse YAML")
        );
    }
}
