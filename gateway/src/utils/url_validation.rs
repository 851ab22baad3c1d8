//! URL validation for vendor and storage endpoints
//!
//! Endpoints come from configuration, so they are checked once at startup:
//! - The URL must parse and carry a host
//! - HTTPS is required unless plain HTTP is explicitly allowed (local S3 emulators)
//! - Query strings and fragments are rejected, since request paths are appended to them

use thiserror::Error;
use tracing::warn;
use url::Url;

/// Errors that can occur during endpoint validation
#[derive(Debug, Error)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(#[from] url::ParseError),

    #[error("URL scheme must be HTTPS, got: {0}")]
    HttpsRequired(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("URL must have a host")]
    MissingHost,

    #[error("Endpoint URL must not contain a query string or fragment")]
    UnexpectedQuery,

    #[error("Bucket name '{0}' cannot be used as a DNS label")]
    InvalidBucketLabel(String),

    #[error("Virtual-hosted-style addressing requires a domain name, got an IP address")]
    RawIpNotAllowed,
}

/// Validate an endpoint URL from configuration.
///
/// # Example
/// ```rust
/// use voiceover_gateway::utils::url_validation::validate_endpoint_url;
///
/// assert!(validate_endpoint_url("https://t3.storage.dev", false).is_ok());
/// assert!(validate_endpoint_url("http://t3.storage.dev", false).is_err());
/// assert!(validate_endpoint_url("http://localhost:9000", true).is_ok());
/// ```
pub fn validate_endpoint_url(url: &str, allow_http: bool) -> Result<Url, UrlValidationError> {
    let parsed = Url::parse(url)?;

    match parsed.scheme() {
        "https" => {}
        "http" if allow_http => {
            warn!(url = %url, "Endpoint uses plain HTTP");
        }
        "http" => return Err(UrlValidationError::HttpsRequired("http".to_string())),
        other => return Err(UrlValidationError::UnsupportedScheme(other.to_string())),
    }

    if parsed.host_str().is_none() {
        return Err(UrlValidationError::MissingHost);
    }

    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(UrlValidationError::UnexpectedQuery);
    }

    Ok(parsed)
}

/// Build the virtual-hosted-style endpoint for a bucket.
///
/// `https://t3.storage.dev` with bucket `pitchbox` becomes
/// `https://pitchbox.t3.storage.dev`. If the endpoint already starts with the
/// bucket label it is returned unchanged.
pub fn virtual_hosted_endpoint(endpoint: &str, bucket: &str) -> Result<String, UrlValidationError> {
    if bucket.is_empty()
        || bucket.contains('.')
        || !bucket
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(UrlValidationError::InvalidBucketLabel(bucket.to_string()));
    }

    let mut parsed = Url::parse(endpoint)?;
    let host = match parsed.host() {
        Some(url::Host::Domain(domain)) => domain.to_string(),
        Some(url::Host::Ipv4(_)) | Some(url::Host::Ipv6(_)) => {
            return Err(UrlValidationError::RawIpNotAllowed);
        }
        None => return Err(UrlValidationError::MissingHost),
    };

    if host.starts_with(&format!("{bucket}.")) {
        return Ok(endpoint.trim_end_matches('/').to_string());
    }

    parsed
        .set_host(Some(&format!("{bucket}.{host}")))
        .map_err(UrlValidationError::InvalidFormat)?;

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_endpoint_url_invalid_format() {
        assert!(matches!(
            validate_endpoint_url("not a url", false),
            Err(UrlValidationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_validate_endpoint_url_https_required() {
        assert!(matches!(
            validate_endpoint_url("http://t3.storage.dev", false),
            Err(UrlValidationError::HttpsRequired(_))
        ));
    }

    #[test]
    fn test_validate_endpoint_url_http_allowed_for_local() {
        let url = validate_endpoint_url("http://127.0.0.1:9000", true).unwrap();
        assert_eq!(url.port(), Some(9000));
    }

    #[test]
    fn test_validate_endpoint_url_rejects_other_schemes() {
        assert!(matches!(
            validate_endpoint_url("ftp://example.com", true),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_validate_endpoint_url_rejects_query() {
        assert!(matches!(
            validate_endpoint_url("https://api.elevenlabs.io?x=1", false),
            Err(UrlValidationError::UnexpectedQuery)
        ));
    }

    #[test]
    fn test_virtual_hosted_endpoint_inserts_bucket() {
        let endpoint = virtual_hosted_endpoint("https://t3.storage.dev", "pitchbox").unwrap();
        assert_eq!(endpoint, "https://pitchbox.t3.storage.dev");
    }

    #[test]
    fn test_virtual_hosted_endpoint_keeps_port() {
        let endpoint = virtual_hosted_endpoint("http://localhost:9000/", "pitchbox").unwrap();
        assert_eq!(endpoint, "http://pitchbox.localhost:9000");
    }

    #[test]
    fn test_virtual_hosted_endpoint_already_prefixed() {
        let endpoint =
            virtual_hosted_endpoint("https://pitchbox.t3.storage.dev/", "pitchbox").unwrap();
        assert_eq!(endpoint, "https://pitchbox.t3.storage.dev");
    }

    #[test]
    fn test_virtual_hosted_endpoint_rejects_ip() {
        assert!(matches!(
            virtual_hosted_endpoint("http://127.0.0.1:9000", "pitchbox"),
            Err(UrlValidationError::RawIpNotAllowed)
        ));
    }

    #[test]
    fn test_virtual_hosted_endpoint_rejects_bad_bucket() {
        assert!(matches!(
            virtual_hosted_endpoint("https://t3.storage.dev", "Bad_Bucket"),
            Err(UrlValidationError::InvalidBucketLabel(_))
        ));
        assert!(matches!(
            virtual_hosted_endpoint("https://t3.storage.dev", ""),
            Err(UrlValidationError::InvalidBucketLabel(_))
        ));
    }
}
