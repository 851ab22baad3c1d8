use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{
    Attribute, Attributes, ClientOptions, Error as ObjectStoreError, ObjectStore, PutOptions,
    PutPayload, RetryConfig,
};
use tracing::{debug, error, info};

use super::error::{StorageError, StorageResult};
use crate::config::StorageConfig;
use crate::utils::url_validation::virtual_hosted_endpoint;

/// Object storage client bound to a single bucket.
///
/// Cloning is cheap; all clones share the underlying connection pool.
#[derive(Clone)]
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl std::fmt::Debug for ObjectStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStorage")
            .field("bucket", &self.bucket)
            .field("store", &self.store.to_string())
            .finish()
    }
}

impl ObjectStorage {
    /// Wrap an existing store. `bucket` is used for logging and messages only.
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    /// Build an S3 client from configuration.
    ///
    /// Requests are bounded by the configured timeouts. Failed or timed out
    /// requests are retried up to `max_retries` times with exponential backoff.
    pub fn from_config(config: &StorageConfig) -> StorageResult<Self> {
        let access_key = config.access_key.as_deref().ok_or_else(|| {
            StorageError::Configuration("storage access key is not configured".to_string())
        })?;
        let secret_key = config.secret_key.as_deref().ok_or_else(|| {
            StorageError::Configuration("storage secret key is not configured".to_string())
        })?;

        let endpoint = if config.virtual_hosted_style {
            virtual_hosted_endpoint(&config.endpoint, &config.bucket)
                .map_err(|e| StorageError::Configuration(e.to_string()))?
        } else {
            config.endpoint.trim_end_matches('/').to_string()
        };

        let client_options = ClientOptions::new()
            .with_timeout(config.request_timeout())
            .with_connect_timeout(config.connect_timeout())
            .with_allow_http(config.allow_http);

        let retry = RetryConfig {
            max_retries: config.max_retries,
            retry_timeout: config.request_timeout() * (config.max_retries as u32 + 1),
            ..RetryConfig::default()
        };

        let store = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region)
            .with_endpoint(&endpoint)
            .with_access_key_id(access_key)
            .with_secret_access_key(secret_key)
            .with_virtual_hosted_style_request(config.virtual_hosted_style)
            .with_client_options(client_options)
            .with_retry(retry)
            .build()
            .map_err(|e| StorageError::Configuration(e.to_string()))?;

        debug!(
            "Object storage configured - bucket={}, endpoint={}, virtual_hosted={}",
            config.bucket, endpoint, config.virtual_hosted_style
        );

        Ok(Self::new(Arc::new(store), config.bucket.clone()))
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn object_path(key: &str) -> StorageResult<ObjectPath> {
        ObjectPath::parse(key).map_err(|e| StorageError::InvalidKey {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }

    fn map_store_error(&self, key: &str, err: ObjectStoreError) -> StorageError {
        match err {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound {
                bucket: self.bucket.clone(),
                key: key.to_string(),
            },
            other => StorageError::Unavailable {
                key: key.to_string(),
                source: other,
            },
        }
    }

    /// Upload a local file to `key`, overwriting any existing object.
    ///
    /// The object is tagged with `content_type`. Returns the number of bytes
    /// uploaded.
    pub async fn store(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
    ) -> StorageResult<u64> {
        let location = Self::object_path(key)?;

        let data = tokio::fs::read(local_path).await.map_err(|source| {
            error!(
                "Error uploading {}: cannot read {}: {}",
                key,
                local_path.display(),
                source
            );
            StorageError::Io {
                path: local_path.to_path_buf(),
                source,
            }
        })?;
        let size = data.len() as u64;

        let options = PutOptions {
            attributes: Attributes::from_iter([(
                Attribute::ContentType,
                content_type.to_string(),
            )]),
            ..PutOptions::default()
        };

        self.store
            .put_opts(&location, PutPayload::from(data), options)
            .await
            .map_err(|e| {
                error!("Error uploading {}: {}", key, e);
                self.map_store_error(key, e)
            })?;

        info!(
            "{} uploaded successfully to {} ({} bytes, {})",
            key, self.bucket, size, content_type
        );
        Ok(size)
    }

    /// Upload an in-memory buffer to `key`, overwriting any existing object.
    pub async fn put_bytes(&self, key: &str, data: Bytes) -> StorageResult<()> {
        let location = Self::object_path(key)?;
        let size = data.len();

        self.store
            .put(&location, PutPayload::from(data))
            .await
            .map_err(|e| {
                error!("Error uploading {}: {}", key, e);
                self.map_store_error(key, e)
            })?;

        debug!("{} written to {} ({} bytes)", key, self.bucket, size);
        Ok(())
    }

    /// Download an object into memory.
    pub async fn fetch_bytes(&self, key: &str) -> StorageResult<Bytes> {
        let location = Self::object_path(key)?;

        let result = self.store.get(&location).await.map_err(|e| {
            match &e {
                ObjectStoreError::NotFound { .. } => {
                    info!("Object {} not found in bucket {}", key, self.bucket)
                }
                _ => error!("Error reading {}: {}", key, e),
            }
            self.map_store_error(key, e)
        })?;

        result.bytes().await.map_err(|e| {
            error!("Error reading body of {}: {}", key, e);
            self.map_store_error(key, e)
        })
    }

    /// Download an object and decode it as UTF-8 text.
    pub async fn fetch_text(&self, key: &str) -> StorageResult<String> {
        let data = self.fetch_bytes(key).await?;

        String::from_utf8(data.to_vec()).map_err(|_| {
            error!("Error reading {}: content is not valid UTF-8", key);
            StorageError::InvalidUtf8 {
                key: key.to_string(),
            }
        })
    }

    /// Download an object to a local file, returning the number of bytes written.
    pub async fn download_to(&self, key: &str, local_path: &Path) -> StorageResult<u64> {
        let data = self.fetch_bytes(key).await?;

        tokio::fs::write(local_path, &data)
            .await
            .map_err(|source| StorageError::Io {
                path: local_path.to_path_buf(),
                source,
            })?;

        debug!(
            "Downloaded {} from {} to {} ({} bytes)",
            key,
            self.bucket,
            local_path.display(),
            data.len()
        );
        Ok(data.len() as u64)
    }

    /// Check whether an object exists.
    pub async fn exists(&self, key: &str) -> StorageResult<bool> {
        let location = Self::object_path(key)?;

        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(self.map_store_error(key, e)),
        }
    }

    /// Delete an object. Deleting a missing object is not an error.
    pub async fn delete(&self, key: &str) -> StorageResult<()> {
        let location = Self::object_path(key)?;

        match self.store.delete(&location).await {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => Ok(()),
            Err(e) => {
                error!("Error deleting {}: {}", key, e);
                Err(self.map_store_error(key, e))
            }
        }
    }
}
