//! S3-compatible object storage (AWS, MinIO).

use bytes::Bytes;
use object_store::{aws::AmazonS3Builder, path::Path, ClientOptions, ObjectStore};
use std::env;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::{StorageError, StorageResult};
use crate::sink::{check_relative, ArtifactSink};

/// Configuration for object storage connection.
#[derive(Debug, Clone)]
pub struct ObjectStorageConfig {
    /// S3/MinIO endpoint URL; `None` uses the AWS endpoint for the region
    pub endpoint: Option<String>,
    /// Bucket name
    pub bucket: String,
    /// Access key ID
    pub access_key_id: Option<String>,
    /// Secret access key
    pub secret_access_key: Option<String>,
    /// AWS region (use "us-east-1" for MinIO)
    pub region: String,
    /// Allow HTTP (for local MinIO)
    pub allow_http: bool,
    /// Key prefix prepended to every artifact path
    pub prefix: Option<String>,
}

impl Default for ObjectStorageConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            bucket: "wind-tiles".to_string(),
            access_key_id: None,
            secret_access_key: None,
            region: "us-east-1".to_string(),
            allow_http: false,
            prefix: None,
        }
    }
}

impl ObjectStorageConfig {
    /// Read `S3_ENDPOINT`, `S3_BUCKET`, `S3_REGION`, `S3_ACCESS_KEY`,
    /// `S3_SECRET_KEY`, `S3_ALLOW_HTTP` and `S3_PREFIX`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
            bucket: env::var("S3_BUCKET").unwrap_or(defaults.bucket),
            access_key_id: env::var("S3_ACCESS_KEY").ok(),
            secret_access_key: env::var("S3_SECRET_KEY").ok(),
            region: env::var("S3_REGION").unwrap_or(defaults.region),
            allow_http: env::var("S3_ALLOW_HTTP")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.allow_http),
            prefix: env::var("S3_PREFIX").ok().filter(|s| !s.is_empty()),
        }
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    pub fn validate(&self) -> StorageResult<()> {
        if self.bucket.trim().is_empty() {
            return Err(StorageError::Config("bucket name is empty".to_string()));
        }
        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            return Err(StorageError::Config(
                "S3_ACCESS_KEY and S3_SECRET_KEY must be set together".to_string(),
            ));
        }
        Ok(())
    }
}

/// Object storage client for wind artifacts.
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    prefix: Option<String>,
}

impl ObjectStorage {
    /// Create a new object storage client from config.
    pub fn new(config: &ObjectStorageConfig) -> StorageResult<Self> {
        config.validate()?;

        let client_options = ClientOptions::new()
            .with_content_type_for_suffix("png", "image/png")
            .with_content_type_for_suffix("json", "application/json")
            .with_allow_http(config.allow_http);

        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region)
            .with_client_options(client_options);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint);
        }
        if let (Some(key), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
            builder = builder
                .with_access_key_id(key)
                .with_secret_access_key(secret);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ObjectStore(format!("Failed to create S3 client: {}", e)))?;

        Ok(Self {
            store: Arc::new(store),
            bucket: config.bucket.clone(),
            prefix: config.prefix.clone(),
        })
    }

    /// Wrap an existing store, e.g. `object_store::memory::InMemory`.
    pub fn from_store(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            prefix: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn location(&self, path: &str) -> Path {
        match &self.prefix {
            Some(prefix) => Path::from(format!("{}/{}", prefix.trim_end_matches('/'), path)),
            None => Path::from(path),
        }
    }
}

#[async_trait::async_trait]
impl ArtifactSink for ObjectStorage {
    fn name(&self) -> &str {
        "object-store"
    }

    #[instrument(skip(self, data), fields(bucket = %self.bucket, path = %path))]
    async fn put(&self, path: &str, data: Bytes) -> StorageResult<()> {
        check_relative(path)?;
        let location = self.location(path);
        debug!(size = data.len(), "Writing object");

        self.store
            .put(&location, data)
            .await
            .map_err(|e| StorageError::ObjectStore(format!("Failed to write {}: {}", path, e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    async fn read(store: &InMemory, key: &str) -> Bytes {
        store
            .get(&Path::from(key))
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_put_lands_at_key() {
        let store = Arc::new(InMemory::new());
        let storage = ObjectStorage::from_store(store.clone(), "test");
        storage
            .put("wind-tiles/2026-02-26/14Z/wind_20260226_t14z_f01.png", Bytes::from_static(b"png"))
            .await
            .unwrap();

        assert_eq!(
            read(&store, "wind-tiles/2026-02-26/14Z/wind_20260226_t14z_f01.png").await,
            Bytes::from_static(b"png")
        );
        assert!(store.head(&Path::from("wind-tiles/missing.png")).await.is_err());
    }

    #[tokio::test]
    async fn test_prefix_applies_to_keys() {
        let store = Arc::new(InMemory::new());
        let storage = ObjectStorage::from_store(store.clone(), "test").with_prefix("prod/");
        storage
            .put("wind-particles/metadata.json", Bytes::from_static(b"{}"))
            .await
            .unwrap();

        assert_eq!(
            read(&store, "prod/wind-particles/metadata.json").await,
            Bytes::from_static(b"{}")
        );
        assert!(store.head(&Path::from("wind-particles/metadata.json")).await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let store = Arc::new(InMemory::new());
        let storage = ObjectStorage::from_store(store, "test");
        assert!(storage.put("../outside.png", Bytes::from_static(b"x")).await.is_err());
    }

    #[test]
    fn test_config_validation() {
        let config = ObjectStorageConfig {
            access_key_id: Some("key".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(ObjectStorageConfig::default().with_bucket("").validate().is_err());
        assert!(ObjectStorageConfig::default().validate().is_ok());
    }
}
