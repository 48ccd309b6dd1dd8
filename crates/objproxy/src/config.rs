// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Bucket configuration
//!
//! A bucket is described by a small YAML document:
//!
//! ```yaml
//! url: s3://my-bucket/some/prefix
//! region: us-west-2
//! access_key: AKIA...
//! secret_key: ...
//! endpoint: http://localhost:9000   # MinIO, R2, etc.
//! log_level: info
//! ```
//!
//! `url` may also be `file:///path/to/dir` or `memory://name`.

use crate::error::{Error, Result};
use crate::object_store_bucket::ObjectStoreBucket;
use object_store::ObjectStore;
use object_store::path::Path;
use object_store::prefix::PrefixStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

/// Bucket storage configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketConfig {
    /// Store URL: `memory://name`, `file:///path` or `s3://bucket[/prefix]`
    pub url: String,

    /// AWS region (for S3)
    #[serde(default)]
    pub region: String,

    /// AWS access key
    #[serde(default)]
    pub access_key: String,

    /// AWS secret key
    #[serde(default)]
    pub secret_key: String,

    /// Custom S3 endpoint
    #[serde(default)]
    pub endpoint: String,

    /// Minimum log level for tools reading this config
    #[serde(default)]
    pub log_level: Option<String>,
}

impl BucketConfig {
    pub fn from_url<U: Into<String>>(url: U) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: BucketConfig = serde_yaml_ng::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    pub fn validate(&self) -> Result<()> {
        _ = self.parsed_url()?;
        Ok(())
    }

    fn parsed_url(&self) -> Result<Url> {
        if self.url.is_empty() {
            return Err(Error::Configuration("url field is required".to_string()));
        }
        let url = Url::parse(&self.url)
            .map_err(|e| Error::Configuration(format!("Invalid url {:?}: {}", self.url, e)))?;
        match url.scheme() {
            "memory" | "file" | "s3" => Ok(url),
            other => Err(Error::Configuration(format!(
                "Unsupported url scheme {:?}",
                other
            ))),
        }
    }

    /// Name used to identify the bucket in logs and errors.
    pub fn bucket_name(&self) -> Result<String> {
        let url = self.parsed_url()?;
        Ok(match url.scheme() {
            "file" => url.path().to_string(),
            _ => url.host_str().unwrap_or_default().to_string(),
        })
    }

    pub fn build_object_store(&self) -> Result<Arc<dyn ObjectStore>> {
        let url = self.parsed_url()?;
        match url.scheme() {
            "memory" => Ok(Arc::new(object_store::memory::InMemory::new())),
            "file" => {
                let path = url.to_file_path().map_err(|_| {
                    Error::Configuration(format!("Invalid file url {:?}", self.url))
                })?;
                std::fs::create_dir_all(&path)?;
                let store = object_store::local::LocalFileSystem::new_with_prefix(&path)?;
                Ok(Arc::new(store))
            }
            _ => {
                let bucket = url.host_str().unwrap_or_default();
                if bucket.is_empty() {
                    return Err(Error::Configuration(format!(
                        "Missing bucket in {:?}",
                        self.url
                    )));
                }

                let mut builder = object_store::aws::AmazonS3Builder::new()
                    .with_bucket_name(bucket)
                    .with_region(&self.region);
                if !self.access_key.is_empty() {
                    builder = builder.with_access_key_id(&self.access_key);
                }
                if !self.secret_key.is_empty() {
                    builder = builder.with_secret_access_key(&self.secret_key);
                }
                if !self.endpoint.is_empty() {
                    builder = builder.with_endpoint(&self.endpoint);
                }
                let store: Arc<dyn ObjectStore> = Arc::new(builder.build()?);

                let prefix = url.path().trim_matches('/');
                if prefix.is_empty() {
                    Ok(store)
                } else {
                    Ok(Arc::new(PrefixStore::new(store, Path::parse(prefix)?)))
                }
            }
        }
    }

    /// Open the configured bucket.
    pub fn open_bucket(&self) -> Result<ObjectStoreBucket> {
        Ok(ObjectStoreBucket::new(
            self.bucket_name()?,
            self.build_object_store()?,
        ))
    }
}
