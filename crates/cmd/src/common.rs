// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use diagnostics::*;
use objproxy::{Bucket, BucketConfig, ProxyObject};

/// Environment variable naming the bucket URL when no flag is given
pub const URL_ENV: &str = "OBJPROXY_URL";

/// Read size used when streaming content out of a proxy
const READ_CHUNK: usize = 1 << 20;

/// Resolve the bucket configuration: `--config` file, then `--url`, then
/// the OBJPROXY_URL environment variable.
pub fn resolve_config(config: Option<&Path>, url: Option<&str>) -> Result<BucketConfig> {
    if let Some(path) = config {
        return BucketConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }
    let url = match url {
        Some(url) => url.to_string(),
        None => env::var(URL_ENV)
            .map_err(|_| anyhow!("No bucket given: use --config, --url or {}", URL_ENV))?,
    };
    let config = BucketConfig::from_url(url);
    config.validate()?;
    Ok(config)
}

pub fn open_bucket(config: &BucketConfig) -> Result<Arc<dyn Bucket>> {
    let bucket = config
        .open_bucket()
        .with_context(|| format!("Failed to open bucket {}", config.url))?;
    Ok(Arc::new(bucket))
}

/// Open a proxy on `name` positioned at its latest generation, if any.
pub async fn open_latest(bucket: Arc<dyn Bucket>, name: &str) -> Result<ProxyObject> {
    let latest = bucket
        .stat_object(name)
        .await
        .with_context(|| format!("Failed to stat {}", name))?;
    let proxy = ProxyObject::new(bucket, name)?;
    match latest {
        Some(record) => {
            let generation = record.generation.value();
            debug!("Opening {name} at generation {generation}", name: name, generation: generation);
            proxy.note_latest(record).await?;
        }
        None => {
            debug!("{name} does not exist yet", name: name);
        }
    }
    Ok(proxy)
}

/// Stream the whole content of `proxy` into `out`, returning bytes copied.
pub async fn copy_to(proxy: &ProxyObject, out: &mut dyn Write) -> Result<u64> {
    let mut buf = vec![0u8; READ_CHUNK];
    let mut offset = 0u64;
    loop {
        let n = proxy.read_at(&mut buf, offset).await?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n])?;
        offset += n as u64;
    }
    out.flush()?;
    Ok(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use objproxy::MemoryBucket;

    #[test]
    fn test_resolve_from_url_flag() {
        let config = resolve_config(None, Some("memory://flag")).unwrap();
        assert_eq!(config.url, "memory://flag");
    }

    #[test]
    fn test_resolve_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bucket.yaml");
        std::fs::write(&path, "url: memory://file\nlog_level: warn\n").unwrap();
        let config = resolve_config(Some(&path), Some("memory://ignored")).unwrap();
        assert_eq!(config.url, "memory://file");
        assert_eq!(config.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn test_resolve_rejects_bad_url() {
        assert!(resolve_config(None, Some("ftp://nope")).is_err());
    }

    #[tokio::test]
    async fn test_open_latest_and_copy() {
        let bucket = Arc::new(MemoryBucket::new("cmd"));
        _ = bucket
            .create_generation("obj", Bytes::from_static(b"first"))
            .await
            .unwrap();
        _ = bucket
            .create_generation("obj", Bytes::from_static(b"second"))
            .await
            .unwrap();

        let proxy = open_latest(bucket.clone(), "obj").await.unwrap();
        let mut out = Vec::new();
        assert_eq!(copy_to(&proxy, &mut out).await.unwrap(), 6);
        assert_eq!(out, b"second");

        let missing = open_latest(bucket, "missing").await.unwrap();
        assert_eq!(missing.size().await, 0);
        assert_eq!(missing.generation().await, None);
    }
}
