// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Lazily fetched copy of the tracked generation's content

use crate::bucket::Bucket;
use crate::error::{Error, Result};
use crate::generation::ObjectRecord;
use bytes::Bytes;
use diagnostics::*;

/// Full remote content for one generation, fetched at most once.
#[derive(Debug, Clone, Default)]
pub struct BaseCache {
    content: Option<Bytes>,
}

impl BaseCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.content.is_some()
    }

    /// Forget the cached content so the next use refetches it.
    pub fn invalidate(&mut self) {
        self.content = None;
    }

    /// Install content known to match the tracked generation.
    pub fn set(&mut self, content: Bytes) {
        self.content = Some(content);
    }

    /// Return the content of `record`'s generation, fetching it if needed.
    ///
    /// With no record the object does not exist remotely and the content is
    /// empty. A failed fetch leaves the cache unloaded.
    pub async fn ensure_loaded(
        &mut self,
        bucket: &dyn Bucket,
        record: Option<&ObjectRecord>,
    ) -> Result<Bytes> {
        if let Some(content) = &self.content {
            return Ok(content.clone());
        }
        let Some(record) = record else {
            return Ok(Bytes::new());
        };

        let name = record.name.as_str();
        let generation = record.generation.value();
        debug!("Fetching {name} generation {generation}", name: name, generation: generation);

        let content = bucket.fetch_content(name, record.generation).await?;
        let actual = content.len() as u64;
        if actual != record.size {
            return Err(Error::SizeMismatch {
                name: record.name.clone(),
                generation: record.generation,
                expected: record.size,
                actual,
            });
        }

        debug!(
            "Cached {actual} bytes of {name} generation {generation}",
            actual: actual,
            name: name,
            generation: generation
        );
        self.content = Some(content.clone());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBucket;

    #[tokio::test]
    async fn test_fetches_once() {
        let bucket = MemoryBucket::new("test");
        let record = bucket
            .create_generation("obj", Bytes::from_static(b"abc"))
            .await
            .unwrap();

        let mut cache = BaseCache::new();
        assert!(!cache.is_loaded());
        assert_eq!(cache.ensure_loaded(&bucket, Some(&record)).await.unwrap(), "abc");
        assert_eq!(cache.ensure_loaded(&bucket, Some(&record)).await.unwrap(), "abc");
        assert_eq!(bucket.fetch_count(), 1);

        cache.invalidate();
        _ = cache.ensure_loaded(&bucket, Some(&record)).await.unwrap();
        assert_eq!(bucket.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_no_record_is_empty_without_fetch() {
        let bucket = MemoryBucket::new("test");
        let mut cache = BaseCache::new();
        assert!(cache.ensure_loaded(&bucket, None).await.unwrap().is_empty());
        assert_eq!(bucket.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_fetch_stays_unloaded() {
        let bucket = MemoryBucket::new("test");
        let record = bucket
            .create_generation("obj", Bytes::from_static(b"abc"))
            .await
            .unwrap();
        bucket.fail_next_fetch();

        let mut cache = BaseCache::new();
        assert!(cache.ensure_loaded(&bucket, Some(&record)).await.is_err());
        assert!(!cache.is_loaded());
        assert_eq!(cache.ensure_loaded(&bucket, Some(&record)).await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_size_mismatch_rejected() {
        let bucket = MemoryBucket::new("test");
        let mut record = bucket
            .create_generation("obj", Bytes::from_static(b"abc"))
            .await
            .unwrap();
        record.size = 10;

        let mut cache = BaseCache::new();
        let err = cache.ensure_loaded(&bucket, Some(&record)).await.unwrap_err();
        assert!(matches!(
            err,
            Error::SizeMismatch {
                expected: 10,
                actual: 3,
                ..
            }
        ));
        assert!(!cache.is_loaded());
    }
}
