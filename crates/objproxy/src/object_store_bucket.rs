// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Bucket adapter over any `object_store::ObjectStore`
//!
//! Plain object stores (local filesystem, S3, in-memory) have no notion of
//! generations, so each generation is kept under its own key:
//!
//! ```text
//! <name>/<generation, 20 digits>.gen
//! ```
//!
//! Generations are microsecond timestamps, bumped when needed so that every
//! generation issued through one adapter is strictly newer than the last and
//! than any generation already in the store. Creating a generation deletes
//! the older keys of the same name.

use crate::bucket::Bucket;
use crate::error::{Error, Result};
use crate::generation::{Generation, ObjectRecord};
use async_trait::async_trait;
use bytes::Bytes;
use diagnostics::*;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

const GENERATION_SUFFIX: &str = ".gen";

pub struct ObjectStoreBucket {
    name: String,
    store: Arc<dyn ObjectStore>,
    /// Last generation issued; held across a create to serialize issuance
    last_issued: Mutex<u64>,
}

impl ObjectStoreBucket {
    pub fn new<N: Into<String>>(name: N, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            name: name.into(),
            store,
            last_issued: Mutex::new(0),
        }
    }

    /// Bucket over a fresh `object_store::memory::InMemory` store.
    pub fn in_memory<N: Into<String>>(name: N) -> Self {
        Self::new(name, Arc::new(object_store::memory::InMemory::new()))
    }

    fn object_prefix(name: &str) -> Result<Path> {
        if name.is_empty() {
            return Err(Error::InvalidName(name.to_string()));
        }
        Ok(Path::parse(name)?)
    }

    fn generation_path(name: &str, generation: Generation) -> Result<Path> {
        Ok(Self::object_prefix(name)?.child(format!(
            "{:020}{}",
            generation.value(),
            GENERATION_SUFFIX
        )))
    }

    fn parse_generation(location: &Path) -> Option<Generation> {
        location
            .filename()?
            .strip_suffix(GENERATION_SUFFIX)?
            .parse::<u64>()
            .ok()
            .map(Generation)
    }

    /// Every stored generation of `name` with its size, oldest first.
    async fn list_generations(&self, name: &str) -> Result<Vec<(Generation, u64)>> {
        let prefix = Self::object_prefix(name)?;
        let listing = self.store.list_with_delimiter(Some(&prefix)).await?;
        let mut generations: Vec<(Generation, u64)> = listing
            .objects
            .iter()
            .filter_map(|meta| {
                Self::parse_generation(&meta.location).map(|g| (g, meta.size as u64))
            })
            .collect();
        generations.sort();
        Ok(generations)
    }
}

fn now_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

#[async_trait]
impl Bucket for ObjectStoreBucket {
    fn bucket_name(&self) -> &str {
        &self.name
    }

    async fn fetch_content(&self, name: &str, generation: Generation) -> Result<Bytes> {
        let path = Self::generation_path(name, generation)?;
        match self.store.get(&path).await {
            Ok(result) => Ok(result.bytes().await?),
            Err(object_store::Error::NotFound { .. }) => {
                Err(Error::generation_not_found(name, generation))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create_generation(&self, name: &str, content: Bytes) -> Result<ObjectRecord> {
        let mut last_issued = self.last_issued.lock().await;
        let existing = self.list_generations(name).await?;

        let mut next = now_micros().max(*last_issued + 1);
        if let Some((latest, _)) = existing.last() {
            next = next.max(latest.value() + 1);
        }
        let generation = Generation(next);
        let size = content.len() as u64;

        let path = Self::generation_path(name, generation)?;
        _ = self.store.put(&path, PutPayload::from(content)).await?;
        *last_issued = next;

        let bucket = self.name.as_str();
        debug!(
            "Created {bucket}/{name} generation {next} ({size} bytes)",
            bucket: bucket,
            name: name,
            next: next,
            size: size
        );

        for (old, _) in existing {
            let old_path = Self::generation_path(name, old)?;
            if let Err(e) = self.store.delete(&old_path).await {
                let old = old.value();
                let err = e.to_string();
                warn!(
                    "Failed to delete {bucket}/{name} generation {old}: {err}",
                    bucket: bucket,
                    name: name,
                    old: old,
                    err: err.as_str()
                );
            }
        }

        Ok(ObjectRecord::new(name, generation, size))
    }

    async fn stat_object(&self, name: &str) -> Result<Option<ObjectRecord>> {
        let generations = self.list_generations(name).await?;
        Ok(generations
            .last()
            .map(|(generation, size)| ObjectRecord::new(name, *generation, *size)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_path_layout() {
        let path = ObjectStoreBucket::generation_path("dir/file.txt", Generation(42)).unwrap();
        assert_eq!(path.as_ref(), "dir/file.txt/00000000000000000042.gen");
        assert_eq!(
            ObjectStoreBucket::parse_generation(&path),
            Some(Generation(42))
        );
        assert_eq!(
            ObjectStoreBucket::parse_generation(&Path::from("dir/other")),
            None
        );
    }

    #[test]
    fn test_invalid_names() {
        assert!(matches!(
            ObjectStoreBucket::generation_path("", Generation(1)),
            Err(Error::InvalidName(_))
        ));
        assert!(ObjectStoreBucket::generation_path("a/../b", Generation(1)).is_err());
    }

    #[tokio::test]
    async fn test_create_fetch_and_replace() {
        let bucket = ObjectStoreBucket::in_memory("mem");
        assert_eq!(bucket.stat_object("obj").await.unwrap(), None);

        let first = bucket
            .create_generation("obj", Bytes::from_static(b"first"))
            .await
            .unwrap();
        let second = bucket
            .create_generation("obj", Bytes::from_static(b"second!"))
            .await
            .unwrap();
        assert!(second.generation > first.generation);
        assert_eq!(second.size, 7);

        assert_eq!(
            bucket.fetch_content("obj", second.generation).await.unwrap(),
            "second!"
        );
        let err = bucket
            .fetch_content("obj", first.generation)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::GenerationNotFound { .. }));
        assert_eq!(bucket.stat_object("obj").await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_generations_increase_across_adapters() {
        let store: Arc<dyn ObjectStore> = Arc::new(object_store::memory::InMemory::new());
        let a = ObjectStoreBucket::new("shared", store.clone());
        let b = ObjectStoreBucket::new("shared", store);

        let mut last = Generation(0);
        for i in 0..5u8 {
            let bucket = if i % 2 == 0 { &a } else { &b };
            let record = bucket
                .create_generation("obj", Bytes::from(vec![i]))
                .await
                .unwrap();
            assert!(record.generation > last);
            last = record.generation;
        }
        assert_eq!(a.list_generations("obj").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_nested_names_do_not_collide() {
        let bucket = ObjectStoreBucket::in_memory("mem");
        let outer = bucket
            .create_generation("a", Bytes::from_static(b"outer"))
            .await
            .unwrap();
        let inner = bucket
            .create_generation("a/b", Bytes::from_static(b"inner"))
            .await
            .unwrap();

        assert_eq!(bucket.stat_object("a").await.unwrap(), Some(outer));
        assert_eq!(bucket.stat_object("a/b").await.unwrap(), Some(inner));
    }
}
