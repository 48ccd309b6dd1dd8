// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory bucket for tests and lightweight use
//!
//! Keeps only the latest generation of each object, the way a store without
//! object versioning does, so fetching a superseded generation fails with
//! `GenerationNotFound`. Counts fetches and creates and can inject one-shot
//! failures, which makes it the test double for proxy behavior.

use crate::bucket::Bucket;
use crate::error::{Error, Result};
use crate::generation::{Generation, ObjectRecord};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct StoredObject {
    generation: Generation,
    content: Bytes,
}

#[derive(Debug, Default)]
struct MemoryState {
    objects: HashMap<String, StoredObject>,
    // Global generation counter; starts at 1
    next_generation: u64,
}

pub struct MemoryBucket {
    name: String,
    state: Mutex<MemoryState>,
    fetches: AtomicU64,
    creates: AtomicU64,
    fail_fetch: AtomicBool,
    fail_create: AtomicBool,
}

impl MemoryBucket {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(MemoryState {
                objects: HashMap::new(),
                next_generation: 1,
            }),
            fetches: AtomicU64::new(0),
            creates: AtomicU64::new(0),
            fail_fetch: AtomicBool::new(false),
            fail_create: AtomicBool::new(false),
        }
    }

    /// Number of `fetch_content` calls, including failed ones.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of `create_generation` calls, including failed ones.
    pub fn create_count(&self) -> u64 {
        self.creates.load(Ordering::SeqCst)
    }

    /// Make the next `fetch_content` fail without touching the store.
    pub fn fail_next_fetch(&self) {
        self.fail_fetch.store(true, Ordering::SeqCst);
    }

    /// Make the next `create_generation` fail without touching the store.
    pub fn fail_next_create(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    /// Remove `name`; later fetches of any of its generations fail.
    pub async fn delete(&self, name: &str) -> bool {
        self.state.lock().await.objects.remove(name).is_some()
    }
}

#[async_trait]
impl Bucket for MemoryBucket {
    fn bucket_name(&self) -> &str {
        &self.name
    }

    async fn fetch_content(&self, name: &str, generation: Generation) -> Result<Bytes> {
        _ = self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.swap(false, Ordering::SeqCst) {
            return Err(Error::Injected(format!("fetch of {name} failed")));
        }

        let state = self.state.lock().await;
        match state.objects.get(name) {
            Some(stored) if stored.generation == generation => Ok(stored.content.clone()),
            _ => Err(Error::generation_not_found(name, generation)),
        }
    }

    async fn create_generation(&self, name: &str, content: Bytes) -> Result<ObjectRecord> {
        _ = self.creates.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.swap(false, Ordering::SeqCst) {
            return Err(Error::Injected(format!("create of {name} failed")));
        }
        if name.is_empty() {
            return Err(Error::InvalidName(name.to_string()));
        }

        let mut state = self.state.lock().await;
        let generation = Generation(state.next_generation);
        state.next_generation += 1;

        let record = ObjectRecord::new(name, generation, content.len() as u64);
        _ = state
            .objects
            .insert(name.to_string(), StoredObject { generation, content });
        Ok(record)
    }

    async fn stat_object(&self, name: &str) -> Result<Option<ObjectRecord>> {
        let state = self.state.lock().await;
        Ok(state.objects.get(name).map(|stored| {
            ObjectRecord::new(name, stored.generation, stored.content.len() as u64)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generations_increase() {
        let bucket = MemoryBucket::new("b");
        let first = bucket
            .create_generation("x", Bytes::from_static(b"1"))
            .await
            .unwrap();
        let second = bucket
            .create_generation("y", Bytes::from_static(b"22"))
            .await
            .unwrap();
        let third = bucket
            .create_generation("x", Bytes::from_static(b"333"))
            .await
            .unwrap();
        assert!(first.generation < second.generation);
        assert!(second.generation < third.generation);
        assert_eq!(third.size, 3);
        assert_eq!(bucket.create_count(), 3);
    }

    #[tokio::test]
    async fn test_superseded_generation_not_found() {
        let bucket = MemoryBucket::new("b");
        let old = bucket
            .create_generation("x", Bytes::from_static(b"old"))
            .await
            .unwrap();
        let new = bucket
            .create_generation("x", Bytes::from_static(b"new"))
            .await
            .unwrap();

        let err = bucket.fetch_content("x", old.generation).await.unwrap_err();
        assert!(matches!(err, Error::GenerationNotFound { .. }));
        assert_eq!(bucket.fetch_content("x", new.generation).await.unwrap(), "new");
        assert_eq!(bucket.stat_object("x").await.unwrap(), Some(new));
        assert_eq!(bucket.stat_object("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_injected_failures_are_one_shot() {
        let bucket = MemoryBucket::new("b");
        bucket.fail_next_create();
        assert!(matches!(
            bucket.create_generation("x", Bytes::new()).await,
            Err(Error::Injected(_))
        ));
        let record = bucket.create_generation("x", Bytes::new()).await.unwrap();

        bucket.fail_next_fetch();
        assert!(bucket.fetch_content("x", record.generation).await.is_err());
        assert!(bucket.fetch_content("x", record.generation).await.is_ok());
        assert_eq!(bucket.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_delete() {
        let bucket = MemoryBucket::new("b");
        let record = bucket
            .create_generation("x", Bytes::from_static(b"abc"))
            .await
            .unwrap();
        assert!(bucket.delete("x").await);
        assert!(!bucket.delete("x").await);
        assert!(bucket.fetch_content("x", record.generation).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let bucket = MemoryBucket::new("b");
        assert!(matches!(
            bucket.create_generation("", Bytes::new()).await,
            Err(Error::InvalidName(_))
        ));
        assert_eq!(bucket.stat_object("").await.unwrap(), None);
    }
}
