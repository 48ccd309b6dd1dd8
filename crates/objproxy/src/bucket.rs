// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use crate::generation::{Generation, ObjectRecord};
use async_trait::async_trait;
use bytes::Bytes;

/// The generation-versioned object store a proxy object reads and writes.
///
/// Transport, authentication and retry belong to implementations; the proxy
/// only needs whole-object reads of a given generation and unconditional
/// whole-object replacement.
#[async_trait]
pub trait Bucket: Send + Sync {
    /// Identity of the bucket, for logging.
    fn bucket_name(&self) -> &str;

    /// Read the full content of `name` as of `generation`.
    ///
    /// Fails with `Error::GenerationNotFound` when that generation has been
    /// replaced or deleted.
    async fn fetch_content(&self, name: &str, generation: Generation) -> Result<Bytes>;

    /// Atomically replace `name` with `content`, creating a new generation.
    ///
    /// Unconditional: whatever generation currently exists is clobbered. The
    /// returned generation is newer than any generation this bucket has
    /// issued before.
    async fn create_generation(&self, name: &str, content: Bytes) -> Result<ObjectRecord>;

    /// Look up the latest generation of `name`, if the object exists.
    async fn stat_object(&self, name: &str) -> Result<Option<ObjectRecord>>;
}
