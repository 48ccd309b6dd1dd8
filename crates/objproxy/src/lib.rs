// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Random-access read/write views on objects in a generation-versioned store
//!
//! Objects in the store are immutable; replacing content creates a new
//! generation. A [`ProxyObject`] gives POSIX-file-like `read_at`,
//! `write_at` and `truncate` on top of that:
//!
//! - **Generation tracking**: the newest known generation; older or equal
//!   observations are ignored
//! - **Lazy base cache**: the tracked generation's content, fetched only
//!   when a read needs bytes no local edit covers
//! - **Dirty overlay**: local byte-range edits and the logical size
//! - **Sync / reconcile**: `sync` uploads the merged content as a new
//!   generation, unconditionally; `note_latest` with a newer generation
//!   discards local edits
//!
//! # Usage
//!
//! ```no_run
//! # async fn example() -> objproxy::Result<()> {
//! use objproxy::{MemoryBucket, ProxyObject};
//! use std::sync::Arc;
//!
//! let bucket = Arc::new(MemoryBucket::new("scratch"));
//! let proxy = ProxyObject::new(bucket, "notes.txt")?;
//!
//! proxy.write_at(b"hello world", 0).await?;
//! proxy.truncate(5).await?;
//! let record = proxy.sync().await?;
//! assert_eq!(record.size, 5);
//! # Ok(())
//! # }
//! ```

mod base;
mod bucket;
mod config;
mod error;
mod generation;
mod memory;
mod object_store_bucket;
mod overlay;
mod proxy;

pub use base::BaseCache;
pub use bucket::Bucket;
pub use config::BucketConfig;
pub use error::{Error, Result};
pub use generation::{Generation, GenerationTracker, ObjectRecord, Observation};
pub use memory::MemoryBucket;
pub use object_store_bucket::ObjectStoreBucket;
pub use overlay::DirtyOverlay;
pub use proxy::{MAX_OBJECT_SIZE, ProxyObject};
