// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Random-access view on one object in a generation-versioned bucket
//!
//! Reads are served from local edits and a lazily fetched copy of the
//! tracked generation. Writes and truncations are buffered locally until
//! [`ProxyObject::sync`] creates a new generation.
//!
//! Every method holds the object's lock for its whole duration, including
//! any fetch or upload, so operations on one object are linearizable.
//! Separate objects share nothing.

use crate::base::BaseCache;
use crate::bucket::Bucket;
use crate::error::{Error, Result};
use crate::generation::{Generation, GenerationTracker, ObjectRecord, Observation};
use crate::overlay::DirtyOverlay;
use bytes::Bytes;
use diagnostics::*;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Largest object a proxy will address (5 TiB).
pub const MAX_OBJECT_SIZE: u64 = 5 << 40;

struct ProxyState {
    tracker: GenerationTracker,
    base: BaseCache,
    overlay: DirtyOverlay,
}

pub struct ProxyObject {
    bucket: Arc<dyn Bucket>,
    name: String,
    state: Mutex<ProxyState>,
}

impl ProxyObject {
    /// Create a view on the object `name`.
    ///
    /// The remote object is assumed not to exist, so the content starts
    /// empty; use [`note_latest`](Self::note_latest) to change that. Does not
    /// touch the network.
    pub fn new<N: Into<String>>(bucket: Arc<dyn Bucket>, name: N) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidName(name));
        }
        Ok(Self {
            bucket,
            state: Mutex::new(ProxyState {
                tracker: GenerationTracker::new(name.clone()),
                base: BaseCache::new(),
                overlay: DirtyOverlay::new(),
            }),
            name,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The generation our view is based on, if any.
    pub async fn generation(&self) -> Option<Generation> {
        self.state.lock().await.tracker.generation()
    }

    /// Whether there are local changes not yet synced.
    pub async fn is_dirty(&self) -> bool {
        self.state.lock().await.overlay.is_dirty()
    }

    /// Inform the proxy of the most recently observed generation.
    ///
    /// A record no newer than the tracked generation is ignored. A newer one
    /// becomes the definitive source of content: the cached base is dropped
    /// and any local modifications are discarded.
    pub async fn note_latest(&self, record: ObjectRecord) -> Result<()> {
        let mut state = self.state.lock().await;
        let ProxyState {
            tracker,
            base,
            overlay,
        } = &mut *state;

        let name = self.name.as_str();
        let generation = record.generation.value();
        let size = record.size;
        match tracker.observe(record)? {
            Observation::Ignored => {
                debug!("Ignoring stale generation {generation} of {name}", generation: generation, name: name);
            }
            Observation::Accepted => {
                if overlay.is_dirty() {
                    let discarded = overlay.dirty_bytes();
                    info!(
                        "Generation {generation} of {name} replaces local edits ({discarded} dirty bytes discarded)",
                        generation: generation,
                        name: name,
                        discarded: discarded
                    );
                }
                base.invalidate();
                overlay.reset(size);
                debug!(
                    "Now tracking {name} generation {generation} ({size} bytes)",
                    name: name,
                    generation: generation,
                    size: size
                );
            }
        }
        Ok(())
    }

    /// Current size in bytes of our view of the content.
    pub async fn size(&self) -> u64 {
        self.state.lock().await.overlay.size()
    }

    /// Random-access read into `buf`.
    ///
    /// Returns fewer bytes than `buf.len()` when the read runs past the end
    /// of the content, and 0 at or beyond it. Fetches the tracked
    /// generation only if the range needs bytes no local edit covers.
    pub async fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let mut state = self.state.lock().await;
        let ProxyState {
            tracker,
            base,
            overlay,
        } = &mut *state;

        let content = if overlay.needs_base(offset, buf.len() as u64) {
            base.ensure_loaded(self.bucket.as_ref(), tracker.latest())
                .await?
        } else {
            Bytes::new()
        };
        Ok(overlay.read(offset, buf, &content))
    }

    /// Random-access write of all of `buf` at `offset`.
    ///
    /// Grows the content as needed. Buffered locally; not reflected
    /// remotely until a successful [`sync`](Self::sync).
    pub async fn write_at(&self, buf: &[u8], offset: u64) -> Result<usize> {
        let length = buf.len() as u64;
        match offset.checked_add(length) {
            Some(end) if end <= MAX_OBJECT_SIZE => {}
            _ => return Err(Error::InvalidRange { offset, length }),
        }

        let mut state = self.state.lock().await;
        state.overlay.write(offset, buf);
        Ok(buf.len())
    }

    /// Truncate our view to `n` bytes, extending with zeros if `n` is
    /// greater than the current size.
    pub async fn truncate(&self, n: u64) -> Result<()> {
        if n > MAX_OBJECT_SIZE {
            return Err(Error::InvalidLength(n));
        }
        self.state.lock().await.overlay.truncate(n);
        Ok(())
    }

    /// Make the remote object reflect the local view, returning the record
    /// of the generation that does.
    ///
    /// Clobbers whatever generation exists remotely. On failure nothing
    /// changes locally and the call may be retried.
    pub async fn sync(&self) -> Result<ObjectRecord> {
        let mut state = self.state.lock().await;
        let ProxyState {
            tracker,
            base,
            overlay,
        } = &mut *state;

        let base_content = if overlay.needs_base(0, overlay.size()) {
            base.ensure_loaded(self.bucket.as_ref(), tracker.latest())
                .await?
        } else {
            Bytes::new()
        };
        let content = Bytes::from(overlay.materialize(&base_content)?);

        let name = self.name.as_str();
        let bucket = self.bucket.bucket_name();
        let size = content.len();
        let record = match self.bucket.create_generation(name, content.clone()).await {
            Ok(record) => record,
            Err(e) => {
                let err = e.to_string();
                error!("Sync of {bucket}/{name} failed: {err}", bucket: bucket, name: name, err: err.as_str());
                return Err(e);
            }
        };

        let generation = record.generation.value();
        info!(
            "Synced {bucket}/{name} as generation {generation} ({size} bytes)",
            bucket: bucket,
            name: name,
            generation: generation,
            size: size
        );

        tracker.adopt(record.clone());
        base.set(content);
        overlay.reset(record.size);
        Ok(record)
    }
}
