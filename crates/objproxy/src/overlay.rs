// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Dirty overlay: local, unsynced edits on top of the base content
//!
//! The overlay holds a logical size and a set of disjoint byte ranges keyed
//! by their starting offset. Together with the base content it determines
//! every byte of the object:
//!
//! - a byte covered by a dirty range comes from that range
//! - otherwise a byte below the visible base extent comes from the base
//! - otherwise (inside the logical size) the byte is zero
//!
//! The visible base extent starts at the remote length and only shrinks, by
//! truncation. Shrinking and then re-extending therefore reads zeros over
//! what used to be base content, as `ftruncate` would.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct DirtyOverlay {
    /// Logical size of the object; never below the end of any range
    size: u64,
    /// Length of the base content this overlay was reset against
    remote_len: u64,
    /// Prefix of the base content still visible through truncation
    base_extent: u64,
    /// Disjoint, non-touching ranges: start offset -> replacement bytes
    ranges: BTreeMap<u64, Vec<u8>>,
}

impl DirtyOverlay {
    /// Overlay for an object that does not exist remotely.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay with no edits on top of base content of `remote_len` bytes.
    #[must_use]
    pub fn clean(remote_len: u64) -> Self {
        Self {
            size: remote_len,
            remote_len,
            base_extent: remote_len,
            ranges: BTreeMap::new(),
        }
    }

    /// Drop all edits and start over against base content of `remote_len` bytes.
    pub fn reset(&mut self, remote_len: u64) {
        *self = Self::clean(remote_len);
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[must_use]
    pub fn base_extent(&self) -> u64 {
        self.base_extent
    }

    /// True when the logical content differs from the base content.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.ranges.is_empty() || self.size != self.remote_len || self.base_extent != self.remote_len
    }

    /// Number of dirty ranges currently held.
    #[must_use]
    pub fn range_count(&self) -> usize {
        self.ranges.len()
    }

    /// Total bytes held in dirty ranges.
    #[must_use]
    pub fn dirty_bytes(&self) -> u64 {
        self.ranges.values().map(|b| b.len() as u64).sum()
    }

    /// Record `data` at `offset`, growing the logical size as needed.
    ///
    /// Overlapping or adjacent ranges are coalesced into one; the new bytes
    /// win in the overlap. Callers bound `offset + data.len()`.
    pub fn write(&mut self, offset: u64, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        let end = offset + data.len() as u64;

        // Ranges are disjoint and sorted, so walking backwards from the last
        // range starting at or before `end`, the touching ones are contiguous.
        let touching: Vec<u64> = self
            .ranges
            .range(..=end)
            .rev()
            .take_while(|(start, bytes)| **start + bytes.len() as u64 >= offset)
            .map(|(start, _)| *start)
            .collect();

        let mut merged_start = offset;
        let mut merged_end = end;
        for start in &touching {
            let len = self.ranges[start].len() as u64;
            merged_start = merged_start.min(*start);
            merged_end = merged_end.max(start + len);
        }

        let mut merged = vec![0u8; (merged_end - merged_start) as usize];
        for start in touching.iter().rev() {
            if let Some(old) = self.ranges.remove(start) {
                let at = (start - merged_start) as usize;
                merged[at..at + old.len()].copy_from_slice(&old);
            }
        }
        let at = (offset - merged_start) as usize;
        merged[at..at + data.len()].copy_from_slice(data);

        _ = self.ranges.insert(merged_start, merged);
        self.size = self.size.max(end);
    }

    /// Set the logical size to `n`.
    ///
    /// Shrinking discards dirty bytes and hides base bytes at or beyond `n`.
    /// Growing materializes nothing; the gap reads as zero.
    pub fn truncate(&mut self, n: u64) {
        if n < self.size {
            let beyond: Vec<u64> = self.ranges.range(n..).map(|(start, _)| *start).collect();
            for start in beyond {
                _ = self.ranges.remove(&start);
            }
            if let Some((start, bytes)) = self.ranges.range_mut(..n).next_back() {
                let keep = (n - *start) as usize;
                bytes.truncate(keep);
            }
        }
        self.base_extent = self.base_extent.min(n);
        self.size = n;
    }

    /// Clip `[offset, offset + len)` to the logical size.
    fn clip(&self, offset: u64, len: u64) -> Range<u64> {
        let start = offset.min(self.size);
        let end = offset.saturating_add(len).min(self.size);
        start..end
    }

    /// Whether answering `[offset, offset + len)` needs any base byte.
    ///
    /// True only if part of the range lies below the visible base extent
    /// and is not covered by a dirty range.
    #[must_use]
    pub fn needs_base(&self, offset: u64, len: u64) -> bool {
        let range = self.clip(offset, len);
        let mut cursor = range.start;
        let limit = range.end.min(self.base_extent);
        if cursor >= limit {
            return false;
        }

        // The range starting at or before `cursor` may already cover it.
        if let Some((start, bytes)) = self.ranges.range(..=cursor).next_back() {
            cursor = cursor.max(start + bytes.len() as u64);
        }
        if cursor >= limit {
            return false;
        }
        for (start, bytes) in self.ranges.range(cursor..limit) {
            if *start > cursor {
                return true;
            }
            cursor = start + bytes.len() as u64;
        }
        cursor < limit
    }

    /// Compose bytes at `offset` into `buf`, returning how many were filled.
    ///
    /// `base` is the base content; it may be empty when
    /// [`needs_base`](Self::needs_base) reported that no base byte is
    /// required. Returns 0 at or past the logical size.
    pub fn read(&self, offset: u64, buf: &mut [u8], base: &[u8]) -> usize {
        let range = self.clip(offset, buf.len() as u64);
        let n = (range.end - range.start) as usize;
        let out = &mut buf[..n];
        out.fill(0);
        if n == 0 {
            return 0;
        }

        let base_end = range.end.min(self.base_extent).min(base.len() as u64);
        if range.start < base_end {
            let src = &base[range.start as usize..base_end as usize];
            out[..src.len()].copy_from_slice(src);
        }

        let first = self
            .ranges
            .range(..=range.start)
            .next_back()
            .map_or(range.start, |(start, _)| *start);
        for (start, bytes) in self.ranges.range(first..range.end) {
            let lo = (*start).max(range.start);
            let hi = (start + bytes.len() as u64).min(range.end);
            if lo >= hi {
                continue;
            }
            let src = &bytes[(lo - start) as usize..(hi - start) as usize];
            let at = (lo - range.start) as usize;
            out[at..at + src.len()].copy_from_slice(src);
        }
        n
    }

    /// Produce the full logical content.
    ///
    /// Fails with [`Error::Allocation`] when the content does not fit in
    /// memory, leaving the overlay untouched.
    pub fn materialize(&self, base: &[u8]) -> Result<Vec<u8>> {
        let len = usize::try_from(self.size).map_err(|_| Error::Allocation(self.size))?;
        let mut content = Vec::new();
        content
            .try_reserve_exact(len)
            .map_err(|_| Error::Allocation(self.size))?;
        content.resize(len, 0);
        let filled = self.read(0, &mut content, base);
        debug_assert_eq!(filled as u64, self.size);
        Ok(content)
    }
}
