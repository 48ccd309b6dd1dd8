// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use objproxy::Bucket;

use crate::common::open_latest;

/// Overwrite part of `name` with a local file's content at `offset`.
///
/// Bytes outside the patched range keep their latest remote value; writing
/// past the end extends the object, zero-filling any gap.
pub async fn patch_command(
    bucket: Arc<dyn Bucket>,
    name: &str,
    source: &Path,
    offset: u64,
    out: &mut dyn Write,
) -> Result<()> {
    let content = tokio::fs::read(source)
        .await
        .with_context(|| format!("Failed to read {}", source.display()))?;

    let proxy = open_latest(bucket, name).await?;
    _ = proxy.write_at(&content, offset).await?;
    let record = proxy
        .sync()
        .await
        .with_context(|| format!("Failed to sync {}", name))?;

    writeln!(out, "{}", record)?;
    Ok(())
}
