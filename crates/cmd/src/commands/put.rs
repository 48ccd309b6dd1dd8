// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use objproxy::{Bucket, ProxyObject};

/// Replace `name` with the content of a local file.
pub async fn put_command(
    bucket: Arc<dyn Bucket>,
    name: &str,
    source: &Path,
    out: &mut dyn Write,
) -> Result<()> {
    let content = tokio::fs::read(source)
        .await
        .with_context(|| format!("Failed to read {}", source.display()))?;

    // Full replacement never needs the previous content.
    let proxy = ProxyObject::new(bucket, name)?;
    _ = proxy.write_at(&content, 0).await?;
    let record = proxy.sync().await?;

    writeln!(out, "{}", record)?;
    Ok(())
}
