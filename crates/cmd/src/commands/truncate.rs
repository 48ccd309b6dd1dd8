// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use objproxy::Bucket;

use crate::common::open_latest;

/// Shrink or zero-extend `name` to `length` bytes.
pub async fn truncate_command(
    bucket: Arc<dyn Bucket>,
    name: &str,
    length: u64,
    out: &mut dyn Write,
) -> Result<()> {
    let proxy = open_latest(bucket, name).await?;
    if proxy.generation().await.is_none() {
        return Err(anyhow!("Object not found: {}", name));
    }
    proxy.truncate(length).await?;
    let record = proxy.sync().await?;
    writeln!(out, "{}", record)?;
    Ok(())
}
