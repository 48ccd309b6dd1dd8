// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use objproxy::Bucket;

/// Print the latest generation and size of `name`.
pub async fn stat_command(bucket: Arc<dyn Bucket>, name: &str, out: &mut dyn Write) -> Result<()> {
    let record = bucket
        .stat_object(name)
        .await?
        .ok_or_else(|| anyhow!("Object not found: {}", name))?;
    writeln!(out, "{}", record)?;
    Ok(())
}
