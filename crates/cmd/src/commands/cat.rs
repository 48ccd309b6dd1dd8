// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use diagnostics::*;
use objproxy::Bucket;

use crate::common::{copy_to, open_latest};

/// Write the latest content of `name` to `out`.
pub async fn cat_command(bucket: Arc<dyn Bucket>, name: &str, out: &mut dyn Write) -> Result<()> {
    let proxy = open_latest(bucket, name).await?;
    if proxy.generation().await.is_none() {
        return Err(anyhow!("Object not found: {}", name));
    }
    let copied = copy_to(&proxy, out).await?;
    debug!("cat {name}: {copied} bytes", name: name, copied: copied);
    Ok(())
}
