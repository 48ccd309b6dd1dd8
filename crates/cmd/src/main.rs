// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use diagnostics::LogLevel;

use cmd::commands::{cat_command, patch_command, put_command, stat_command, truncate_command};
use cmd::common::{open_bucket, resolve_config};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "objproxy")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML bucket configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Bucket URL (memory://, file:///path, s3://bucket/prefix); overrides OBJPROXY_URL
    #[arg(short, long, global = true)]
    url: Option<String>,

    /// Log level (off, error, warn, info, debug); overrides the config and OBJPROXY_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the latest generation and size of an object
    Stat {
        /// Object name
        name: String,
    },
    /// Write the latest content of an object to stdout
    Cat {
        /// Object name
        name: String,
    },
    /// Replace an object with the content of a local file
    Put {
        /// Object name
        name: String,
        /// Local source file
        source: PathBuf,
    },
    /// Overwrite part of an object with a local file's content
    Patch {
        /// Object name
        name: String,
        /// Local source file
        source: PathBuf,
        /// Byte offset to write at
        #[arg(short, long, default_value_t = 0)]
        offset: u64,
    },
    /// Shrink or zero-extend an object
    Truncate {
        /// Object name
        name: String,
        /// New length in bytes
        length: u64,
    },
}

fn init_logging(cli: &Cli, config_level: Option<&str>) -> Result<()> {
    match cli.log_level.as_deref().or(config_level) {
        Some(level) => {
            let level: LogLevel = level.parse()?;
            diagnostics::init_with_level(level);
        }
        None => diagnostics::init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref(), cli.url.as_deref())?;
    init_logging(&cli, config.log_level.as_deref())?;
    let bucket = open_bucket(&config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Commands::Stat { name } => stat_command(bucket, name, &mut out).await,
        Commands::Cat { name } => cat_command(bucket, name, &mut out).await,
        Commands::Put { name, source } => put_command(bucket, name, source, &mut out).await,
        Commands::Patch {
            name,
            source,
            offset,
        } => patch_command(bucket, name, source, *offset, &mut out).await,
        Commands::Truncate { name, length } => {
            truncate_command(bucket, name, *length, &mut out).await
        }
    }
}
