// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use machine_image::types::{ExportFormat, ImageKind, ImageName, VerifyMode};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "machine-image")]
#[command(about = "Declarative image management for systemd-machined and systemd-importd")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print final results
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Stop waiting for a transfer after this long (e.g. 30m), canceling it
    #[arg(long, global = true, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Issue transfers without waiting for them to finish
    #[arg(long, global = true)]
    pub no_wait: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a machine-images.yml template
    Init {
        /// Image name to put in the template
        #[arg(short, long)]
        name: Option<String>,

        /// Overwrite an existing manifest
        #[arg(long)]
        force: bool,
    },

    /// Converge every image declared in the manifest
    Apply {
        /// Manifest path (default: discover in the current directory)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// List images and running transfers
    List,

    /// Pull an image from a URL
    Pull {
        /// URL to download from
        source: String,
        /// Local image name
        name: ImageName,
        #[arg(long = "type", value_enum, default_value_t)]
        kind: ImageKind,
        #[arg(long, value_enum, default_value_t)]
        verify: VerifyMode,
        /// Replace an existing image
        #[arg(long)]
        force: bool,
    },

    /// Import an image from a local file
    Import {
        /// File to read
        path: PathBuf,
        /// Local image name
        name: ImageName,
        #[arg(long = "type", value_enum, default_value_t)]
        kind: ImageKind,
        /// Replace an existing image
        #[arg(long)]
        force: bool,
        /// Mark the imported image read-only
        #[arg(long)]
        read_only: bool,
    },

    /// Export an image into a local file
    Export {
        /// Image to export
        name: ImageName,
        /// File to write
        path: PathBuf,
        #[arg(long = "type", value_enum, default_value_t)]
        kind: ImageKind,
        #[arg(long, value_enum, default_value_t)]
        format: ExportFormat,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Clone an image
    Clone {
        from: ImageName,
        to: ImageName,
        /// Mark the clone read-only
        #[arg(long)]
        read_only: bool,
    },

    /// Rename an image
    Rename { from: ImageName, to: ImageName },

    /// Remove an image
    Remove { name: ImageName },

    /// Change the read-only flag or size limit of an image
    Set {
        name: ImageName,
        #[arg(long)]
        read_only: Option<bool>,
        /// Size limit in bytes
        #[arg(long)]
        limit: Option<u64>,
    },
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(s).map_err(|e| e.to_string())
}
