// ABOUTME: Shared types used across service trait definitions.
// ABOUTME: Image and transfer listings, transfer requests, completion events.

use crate::types::{ExportFormat, ImageKind, ImageName, Outcome, TransferId, VerifyMode};
use chrono::{DateTime, Utc};
use futures::Stream;
use serde::Serialize;
use std::pin::Pin;

/// An image known to the image manager.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageInfo {
    /// Image name.
    pub name: String,
    /// Storage type reported by machined (directory, subvolume, raw, block).
    pub kind: String,
    /// Whether the image is marked read-only.
    pub read_only: bool,
    /// Creation time, if the backing storage records one.
    pub created: Option<DateTime<Utc>>,
    /// Last modification time, if known.
    pub modified: Option<DateTime<Utc>>,
    /// Disk usage in bytes, if known.
    pub usage: Option<u64>,
    /// Size limit in bytes, if known.
    pub limit: Option<u64>,
}

impl ImageInfo {
    /// Minimal image entry, mostly useful for fakes and tests.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: "directory".to_string(),
            read_only: false,
            created: None,
            modified: None,
            usage: None,
            limit: None,
        }
    }
}

/// A transfer currently tracked by the transfer service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferInfo {
    pub id: TransferId,
    /// Transfer type as reported by importd (e.g. "pull-tar", "export-raw").
    pub kind: String,
    /// Remote side: URL for pulls, empty for local transfers.
    pub remote: String,
    /// Local image the transfer writes to or reads from.
    pub image_name: String,
    /// Progress between 0.0 and 1.0.
    pub progress: f64,
}

/// Parameters for pulling an image from a URL.
#[derive(Debug, Clone)]
pub struct PullRequest {
    pub kind: ImageKind,
    pub source: String,
    pub name: ImageName,
    pub verify: VerifyMode,
    pub force: bool,
}

/// Parameters for importing an image from an open file.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub kind: ImageKind,
    pub name: ImageName,
    pub force: bool,
    pub read_only: bool,
}

/// Parameters for exporting an image into an open file.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub kind: ImageKind,
    pub name: ImageName,
    pub format: ExportFormat,
}

/// Notification that a transfer has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferEvent {
    pub id: TransferId,
    pub outcome: Outcome,
}

/// Live subscription to transfer completion events. Dropping it unsubscribes.
pub type TransferEvents = Pin<Box<dyn Stream<Item = TransferEvent> + Send>>;
