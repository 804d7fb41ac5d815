// ABOUTME: Results of converging one image resource.
// ABOUTME: Either work was done or a guard decided it was unnecessary.

use std::fmt;

use crate::transfer::Completion;

/// What an action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// A pull, import or export was issued (and awaited, unless detached).
    Transferred(Completion),
    /// A synchronous change was made.
    Changed,
    /// A guard found nothing to do.
    Skipped(SkipReason),
}

impl ActionOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, ActionOutcome::Skipped(_))
    }
}

/// Why a guard skipped an action. Skips are not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The target image already exists and `force` is off.
    ImageExists,
    /// A transfer for the image is already running.
    TransferInProgress,
    /// The clone or rename destination already exists.
    DestinationExists,
    /// The image to remove does not exist.
    ImageMissing,
    /// The export destination path exists and `force` is off.
    PathExists,
    /// The image properties already have the requested values.
    AlreadySet,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::ImageExists => "image already exists",
            SkipReason::TransferInProgress => "a transfer for this image is already running",
            SkipReason::DestinationExists => "destination image already exists",
            SkipReason::ImageMissing => "image does not exist",
            SkipReason::PathExists => "destination path already exists",
            SkipReason::AlreadySet => "properties already up to date",
        };
        f.write_str(reason)
    }
}
