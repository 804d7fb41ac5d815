// ABOUTME: Guard predicates deciding whether an action needs to run.
// ABOUTME: Membership checks against the current image and transfer lists.

use std::path::Path;

use crate::service::{ImageOps, ServiceError, TransferOps};
use crate::types::ImageName;

use super::SkipReason;

/// Pull and import: skip when the image exists (unless forced) or is already
/// being transferred.
pub async fn transfer_guard<S>(
    service: &S,
    name: &ImageName,
    force: bool,
) -> Result<Option<SkipReason>, ServiceError>
where
    S: ImageOps + TransferOps + ?Sized,
{
    if !force && service.image_exists(name).await? {
        return Ok(Some(SkipReason::ImageExists));
    }
    in_flight_guard(service, name).await
}

/// Skip when a transfer for `name` is already running.
pub async fn in_flight_guard<S>(
    service: &S,
    name: &ImageName,
) -> Result<Option<SkipReason>, ServiceError>
where
    S: TransferOps + ?Sized,
{
    if service.transfer_in_progress(name).await? {
        return Ok(Some(SkipReason::TransferInProgress));
    }
    Ok(None)
}

/// Clone and rename: skip when the destination already exists.
pub async fn destination_guard<S>(
    service: &S,
    to: &ImageName,
) -> Result<Option<SkipReason>, ServiceError>
where
    S: ImageOps + ?Sized,
{
    if service.image_exists(to).await? {
        return Ok(Some(SkipReason::DestinationExists));
    }
    Ok(None)
}

/// Remove: only run when the image exists.
pub async fn removal_guard<S>(
    service: &S,
    name: &ImageName,
) -> Result<Option<SkipReason>, ServiceError>
where
    S: ImageOps + ?Sized,
{
    if service.image_exists(name).await? {
        return Ok(None);
    }
    Ok(Some(SkipReason::ImageMissing))
}

/// Export: skip when the destination file exists (unless forced).
///
/// This looks at the filesystem, not at image state.
pub fn export_path_guard(path: &Path, force: bool) -> Option<SkipReason> {
    if !force && path.exists() {
        return Some(SkipReason::PathExists);
    }
    None
}
