// ABOUTME: Synchronous image actions: clone, rename, remove, set_properties.
// ABOUTME: Each checks the current image list before calling the image manager.

use snafu::ResultExt;

use crate::config::{Action, ImageResource};
use crate::service::{ImageOps, ServiceError};

use super::error::{ActionError, ServiceSnafu};
use super::{ActionOutcome, SkipReason, guards, skipped};

/// Clone `from` into `to`, unless `to` already exists.
pub async fn clone<S>(service: &S, resource: &ImageResource) -> Result<ActionOutcome, ActionError>
where
    S: ImageOps + ?Sized,
{
    let (from, to) = (resource.from(), resource.to());
    let context = || ServiceSnafu {
        action: Action::Clone,
        name: to.clone(),
    };

    if let Some(reason) = guards::destination_guard(service, to)
        .await
        .context(context())?
    {
        return Ok(skipped(resource, reason));
    }

    tracing::info!("Cloning image {} to {}", from, to);
    service
        .clone_image(from, to, resource.read_only())
        .await
        .context(context())?;

    Ok(ActionOutcome::Changed)
}

/// Rename `from` to `to`, unless `to` already exists.
pub async fn rename<S>(service: &S, resource: &ImageResource) -> Result<ActionOutcome, ActionError>
where
    S: ImageOps + ?Sized,
{
    let (from, to) = (resource.from(), resource.to());
    let context = || ServiceSnafu {
        action: Action::Rename,
        name: to.clone(),
    };

    if let Some(reason) = guards::destination_guard(service, to)
        .await
        .context(context())?
    {
        return Ok(skipped(resource, reason));
    }

    tracing::info!("Renaming image {} to {}", from, to);
    service.rename_image(from, to).await.context(context())?;

    Ok(ActionOutcome::Changed)
}

/// Remove the image, if it exists.
pub async fn remove<S>(service: &S, resource: &ImageResource) -> Result<ActionOutcome, ActionError>
where
    S: ImageOps + ?Sized,
{
    let name = &resource.name;
    let context = || ServiceSnafu {
        action: Action::Remove,
        name: name.clone(),
    };

    if let Some(reason) = guards::removal_guard(service, name)
        .await
        .context(context())?
    {
        return Ok(skipped(resource, reason));
    }

    tracing::info!("Removing image {}", name);
    service.remove_image(name).await.context(context())?;

    Ok(ActionOutcome::Changed)
}

/// Bring the read-only flag and size limit in line with the resource.
///
/// Each property is handled on its own: unset properties are left alone and
/// properties that already match are not written.
pub async fn set_properties<S>(
    service: &S,
    resource: &ImageResource,
) -> Result<ActionOutcome, ActionError>
where
    S: ImageOps + ?Sized,
{
    let name = &resource.name;
    let context = || ServiceSnafu {
        action: Action::SetProperties,
        name: name.clone(),
    };

    let image = service
        .image(name)
        .await
        .and_then(|image| image.ok_or_else(|| ServiceError::ImageNotFound(name.to_string())))
        .context(context())?;

    let mut changed = false;

    if let Some(read_only) = resource.read_only
        && image.read_only != read_only
    {
        tracing::info!("Marking image {} read-only={}", name, read_only);
        service
            .mark_read_only(name, read_only)
            .await
            .context(context())?;
        changed = true;
    }

    // u64::MAX is how machined spells "no limit", which reads back as None.
    if let Some(limit) = resource.limit_bytes
        && image.limit != (limit != u64::MAX).then_some(limit)
    {
        tracing::info!("Setting size limit of image {} to {} bytes", name, limit);
        service.set_limit(name, limit).await.context(context())?;
        changed = true;
    }

    if changed {
        Ok(ActionOutcome::Changed)
    } else {
        Ok(skipped(resource, SkipReason::AlreadySet))
    }
}
