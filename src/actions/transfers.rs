// ABOUTME: Pull, import and export actions.
// ABOUTME: Guard against redundant work, then issue through the transfer correlator.

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use snafu::{OptionExt, ResultExt};

use crate::config::{Action, ImageResource};
use crate::service::{ExportRequest, FullService, ImportRequest, PullRequest};
use crate::transfer::{self, FileTransfer};
use crate::types::TransferKind;

use super::error::{ActionError, IoSnafu, MissingPropertySnafu, ServiceSnafu};
use super::{ActionOutcome, guards, skipped};

/// Pull an image from `source`.
pub async fn pull<S>(
    service: &S,
    resource: &ImageResource,
    default_timeout: Option<Duration>,
) -> Result<ActionOutcome, ActionError>
where
    S: FullService + ?Sized,
{
    let name = &resource.name;
    let source = resource.source.as_ref().context(MissingPropertySnafu {
        action: Action::Pull,
        name: name.clone(),
        property: "source",
    })?;

    let guard = guards::transfer_guard(service, name, resource.force)
        .await
        .context(ServiceSnafu {
            action: Action::Pull,
            name: name.clone(),
        })?;
    if let Some(reason) = guard {
        return Ok(skipped(resource, reason));
    }

    let request = PullRequest {
        kind: resource.kind,
        source: source.clone(),
        name: name.clone(),
        verify: resource.verify,
        force: resource.force,
    };

    tracing::info!("Pulling {} image {} from {}", request.kind, name, source);
    let completion = transfer::execute(
        service,
        TransferKind::Pull,
        resource.wait_mode(default_timeout),
        || service.pull(&request),
    )
    .await?;

    Ok(ActionOutcome::Transferred(completion))
}

/// Import an image from the local file at `path`.
pub async fn import<S>(
    service: &S,
    resource: &ImageResource,
    default_timeout: Option<Duration>,
) -> Result<ActionOutcome, ActionError>
where
    S: FullService + ?Sized,
{
    let name = &resource.name;
    let path = resource.path().context(MissingPropertySnafu {
        action: Action::Import,
        name: name.clone(),
        property: "path",
    })?;

    let guard = guards::transfer_guard(service, name, resource.force)
        .await
        .context(ServiceSnafu {
            action: Action::Import,
            name: name.clone(),
        })?;
    if let Some(reason) = guard {
        return Ok(skipped(resource, reason));
    }

    let file = File::open(path).context(IoSnafu { path })?;
    let request = ImportRequest {
        kind: resource.kind,
        name: name.clone(),
        force: resource.force,
        read_only: resource.read_only(),
    };

    tracing::info!("Importing {} image {} from {}", request.kind, name, path.display());
    let completion = transfer::execute_with_file(
        service,
        FileTransfer::Import(&request),
        file,
        resource.wait_mode(default_timeout),
    )
    .await?;

    Ok(ActionOutcome::Transferred(completion))
}

/// Export an image into the file at `path`.
pub async fn export<S>(
    service: &S,
    resource: &ImageResource,
    default_timeout: Option<Duration>,
) -> Result<ActionOutcome, ActionError>
where
    S: FullService + ?Sized,
{
    let name = &resource.name;
    let path = resource.path().context(MissingPropertySnafu {
        action: Action::Export,
        name: name.clone(),
        property: "path",
    })?;

    if let Some(reason) = guards::export_path_guard(path, resource.force) {
        return Ok(skipped(resource, reason));
    }
    let guard = guards::in_flight_guard(service, name)
        .await
        .context(ServiceSnafu {
            action: Action::Export,
            name: name.clone(),
        })?;
    if let Some(reason) = guard {
        return Ok(skipped(resource, reason));
    }

    let file = File::create(path).context(IoSnafu { path })?;
    let request = ExportRequest {
        kind: resource.kind,
        name: name.clone(),
        format: resource.format,
    };

    tracing::info!(
        "Exporting {} image {} to {} ({})",
        request.kind,
        name,
        path.display(),
        request.format
    );
    let result = transfer::execute_with_file(
        service,
        FileTransfer::Export(&request),
        file,
        resource.wait_mode(default_timeout),
    )
    .await;

    match result {
        Ok(completion) => Ok(ActionOutcome::Transferred(completion)),
        Err(e) => {
            // A partial file would make the path guard skip every later run.
            discard_partial_export(path);
            Err(e.into())
        }
    }
}

fn discard_partial_export(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!("Removed incomplete export {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            "Failed to remove incomplete export {}: {}",
            path.display(),
            e
        ),
    }
}
