// ABOUTME: Resource actions that converge machine images to their declared state.
// ABOUTME: Dispatches a declared ImageResource to the matching action.

mod error;
pub mod guards;
mod images;
mod outcome;
mod transfers;

pub use error::{ActionError, ActionErrorKind};
pub use images::{clone, remove, rename, set_properties};
pub use outcome::{ActionOutcome, SkipReason};
pub use transfers::{export, import, pull};

use std::time::Duration;

use crate::config::{Action, ImageResource};
use crate::service::FullService;

/// Run the action declared by `resource`.
///
/// `default_timeout` applies to transfers whose resource sets no timeout.
pub async fn apply<S>(
    service: &S,
    resource: &ImageResource,
    default_timeout: Option<Duration>,
) -> Result<ActionOutcome, ActionError>
where
    S: FullService + ?Sized,
{
    tracing::debug!("Applying {} to image {}", resource.action, resource.name);

    match resource.action {
        Action::Pull => pull(service, resource, default_timeout).await,
        Action::Import => import(service, resource, default_timeout).await,
        Action::Export => export(service, resource, default_timeout).await,
        Action::Clone => clone(service, resource).await,
        Action::Rename => rename(service, resource).await,
        Action::Remove => remove(service, resource).await,
        Action::SetProperties => set_properties(service, resource).await,
    }
}

fn skipped(resource: &ImageResource, reason: SkipReason) -> ActionOutcome {
    tracing::info!(
        "Skipping {} of image {}: {}",
        resource.action,
        resource.name,
        reason
    );
    ActionOutcome::Skipped(reason)
}
