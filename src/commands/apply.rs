// ABOUTME: Apply command implementation.
// ABOUTME: Runs each declared image resource in order, stopping at the first failure.

use std::time::Duration;

use machine_image::actions;
use machine_image::config::ImageResource;
use machine_image::error::Result;
use machine_image::output::Output;
use machine_image::service::FullService;

/// Settings from the command line that override the manifest.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Default wait timeout for transfers.
    pub timeout: Option<Duration>,
    /// Force fire-and-forget transfers.
    pub no_wait: bool,
}

/// Converge resources one after another. Failures abort the run without retry.
pub async fn apply_resources<S, I>(
    service: &S,
    resources: I,
    options: RunOptions,
    output: &Output,
) -> Result<()>
where
    S: FullService + ?Sized,
    I: IntoIterator<Item = ImageResource>,
{
    for mut resource in resources {
        if options.no_wait {
            resource.wait = false;
        }

        output.progress(&format!("→ {} {}...", resource.action, resource.name));
        let outcome = actions::apply(service, &resource, options.timeout).await?;
        output.outcome(&resource, &outcome);
    }

    Ok(())
}
