// ABOUTME: Shared helper for connecting to machined and importd.
// ABOUTME: Used by every command that talks to the system services.

use machine_image::error::Result;
use machine_image::output::Output;
use machine_image::service::SystemdService;

/// Connect to the image manager and transfer service on the system bus.
pub async fn connect_to_service(output: &Output) -> Result<SystemdService> {
    output.progress("→ Connecting to system bus...");
    let service = SystemdService::connect().await?;
    tracing::debug!("Connected to machined and importd");
    Ok(service)
}
