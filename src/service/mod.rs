// ABOUTME: Collaborator seam for the host image manager and transfer service.
// ABOUTME: Traits for testability plus the systemd D-Bus implementation.

mod error;
mod systemd;
pub mod traits;

pub use error::ServiceError;
pub use systemd::SystemdService;
pub use traits::*;
