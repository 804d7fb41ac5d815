// ABOUTME: Validated domain types for machine images and transfers.
// ABOUTME: Image names, transfer ids, and the enums that select transfer methods.

mod id;
mod image_name;
mod kind;
mod outcome;

pub use id::TransferId;
pub use image_name::{ImageName, ImageNameError, MAX_IMAGE_NAME_LEN};
pub use kind::{ExportFormat, ImageKind, VerifyMode};
pub use outcome::{Outcome, TransferKind};
