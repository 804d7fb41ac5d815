// ABOUTME: Capability traits for the image manager and transfer service.
// ABOUTME: Defines ImageOps, TransferOps, and the combined FullService.

mod image;
mod shared_types;
mod transfer;

pub use image::ImageOps;
pub use shared_types::*;
pub use transfer::TransferOps;

/// A backend offering both image management and transfers.
pub trait FullService: ImageOps + TransferOps {}

impl<T: ImageOps + TransferOps> FullService for T {}
