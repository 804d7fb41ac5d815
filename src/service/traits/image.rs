// ABOUTME: Image manager operations (systemd-machined).
// ABOUTME: List, inspect, clone, rename, remove, and tune images.

use super::shared_types::ImageInfo;
use crate::service::ServiceError;
use crate::types::ImageName;
use async_trait::async_trait;

/// Synchronous image operations exposed by the image manager.
#[async_trait]
pub trait ImageOps: Send + Sync {
    /// List all images.
    async fn list_images(&self) -> Result<Vec<ImageInfo>, ServiceError>;

    /// Look up one image including its read-only flag and size limit.
    async fn image(&self, name: &ImageName) -> Result<Option<ImageInfo>, ServiceError>;

    /// Clone `from` into a new image `to`.
    async fn clone_image(
        &self,
        from: &ImageName,
        to: &ImageName,
        read_only: bool,
    ) -> Result<(), ServiceError>;

    /// Rename `from` to `to`.
    async fn rename_image(&self, from: &ImageName, to: &ImageName) -> Result<(), ServiceError>;

    /// Remove an image.
    async fn remove_image(&self, name: &ImageName) -> Result<(), ServiceError>;

    /// Mark an image read-only or writable.
    async fn mark_read_only(&self, name: &ImageName, read_only: bool) -> Result<(), ServiceError>;

    /// Set the size limit of an image in bytes.
    async fn set_limit(&self, name: &ImageName, bytes: u64) -> Result<(), ServiceError>;

    /// Check whether an image with this name exists.
    async fn image_exists(&self, name: &ImageName) -> Result<bool, ServiceError> {
        let images = self.list_images().await?;
        Ok(images.iter().any(|image| name == image.name.as_str()))
    }
}
