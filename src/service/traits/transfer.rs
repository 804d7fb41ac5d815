// ABOUTME: Transfer service operations (systemd-importd).
// ABOUTME: Issue pulls, imports and exports, and subscribe to their completion.

use super::shared_types::{
    ExportRequest, ImportRequest, PullRequest, TransferEvents, TransferInfo,
};
use crate::service::ServiceError;
use crate::types::{ImageName, TransferId};
use async_trait::async_trait;
use std::fs::File;

/// Long-running transfer operations.
///
/// Issuing returns as soon as the service has accepted the work; completion
/// is reported through [`TransferOps::subscribe`].
#[async_trait]
pub trait TransferOps: Send + Sync {
    /// List transfers currently in flight.
    async fn list_transfers(&self) -> Result<Vec<TransferInfo>, ServiceError>;

    /// Start pulling an image from a URL.
    async fn pull(&self, request: &PullRequest) -> Result<TransferId, ServiceError>;

    /// Start importing an image from `source`, which must be open for reading.
    async fn import(
        &self,
        request: &ImportRequest,
        source: &File,
    ) -> Result<TransferId, ServiceError>;

    /// Start exporting an image into `destination`, which must be open for writing.
    async fn export(
        &self,
        request: &ExportRequest,
        destination: &File,
    ) -> Result<TransferId, ServiceError>;

    /// Ask the service to abort a transfer.
    async fn cancel_transfer(&self, id: TransferId) -> Result<(), ServiceError>;

    /// Subscribe to completion events. Events are delivered from the moment
    /// this returns; dropping the stream ends the subscription.
    async fn subscribe(&self) -> Result<TransferEvents, ServiceError>;

    /// Check whether a transfer for this image is already running.
    async fn transfer_in_progress(&self, name: &ImageName) -> Result<bool, ServiceError> {
        let transfers = self.list_transfers().await?;
        Ok(transfers
            .iter()
            .any(|transfer| name == transfer.image_name.as_str()))
    }
}
