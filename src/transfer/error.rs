// ABOUTME: Error types for transfer correlation.
// ABOUTME: Failed and canceled outcomes, timeouts, and lost subscriptions.

use crate::service::ServiceError;
use crate::types::{TransferId, TransferKind};
use std::time::Duration;

/// Errors that end a transfer without success.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The service reported the transfer as failed.
    #[error("{kind} failed (transfer {id})")]
    Failed { kind: TransferKind, id: TransferId },

    /// The transfer was canceled before it finished.
    #[error("{kind} canceled (transfer {id})")]
    Canceled { kind: TransferKind, id: TransferId },

    /// No completion arrived within the configured timeout.
    #[error("{kind} timed out after {after:?} (transfer {id})")]
    Timeout {
        kind: TransferKind,
        id: TransferId,
        after: Duration,
    },

    /// The event subscription ended before the transfer completed.
    #[error("{kind} lost track of transfer {id}: event stream closed")]
    EventStreamClosed { kind: TransferKind, id: TransferId },

    /// Subscribing or issuing failed at the service.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl TransferError {
    /// The transfer kind, when the error relates to an issued transfer.
    pub fn kind(&self) -> Option<TransferKind> {
        match self {
            TransferError::Failed { kind, .. }
            | TransferError::Canceled { kind, .. }
            | TransferError::Timeout { kind, .. }
            | TransferError::EventStreamClosed { kind, .. } => Some(*kind),
            TransferError::Service(_) => None,
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, TransferError::Canceled { .. })
    }
}
