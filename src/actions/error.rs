// ABOUTME: Action error types with SNAFU pattern.
// ABOUTME: Wraps transfer, service and file errors with the action that raised them.

use std::path::PathBuf;

use snafu::Snafu;

use crate::config::Action;
use crate::service::ServiceError;
use crate::transfer::TransferError;
use crate::types::ImageName;

/// Failure of one resource action. Aborts the run; there is no retry.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ActionError {
    #[snafu(display("{source}"))]
    Transfer { source: TransferError },

    #[snafu(display("{action} {name}: {source}"))]
    Service {
        action: Action,
        name: ImageName,
        source: ServiceError,
    },

    #[snafu(display("cannot open {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("{action} {name}: missing required property '{property}'"))]
    MissingProperty {
        action: Action,
        name: ImageName,
        property: &'static str,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionErrorKind {
    /// The service reported the transfer as failed.
    TransferFailed,
    /// The transfer was canceled.
    TransferCanceled,
    /// Waiting for the transfer gave up.
    TransferTimeout,
    /// Talking to the image manager or transfer service failed.
    Service,
    /// The local file for an import or export could not be opened.
    Io,
    /// The resource lacks a property its action needs.
    InvalidResource,
}

impl ActionError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ActionErrorKind {
        match self {
            ActionError::Transfer { source } => match source {
                TransferError::Failed { .. } | TransferError::EventStreamClosed { .. } => {
                    ActionErrorKind::TransferFailed
                }
                TransferError::Canceled { .. } => ActionErrorKind::TransferCanceled,
                TransferError::Timeout { .. } => ActionErrorKind::TransferTimeout,
                TransferError::Service(_) => ActionErrorKind::Service,
            },
            ActionError::Service { .. } => ActionErrorKind::Service,
            ActionError::Io { .. } => ActionErrorKind::Io,
            ActionError::MissingProperty { .. } => ActionErrorKind::InvalidResource,
        }
    }

    /// Returns the underlying transfer error, if this is a transfer failure.
    pub fn transfer_error(&self) -> Option<&TransferError> {
        match self {
            ActionError::Transfer { source } => Some(source),
            _ => None,
        }
    }
}

impl From<TransferError> for ActionError {
    fn from(source: TransferError) -> Self {
        ActionError::Transfer { source }
    }
}
