// ABOUTME: State transitions for a single correlated transfer.
// ABOUTME: Subscribe, issue, then wait for the TransferRemoved event with a matching id.

use std::fmt;
use std::fs::File;
use std::future::Future;
use std::time::Duration;

use futures::StreamExt;

use crate::service::{
    ExportRequest, ImportRequest, ServiceError, TransferEvents, TransferOps,
};
use crate::types::{Outcome, TransferId, TransferKind};

use super::error::TransferError;
use super::state::{Issued, Subscribed};

/// Whether the caller blocks until the transfer finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
    /// Issue and return immediately.
    Detached,
    /// Wait for the completion event, optionally giving up after `timeout`.
    Wait { timeout: Option<Duration> },
}

impl WaitMode {
    pub fn new(wait: bool, timeout: Option<Duration>) -> Self {
        if wait {
            WaitMode::Wait { timeout }
        } else {
            WaitMode::Detached
        }
    }
}

/// Successful end of a correlated transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The service reported the transfer as done.
    Completed(TransferId),
    /// Issued without waiting; the outcome is unknown.
    Detached(TransferId),
}

impl Completion {
    pub fn id(&self) -> TransferId {
        match self {
            Completion::Completed(id) | Completion::Detached(id) => *id,
        }
    }
}

/// One transfer, parameterized by its correlation state.
///
/// The only way to obtain a `Transfer` is [`Transfer::subscribe`], and the only
/// way to wait is on `Transfer<Issued>`, so a completion event can never be
/// emitted before somebody is listening for it.
///
/// ```no_run
/// use machine_image::service::TransferOps;
/// use machine_image::transfer::{Completion, Transfer, TransferError};
/// use machine_image::types::{TransferId, TransferKind};
///
/// async fn wait_for<T: TransferOps>(
///     service: &T,
///     id: TransferId,
/// ) -> Result<Completion, TransferError> {
///     let transfer = Transfer::subscribe(service, TransferKind::Pull).await?;
///     transfer.issued(id).wait(None).await
/// }
/// ```
///
/// Waiting on a transfer that was never issued does not compile:
///
/// ```compile_fail
/// use machine_image::service::TransferOps;
/// use machine_image::transfer::{Completion, Transfer, TransferError};
/// use machine_image::types::{TransferId, TransferKind};
///
/// async fn wait_for<T: TransferOps>(
///     service: &T,
///     _id: TransferId,
/// ) -> Result<Completion, TransferError> {
///     let transfer = Transfer::subscribe(service, TransferKind::Pull).await?;
///     transfer.wait(None).await
/// }
/// ```
pub struct Transfer<'a, T: ?Sized, S> {
    service: &'a T,
    kind: TransferKind,
    events: TransferEvents,
    state: S,
}

impl<T: ?Sized, S: fmt::Debug> fmt::Debug for Transfer<'_, T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transfer")
            .field("kind", &self.kind)
            .field("state", &self.state)
            .finish()
    }
}

impl<T: ?Sized, S> Transfer<'_, T, S> {
    pub fn kind(&self) -> TransferKind {
        self.kind
    }
}

// =============================================================================
// Subscribed -> Issued
// =============================================================================

impl<'a, T: TransferOps + ?Sized> Transfer<'a, T, Subscribed> {
    /// Start listening for completion events.
    pub async fn subscribe(service: &'a T, kind: TransferKind) -> Result<Self, TransferError> {
        let events = service.subscribe().await?;
        tracing::debug!("Subscribed to {} completion events", kind);

        Ok(Transfer {
            service,
            kind,
            events,
            state: Subscribed,
        })
    }

    /// Record the id the service assigned when the work was issued.
    pub fn issued(self, id: TransferId) -> Transfer<'a, T, Issued> {
        tracing::debug!("{} issued as transfer {}", self.kind, id);
        Transfer {
            service: self.service,
            kind: self.kind,
            events: self.events,
            state: Issued { id },
        }
    }
}

// =============================================================================
// Issued -> Completed | Failed | Canceled | Abandoned
// =============================================================================

impl<T: TransferOps + ?Sized> Transfer<'_, T, Issued> {
    pub fn id(&self) -> TransferId {
        self.state.id
    }

    /// Wait for the matching completion event.
    pub async fn wait(self, timeout: Option<Duration>) -> Result<Completion, TransferError> {
        self.wait_holding((), timeout).await
    }

    /// Wait for the matching completion event while keeping `resource` alive.
    ///
    /// `resource` (typically the file handed to the service) is dropped exactly
    /// once on every exit path, before the event subscription is torn down.
    pub async fn wait_holding<H>(
        mut self,
        resource: H,
        timeout: Option<Duration>,
    ) -> Result<Completion, TransferError> {
        let id = self.state.id;
        let kind = self.kind;

        let waited = match timeout {
            Some(limit) => tokio::time::timeout(limit, next_outcome(&mut self.events, id))
                .await
                .map_err(|_| limit),
            None => Ok(next_outcome(&mut self.events, id).await),
        };

        drop(resource);
        let Transfer {
            service, events, ..
        } = self;
        drop(events);

        match waited {
            Ok(Some(Outcome::Success)) => {
                tracing::info!("{} finished (transfer {})", kind, id);
                Ok(Completion::Completed(id))
            }
            Ok(Some(Outcome::Failed)) => {
                tracing::error!("{} failed (transfer {})", kind, id);
                Err(TransferError::Failed { kind, id })
            }
            Ok(Some(Outcome::Canceled)) => {
                tracing::error!("{} canceled (transfer {})", kind, id);
                Err(TransferError::Canceled { kind, id })
            }
            Ok(None) => Err(TransferError::EventStreamClosed { kind, id }),
            Err(after) => {
                tracing::warn!("{} timed out after {:?}, canceling transfer {}", kind, after, id);
                if let Err(e) = service.cancel_transfer(id).await {
                    tracing::warn!("Failed to cancel transfer {}: {}", id, e);
                }
                Err(TransferError::Timeout { kind, id, after })
            }
        }
    }
}

/// Consume events until one matches `id`. `None` means the stream ended.
async fn next_outcome(events: &mut TransferEvents, id: TransferId) -> Option<Outcome> {
    while let Some(event) = events.next().await {
        if event.id == id {
            return Some(event.outcome);
        }
        tracing::debug!(
            "Ignoring completion of unrelated transfer {} ({})",
            event.id,
            event.outcome
        );
    }
    None
}

// =============================================================================
// Entry points
// =============================================================================

/// Issue a transfer and, if asked to, wait for its outcome.
///
/// With [`WaitMode::Wait`] the subscription is established before `issue` is
/// called, so an event emitted while issuing is still observed.
pub async fn execute<T, F, Fut>(
    service: &T,
    kind: TransferKind,
    mode: WaitMode,
    issue: F,
) -> Result<Completion, TransferError>
where
    T: TransferOps + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<TransferId, ServiceError>>,
{
    match mode {
        WaitMode::Detached => {
            let id = issue().await?;
            tracing::debug!("{} issued as transfer {}, not waiting", kind, id);
            Ok(Completion::Detached(id))
        }
        WaitMode::Wait { timeout } => {
            let transfer = Transfer::subscribe(service, kind).await?;
            let id = issue().await?;
            transfer.issued(id).wait(timeout).await
        }
    }
}

/// A transfer that streams through a local file.
#[derive(Debug, Clone, Copy)]
pub enum FileTransfer<'r> {
    Import(&'r ImportRequest),
    Export(&'r ExportRequest),
}

impl FileTransfer<'_> {
    pub fn kind(&self) -> TransferKind {
        match self {
            FileTransfer::Import(_) => TransferKind::Import,
            FileTransfer::Export(_) => TransferKind::Export,
        }
    }

    async fn issue<T: TransferOps + ?Sized>(
        &self,
        service: &T,
        file: &File,
    ) -> Result<TransferId, ServiceError> {
        match self {
            FileTransfer::Import(request) => service.import(request, file).await,
            FileTransfer::Export(request) => service.export(request, file).await,
        }
    }
}

/// Like [`execute`], for transfers that read from or write to `file`.
///
/// The file is owned here and closed once the outcome is known, or right
/// after issuing when not waiting.
pub async fn execute_with_file<T>(
    service: &T,
    transfer: FileTransfer<'_>,
    file: File,
    mode: WaitMode,
) -> Result<Completion, TransferError>
where
    T: TransferOps + ?Sized,
{
    let kind = transfer.kind();
    match mode {
        WaitMode::Detached => {
            let id = transfer.issue(service, &file).await?;
            drop(file);
            tracing::debug!("{} issued as transfer {}, not waiting", kind, id);
            Ok(Completion::Detached(id))
        }
        WaitMode::Wait { timeout } => {
            let pending = Transfer::subscribe(service, kind).await?;
            let id = transfer.issue(service, &file).await?;
            pending.issued(id).wait_holding(file, timeout).await
        }
    }
}
