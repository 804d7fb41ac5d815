// ABOUTME: In-memory stand-in for machined and importd.
// ABOUTME: Records every call and emits scripted completion events to subscribers.

use async_trait::async_trait;
use machine_image::service::{
    ExportRequest, ImageInfo, ImageOps, ImportRequest, PullRequest, ServiceError, TransferEvent,
    TransferEvents, TransferInfo, TransferOps,
};
use machine_image::types::{
    ExportFormat, ImageKind, ImageName, Outcome, TransferId, TransferKind, VerifyMode,
};
use parking_lot::Mutex;
use std::fs::File;
use tokio::sync::mpsc;

/// A call the code under test made against the fake.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Pull {
        name: String,
        source: String,
        kind: ImageKind,
        verify: VerifyMode,
        force: bool,
    },
    Import {
        name: String,
        kind: ImageKind,
        force: bool,
        read_only: bool,
    },
    Export {
        name: String,
        kind: ImageKind,
        format: ExportFormat,
    },
    Cancel(TransferId),
    Clone {
        from: String,
        to: String,
        read_only: bool,
    },
    Rename {
        from: String,
        to: String,
    },
    Remove(String),
    MarkReadOnly(String, bool),
    SetLimit(String, u64),
}

/// What happens right after a transfer is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnIssue {
    /// Emit the completion event synchronously, inside the issuing call.
    Emit(Outcome),
    /// Leave the transfer running until the test completes it.
    Hold,
}

struct State {
    images: Vec<ImageInfo>,
    transfers: Vec<TransferInfo>,
    subscribers: Vec<mpsc::UnboundedSender<TransferEvent>>,
    calls: Vec<Call>,
    next_id: u32,
    on_issue: OnIssue,
    noise: bool,
}

pub struct FakeService {
    state: Mutex<State>,
}

impl Default for FakeService {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl FakeService {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                images: Vec::new(),
                transfers: Vec::new(),
                subscribers: Vec::new(),
                calls: Vec::new(),
                next_id: 1,
                on_issue: OnIssue::Emit(Outcome::Success),
                noise: false,
            }),
        }
    }

    pub fn with_image(self, name: &str) -> Self {
        self.state.lock().images.push(ImageInfo::named(name));
        self
    }

    pub fn with_image_info(self, image: ImageInfo) -> Self {
        self.state.lock().images.push(image);
        self
    }

    pub fn with_transfer(self, image_name: &str) -> Self {
        {
            let mut state = self.state.lock();
            let id = TransferId::new(state.next_id);
            state.next_id += 1;
            state.transfers.push(TransferInfo {
                id,
                kind: "pull-tar".to_string(),
                remote: "https://example.com/image.tar".to_string(),
                image_name: image_name.to_string(),
                progress: 0.5,
            });
        }
        self
    }

    pub fn on_issue(self, on_issue: OnIssue) -> Self {
        self.state.lock().on_issue = on_issue;
        self
    }

    /// Change the issue policy between runs.
    pub fn set_on_issue(&self, on_issue: OnIssue) {
        self.state.lock().on_issue = on_issue;
    }

    /// Emit an unrelated completion event before each real one.
    pub fn with_noise(self) -> Self {
        self.state.lock().noise = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn image_names(&self) -> Vec<String> {
        self.state
            .lock()
            .images
            .iter()
            .map(|image| image.name.clone())
            .collect()
    }

    pub fn image_info(&self, name: &str) -> Option<ImageInfo> {
        self.state
            .lock()
            .images
            .iter()
            .find(|image| image.name == name)
            .cloned()
    }

    /// Id of the most recently issued transfer.
    pub fn last_issued(&self) -> Option<TransferId> {
        let state = self.state.lock();
        (state.next_id > 1).then(|| TransferId::new(state.next_id - 1))
    }

    /// Number of live event subscriptions.
    pub fn subscriber_count(&self) -> usize {
        let mut state = self.state.lock();
        state.subscribers.retain(|tx| !tx.is_closed());
        state.subscribers.len()
    }

    /// Deliver a completion event to every subscriber.
    pub fn complete(&self, id: TransferId, outcome: Outcome) {
        let mut state = self.state.lock();
        Self::finish(&mut state, id, outcome);
    }

    /// End every subscription without delivering an event.
    pub fn close_subscriptions(&self) {
        self.state.lock().subscribers.clear();
    }

    /// Yield until `count` transfers have been issued.
    pub async fn wait_for_issued(&self, count: u32) {
        loop {
            if self.state.lock().next_id > count {
                return;
            }
            tokio::task::yield_now().await;
        }
    }

    fn issue(&self, kind: TransferKind, name: &ImageName, call: Call) -> TransferId {
        let mut state = self.state.lock();
        state.calls.push(call);

        let id = TransferId::new(state.next_id);
        state.next_id += 1;
        state.transfers.push(TransferInfo {
            id,
            kind: format!("{}-tar", kind.label().to_lowercase()),
            remote: String::new(),
            image_name: name.to_string(),
            progress: 0.0,
        });

        if let OnIssue::Emit(outcome) = state.on_issue {
            Self::finish(&mut state, id, outcome);
        }
        id
    }

    fn finish(state: &mut State, id: TransferId, outcome: Outcome) {
        if state.noise {
            Self::emit(
                state,
                TransferEvent {
                    id: TransferId::new(id.get() + 1000),
                    outcome: Outcome::Failed,
                },
            );
        }

        if let Some(pos) = state.transfers.iter().position(|t| t.id == id) {
            let transfer = state.transfers.remove(pos);
            let creates_image = !transfer.kind.starts_with("export");
            if outcome.is_success()
                && creates_image
                && !state.images.iter().any(|i| i.name == transfer.image_name)
            {
                state.images.push(ImageInfo::named(transfer.image_name));
            }
        }

        Self::emit(state, TransferEvent { id, outcome });
    }

    fn emit(state: &mut State, event: TransferEvent) {
        state.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}

#[async_trait]
impl ImageOps for FakeService {
    async fn list_images(&self) -> Result<Vec<ImageInfo>, ServiceError> {
        Ok(self.state.lock().images.clone())
    }

    async fn image(&self, name: &ImageName) -> Result<Option<ImageInfo>, ServiceError> {
        Ok(self.image_info(name.as_str()))
    }

    async fn clone_image(
        &self,
        from: &ImageName,
        to: &ImageName,
        read_only: bool,
    ) -> Result<(), ServiceError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Clone {
            from: from.to_string(),
            to: to.to_string(),
            read_only,
        });
        let source = state
            .images
            .iter()
            .find(|image| image.name == from.as_str())
            .cloned()
            .ok_or_else(|| ServiceError::ImageNotFound(from.to_string()))?;
        state.images.push(ImageInfo {
            name: to.to_string(),
            read_only,
            ..source
        });
        Ok(())
    }

    async fn rename_image(&self, from: &ImageName, to: &ImageName) -> Result<(), ServiceError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Rename {
            from: from.to_string(),
            to: to.to_string(),
        });
        let image = state
            .images
            .iter_mut()
            .find(|image| image.name == from.as_str())
            .ok_or_else(|| ServiceError::ImageNotFound(from.to_string()))?;
        image.name = to.to_string();
        Ok(())
    }

    async fn remove_image(&self, name: &ImageName) -> Result<(), ServiceError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Remove(name.to_string()));
        state.images.retain(|image| image.name != name.as_str());
        Ok(())
    }

    async fn mark_read_only(&self, name: &ImageName, read_only: bool) -> Result<(), ServiceError> {
        let mut state = self.state.lock();
        state
            .calls
            .push(Call::MarkReadOnly(name.to_string(), read_only));
        if let Some(image) = state.images.iter_mut().find(|i| i.name == name.as_str()) {
            image.read_only = read_only;
        }
        Ok(())
    }

    async fn set_limit(&self, name: &ImageName, bytes: u64) -> Result<(), ServiceError> {
        let mut state = self.state.lock();
        state.calls.push(Call::SetLimit(name.to_string(), bytes));
        if let Some(image) = state.images.iter_mut().find(|i| i.name == name.as_str()) {
            image.limit = (bytes != u64::MAX).then_some(bytes);
        }
        Ok(())
    }
}

#[async_trait]
impl TransferOps for FakeService {
    async fn list_transfers(&self) -> Result<Vec<TransferInfo>, ServiceError> {
        Ok(self.state.lock().transfers.clone())
    }

    async fn pull(&self, request: &PullRequest) -> Result<TransferId, ServiceError> {
        Ok(self.issue(
            TransferKind::Pull,
            &request.name,
            Call::Pull {
                name: request.name.to_string(),
                source: request.source.clone(),
                kind: request.kind,
                verify: request.verify,
                force: request.force,
            },
        ))
    }

    async fn import(
        &self,
        request: &ImportRequest,
        _source: &File,
    ) -> Result<TransferId, ServiceError> {
        Ok(self.issue(
            TransferKind::Import,
            &request.name,
            Call::Import {
                name: request.name.to_string(),
                kind: request.kind,
                force: request.force,
                read_only: request.read_only,
            },
        ))
    }

    async fn export(
        &self,
        request: &ExportRequest,
        _destination: &File,
    ) -> Result<TransferId, ServiceError> {
        Ok(self.issue(
            TransferKind::Export,
            &request.name,
            Call::Export {
                name: request.name.to_string(),
                kind: request.kind,
                format: request.format,
            },
        ))
    }

    async fn cancel_transfer(&self, id: TransferId) -> Result<(), ServiceError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Cancel(id));
        state.transfers.retain(|t| t.id != id);
        Ok(())
    }

    async fn subscribe(&self) -> Result<TransferEvents, ServiceError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().subscribers.push(tx);

        let events = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        });
        Ok(Box::pin(events))
    }
}
