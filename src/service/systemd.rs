// ABOUTME: systemd-machined and systemd-importd backend over the system bus.
// ABOUTME: zbus proxies for machine1/import1 mapped onto ImageOps and TransferOps.

use super::error::ServiceError;
use super::traits::{
    ExportRequest, ImageInfo, ImageOps, ImportRequest, PullRequest, TransferEvent, TransferEvents,
    TransferInfo, TransferOps,
};
use crate::types::{ImageKind, ImageName, Outcome, TransferId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use std::fs::File;
use std::os::fd::AsFd;
use zbus::zvariant::{Fd, ObjectPath, OwnedObjectPath};
use zbus::{Connection, proxy};

const NO_SUCH_IMAGE: &str = "org.freedesktop.machine1.NoSuchImage";

// =============================================================================
// Proxies
// =============================================================================

#[proxy(
    interface = "org.freedesktop.machine1.Manager",
    default_service = "org.freedesktop.machine1",
    default_path = "/org/freedesktop/machine1"
)]
trait MachineManager {
    fn list_images(
        &self,
    ) -> zbus::Result<Vec<(String, String, bool, u64, u64, u64, OwnedObjectPath)>>;

    fn get_image(&self, name: &str) -> zbus::Result<OwnedObjectPath>;

    fn clone_image(&self, name: &str, new_name: &str, read_only: bool) -> zbus::Result<()>;

    fn rename_image(&self, name: &str, new_name: &str) -> zbus::Result<()>;

    fn remove_image(&self, name: &str) -> zbus::Result<()>;

    fn mark_image_read_only(&self, name: &str, read_only: bool) -> zbus::Result<()>;

    fn set_image_limit(&self, name: &str, size: u64) -> zbus::Result<()>;
}

#[proxy(
    interface = "org.freedesktop.machine1.Image",
    default_service = "org.freedesktop.machine1"
)]
trait MachineImage {
    #[zbus(property, name = "Type")]
    fn image_type(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn read_only(&self) -> zbus::Result<bool>;

    #[zbus(property)]
    fn creation_timestamp(&self) -> zbus::Result<u64>;

    #[zbus(property)]
    fn modification_timestamp(&self) -> zbus::Result<u64>;

    #[zbus(property)]
    fn usage(&self) -> zbus::Result<u64>;

    #[zbus(property)]
    fn limit(&self) -> zbus::Result<u64>;
}

#[proxy(
    interface = "org.freedesktop.import1.Manager",
    default_service = "org.freedesktop.import1",
    default_path = "/org/freedesktop/import1"
)]
trait ImportManager {
    fn pull_tar(
        &self,
        url: &str,
        local_name: &str,
        verify_mode: &str,
        force: bool,
    ) -> zbus::Result<(u32, OwnedObjectPath)>;

    fn pull_raw(
        &self,
        url: &str,
        local_name: &str,
        verify_mode: &str,
        force: bool,
    ) -> zbus::Result<(u32, OwnedObjectPath)>;

    fn import_tar(
        &self,
        fd: Fd<'_>,
        local_name: &str,
        force: bool,
        read_only: bool,
    ) -> zbus::Result<(u32, OwnedObjectPath)>;

    fn import_raw(
        &self,
        fd: Fd<'_>,
        local_name: &str,
        force: bool,
        read_only: bool,
    ) -> zbus::Result<(u32, OwnedObjectPath)>;

    fn export_tar(
        &self,
        local_name: &str,
        fd: Fd<'_>,
        format: &str,
    ) -> zbus::Result<(u32, OwnedObjectPath)>;

    fn export_raw(
        &self,
        local_name: &str,
        fd: Fd<'_>,
        format: &str,
    ) -> zbus::Result<(u32, OwnedObjectPath)>;

    fn list_transfers(
        &self,
    ) -> zbus::Result<Vec<(u32, String, String, String, f64, OwnedObjectPath)>>;

    fn cancel_transfer(&self, transfer_id: u32) -> zbus::Result<()>;

    #[zbus(signal)]
    fn transfer_removed(
        &self,
        transfer_id: u32,
        transfer_path: ObjectPath<'_>,
        result: &str,
    ) -> zbus::Result<()>;
}

// =============================================================================
// Helpers
// =============================================================================

fn map_call_error(method: &'static str) -> impl Fn(zbus::Error) -> ServiceError {
    move |e| ServiceError::call(method, e.to_string())
}

fn is_no_such_image(e: &zbus::Error) -> bool {
    matches!(e, zbus::Error::MethodError(name, _, _) if name.as_str() == NO_SUCH_IMAGE)
}

/// machined reports timestamps in microseconds, with 0 meaning unknown.
fn timestamp(usec: u64) -> Option<DateTime<Utc>> {
    if usec == 0 {
        return None;
    }
    i64::try_from(usec)
        .ok()
        .and_then(DateTime::from_timestamp_micros)
}

/// machined uses `u64::MAX` for "no limit" and "unknown usage".
fn size(bytes: u64) -> Option<u64> {
    (bytes != u64::MAX).then_some(bytes)
}

// =============================================================================
// SystemdService
// =============================================================================

/// Backend talking to systemd-machined and systemd-importd on the system bus.
pub struct SystemdService {
    connection: Connection,
    machines: MachineManagerProxy<'static>,
    imports: ImportManagerProxy<'static>,
}

impl SystemdService {
    /// Connect to the system bus.
    pub async fn connect() -> Result<Self, ServiceError> {
        let connection = Connection::system()
            .await
            .map_err(|e| ServiceError::Connection(e.to_string()))?;
        Self::with_connection(connection).await
    }

    /// Build the service on top of an existing bus connection.
    pub async fn with_connection(connection: Connection) -> Result<Self, ServiceError> {
        let machines = MachineManagerProxy::new(&connection)
            .await
            .map_err(|e| ServiceError::Connection(e.to_string()))?;
        let imports = ImportManagerProxy::new(&connection)
            .await
            .map_err(|e| ServiceError::Connection(e.to_string()))?;

        Ok(Self {
            connection,
            machines,
            imports,
        })
    }

    async fn image_proxy(
        &self,
        path: OwnedObjectPath,
    ) -> Result<MachineImageProxy<'static>, ServiceError> {
        MachineImageProxy::builder(&self.connection)
            .path(path)
            .map_err(map_call_error("GetImage"))?
            .build()
            .await
            .map_err(map_call_error("GetImage"))
    }
}

#[async_trait]
impl ImageOps for SystemdService {
    async fn list_images(&self) -> Result<Vec<ImageInfo>, ServiceError> {
        let images = self
            .machines
            .list_images()
            .await
            .map_err(map_call_error("ListImages"))?;

        Ok(images
            .into_iter()
            .map(
                |(name, kind, read_only, created, modified, usage, _path)| ImageInfo {
                    name,
                    kind,
                    read_only,
                    created: timestamp(created),
                    modified: timestamp(modified),
                    usage: size(usage),
                    limit: None,
                },
            )
            .collect())
    }

    async fn image(&self, name: &ImageName) -> Result<Option<ImageInfo>, ServiceError> {
        let path = match self.machines.get_image(name.as_str()).await {
            Ok(path) => path,
            Err(e) if is_no_such_image(&e) => return Ok(None),
            Err(e) => return Err(map_call_error("GetImage")(e)),
        };

        let image = self.image_proxy(path).await?;
        let read = map_call_error("Get");

        Ok(Some(ImageInfo {
            name: name.to_string(),
            kind: image.image_type().await.map_err(&read)?,
            read_only: image.read_only().await.map_err(&read)?,
            created: timestamp(image.creation_timestamp().await.map_err(&read)?),
            modified: timestamp(image.modification_timestamp().await.map_err(&read)?),
            usage: size(image.usage().await.map_err(&read)?),
            limit: size(image.limit().await.map_err(&read)?),
        }))
    }

    async fn clone_image(
        &self,
        from: &ImageName,
        to: &ImageName,
        read_only: bool,
    ) -> Result<(), ServiceError> {
        self.machines
            .clone_image(from.as_str(), to.as_str(), read_only)
            .await
            .map_err(map_call_error("CloneImage"))
    }

    async fn rename_image(&self, from: &ImageName, to: &ImageName) -> Result<(), ServiceError> {
        self.machines
            .rename_image(from.as_str(), to.as_str())
            .await
            .map_err(map_call_error("RenameImage"))
    }

    async fn remove_image(&self, name: &ImageName) -> Result<(), ServiceError> {
        match self.machines.remove_image(name.as_str()).await {
            Ok(()) => Ok(()),
            Err(e) if is_no_such_image(&e) => Err(ServiceError::ImageNotFound(name.to_string())),
            Err(e) => Err(map_call_error("RemoveImage")(e)),
        }
    }

    async fn mark_read_only(&self, name: &ImageName, read_only: bool) -> Result<(), ServiceError> {
        self.machines
            .mark_image_read_only(name.as_str(), read_only)
            .await
            .map_err(map_call_error("MarkImageReadOnly"))
    }

    async fn set_limit(&self, name: &ImageName, bytes: u64) -> Result<(), ServiceError> {
        self.machines
            .set_image_limit(name.as_str(), bytes)
            .await
            .map_err(map_call_error("SetImageLimit"))
    }
}

#[async_trait]
impl TransferOps for SystemdService {
    async fn list_transfers(&self) -> Result<Vec<TransferInfo>, ServiceError> {
        let transfers = self
            .imports
            .list_transfers()
            .await
            .map_err(map_call_error("ListTransfers"))?;

        Ok(transfers
            .into_iter()
            .map(
                |(id, kind, remote, image_name, progress, _path)| TransferInfo {
                    id: TransferId::new(id),
                    kind,
                    remote,
                    image_name,
                    progress,
                },
            )
            .collect())
    }

    async fn pull(&self, request: &PullRequest) -> Result<TransferId, ServiceError> {
        let (url, name, verify) = (
            request.source.as_str(),
            request.name.as_str(),
            request.verify.as_str(),
        );
        let (id, _path) = match request.kind {
            ImageKind::Tar => self
                .imports
                .pull_tar(url, name, verify, request.force)
                .await
                .map_err(map_call_error("PullTar"))?,
            ImageKind::Raw => self
                .imports
                .pull_raw(url, name, verify, request.force)
                .await
                .map_err(map_call_error("PullRaw"))?,
        };
        Ok(TransferId::new(id))
    }

    async fn import(
        &self,
        request: &ImportRequest,
        source: &File,
    ) -> Result<TransferId, ServiceError> {
        let fd = Fd::from(source.as_fd());
        let name = request.name.as_str();
        let (id, _path) = match request.kind {
            ImageKind::Tar => self
                .imports
                .import_tar(fd, name, request.force, request.read_only)
                .await
                .map_err(map_call_error("ImportTar"))?,
            ImageKind::Raw => self
                .imports
                .import_raw(fd, name, request.force, request.read_only)
                .await
                .map_err(map_call_error("ImportRaw"))?,
        };
        Ok(TransferId::new(id))
    }

    async fn export(
        &self,
        request: &ExportRequest,
        destination: &File,
    ) -> Result<TransferId, ServiceError> {
        let fd = Fd::from(destination.as_fd());
        let (name, format) = (request.name.as_str(), request.format.as_str());
        let (id, _path) = match request.kind {
            ImageKind::Tar => self
                .imports
                .export_tar(name, fd, format)
                .await
                .map_err(map_call_error("ExportTar"))?,
            ImageKind::Raw => self
                .imports
                .export_raw(name, fd, format)
                .await
                .map_err(map_call_error("ExportRaw"))?,
        };
        Ok(TransferId::new(id))
    }

    async fn cancel_transfer(&self, id: TransferId) -> Result<(), ServiceError> {
        self.imports
            .cancel_transfer(id.get())
            .await
            .map_err(map_call_error("CancelTransfer"))
    }

    async fn subscribe(&self) -> Result<TransferEvents, ServiceError> {
        // The match rule is installed before this returns, so any transfer
        // issued afterwards cannot slip past the stream.
        let signals = self
            .imports
            .receive_transfer_removed()
            .await
            .map_err(map_call_error("AddMatch"))?;

        let events = signals.filter_map(|signal| async move {
            match signal.args() {
                Ok(args) => Some(TransferEvent {
                    id: TransferId::new(*args.transfer_id()),
                    outcome: Outcome::from_result(args.result()),
                }),
                Err(e) => {
                    tracing::warn!("Ignoring malformed TransferRemoved signal: {}", e);
                    None
                }
            }
        });

        Ok(Box::pin(events))
    }
}
