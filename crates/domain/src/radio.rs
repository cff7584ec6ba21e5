use std::sync::Arc;

use async_trait::async_trait;

use crate::device::{DeviceAddress, DeviceRecord};
use crate::error::DomainError;
use crate::printer::PrinterConnection;

/// Operation a radio permission check is made for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioAccess {
    Scan,
    Connect,
}

/// Receives discovery events from the radio.
///
/// Implementations must only enqueue; the radio may call from any thread.
pub trait DiscoverySink: Send + Sync {
    fn device_found(&self, address: DeviceAddress, name: Option<String>);

    fn discovery_finished(&self);
}

/// Platform radio stack: paired registry, discovery and device handles
#[async_trait]
pub trait Radio: Send + Sync {
    /// `PermissionDenied` or `RadioDisabled` when the operation cannot start
    async fn check_access(&self, access: RadioAccess) -> Result<(), DomainError>;

    /// Enumerate paired devices, in registry order
    async fn bonded_devices(&self) -> Result<Vec<DeviceRecord>, DomainError>;

    /// Begin an asynchronous scan reporting to `sink` until finished or cancelled
    async fn start_discovery(&self, sink: Arc<dyn DiscoverySink>) -> Result<(), DomainError>;

    async fn cancel_discovery(&self) -> Result<(), DomainError>;

    async fn is_discovering(&self) -> bool;

    /// Fresh, unconnected handle for `address`; `DeviceUnavailable` if unknown
    async fn resolve(&self, address: &DeviceAddress)
    -> Result<Box<dyn PrinterConnection>, DomainError>;
}
