use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::{
    DeviceAddress, DeviceRecord, DiscoverySink, DomainError, PrinterConnection, Radio,
    RadioAccess,
};
use tokio::time::Instant;
use tokio_serial::{SerialPortInfo, SerialPortType};
use tracing::{debug, warn};

use super::scan_task::ScanTask;
use crate::printer::SerialPrinter;

/// Radio backed by the serial ports the OS Bluetooth stack exposes.
///
/// Paired SPP printers show up as `/dev/rfcommN` (after `rfcomm bind`) or as
/// Bluetooth COM ports; those count as bonded. A scan re-enumerates ports for
/// the scan window and reports each one, so freshly bound printers appear.
pub struct SerialRadio {
    scan_window: Duration,
    poll_interval: Duration,
    baud_rate: u32,
    include_all_ports: bool,
    scan: ScanTask,
}

impl SerialRadio {
    pub fn new(
        scan_window: Duration,
        poll_interval: Duration,
        baud_rate: u32,
        include_all_ports: bool,
    ) -> Self {
        Self {
            scan_window,
            poll_interval,
            baud_rate,
            include_all_ports,
            scan: ScanTask::default(),
        }
    }
}

fn is_bluetooth_port(info: &SerialPortInfo) -> bool {
    matches!(info.port_type, SerialPortType::BluetoothPort) || info.port_name.contains("rfcomm")
}

fn port_name_hint(info: &SerialPortInfo) -> Option<String> {
    match &info.port_type {
        SerialPortType::UsbPort(usb) => usb.product.clone(),
        _ => None,
    }
}

/// Enumerate candidate printer ports as (address, name) pairs
fn list_ports(include_all: bool) -> Result<Vec<(DeviceAddress, Option<String>)>, DomainError> {
    let ports = tokio_serial::available_ports().map_err(|e| {
        warn!(error = %e, "Serial port enumeration failed");
        DomainError::RadioDisabled
    })?;

    Ok(ports
        .iter()
        .filter(|info| include_all || is_bluetooth_port(info))
        .filter_map(|info| match DeviceAddress::new(info.port_name.as_str()) {
            Ok(address) => Some((address, port_name_hint(info))),
            Err(e) => {
                debug!(port = %info.port_name, error = %e, "Skipping port");
                None
            }
        })
        .collect())
}

#[async_trait]
impl Radio for SerialRadio {
    async fn check_access(&self, access: RadioAccess) -> Result<(), DomainError> {
        debug!(?access, "Checking serial radio access");
        list_ports(self.include_all_ports).map(|_| ())
    }

    async fn bonded_devices(&self) -> Result<Vec<DeviceRecord>, DomainError> {
        Ok(list_ports(self.include_all_ports)?
            .into_iter()
            .map(|(address, name)| DeviceRecord::bonded(address, name))
            .collect())
    }

    async fn start_discovery(&self, sink: Arc<dyn DiscoverySink>) -> Result<(), DomainError> {
        let include_all = self.include_all_ports;
        let window = self.scan_window;
        let poll_interval = self.poll_interval;

        self.scan
            .start(move |token| async move {
                let deadline = Instant::now() + window;
                while Instant::now() < deadline {
                    match list_ports(include_all) {
                        Ok(ports) => {
                            for (address, name) in ports {
                                let name = name.unwrap_or_else(|| address.to_string());
                                sink.device_found(address, Some(name));
                            }
                        }
                        Err(e) => warn!(error = %e, "Port enumeration failed during scan"),
                    }

                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = tokio::time::sleep(poll_interval) => {}
                    }
                }
                sink.discovery_finished();
            })
            .await;
        Ok(())
    }

    async fn cancel_discovery(&self) -> Result<(), DomainError> {
        self.scan.cancel().await;
        Ok(())
    }

    async fn is_discovering(&self) -> bool {
        self.scan.is_running().await
    }

    async fn resolve(
        &self,
        address: &DeviceAddress,
    ) -> Result<Box<dyn PrinterConnection>, DomainError> {
        let listed = list_ports(true)
            .map(|ports| ports.iter().any(|(a, _)| a == address))
            .unwrap_or(false);

        if !listed && !Path::new(address.as_str()).exists() {
            debug!(%address, "Serial port not present");
            return Err(DomainError::DeviceUnavailable);
        }

        Ok(Box::new(SerialPrinter::new(address.as_str(), self.baud_rate)))
    }
}
