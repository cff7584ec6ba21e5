use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use domain::{
    DeviceAddress, DeviceRecord, DiscoverySink, DomainError, PrinterConnection, Radio,
    RadioAccess,
};
use tracing::{debug, warn};

use super::scan_task::ScanTask;
use crate::config::SimulatedRadioConfig;
use crate::printer::{FilePrinter, MockPrinter};

/// Where a simulated printer's payloads end up
enum PrinterTarget {
    Memory(MockPrinter),
    File(String),
}

struct SimulatedDevice {
    address: DeviceAddress,
    name: Option<String>,
    bonded: bool,
}

/// Scripted radio: a fixed set of devices, discovered one per step.
///
/// Radio state and permission can be flipped at runtime to exercise the
/// `RadioDisabled` / `PermissionDenied` paths.
pub struct SimulatedRadio {
    devices: Vec<SimulatedDevice>,
    step: Duration,
    target: PrinterTarget,
    enabled: AtomicBool,
    permission_granted: AtomicBool,
    scan: ScanTask,
}

impl SimulatedRadio {
    pub fn new(config: SimulatedRadioConfig) -> Self {
        let target = match &config.output_path {
            Some(path) => PrinterTarget::File(path.clone()),
            None => PrinterTarget::Memory(MockPrinter::new()),
        };
        Self::with_target(config, target)
    }

    pub fn with_printer(config: SimulatedRadioConfig, printer: MockPrinter) -> Self {
        Self::with_target(config, PrinterTarget::Memory(printer))
    }

    fn with_target(config: SimulatedRadioConfig, target: PrinterTarget) -> Self {
        let devices = config
            .devices
            .iter()
            .filter_map(|d| match DeviceAddress::new(d.address.as_str()) {
                Ok(address) => Some(SimulatedDevice {
                    address,
                    name: d.name.clone(),
                    bonded: d.bonded,
                }),
                Err(e) => {
                    warn!(address = %d.address, error = %e, "Skipping simulated device");
                    None
                }
            })
            .collect();

        Self {
            devices,
            step: Duration::from_millis(config.step_ms),
            target,
            enabled: AtomicBool::new(config.enabled),
            permission_granted: AtomicBool::new(config.permission_granted),
            scan: ScanTask::default(),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn set_permission_granted(&self, granted: bool) {
        self.permission_granted.store(granted, Ordering::SeqCst);
    }

    fn ensure_enabled(&self) -> Result<(), DomainError> {
        if self.enabled.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DomainError::RadioDisabled)
        }
    }
}

#[async_trait]
impl Radio for SimulatedRadio {
    async fn check_access(&self, access: RadioAccess) -> Result<(), DomainError> {
        if !self.permission_granted.load(Ordering::SeqCst) {
            debug!(?access, "Simulated permission denied");
            return Err(DomainError::PermissionDenied);
        }
        self.ensure_enabled()
    }

    async fn bonded_devices(&self) -> Result<Vec<DeviceRecord>, DomainError> {
        self.ensure_enabled()?;
        Ok(self
            .devices
            .iter()
            .filter(|d| d.bonded)
            .map(|d| DeviceRecord::bonded(d.address.clone(), d.name.clone()))
            .collect())
    }

    async fn start_discovery(&self, sink: Arc<dyn DiscoverySink>) -> Result<(), DomainError> {
        self.ensure_enabled()?;

        // Every device in range answers, paired or not
        let script: Vec<(DeviceAddress, Option<String>)> = self
            .devices
            .iter()
            .map(|d| (d.address.clone(), d.name.clone()))
            .collect();
        let step = self.step;

        self.scan
            .start(move |token| async move {
                for (address, name) in script {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = tokio::time::sleep(step) => sink.device_found(address, name),
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
        self.ensure_enabled()?;
        if !self.devices.iter().any(|d| &d.address == address) {
            return Err(DomainError::DeviceUnavailable);
        }

        Ok(match &self.target {
            PrinterTarget::Memory(printer) => Box::new(printer.clone()),
            PrinterTarget::File(path) => Box::new(FilePrinter::new(path)),
        })
    }
}
