use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use domain::{DeviceAddress, DeviceRecord, DiscoverySink, DomainError, Radio, RadioAccess};
use tokio::sync::{Mutex, mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use super::state::{DeviceDirectory, ScanStatus};

/// What the caller sees when it reads the directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySnapshot {
    pub devices: Vec<DeviceRecord>,
    pub scan: ScanStatus,
}

enum DirectoryCommand {
    /// Seed the bonded list before any scan has run
    ReseedBonded { bonded: Vec<DeviceRecord> },
    BeginScan {
        generation: u64,
        bonded: Vec<DeviceRecord>,
    },
    Found {
        generation: u64,
        address: DeviceAddress,
        name: Option<String>,
    },
    Finished { generation: u64 },
    Cancelled { generation: u64 },
    /// The radio refused to start the scan
    Aborted { generation: u64 },
    Snapshot {
        reply: oneshot::Sender<DirectorySnapshot>,
    },
}

/// Single writer of the directory. Commands are applied strictly in
/// channel order; events tagged with an older scan generation are dropped.
struct DirectoryActor {
    directory: DeviceDirectory,
    generation: u64,
    scan: ScanStatus,
    status_tx: watch::Sender<ScanStatus>,
}

impl DirectoryActor {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<DirectoryCommand>) {
        while let Some(command) = rx.recv().await {
            self.apply(command);
        }
        debug!("Directory command channel closed");
    }

    fn apply(&mut self, command: DirectoryCommand) {
        match command {
            DirectoryCommand::ReseedBonded { bonded } => {
                if self.scan != ScanStatus::Idle {
                    debug!(scan = ?self.scan, "Directory owned by a scan, bonded refresh not applied");
                    return;
                }
                self.directory.reseed(bonded);
            }
            DirectoryCommand::BeginScan { generation, bonded } => {
                self.generation = generation;
                self.directory.reseed(bonded);
                self.set_scan(ScanStatus::Scanning);
            }
            DirectoryCommand::Found {
                generation,
                address,
                name,
            } => {
                if generation != self.generation || self.scan != ScanStatus::Scanning {
                    debug!(%address, generation, "Dropping stale discovery event");
                    return;
                }
                let Some(name) = name.filter(|n| !n.trim().is_empty()) else {
                    debug!(%address, "Ignoring unnamed device");
                    return;
                };
                if self
                    .directory
                    .insert(DeviceRecord::discovered(address.clone(), name))
                {
                    debug!(%address, total = self.directory.len(), "Device discovered");
                }
            }
            DirectoryCommand::Finished { generation } => {
                if generation == self.generation && self.scan == ScanStatus::Scanning {
                    info!(devices = self.directory.len(), "Scan finished");
                    self.set_scan(ScanStatus::Finished);
                }
            }
            DirectoryCommand::Cancelled { generation } => {
                if generation == self.generation && self.scan == ScanStatus::Scanning {
                    info!(devices = self.directory.len(), "Scan cancelled");
                    self.set_scan(ScanStatus::Cancelled);
                }
            }
            DirectoryCommand::Aborted { generation } => {
                if generation == self.generation {
                    self.set_scan(ScanStatus::Idle);
                }
            }
            DirectoryCommand::Snapshot { reply } => {
                let _ = reply.send(DirectorySnapshot {
                    devices: self.directory.records().to_vec(),
                    scan: self.scan,
                });
            }
        }
    }

    fn set_scan(&mut self, status: ScanStatus) {
        self.scan = status;
        self.status_tx.send_replace(status);
    }
}

/// Handed to the radio; turns callbacks into ordered directory commands
struct ChannelSink {
    generation: u64,
    commands: mpsc::UnboundedSender<DirectoryCommand>,
}

impl DiscoverySink for ChannelSink {
    fn device_found(&self, address: DeviceAddress, name: Option<String>) {
        let _ = self.commands.send(DirectoryCommand::Found {
            generation: self.generation,
            address,
            name,
        });
    }

    fn discovery_finished(&self) {
        let _ = self.commands.send(DirectoryCommand::Finished {
            generation: self.generation,
        });
    }
}

/// Handle to the device directory and the radio's discovery process
#[derive(Clone)]
pub struct DeviceDiscovery {
    radio: Arc<dyn Radio>,
    radio_lock: Arc<Mutex<()>>,
    commands: mpsc::UnboundedSender<DirectoryCommand>,
    status: watch::Receiver<ScanStatus>,
    generation: Arc<AtomicU64>,
}

impl DeviceDiscovery {
    /// Spawn the directory actor. `radio_lock` is shared with print sessions.
    pub fn spawn(radio: Arc<dyn Radio>, radio_lock: Arc<Mutex<()>>) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(ScanStatus::Idle);

        let actor = DirectoryActor {
            directory: DeviceDirectory::new(),
            generation: 0,
            scan: ScanStatus::Idle,
            status_tx,
        };
        tokio::spawn(actor.run(rx));

        Self {
            radio,
            radio_lock,
            commands,
            status,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Query the paired registry. Until the first scan starts the directory
    /// is seeded with the result; afterwards scan results are left untouched.
    pub async fn snapshot_bonded(&self) -> Result<Vec<DeviceRecord>, DomainError> {
        let bonded = self.radio.bonded_devices().await?;
        let _ = self.commands.send(DirectoryCommand::ReseedBonded {
            bonded: bonded.clone(),
        });
        Ok(bonded)
    }

    /// Cancel any running scan, re-seed with bonded devices and start discovery.
    ///
    /// Waits for an in-flight print session to finish first.
    pub async fn start_scan(&self) -> Result<(), DomainError> {
        let _radio = self.radio_lock.lock().await;

        self.radio.check_access(RadioAccess::Scan).await?;
        self.cancel_while_locked().await?;

        let bonded = self.radio.bonded_devices().await?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.commands.send(DirectoryCommand::BeginScan {
            generation,
            bonded,
        });

        let sink = Arc::new(ChannelSink {
            generation,
            commands: self.commands.clone(),
        });
        if let Err(e) = self.radio.start_discovery(sink).await {
            warn!(error = %e, "Radio refused to start discovery");
            let _ = self.commands.send(DirectoryCommand::Aborted { generation });
            self.snapshot().await;
            return Err(match e {
                DomainError::PermissionDenied | DomainError::RadioDisabled => e,
                other => DomainError::ScanFailed(other.to_string()),
            });
        }

        // Round-trip so the Scanning status is visible once we return
        self.snapshot().await;
        info!(generation, "Scan started");
        Ok(())
    }

    /// Stop a running scan; the directory keeps what it has.
    pub async fn cancel_scan(&self) -> Result<(), DomainError> {
        let _radio = self.radio_lock.lock().await;
        self.cancel_while_locked().await
    }

    /// Caller must hold the radio lock
    pub(crate) async fn cancel_while_locked(&self) -> Result<(), DomainError> {
        let cancelled = if self.radio.is_discovering().await {
            self.radio.cancel_discovery().await
        } else {
            Ok(())
        };
        // The directory stops accepting events even if the radio refused
        let _ = self.commands.send(DirectoryCommand::Cancelled {
            generation: self.generation.load(Ordering::SeqCst),
        });
        cancelled
    }

    pub async fn snapshot(&self) -> DirectorySnapshot {
        let (reply, rx) = oneshot::channel();
        if self
            .commands
            .send(DirectoryCommand::Snapshot { reply })
            .is_err()
        {
            return DirectorySnapshot::default();
        }
        rx.await.unwrap_or_default()
    }

    pub async fn devices(&self) -> Vec<DeviceRecord> {
        self.snapshot().await.devices
    }

    pub async fn find(&self, address: &DeviceAddress) -> Option<DeviceRecord> {
        self.devices()
            .await
            .into_iter()
            .find(|r| &r.address == address)
    }

    pub fn scan_status(&self) -> ScanStatus {
        *self.status.borrow()
    }

    /// Resolves once no scan is running
    pub async fn wait_for_scan(&self) {
        let mut status = self.status.clone();
        let _ = status
            .wait_for(|s| *s != ScanStatus::Scanning)
            .await;
    }
}
