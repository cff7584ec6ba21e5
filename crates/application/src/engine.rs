use std::ops::RangeInclusive;
use std::sync::Arc;

use domain::{
    Counter, CounterId, CounterSpec, DeviceAddress, DeviceRecord, DomainError, KeyValueStore,
    PrinterBinding, Radio, TicketLayout,
};
use tokio::sync::Mutex;
use tracing::info;

use crate::counter::CounterStore;
use crate::directory::{DeviceDiscovery, DirectorySnapshot};
use crate::printer::{PrintReceipt, PrinterConnectionManager, SessionTimeouts, TicketEncoder};

/// Static settings for an engine instance
#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub counters: Vec<CounterSpec>,
    pub layout: TicketLayout,
    pub timeouts: SessionTimeouts,
}

impl EngineSettings {
    pub fn with_default_counters() -> Self {
        Self {
            counters: CounterSpec::defaults(),
            ..Self::default()
        }
    }
}

/// Outcome of issuing a new number: the number is kept even if printing failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedTicket {
    pub counter: CounterId,
    pub number: u32,
    pub print: Result<PrintReceipt, DomainError>,
}

/// The queue printer core: counters, device directory and printer binding,
/// owned by one caller and built from injected persistence and radio.
pub struct QueuePrinterEngine {
    counters: CounterStore,
    discovery: DeviceDiscovery,
    printer: PrinterConnectionManager,
}

impl QueuePrinterEngine {
    /// Restore state from `store` and spawn the directory actor.
    /// Must be called inside a Tokio runtime.
    pub async fn start(
        store: Arc<dyn KeyValueStore>,
        radio: Arc<dyn Radio>,
        settings: EngineSettings,
    ) -> Result<Self, DomainError> {
        let radio_lock = Arc::new(Mutex::new(()));
        let counters = CounterStore::load(store.clone(), settings.counters).await?;
        let discovery = DeviceDiscovery::spawn(radio.clone(), radio_lock.clone());
        let printer = PrinterConnectionManager::restore(
            radio,
            store,
            discovery.clone(),
            TicketEncoder::new(settings.layout),
            settings.timeouts,
            radio_lock,
        )
        .await?;

        info!("Queue printer engine ready");
        Ok(Self {
            counters,
            discovery,
            printer,
        })
    }

    /// Resolve a counter by ID or label
    pub fn counter_id(&self, name: &str) -> Result<CounterId, DomainError> {
        self.counters
            .find(name)
            .map(|spec| spec.id.clone())
            .ok_or_else(|| DomainError::UnknownCounter(name.to_string()))
    }

    pub async fn counters(&self) -> Vec<(CounterSpec, Counter)> {
        self.counters.counters().await
    }

    /// Issue the next number and print it
    pub async fn advance_counter(&self, id: &CounterId) -> Result<IssuedTicket, DomainError> {
        let label = self.counters.label(id)?.to_string();
        let number = self.counters.advance(id).await?;
        let print = self.printer.print_ticket(&label, number).await;

        Ok(IssuedTicket {
            counter: id.clone(),
            number,
            print,
        })
    }

    /// Print the last issued number again
    pub async fn reprint_last(&self, id: &CounterId) -> Result<PrintReceipt, DomainError> {
        let label = self.counters.label(id)?;
        let number = self.counters.reprint_target(id).await?;
        self.printer.print_ticket(label, number).await
    }

    pub async fn reset_counter(&self, id: &CounterId) -> Result<(), DomainError> {
        self.counters.reset(id).await
    }

    /// Numbers a picker may offer for `id`
    pub async fn pick_range(&self, id: &CounterId) -> Result<RangeInclusive<u32>, DomainError> {
        self.counters.pick_range(id).await
    }

    /// Print an already issued number
    pub async fn pick_and_print(
        &self,
        id: &CounterId,
        requested: i64,
    ) -> Result<PrintReceipt, DomainError> {
        let label = self.counters.label(id)?;
        let number = self.counters.pick(id, requested).await?;
        self.printer.print_ticket(label, number).await
    }

    pub async fn snapshot_bonded(&self) -> Result<Vec<DeviceRecord>, DomainError> {
        self.discovery.snapshot_bonded().await
    }

    pub async fn list_devices(&self) -> DirectorySnapshot {
        self.discovery.snapshot().await
    }

    pub async fn start_scan(&self) -> Result<(), DomainError> {
        self.discovery.start_scan().await
    }

    pub async fn cancel_scan(&self) -> Result<(), DomainError> {
        self.discovery.cancel_scan().await
    }

    pub async fn wait_for_scan(&self) {
        self.discovery.wait_for_scan().await
    }

    /// Bind to a device currently listed in the directory
    pub async fn select_device(
        &self,
        address: &DeviceAddress,
    ) -> Result<PrinterBinding, DomainError> {
        let record = self
            .discovery
            .find(address)
            .await
            .ok_or(DomainError::DeviceUnavailable)?;
        self.printer
            .bind(record.address, Some(record.display_name))
            .await
    }

    /// Bind directly, without consulting the directory
    pub async fn bind(
        &self,
        address: DeviceAddress,
        display_name: Option<String>,
    ) -> Result<PrinterBinding, DomainError> {
        self.printer.bind(address, display_name).await
    }

    pub async fn current_binding(&self) -> Option<PrinterBinding> {
        self.printer.current_binding().await
    }

    pub async fn print_ticket(
        &self,
        counter_label: &str,
        number: u32,
    ) -> Result<PrintReceipt, DomainError> {
        self.printer.print_ticket(counter_label, number).await
    }
}
