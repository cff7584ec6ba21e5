use std::sync::Arc;

use domain::{
    DeviceAddress, DomainError, KeyValueStore, PrinterBinding, Radio, StoredValue, Ticket,
};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::encoder::TicketEncoder;
use super::session::{PrintReceipt, PrintSession, SessionTimeouts};
use crate::directory::DeviceDiscovery;

/// Owns the printer binding and runs print sessions against it.
///
/// Sessions are serialized by the radio lock shared with discovery, so a
/// second print waits for the first and never interleaves on the link.
pub struct PrinterConnectionManager {
    radio: Arc<dyn Radio>,
    store: Arc<dyn KeyValueStore>,
    discovery: DeviceDiscovery,
    encoder: TicketEncoder,
    timeouts: SessionTimeouts,
    radio_lock: Arc<Mutex<()>>,
    binding: RwLock<Option<PrinterBinding>>,
}

impl PrinterConnectionManager {
    /// Restore the persisted binding. The name is looked up best-effort in
    /// the bonded registry.
    pub async fn restore(
        radio: Arc<dyn Radio>,
        store: Arc<dyn KeyValueStore>,
        discovery: DeviceDiscovery,
        encoder: TicketEncoder,
        timeouts: SessionTimeouts,
        radio_lock: Arc<Mutex<()>>,
    ) -> Result<Self, DomainError> {
        let binding = match store.get(PrinterBinding::ADDRESS_KEY).await? {
            Some(StoredValue::Text(saved)) => match DeviceAddress::new(saved) {
                Ok(address) => {
                    let name = match radio.bonded_devices().await {
                        Ok(bonded) => bonded
                            .into_iter()
                            .find(|r| r.address == address && r.display_name != address.as_str())
                            .map(|r| r.display_name),
                        Err(e) => {
                            debug!(error = %e, "Bonded registry unavailable, binding name unknown");
                            None
                        }
                    };
                    Some(PrinterBinding::new(address, name))
                }
                Err(e) => {
                    warn!(error = %e, "Ignoring malformed saved printer address");
                    None
                }
            },
            Some(StoredValue::Int(_)) => {
                warn!("Ignoring non-text saved printer address");
                None
            }
            None => None,
        };

        if let Some(binding) = &binding {
            info!(printer = %binding.describe(), "Printer binding restored");
        }

        Ok(Self {
            radio,
            store,
            discovery,
            encoder,
            timeouts,
            radio_lock,
            binding: RwLock::new(binding),
        })
    }

    /// Select the target printer and persist its address
    pub async fn bind(
        &self,
        address: DeviceAddress,
        display_name: Option<String>,
    ) -> Result<PrinterBinding, DomainError> {
        let mut binding = self.binding.write().await;

        self.store
            .put_all(vec![(
                PrinterBinding::ADDRESS_KEY.to_string(),
                StoredValue::Text(address.to_string()),
            )])
            .await?;

        let bound = PrinterBinding::new(address, display_name);
        info!(printer = %bound.describe(), "Printer selected");
        *binding = Some(bound.clone());
        Ok(bound)
    }

    pub async fn current_binding(&self) -> Option<PrinterBinding> {
        self.binding.read().await.clone()
    }

    /// Print a ticket stamped with the current local time
    pub async fn print_ticket(
        &self,
        counter_label: &str,
        number: u32,
    ) -> Result<PrintReceipt, DomainError> {
        self.print(&Ticket::issued_now(counter_label, number)).await
    }

    pub async fn print(&self, ticket: &Ticket) -> Result<PrintReceipt, DomainError> {
        let payload = self.encoder.encode(ticket);
        let binding = self.current_binding().await;

        let _radio = self.radio_lock.lock().await;
        let mut session = PrintSession::new(binding, self.timeouts);
        let result = session
            .run(self.radio.as_ref(), &self.discovery, &payload)
            .await;

        debug!(
            counter = %ticket.counter_label,
            number = ticket.number,
            state = %session.state(),
            "Print session ended"
        );
        result
    }
}
