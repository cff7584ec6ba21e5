use std::time::Duration;

use domain::{
    DeviceAddress, DomainError, PrinterBinding, PrinterConnection, PrinterError, Radio,
    RadioAccess, SERIAL_PORT_PROFILE, SessionState,
};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::directory::DeviceDiscovery;

/// Upper bounds for the blocking steps of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimeouts {
    pub connect: Duration,
    pub send: Duration,
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            send: Duration::from_secs(10),
        }
    }
}

/// Result of a delivered ticket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintReceipt {
    pub address: DeviceAddress,
    pub bytes_sent: usize,
}

/// One connect → write → disconnect attempt. Never retried; a new call
/// builds a new session and a new device handle.
pub struct PrintSession {
    binding: Option<PrinterBinding>,
    timeouts: SessionTimeouts,
    state: SessionState,
}

impl PrintSession {
    pub fn new(binding: Option<PrinterBinding>, timeouts: SessionTimeouts) -> Self {
        Self {
            binding,
            timeouts,
            state: SessionState::Unbound,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the session to a terminal state. The caller holds the radio lock.
    pub async fn run(
        &mut self,
        radio: &dyn Radio,
        discovery: &DeviceDiscovery,
        payload: &[u8],
    ) -> Result<PrintReceipt, DomainError> {
        let Some(binding) = self.binding.clone() else {
            self.state = self.state.to_failed();
            return Err(DomainError::NoPrinterSelected);
        };

        self.enter(self.state.to_resolving());
        if let Err(e) = radio.check_access(RadioAccess::Connect).await {
            self.state = self.state.to_failed();
            return Err(e);
        }

        let mut link = match radio.resolve(&binding.address).await {
            Ok(link) => link,
            Err(e) => {
                warn!(address = %binding.address, error = %e, "Printer could not be resolved");
                self.state = self.state.to_failed();
                return Err(match e {
                    DomainError::PermissionDenied | DomainError::RadioDisabled => e,
                    _ => DomainError::DeviceUnavailable,
                });
            }
        };

        self.enter(self.state.to_connecting());
        if let Err(e) = discovery.cancel_while_locked().await {
            warn!(error = %e, "Failed to cancel discovery before connecting");
        }

        let outcome = self.connect_and_send(link.as_mut(), payload).await;

        self.enter(self.state.to_closing());
        if let Err(e) = link.disconnect().await {
            warn!(address = %binding.address, error = %e, "Error releasing printer link");
        }
        drop(link);

        match outcome {
            Ok(()) => {
                self.enter(self.state.to_done());
                info!(address = %binding.address, bytes = payload.len(), "Ticket printed");
                Ok(PrintReceipt {
                    address: binding.address,
                    bytes_sent: payload.len(),
                })
            }
            Err(e) => {
                self.state = self.state.to_failed();
                warn!(address = %binding.address, error = %e, "Print session failed");
                Err(e)
            }
        }
    }

    async fn connect_and_send(
        &mut self,
        link: &mut dyn PrinterConnection,
        payload: &[u8],
    ) -> Result<(), DomainError> {
        match timeout(self.timeouts.connect, link.connect(SERIAL_PORT_PROFILE)).await {
            Err(_) => return Err(DomainError::ConnectFailed("timeout".to_string())),
            Ok(Err(e)) => return Err(DomainError::ConnectFailed(reason(e))),
            Ok(Ok(())) => {}
        }

        self.enter(self.state.to_sending());
        match timeout(self.timeouts.send, link.send_commands(payload)).await {
            Err(_) => Err(DomainError::ConnectFailed("timeout".to_string())),
            Ok(Err(e)) => Err(DomainError::WriteFailed(reason(e))),
            Ok(Ok(())) => Ok(()),
        }
    }

    fn enter(&mut self, next: Result<SessionState, &'static str>) {
        match next {
            Ok(state) => {
                debug!(from = %self.state, to = %state, "Print session transition");
                self.state = state;
            }
            Err(violation) => {
                warn!(from = %self.state, violation, "Invalid print session transition");
                self.state = self.state.to_failed();
            }
        }
    }
}

fn reason(error: PrinterError) -> String {
    match error {
        PrinterError::ConnectionFailed(r) | PrinterError::WriteFailed(r) => r,
        other => other.to_string(),
    }
}
