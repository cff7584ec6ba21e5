mod scan_task;
mod serial_radio;
mod simulated_radio;

pub use serial_radio::SerialRadio;
pub use simulated_radio::SimulatedRadio;

use std::sync::Arc;
use std::time::Duration;

use domain::Radio;
use tracing::info;

use crate::config::{RadioConfig, RadioKind};

/// Factory for the configured radio stack
pub struct RadioFactory;

impl RadioFactory {
    pub fn create(config: &RadioConfig) -> Arc<dyn Radio> {
        match config.kind {
            RadioKind::Serial => {
                info!(
                    scan_window_secs = config.scan_window_secs,
                    baud_rate = config.baud_rate,
                    "Using serial port radio"
                );
                Arc::new(SerialRadio::new(
                    Duration::from_secs(config.scan_window_secs),
                    Duration::from_millis(config.poll_interval_ms),
                    config.baud_rate,
                    config.include_all_ports,
                ))
            }
            RadioKind::Simulated => {
                info!(
                    devices = config.simulated.devices.len(),
                    "Using simulated radio"
                );
                Arc::new(SimulatedRadio::new(config.simulated.clone()))
            }
        }
    }
}
