use crate::device::DeviceAddress;
use serde::{Deserialize, Serialize};

/// The single printer currently selected as print target.
///
/// The printer is always addressed by `address`; the name is informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterBinding {
    pub address: DeviceAddress,
    pub last_known_name: Option<String>,
}

impl PrinterBinding {
    /// Persistence key of the bound address
    pub const ADDRESS_KEY: &'static str = "printer.address";

    pub fn new(address: DeviceAddress, last_known_name: Option<String>) -> Self {
        Self {
            address,
            last_known_name,
        }
    }

    /// e.g. `MTP-II (00:11:22:33:44:55)` or `Saved (00:11:22:33:44:55)`
    pub fn describe(&self) -> String {
        match &self.last_known_name {
            Some(name) => format!("{} ({})", name, self.address),
            None => format!("Saved ({})", self.address),
        }
    }
}
