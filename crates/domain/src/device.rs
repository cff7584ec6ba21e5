use crate::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Stable hardware identifier of a printer (a Bluetooth MAC on phones,
/// a serial port path such as `/dev/rfcomm0` on hosts).
///
/// Surrounding whitespace is trimmed; comparison is exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceAddress(String);

impl DeviceAddress {
    pub fn new(address: impl Into<String>) -> Result<Self> {
        let address = address.into();
        let trimmed = address.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidAddress(
                "Device address cannot be empty".to_string(),
            ));
        }

        if trimmed.chars().any(char::is_control) {
            return Err(DomainError::InvalidAddress(format!(
                "Device address {trimmed:?} contains control characters"
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for DeviceAddress {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<DeviceAddress> for String {
    fn from(address: DeviceAddress) -> Self {
        address.0
    }
}

/// Where a device record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceOrigin {
    /// Paired at platform level, known without scanning
    Bonded,
    /// Reported by an active discovery scan
    Discovered,
}

/// A candidate printer as listed to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub address: DeviceAddress,
    pub display_name: String,
    pub origin: DeviceOrigin,
}

impl DeviceRecord {
    /// Bonded devices without a name are shown by address
    pub fn bonded(address: DeviceAddress, name: Option<String>) -> Self {
        let display_name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| address.to_string());
        Self {
            address,
            display_name,
            origin: DeviceOrigin::Bonded,
        }
    }

    pub fn discovered(address: DeviceAddress, name: impl Into<String>) -> Self {
        Self {
            address,
            display_name: name.into(),
            origin: DeviceOrigin::Discovered,
        }
    }

    pub fn is_bonded(&self) -> bool {
        self.origin == DeviceOrigin::Bonded
    }

    /// Picker line, e.g. `[Paired] MTP-II (00:11:22:33:44:55)`
    pub fn label(&self) -> String {
        match self.origin {
            DeviceOrigin::Bonded => format!("[Paired] {} ({})", self.display_name, self.address),
            DeviceOrigin::Discovered => format!("{} ({})", self.display_name, self.address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> DeviceAddress {
        DeviceAddress::new(s).unwrap()
    }

    #[test]
    fn test_address_is_trimmed() {
        assert_eq!(addr("  00:11:22:33:44:55 ").as_str(), "00:11:22:33:44:55");
    }

    #[test]
    fn test_empty_address_rejected() {
        assert!(DeviceAddress::new("   ").is_err());
        assert!(DeviceAddress::new("AA:\nBB").is_err());
    }

    #[test]
    fn test_bonded_without_name_uses_address() {
        let record = DeviceRecord::bonded(addr("/dev/rfcomm0"), None);
        assert_eq!(record.display_name, "/dev/rfcomm0");
        assert!(record.is_bonded());
    }

    #[test]
    fn test_labels() {
        let bonded = DeviceRecord::bonded(addr("AA:BB"), Some("MTP-II".into()));
        assert_eq!(bonded.label(), "[Paired] MTP-II (AA:BB)");

        let found = DeviceRecord::discovered(addr("CC:DD"), "PT-210");
        assert_eq!(found.label(), "PT-210 (CC:DD)");
        assert_eq!(found.origin, DeviceOrigin::Discovered);
    }
}
