use std::collections::HashSet;

use domain::{DeviceAddress, DeviceRecord};

/// Ordered, address-unique list of candidate printers.
///
/// Bonded records come first (re-seeded on every scan), discovered records
/// follow in arrival order. Mutated only by the discovery actor.
#[derive(Debug, Default)]
pub struct DeviceDirectory {
    records: Vec<DeviceRecord>,
    addresses: HashSet<DeviceAddress>,
}

impl DeviceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything and start over from the bonded registry
    pub fn reseed(&mut self, bonded: Vec<DeviceRecord>) {
        self.records.clear();
        self.addresses.clear();
        for record in bonded {
            self.insert(record);
        }
    }

    /// Append unless a record with the same address exists. Returns whether it was added.
    pub fn insert(&mut self, record: DeviceRecord) -> bool {
        if !self.addresses.insert(record.address.clone()) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn contains(&self, address: &DeviceAddress) -> bool {
        self.addresses.contains(address)
    }

    pub fn find(&self, address: &DeviceAddress) -> Option<&DeviceRecord> {
        self.records.iter().find(|r| &r.address == address)
    }

    pub fn records(&self) -> &[DeviceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Lifecycle of the most recent scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanStatus {
    /// No scan started since the engine came up
    #[default]
    Idle,
    Scanning,
    /// Radio reported the end of discovery
    Finished,
    /// Stopped by the caller or by a print session
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> DeviceAddress {
        DeviceAddress::new(s).unwrap()
    }

    fn addresses(dir: &DeviceDirectory) -> Vec<&str> {
        dir.records().iter().map(|r| r.address.as_str()).collect()
    }

    #[test]
    fn test_bonded_then_discovered_without_duplicates() {
        let mut dir = DeviceDirectory::new();
        dir.reseed(vec![
            DeviceRecord::bonded(addr("A"), Some("Printer A".into())),
            DeviceRecord::bonded(addr("B"), Some("Printer B".into())),
        ]);

        assert!(!dir.insert(DeviceRecord::discovered(addr("B"), "Printer B")));
        assert!(dir.insert(DeviceRecord::discovered(addr("C"), "Printer C")));

        assert_eq!(addresses(&dir), vec!["A", "B", "C"]);
        assert!(dir.find(&addr("B")).unwrap().is_bonded());
    }

    #[test]
    fn test_dedup_ignores_name() {
        let mut dir = DeviceDirectory::new();
        assert!(dir.insert(DeviceRecord::discovered(addr("C"), "First")));
        assert!(!dir.insert(DeviceRecord::discovered(addr("C"), "Renamed")));
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.find(&addr("C")).unwrap().display_name, "First");
    }

    #[test]
    fn test_reseed_drops_discovered() {
        let mut dir = DeviceDirectory::new();
        dir.reseed(vec![DeviceRecord::bonded(addr("A"), None)]);
        dir.insert(DeviceRecord::discovered(addr("C"), "C"));

        dir.reseed(vec![DeviceRecord::bonded(addr("A"), None)]);
        assert_eq!(addresses(&dir), vec!["A"]);
        assert!(!dir.contains(&addr("C")));
    }

    #[test]
    fn test_duplicate_bonded_entries_collapse() {
        let mut dir = DeviceDirectory::new();
        dir.reseed(vec![
            DeviceRecord::bonded(addr("A"), None),
            DeviceRecord::bonded(addr("A"), None),
        ]);
        assert_eq!(dir.len(), 1);
    }
}
