pub mod discovery;
pub mod state;

pub use discovery::{DeviceDiscovery, DirectorySnapshot};
pub use state::{DeviceDirectory, ScanStatus};
