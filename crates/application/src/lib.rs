//! Application layer - queue counters, device directory and print sessions

pub mod counter;
pub mod directory;
pub mod engine;
pub mod printer;

pub use counter::CounterStore;
pub use directory::{DeviceDiscovery, DeviceDirectory, DirectorySnapshot, ScanStatus};
pub use engine::{EngineSettings, IssuedTicket, QueuePrinterEngine};
pub use printer::{
    PrintReceipt, PrintSession, PrinterConnectionManager, SessionTimeouts, TicketEncoder,
};
