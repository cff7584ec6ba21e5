//! Domain layer - Pure queue and printer model with no I/O
//!
//! This crate contains:
//! - Value objects (CounterId, DeviceAddress, Ticket, TicketLayout)
//! - Entities (Counter, DeviceRecord, PrinterBinding)
//! - The print session state machine states
//! - Collaborator interfaces (KeyValueStore, Radio, PrinterConnection)
//!
//! Principles:
//! - No dependencies on infrastructure
//! - Invariants enforced at domain level
//! - Every failure is a `DomainError` value

pub mod counter;
pub mod device;
pub mod error;
pub mod printer;
pub mod radio;
pub mod storage;
pub mod ticket;

// Re-export commonly used types
pub use counter::{Counter, CounterId, CounterSpec};
pub use device::{DeviceAddress, DeviceOrigin, DeviceRecord};
pub use error::DomainError;
pub use printer::{PrinterBinding, PrinterConnection, PrinterError, SERIAL_PORT_PROFILE, SessionState};
pub use radio::{DiscoverySink, Radio, RadioAccess};
pub use storage::{KeyValueStore, StoredValue};
pub use ticket::{Ticket, TicketLayout};
