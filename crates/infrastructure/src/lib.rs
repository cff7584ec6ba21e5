//! Infrastructure layer - persistence, radio and printer links

pub mod config;
pub mod printer;
pub mod radio;
pub mod storage;

pub use config::AgentConfig;
pub use printer::{FilePrinter, MockPrinter, MockPrinterBehavior, SerialPrinter};
pub use radio::{RadioFactory, SerialRadio, SimulatedRadio};
pub use storage::{MemoryKeyValueStore, SqliteKeyValueStore, open_store};
