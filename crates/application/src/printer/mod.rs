pub mod builder;
pub mod encoder;
pub mod manager;
pub mod session;

pub use builder::ReceiptBuilder;
pub use encoder::TicketEncoder;
pub use manager::PrinterConnectionManager;
pub use session::{PrintReceipt, PrintSession, SessionTimeouts};
