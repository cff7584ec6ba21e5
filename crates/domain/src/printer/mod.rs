mod binding;
mod connection;
mod session_state;

pub use binding::PrinterBinding;
pub use connection::{PrinterConnection, PrinterError, SERIAL_PORT_PROFILE};
pub use session_state::SessionState;
