pub mod file_printer;
pub mod mock_printer;
pub mod serial_printer;

pub use file_printer::FilePrinter;
pub use mock_printer::{MockPrinter, MockPrinterBehavior};
pub use serial_printer::SerialPrinter;
