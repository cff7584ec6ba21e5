use async_trait::async_trait;
use domain::{PrinterConnection, PrinterError};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// SPP link to a printer through the OS serial port the Bluetooth stack
/// bound to it (`/dev/rfcommN` on Linux, an outgoing COM port on Windows).
///
/// The stream sits behind a Mutex so the link is Sync as `PrinterConnection` requires.
pub struct SerialPrinter {
    port: String,
    baud_rate: u32,
    stream: Option<Mutex<SerialStream>>,
}

impl SerialPrinter {
    pub fn new(port: &str, baud_rate: u32) -> Self {
        Self {
            port: port.to_string(),
            baud_rate,
            stream: None,
        }
    }

    // Windows needs \\.\COM10 style names for ports above COM9
    fn port_name(&self) -> String {
        if cfg!(target_os = "windows") && !self.port.to_uppercase().starts_with(r"\\.\") {
            format!(r"\\.\{}", self.port)
        } else {
            self.port.clone()
        }
    }
}

fn open_error(port: &str, e: tokio_serial::Error) -> PrinterError {
    match e.kind() {
        tokio_serial::ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => {
            PrinterError::PermissionDenied(format!("{port}: {e}"))
        }
        tokio_serial::ErrorKind::NoDevice => {
            PrinterError::ConnectionFailed(format!("{port}: device unreachable"))
        }
        _ => PrinterError::ConnectionFailed(format!("{port}: {e}")),
    }
}

#[async_trait]
impl PrinterConnection for SerialPrinter {
    async fn connect(&mut self, service: Uuid) -> Result<(), PrinterError> {
        let port_name = self.port_name();
        debug!(port = %port_name, baud_rate = self.baud_rate, %service, "Opening printer serial link");

        // The RFCOMM binding already targets the SPP channel; the service
        // id is only informational here.
        let stream = tokio_serial::new(&port_name, self.baud_rate)
            .open_native_async()
            .map_err(|e| {
                warn!(port = %port_name, error = %e, "Failed to open printer serial link");
                open_error(&port_name, e)
            })?;

        self.stream = Some(Mutex::new(stream));
        info!(port = %self.port, "Printer link open");
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), PrinterError> {
        if let Some(stream) = self.stream.take() {
            let mut stream = stream.into_inner();
            if let Err(e) = stream.shutdown().await {
                warn!(port = %self.port, error = %e, "Error shutting down printer link");
            }
        }
        debug!(port = %self.port, "Printer link closed");
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn send_commands(&mut self, commands: &[u8]) -> Result<(), PrinterError> {
        let Some(stream) = self.stream.as_ref() else {
            return Err(PrinterError::NotConnected);
        };
        let mut stream = stream.lock().await;

        if let Err(e) = stream.write_all(commands).await {
            error!(port = %self.port, error = %e, "Failed to write to printer");
            return Err(PrinterError::WriteFailed(e.to_string()));
        }
        if let Err(e) = stream.flush().await {
            error!(port = %self.port, error = %e, "Failed to flush printer link");
            return Err(PrinterError::WriteFailed(e.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_without_connect_fails() {
        let mut printer = SerialPrinter::new("/dev/rfcomm-missing", 9600);
        assert!(!printer.is_connected().await);
        assert_eq!(
            printer.send_commands(&[0x1B, 0x40]).await,
            Err(PrinterError::NotConnected)
        );
    }

    #[tokio::test]
    async fn test_connect_to_missing_port_fails() {
        let mut printer = SerialPrinter::new("/dev/rfcomm-missing", 9600);
        let result = printer.connect(domain::SERIAL_PORT_PROFILE).await;
        assert!(result.is_err());
        assert!(!printer.is_connected().await);
        // Releasing an unopened link is harmless
        assert!(printer.disconnect().await.is_ok());
    }
}
