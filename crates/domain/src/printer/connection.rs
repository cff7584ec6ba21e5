use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Serial Port Profile service class, `00001101-0000-1000-8000-00805F9B34FB`
pub const SERIAL_PORT_PROFILE: Uuid = Uuid::from_u128(0x0000_1101_0000_1000_8000_0080_5F9B_34FB);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrinterError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Write failed: {0}")]
    WriteFailed(String),
    #[error("Not connected")]
    NotConnected,
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

/// One serial link to a printer. A handle is used for a single
/// connect-send-disconnect session and then dropped.
#[async_trait]
pub trait PrinterConnection: Send + Sync {
    /// Open the connection-oriented link to the given service
    async fn connect(&mut self, service: Uuid) -> Result<(), PrinterError>;

    /// Release the stream and the connection
    async fn disconnect(&mut self) -> Result<(), PrinterError>;

    /// Check if the connection is currently active
    async fn is_connected(&self) -> bool;

    /// Send raw bytes (ESC/POS commands) to the printer and flush
    async fn send_commands(&mut self, commands: &[u8]) -> Result<(), PrinterError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_port_profile_uuid() {
        assert_eq!(
            SERIAL_PORT_PROFILE.to_string().to_uppercase(),
            "00001101-0000-1000-8000-00805F9B34FB"
        );
    }
}
