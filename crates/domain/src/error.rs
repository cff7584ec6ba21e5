use thiserror::Error;

/// Every condition the queue printer core can signal to its caller.
///
/// All variants are recoverable by the caller; none of them terminate the
/// host process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Radio permission denied")]
    PermissionDenied,

    #[error("Radio is disabled")]
    RadioDisabled,

    #[error("No printer selected")]
    NoPrinterSelected,

    #[error("Printer device unavailable")]
    DeviceUnavailable,

    #[error("Connect failed: {0}")]
    ConnectFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("No number yet")]
    NoNumberYet,

    #[error("Number {requested} is out of range (issued: {issued})")]
    OutOfRange { requested: i64, issued: u32 },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Unknown counter: {0}")]
    UnknownCounter(String),

    #[error("Invalid counter ID: {0}")]
    InvalidCounterId(String),

    #[error("Invalid device address: {0}")]
    InvalidAddress(String),

    #[error("Scan failed: {0}")]
    ScanFailed(String),
}

impl DomainError {
    /// Conditions the caller can only fix by changing radio settings or
    /// granting permissions, as opposed to retrying.
    pub fn needs_user_action(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::RadioDisabled)
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
