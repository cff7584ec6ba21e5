use serde::{Deserialize, Serialize};

/// State of a single print session (one per `print_ticket` call)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Session created, binding not checked yet
    Unbound,
    /// Turning the bound address into a fresh device handle
    Resolving,
    /// Opening the serial link
    Connecting,
    /// Writing and flushing the ticket payload
    Sending,
    /// Releasing stream and connection
    Closing,
    /// Ticket delivered and link released
    Done,
    /// Session ended with an error
    Failed,
}

impl SessionState {
    pub fn to_resolving(&self) -> Result<Self, &'static str> {
        match self {
            Self::Unbound => Ok(Self::Resolving),
            _ => Err("Can only resolve from Unbound state"),
        }
    }

    pub fn to_connecting(&self) -> Result<Self, &'static str> {
        match self {
            Self::Resolving => Ok(Self::Connecting),
            _ => Err("Can only connect from Resolving state"),
        }
    }

    pub fn to_sending(&self) -> Result<Self, &'static str> {
        match self {
            Self::Connecting => Ok(Self::Sending),
            _ => Err("Can only send from Connecting state"),
        }
    }

    pub fn to_closing(&self) -> Result<Self, &'static str> {
        match self {
            Self::Connecting | Self::Sending => Ok(Self::Closing),
            _ => Err("Can only close from Connecting or Sending state"),
        }
    }

    pub fn to_done(&self) -> Result<Self, &'static str> {
        match self {
            Self::Closing => Ok(Self::Done),
            _ => Err("Can only finish from Closing state"),
        }
    }

    /// Transition to failed state
    pub fn to_failed(&self) -> Self {
        Self::Failed
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Unbound
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unbound => "unbound",
            Self::Resolving => "resolving",
            Self::Connecting => "connecting",
            Self::Sending => "sending",
            Self::Closing => "closing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_unbound() {
        let state = SessionState::default();
        assert_eq!(state, SessionState::Unbound);
    }

    #[test]
    fn test_happy_path() {
        let state = SessionState::Unbound
            .to_resolving()
            .and_then(|s| s.to_connecting())
            .and_then(|s| s.to_sending())
            .and_then(|s| s.to_closing())
            .and_then(|s| s.to_done())
            .unwrap();
        assert_eq!(state, SessionState::Done);
    }

    #[test]
    fn test_close_after_failed_connect() {
        assert_eq!(
            SessionState::Connecting.to_closing().unwrap(),
            SessionState::Closing
        );
    }

    #[test]
    fn test_cannot_send_without_connecting() {
        assert!(SessionState::Resolving.to_sending().is_err());
        assert!(SessionState::Unbound.to_connecting().is_err());
    }

    #[test]
    fn test_cannot_finish_without_closing() {
        assert!(SessionState::Sending.to_done().is_err());
    }

    #[test]
    fn test_to_failed_from_any_state() {
        assert_eq!(SessionState::Unbound.to_failed(), SessionState::Failed);
        assert_eq!(SessionState::Sending.to_failed(), SessionState::Failed);
        assert_eq!(SessionState::Closing.to_failed(), SessionState::Failed);
    }

    #[test]
    fn test_display() {
        assert_eq!(SessionState::Connecting.to_string(), "connecting");
    }
}
