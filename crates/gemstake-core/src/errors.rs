//! Error types for Gemstake

use thiserror::Error;

/// Core errors that can occur in Gemstake
#[derive(Debug, Error)]
pub enum Error {
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),
}

/// Errors raised by the staking session itself
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("No Gem Bank client has been initialized.")]
    NotInitialized,

    #[error("Action not allowed: {reason}")]
    ActionNotAllowed { reason: String },

    #[error("Another staking action is still in progress")]
    ActionInProgress,
}

/// Errors surfaced by chain collaborators (bank, farm, connection, inventory)
#[derive(Debug, Clone, Error)]
pub enum ChainError {
    #[error("Account not found: {address}")]
    AccountNotFound { address: String },

    #[error("Deposit rejected by whitelist: {mint}")]
    WhitelistRejection { mint: String },

    #[error("RPC error: {message}")]
    Rpc { message: String },

    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Failed to decode account: {message}")]
    Decode { message: String },
}

impl ChainError {
    pub fn rpc(message: impl Into<String>) -> Self {
        Self::Rpc {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Result type alias for Gemstake operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Session(SessionError::Configuration(_)) => "configuration_error",
            Self::Session(SessionError::NotInitialized) => "not_initialized",
            Self::Session(SessionError::ActionNotAllowed { .. }) => "action_not_allowed",
            Self::Session(SessionError::ActionInProgress) => "action_in_progress",
            Self::Chain(ChainError::AccountNotFound { .. }) => "account_not_found",
            Self::Chain(ChainError::WhitelistRejection { .. }) => "whitelist_rejection",
            Self::Chain(ChainError::Rpc { .. }) => "rpc_error",
            Self::Chain(ChainError::Timeout { .. }) => "timeout",
            Self::Chain(ChainError::Decode { .. }) => "decode_error",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Session(SessionError::Configuration(_)) => 400,
            Self::Session(SessionError::NotInitialized) => 409,
            Self::Session(SessionError::ActionInProgress) => 409,
            Self::Session(SessionError::ActionNotAllowed { .. }) => 422,
            Self::Chain(ChainError::AccountNotFound { .. }) => 404,
            Self::Chain(ChainError::WhitelistRejection { .. }) => 422,
            Self::Chain(ChainError::Timeout { .. }) => 504,
            Self::Chain(ChainError::Rpc { .. }) | Self::Chain(ChainError::Decode { .. }) => 502,
        }
    }
}

impl SessionError {
    pub fn not_allowed(reason: impl Into<String>) -> Self {
        Self::ActionNotAllowed {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = Error::from(SessionError::Configuration("missing farm".into()));
        assert_eq!(err.error_code(), "configuration_error");
        assert_eq!(err.status_code(), 400);

        let err = Error::from(ChainError::Timeout { secs: 90 });
        assert_eq!(err.error_code(), "timeout");
        assert_eq!(err.status_code(), 504);
    }

    #[test]
    fn test_not_initialized_message() {
        let err = Error::from(SessionError::NotInitialized);
        assert_eq!(
            err.to_string(),
            "Session error: No Gem Bank client has been initialized."
        );
    }
}
