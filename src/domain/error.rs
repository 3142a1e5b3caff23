//! Error taxonomy for the wallet flow and the asset server.

use thiserror::Error;

/// EIP-1193: the user rejected the request.
pub const USER_REJECTED_CODE: i64 = 4001;
/// EIP-3085/3326: the wallet does not know the requested chain.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;
/// A request of the same kind is already awaiting the user.
pub const REQUEST_PENDING_CODE: i64 = -32002;

/// Top-level application error
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Wallet(#[from] WalletError),

    #[error("{0}")]
    Network(#[from] NetworkError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Resolution(#[from] ResolutionError),

    #[error("{0}")]
    Submission(#[from] SubmissionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors reported by (or about) the wallet capability
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("No wallet detected")]
    NotDetected,

    #[error("User rejected the request")]
    UserRejected,

    #[error("A wallet request is already pending")]
    RequestPending,

    #[error("Chain {0} has not been added to the wallet")]
    UnrecognizedChain(String),

    #[error("Wallet RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Wallet transport error: {0}")]
    Transport(String),

    #[error("Malformed wallet response: {0}")]
    InvalidResponse(String),

    #[error("Wallet returned no accounts")]
    NoAccounts,

    #[error("Please connect your wallet first")]
    NotConnected,
}

impl WalletError {
    /// Map an EIP-1193 provider error code onto the taxonomy.
    #[must_use]
    pub fn from_code(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            USER_REJECTED_CODE => Self::UserRejected,
            REQUEST_PENDING_CODE => Self::RequestPending,
            UNRECOGNIZED_CHAIN_CODE => Self::UnrecognizedChain(message),
            _ => Self::Rpc { code, message },
        }
    }
}

/// Active network does not match the target
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Wrong network: expected chain {expected}, got {actual}")]
    Mismatch { expected: u64, actual: u64 },

    #[error("Failed to switch network: {0}")]
    SwitchFailed(String),
}

/// Tip form validation failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter recipient address or BaseName")]
    MissingRecipient,

    #[error("Please enter a valid tip amount")]
    InvalidAmount,
}

/// Recipient resolution failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("BaseName not found")]
    NameNotFound,

    #[error("Could not resolve BaseName")]
    LookupFailed,

    #[error("Invalid recipient address or BaseName")]
    InvalidRecipient,
}

/// Broadcast and confirmation failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Transaction broadcast failed: {0}")]
    Broadcast(String),

    #[error("Transaction reverted: {0}")]
    Reverted(String),

    #[error("Could not confirm transaction: {0}")]
    Confirmation(String),
}

/// Environment configuration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
